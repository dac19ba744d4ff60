//! Flat storage for the shortest-path trees of every feedback vertex.
//!
//! Trees are grouped into chunks of `chunk_size` roots. Within a chunk each logical array is a
//! single allocation holding one `n`-sized slot per tree (`n + 1` for the child offsets), so a
//! tree is addressed by `(chunk, slot)` and its arrays are contiguous.
//!
//! Per tree:
//! - `parent[v]`: arc from `v`'s parent to `v`, `NONE` for the root and unreachable vertices
//! - `distance[v]`: weight of the tree path, `Weight::MAX` if unreachable
//! - `nodes_index`: reachable vertices in settlement order, padded with `NONE`
//! - `tree_rows` / `tree_cols` / `edge_offset`: children of each vertex (CSR) and the arc used
//! - `precompute_value[v]`: parity bit for the support vector under test
//!
//! The structure is filled once in parallel through [`CompressedTrees::slots_mut`]; after that
//! only the precompute bits change, through [`CompressedTrees::precompute_mut`].
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `new` | \(O(f \cdot n)\) | seven arrays per chunk |
//! | `tree` | \(O(1)\) | slice arithmetic |
//! | `slots_mut` / `precompute_mut` | \(O(f)\) | disjoint borrows, no copying |

use crate::alloc::{AllocError, ArrayAlloc, ArrayBuf};
use crate::graph::Weight;

/// Sentinel for "no vertex" / "no arc" in the flat arrays.
pub const NONE: usize = usize::MAX;

struct TreeChunk {
    trees: usize,
    tree_rows: ArrayBuf<usize>,
    tree_cols: ArrayBuf<usize>,
    edge_offset: ArrayBuf<usize>,
    parent: ArrayBuf<usize>,
    distance: ArrayBuf<Weight>,
    nodes_index: ArrayBuf<usize>,
    precompute_value: ArrayBuf<u8>,
}

impl TreeChunk {
    fn new<A: ArrayAlloc>(alloc: &A, trees: usize, n: usize) -> Result<Self, AllocError> {
        Ok(Self {
            trees,
            tree_rows: alloc.allocate(trees * (n + 1))?,
            tree_cols: alloc.allocate(trees * n)?,
            edge_offset: alloc.allocate(trees * n)?,
            parent: alloc.allocate(trees * n)?,
            distance: alloc.allocate(trees * n)?,
            nodes_index: alloc.allocate(trees * n)?,
            precompute_value: alloc.allocate(trees * n)?,
        })
    }

    fn byte_len(&self) -> usize {
        self.tree_rows.byte_len()
            + self.tree_cols.byte_len()
            + self.edge_offset.byte_len()
            + self.parent.byte_len()
            + self.distance.byte_len()
            + self.nodes_index.byte_len()
            + self.precompute_value.byte_len()
    }
}

/// Write access to one tree's arrays during construction.
pub struct TreeSlotMut<'a> {
    /// Compact index of the tree.
    pub index: usize,
    /// Root vertex.
    pub root: usize,
    /// Child offsets, `n + 1` entries.
    pub tree_rows: &'a mut [usize],
    /// Children, grouped by parent.
    pub tree_cols: &'a mut [usize],
    /// Arc from parent to each entry of `tree_cols`.
    pub edge_offset: &'a mut [usize],
    /// Parent arc per vertex.
    pub parent: &'a mut [usize],
    /// Tree distance per vertex.
    pub distance: &'a mut [Weight],
    /// Settlement order.
    pub nodes_index: &'a mut [usize],
    /// Number of valid entries in `nodes_index`.
    pub reached: &'a mut usize,
}

/// Read access to one finished tree.
#[derive(Clone, Copy)]
pub struct TreeView<'a> {
    index: usize,
    root: usize,
    tree_rows: &'a [usize],
    tree_cols: &'a [usize],
    edge_offset: &'a [usize],
    parent: &'a [usize],
    distance: &'a [Weight],
    nodes_index: &'a [usize],
}

impl<'a> TreeView<'a> {
    /// Compact index of the tree.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Root vertex.
    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    /// Arc from `v`'s parent to `v`.
    #[inline]
    pub fn parent_arc(&self, v: usize) -> Option<usize> {
        match self.parent[v] {
            NONE => None,
            a => Some(a),
        }
    }

    /// Tree distance of `v`.
    #[inline]
    pub fn distance(&self, v: usize) -> Weight {
        self.distance[v]
    }

    /// Returns `true` if `v` is in the root's component.
    #[inline]
    pub fn is_reachable(&self, v: usize) -> bool {
        v == self.root || self.parent[v] != NONE
    }

    /// Reachable vertices in settlement order.
    #[inline]
    pub fn order(&self) -> &'a [usize] {
        self.nodes_index
    }

    /// `(child, arc)` pairs below `v`.
    pub fn children(&self, v: usize) -> impl Iterator<Item = (usize, usize)> + 'a {
        let range = self.tree_rows[v]..self.tree_rows[v + 1];
        let cols = self.tree_cols;
        let arcs = self.edge_offset;
        range.map(move |k| (cols[k], arcs[k]))
    }
}

impl core::fmt::Debug for TreeView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeView")
            .field("index", &self.index)
            .field("root", &self.root)
            .field("reached", &self.nodes_index.len())
            .finish()
    }
}

/// Shortest-path trees of all roots in chunked flat arrays.
pub struct CompressedTrees {
    nodes: usize,
    chunk_size: usize,
    roots: Vec<usize>,
    reached: Vec<usize>,
    chunks: Vec<TreeChunk>,
    allocator: &'static str,
    pinned: bool,
}

impl CompressedTrees {
    /// Allocates storage for one tree per entry of `roots` over an `nodes`-vertex graph.
    ///
    /// A `chunk_size` of 0 puts every tree in one chunk.
    ///
    /// # Errors
    /// Propagates the allocator's failure.
    pub fn new<A: ArrayAlloc>(
        alloc: &A,
        nodes: usize,
        roots: &[usize],
        chunk_size: usize,
    ) -> Result<Self, AllocError> {
        let chunk_size = if chunk_size == 0 { roots.len().max(1) } else { chunk_size };
        let mut chunks = Vec::with_capacity(roots.len().div_ceil(chunk_size));
        let mut left = roots.len();
        while left > 0 {
            let trees = left.min(chunk_size);
            chunks.push(TreeChunk::new(alloc, trees, nodes)?);
            left -= trees;
        }
        let pinned = !chunks.is_empty() && chunks.iter().all(|c| c.parent.is_pinned());
        Ok(Self {
            nodes,
            chunk_size,
            roots: roots.to_vec(),
            reached: vec![0; roots.len()],
            chunks,
            allocator: alloc.name(),
            pinned,
        })
    }

    /// Number of trees.
    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if there are no trees.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Trees per chunk.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks.
    #[inline]
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Root of tree `idx`.
    #[inline]
    pub fn root(&self, idx: usize) -> usize {
        self.roots[idx]
    }

    /// Name of the allocation strategy in use.
    pub fn allocator(&self) -> &'static str {
        self.allocator
    }

    /// Returns `true` if every array is page-locked.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Total bytes across all arrays.
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(TreeChunk::byte_len).sum()
    }

    /// Read access to tree `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= len()`.
    pub fn tree(&self, idx: usize) -> TreeView<'_> {
        let n = self.nodes;
        let chunk = &self.chunks[idx / self.chunk_size];
        let slot = idx % self.chunk_size;
        let span = slot * n..(slot + 1) * n;
        TreeView {
            index: idx,
            root: self.roots[idx],
            tree_rows: &chunk.tree_rows[slot * (n + 1)..(slot + 1) * (n + 1)],
            tree_cols: &chunk.tree_cols[span.clone()],
            edge_offset: &chunk.edge_offset[span.clone()],
            parent: &chunk.parent[span.clone()],
            distance: &chunk.distance[span.clone()],
            nodes_index: &chunk.nodes_index[slot * n..slot * n + self.reached[idx]],
        }
    }

    /// Precompute bits of tree `idx`.
    pub fn precompute(&self, idx: usize) -> &[u8] {
        let n = self.nodes;
        let chunk = &self.chunks[idx / self.chunk_size];
        let slot = idx % self.chunk_size;
        &chunk.precompute_value[slot * n..(slot + 1) * n]
    }

    /// Splits the storage into one writable slot per tree, in index order.
    pub fn slots_mut(&mut self) -> Vec<TreeSlotMut<'_>> {
        let Self {
            nodes,
            roots,
            reached,
            chunks,
            ..
        } = self;
        let n = *nodes;
        let mut out = Vec::with_capacity(roots.len());
        let mut counts = reached.iter_mut();
        let mut roots = roots.iter().copied().enumerate();

        for chunk in chunks.iter_mut() {
            let TreeChunk {
                trees,
                tree_rows,
                tree_cols,
                edge_offset,
                parent,
                distance,
                nodes_index,
                ..
            } = chunk;
            let arrays = tree_rows
                .chunks_mut(n + 1)
                .zip(tree_cols.chunks_mut(n))
                .zip(edge_offset.chunks_mut(n))
                .zip(parent.chunks_mut(n))
                .zip(distance.chunks_mut(n))
                .zip(nodes_index.chunks_mut(n))
                .take(*trees);
            for (((((rows, cols), offsets), parent), distance), order) in arrays {
                let (Some((index, root)), Some(reached)) = (roots.next(), counts.next()) else {
                    break;
                };
                out.push(TreeSlotMut {
                    index,
                    root,
                    tree_rows: rows,
                    tree_cols: cols,
                    edge_offset: offsets,
                    parent,
                    distance,
                    nodes_index: order,
                    reached,
                });
            }
        }
        out
    }

    /// Pairs every finished tree with its writable precompute bits, in index order.
    pub fn precompute_mut(&mut self) -> Vec<(TreeView<'_>, &mut [u8])> {
        let Self {
            nodes,
            chunk_size,
            roots,
            reached,
            chunks,
            ..
        } = self;
        let n = *nodes;
        let mut out = Vec::with_capacity(roots.len());

        for (c, chunk) in chunks.iter_mut().enumerate() {
            let TreeChunk {
                trees,
                tree_rows,
                tree_cols,
                edge_offset,
                parent,
                distance,
                nodes_index,
                precompute_value,
            } = chunk;
            for (slot, pre) in precompute_value.chunks_mut(n).take(*trees).enumerate() {
                let idx = c * *chunk_size + slot;
                let span = slot * n..(slot + 1) * n;
                let view = TreeView {
                    index: idx,
                    root: roots[idx],
                    tree_rows: &tree_rows[slot * (n + 1)..(slot + 1) * (n + 1)],
                    tree_cols: &tree_cols[span.clone()],
                    edge_offset: &edge_offset[span.clone()],
                    parent: &parent[span.clone()],
                    distance: &distance[span.clone()],
                    nodes_index: &nodes_index[slot * n..slot * n + reached[idx]],
                };
                out.push((view, pre));
            }
        }
        out
    }
}

impl core::fmt::Debug for CompressedTrees {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompressedTrees")
            .field("trees", &self.roots.len())
            .field("nodes", &self.nodes)
            .field("chunk_size", &self.chunk_size)
            .field("chunks", &self.chunks.len())
            .field("allocator", &self.allocator)
            .finish()
    }
}
