//! A weighted undirected multigraph in CSR (compressed sparse row) form.
//!
//! Every undirected edge is stored as two directed arcs, and every arc knows the index of its
//! partner through `reverse_edge`. Arcs are sorted by `(row, col)`; parallel edges keep their
//! insertion order, which makes construction reproducible.
//!
//! Memory layout:
//! - `rows`, `cols`, `weights`: one entry per arc
//! - `row_offsets`: length `n + 1`, arcs of vertex `v` are `row_offsets[v]..row_offsets[v + 1]`
//! - `reverse_edge`: index of the paired arc
//! - `chains`: `Some(k)` if the arc was synthesized from the `k`-th contracted chain
//! - `edge_original_graph`: `Some(i)` back-reference to the pre-contraction arc (for a graph read
//!   from input, the input edge ordinal)
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `CsrGraphBuilder::build` | \(O(m \log m)\) | stable sort of arcs |
//! | `arcs` / `degree` | \(O(1)\) | offset lookup |
//! | `reverse` | \(O(1)\) | explicit index |
//! | `total_weight` | \(O(m)\) | each undirected edge counted once |

use core::ops::Range;

use crate::error::{McbError, Result};

mod traversal;

/// Edge weight. Weights are non-negative; path lengths are sums of weights.
pub type Weight = u64;

/// Largest total edge weight [`CsrGraph::from_edges`] accepts.
///
/// Any closed walk of two tree paths plus one edge then fits in a [`Weight`].
pub const MAX_TOTAL_WEIGHT: Weight = Weight::MAX / 4;

/// A finalized CSR multigraph. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrGraph {
    nodes: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    weights: Vec<Weight>,
    row_offsets: Vec<usize>,
    degree: Vec<usize>,
    reverse_edge: Vec<usize>,
    chains: Vec<Option<usize>>,
    edge_original_graph: Vec<Option<usize>>,
}

/// Accumulates arcs before the CSR index is computed.
#[derive(Clone, Debug, Default)]
pub struct CsrGraphBuilder {
    nodes: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    weights: Vec<Weight>,
    reverse_edge: Vec<usize>,
    chains: Vec<Option<usize>>,
    edge_original_graph: Vec<Option<usize>>,
}

impl CsrGraphBuilder {
    /// Starts a graph over `nodes` vertices.
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// Reserves room for `edges` more undirected edges.
    pub fn reserve(&mut self, edges: usize) {
        let arcs = edges.saturating_mul(2);
        self.rows.reserve(arcs);
        self.cols.reserve(arcs);
        self.weights.reserve(arcs);
        self.reverse_edge.reserve(arcs);
        self.chains.reserve(arcs);
        self.edge_original_graph.reserve(arcs);
    }

    /// Inserts the undirected edge `{a, b}` as the arc pair `a -> b`, `b -> a`.
    ///
    /// # Panics
    /// Panics if `a` or `b` is not a vertex of the graph.
    pub fn insert(
        &mut self,
        a: usize,
        b: usize,
        weight: Weight,
        chain: Option<usize>,
        original: Option<usize>,
    ) {
        assert!(a < self.nodes && b < self.nodes, "edge {a}-{b} out of bounds for n={}", self.nodes);
        let forward = self.rows.len();
        for (row, col, reverse) in [(a, b, forward + 1), (b, a, forward)] {
            self.rows.push(row);
            self.cols.push(col);
            self.weights.push(weight);
            self.chains.push(chain);
            self.edge_original_graph.push(original);
            self.reverse_edge.push(reverse);
        }
    }

    /// Sorts the arcs, rewires reverse indices and computes degrees and row offsets.
    pub fn build(self) -> CsrGraph {
        let n = self.nodes;
        let m = self.rows.len();

        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by_key(|&i| (self.rows[i], self.cols[i]));

        let mut position = vec![0usize; m];
        for (pos, &old) in order.iter().enumerate() {
            position[old] = pos;
        }

        let rows: Vec<usize> = order.iter().map(|&i| self.rows[i]).collect();
        let cols: Vec<usize> = order.iter().map(|&i| self.cols[i]).collect();
        let weights: Vec<Weight> = order.iter().map(|&i| self.weights[i]).collect();
        let chains: Vec<Option<usize>> = order.iter().map(|&i| self.chains[i]).collect();
        let edge_original_graph: Vec<Option<usize>> =
            order.iter().map(|&i| self.edge_original_graph[i]).collect();
        let reverse_edge: Vec<usize> = order
            .iter()
            .map(|&i| position[self.reverse_edge[i]])
            .collect();

        let mut row_offsets = vec![0usize; n + 1];
        for &r in &rows {
            row_offsets[r + 1] += 1;
        }
        for v in 0..n {
            row_offsets[v + 1] += row_offsets[v];
        }
        let degree: Vec<usize> = row_offsets.windows(2).map(|w| w[1] - w[0]).collect();

        debug_assert_eq!(row_offsets[n], m);

        CsrGraph {
            nodes: n,
            rows,
            cols,
            weights,
            row_offsets,
            degree,
            reverse_edge,
            chains,
            edge_original_graph,
        }
    }
}

impl CsrGraph {
    /// Builds a graph from 0-indexed undirected edges; arc origins record the edge ordinal.
    ///
    /// # Errors
    /// Returns `McbError::InvalidGraph` for out-of-range vertices, self-loops, or a total
    /// weight above [`MAX_TOTAL_WEIGHT`].
    pub fn from_edges(nodes: usize, edges: &[(usize, usize, Weight)]) -> Result<Self> {
        let mut builder = CsrGraphBuilder::new(nodes);
        builder.reserve(edges.len());
        let mut total: Weight = 0;
        for (k, &(u, v, w)) in edges.iter().enumerate() {
            if u >= nodes || v >= nodes {
                return Err(McbError::InvalidGraph(format!(
                    "edge {k} ({u}, {v}) references a vertex outside 0..{nodes}"
                )));
            }
            if u == v {
                return Err(McbError::InvalidGraph(format!("edge {k} is a self-loop on {u}")));
            }
            total = total
                .checked_add(w)
                .filter(|&t| t <= MAX_TOTAL_WEIGHT)
                .ok_or_else(|| {
                    McbError::InvalidGraph(format!(
                        "total weight exceeds {MAX_TOTAL_WEIGHT} at edge {k}"
                    ))
                })?;
            builder.insert(u, v, w, None, Some(k));
        }
        Ok(builder.build())
    }

    /// Number of vertices.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of directed arcs (twice the number of undirected edges).
    #[inline]
    pub fn arc_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.rows.len() / 2
    }

    /// Tail of arc `arc`.
    #[inline]
    pub fn row(&self, arc: usize) -> usize {
        self.rows[arc]
    }

    /// Head of arc `arc`.
    #[inline]
    pub fn col(&self, arc: usize) -> usize {
        self.cols[arc]
    }

    /// Weight of arc `arc`.
    #[inline]
    pub fn weight(&self, arc: usize) -> Weight {
        self.weights[arc]
    }

    /// Index of the arc running the other way along the same edge.
    #[inline]
    pub fn reverse(&self, arc: usize) -> usize {
        self.reverse_edge[arc]
    }

    /// Chain index if the arc was synthesized by contraction.
    #[inline]
    pub fn chain(&self, arc: usize) -> Option<usize> {
        self.chains[arc]
    }

    /// Back-reference to the pre-contraction arc (or input edge ordinal).
    #[inline]
    pub fn original(&self, arc: usize) -> Option<usize> {
        self.edge_original_graph[arc]
    }

    /// Canonical arc of the undirected edge containing `arc` (the smaller index of the pair).
    #[inline]
    pub fn edge_id(&self, arc: usize) -> usize {
        arc.min(self.reverse_edge[arc])
    }

    /// Returns `true` if `arc` is a self-loop.
    #[inline]
    pub fn is_self_loop(&self, arc: usize) -> bool {
        self.rows[arc] == self.cols[arc]
    }

    /// Degree of `node`, counting a self-loop twice.
    #[inline]
    pub fn degree(&self, node: usize) -> usize {
        self.degree[node]
    }

    /// Arc indices leaving `node`.
    #[inline]
    pub fn arcs(&self, node: usize) -> Range<usize> {
        self.row_offsets[node]..self.row_offsets[node + 1]
    }

    /// `(arc, head)` pairs leaving `node`.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.arcs(node).map(move |a| (a, self.cols[a]))
    }

    /// Canonical arcs, one per undirected edge, in index order.
    pub fn edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.arc_count()).filter(move |&a| a < self.reverse_edge[a])
    }

    /// Row offsets (`n + 1` entries).
    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    /// Number of vertices whose degree is exactly `d`.
    pub fn vertices_of_degree(&self, d: usize) -> usize {
        self.degree.iter().filter(|&&x| x == d).count()
    }

    /// Sum of edge weights, each undirected edge counted once.
    pub fn total_weight(&self) -> Weight {
        self.edges()
            .fold(0, |acc: Weight, a| acc.saturating_add(self.weights[a]))
    }

    /// Checks the structural CSR invariants.
    ///
    /// # Errors
    /// Returns `McbError::Invariant` describing the first broken invariant.
    pub fn validate(&self) -> Result<()> {
        let m = self.rows.len();
        if self.row_offsets.len() != self.nodes + 1 || self.row_offsets[self.nodes] != m {
            return Err(McbError::invariant("row offsets do not cover every arc"));
        }
        for a in 0..m {
            let r = self.reverse_edge[a];
            if r >= m || self.reverse_edge[r] != a || r == a {
                return Err(McbError::invariant(format!("arc {a} has no consistent reverse arc")));
            }
            if self.rows[r] != self.cols[a] || self.cols[r] != self.rows[a] {
                return Err(McbError::invariant(format!("reverse of arc {a} has wrong endpoints")));
            }
            if self.weights[r] != self.weights[a] {
                return Err(McbError::invariant(format!("reverse of arc {a} has a different weight")));
            }
            if !self.arcs(self.rows[a]).contains(&a) {
                return Err(McbError::invariant(format!("arc {a} is outside its row")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
