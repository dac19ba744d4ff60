//! Per-thread shortest-path tree construction and the tree walks of the basis loop.
//!
//! A non-tree arc `(u, v)` closes the walk `root ~> u -> v ~> root`. When the two tree paths
//! meet below the root at `w`, they share the prefix `root ~> w`, which cancels over GF(2);
//! the candidate then stands for the cycle through `w`. Such a candidate is kept only when the
//! shared prefix weighs nothing (`distance(w) == 0`), since its length is then the weight of
//! the cycle through `w`. With a positive prefix, the cycle through `w` is strictly lighter
//! and is found from its own roots. A zero-weight edge from a root into a cycle that misses
//! the root is the case that needs the exception.
//!
//! Every walk here strips the shared prefix before it is hashed or expanded.

use tracing::trace;

use super::compressed::{TreeSlotMut, TreeView, NONE};
use super::cycle::Cycle;
use super::storage::{CycleKey, SignatureBuilder};
use crate::collections::BitVector;
use crate::graph::{CsrGraph, ShortestPaths, SpanningTree};

/// Scratch state owned by one thread during tree construction.
///
/// A worker handles a contiguous range of roots. For each it runs Dijkstra, writes the tree
/// into its slot of the compressed storage and collects one candidate cycle per usable
/// non-tree edge.
#[derive(Debug)]
pub struct Worker {
    sp: ShortestPaths,
    cursor: Vec<usize>,
    left: Vec<usize>,
    right: Vec<usize>,
    found: Vec<(Cycle, CycleKey)>,
    trees_built: usize,
}

impl Worker {
    /// Creates a worker for graphs with `nodes` vertices.
    pub fn new(nodes: usize) -> Self {
        Self {
            sp: ShortestPaths::new(nodes),
            cursor: vec![0; nodes + 1],
            left: Vec::new(),
            right: Vec::new(),
            found: Vec::new(),
            trees_built: 0,
        }
    }

    /// Number of trees this worker has built.
    #[inline]
    pub fn trees_built(&self) -> usize {
        self.trees_built
    }

    /// Hands over the collected candidates.
    pub fn take_cycles(&mut self) -> Vec<(Cycle, CycleKey)> {
        core::mem::take(&mut self.found)
    }

    /// Builds the tree of `slot.root`, stores it and collects its candidate cycles.
    pub fn build_tree(&mut self, graph: &CsrGraph, slot: &mut TreeSlotMut<'_>) {
        let n = graph.node_count();
        let root = slot.root;
        self.sp.run(graph, root);
        let sp = &self.sp;
        let order = sp.order();

        for v in 0..n {
            slot.parent[v] = sp.parent_arc(v).unwrap_or(NONE);
            slot.distance[v] = sp.distance(v);
        }
        slot.nodes_index[..order.len()].copy_from_slice(order);
        slot.nodes_index[order.len()..].fill(NONE);
        *slot.reached = order.len();

        // children grouped by parent, each group in settlement order
        slot.tree_rows.fill(0);
        for &v in &order[1..] {
            let a = slot.parent[v];
            slot.tree_rows[graph.row(a) + 1] += 1;
        }
        for v in 0..n {
            slot.tree_rows[v + 1] += slot.tree_rows[v];
        }
        self.cursor.copy_from_slice(&slot.tree_rows[..]);
        for &v in &order[1..] {
            let a = slot.parent[v];
            let p = graph.row(a);
            let k = self.cursor[p];
            self.cursor[p] += 1;
            slot.tree_cols[k] = v;
            slot.edge_offset[k] = a;
        }
        slot.tree_cols[order.len() - 1..].fill(NONE);
        slot.edge_offset[order.len() - 1..].fill(NONE);

        let before = self.found.len();
        for a in graph.edges() {
            let (u, v) = (graph.row(a), graph.col(a));
            if !sp.is_reachable(u) || !sp.is_reachable(v) {
                continue;
            }
            if sp.parent_arc(v) == Some(a) || sp.parent_arc(u) == Some(graph.reverse(a)) {
                continue;
            }
            let meet = closed_walk(graph, |x| sp.parent_arc(x), a, &mut self.left, &mut self.right);
            if sp.distance(meet) != 0 {
                continue;
            }

            let total_length = sp
                .distance(u)
                .saturating_add(sp.distance(v))
                .saturating_add(graph.weight(a));
            let mut key = SignatureBuilder::default();
            key.vertex(u);
            key.vertex(v);
            key.edge(graph.edge_id(a));
            for &p in self.left.iter().chain(&self.right) {
                key.vertex(graph.row(p));
                key.edge(graph.edge_id(p));
            }
            let cycle = Cycle {
                root,
                tree: slot.index,
                non_tree_edge: a,
                total_length,
                id: NONE,
            };
            self.found.push((cycle, key.finish(total_length)));
        }
        self.trees_built += 1;
        trace!(
            root,
            reached = order.len(),
            cycles = self.found.len() - before,
            "built shortest-path tree"
        );
    }
}

/// Collects the tree paths above both ends of `a` into `left` and `right`, bottom-up, with
/// their common prefix removed. Returns the vertex where the two paths meet.
fn closed_walk(
    graph: &CsrGraph,
    parent_arc: impl Fn(usize) -> Option<usize>,
    a: usize,
    left: &mut Vec<usize>,
    right: &mut Vec<usize>,
) -> usize {
    for (end, path) in [(graph.row(a), &mut *left), (graph.col(a), &mut *right)] {
        path.clear();
        let mut x = end;
        while let Some(p) = parent_arc(x) {
            path.push(p);
            x = graph.row(p);
        }
    }
    while let (Some(&p), Some(&q)) = (left.last(), right.last()) {
        if p != q {
            break;
        }
        left.pop();
        right.pop();
    }
    left.last().or(right.last()).map_or(graph.row(a), |&p| graph.row(p))
}

/// Parity bit of one arc under `support`: set if the arc is a non-tree edge whose coordinate
/// is set.
#[inline]
fn support_bit(spanning: &SpanningTree, support: &BitVector, arc: usize) -> u8 {
    spanning
        .non_tree_index(arc)
        .map_or(0, |k| u8::from(support.get(k)))
}

/// Fills `pre[v]` with the parity of `support` over the tree path from the root to `v`.
///
/// Unreachable vertices get 0.
pub fn precompute(view: TreeView<'_>, spanning: &SpanningTree, support: &BitVector, pre: &mut [u8]) {
    pre.fill(0);
    for &u in view.order() {
        let pu = pre[u];
        for (child, arc) in view.children(u) {
            pre[child] = pu ^ support_bit(spanning, support, arc);
        }
    }
}

/// `<C, support>` for the candidate `cycle` given its tree's precompute bits.
#[inline]
pub fn inner_product(
    graph: &CsrGraph,
    spanning: &SpanningTree,
    support: &BitVector,
    pre: &[u8],
    cycle: &Cycle,
) -> bool {
    let a = cycle.non_tree_edge;
    (support_bit(spanning, support, a) ^ pre[graph.row(a)] ^ pre[graph.col(a)]) == 1
}

/// GF(2) membership vector of `cycle` over the non-tree coordinates.
pub fn cycle_vector(
    graph: &CsrGraph,
    spanning: &SpanningTree,
    view: TreeView<'_>,
    cycle: &Cycle,
) -> BitVector {
    let mut vector = BitVector::new(spanning.num_non_tree_edges());
    for arc in cycle_arcs(graph, view, cycle) {
        if let Some(k) = spanning.non_tree_index(arc) {
            vector.toggle(k);
        }
    }
    vector
}

/// Arcs of `cycle`: the closing edge followed by both tree paths up to where they meet.
pub fn cycle_arcs(graph: &CsrGraph, view: TreeView<'_>, cycle: &Cycle) -> Vec<usize> {
    let a = cycle.non_tree_edge;
    let (mut left, mut right) = (Vec::new(), Vec::new());
    closed_walk(graph, |x| view.parent_arc(x), a, &mut left, &mut right);
    let mut arcs = Vec::with_capacity(1 + left.len() + right.len());
    arcs.push(a);
    arcs.extend(left);
    arcs.extend(right);
    arcs
}
