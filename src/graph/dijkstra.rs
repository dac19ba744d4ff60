//! Single-source shortest paths with reusable scratch space.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `run` | \(O((n + m) \log n)\) | binary heap, lazy deletion |
//! | `reset` | \(O(\text{reached})\) | only touched vertices are cleared |

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use super::csr::{CsrGraph, Weight};

/// Dijkstra scratch buffers for one worker, reused across roots.
///
/// Vertices settle in `(distance, vertex)` order and a tentative parent only changes on a
/// strictly shorter distance, so the tree for a given root is unique.
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    root: usize,
    distance: Vec<Weight>,
    parent: Vec<Option<usize>>,
    settled: Vec<bool>,
    order: Vec<usize>,
    touched: Vec<usize>,
    heap: BinaryHeap<Reverse<(Weight, usize)>>,
}

impl ShortestPaths {
    /// Allocates scratch for graphs with `nodes` vertices.
    pub fn new(nodes: usize) -> Self {
        Self {
            root: 0,
            distance: vec![Weight::MAX; nodes],
            parent: vec![None; nodes],
            settled: vec![false; nodes],
            order: Vec::with_capacity(nodes),
            touched: Vec::with_capacity(nodes),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        for &v in &self.touched {
            self.distance[v] = Weight::MAX;
            self.parent[v] = None;
            self.settled[v] = false;
        }
        self.touched.clear();
        self.order.clear();
        self.heap.clear();
    }

    /// Computes the shortest-path tree of `graph` rooted at `root`.
    ///
    /// # Panics
    /// Panics if `root` is out of bounds or the scratch was sized for another graph.
    pub fn run(&mut self, graph: &CsrGraph, root: usize) {
        assert_eq!(self.distance.len(), graph.node_count(), "scratch sized for another graph");
        self.reset();
        self.root = root;
        self.distance[root] = 0;
        self.touched.push(root);
        self.heap.push(Reverse((0, root)));

        while let Some(Reverse((d, u))) = self.heap.pop() {
            if self.settled[u] || d > self.distance[u] {
                continue;
            }
            self.settled[u] = true;
            self.order.push(u);
            for (a, v) in graph.neighbors(u) {
                if self.settled[v] {
                    continue;
                }
                let nd = d.saturating_add(graph.weight(a));
                if nd < self.distance[v] {
                    if self.distance[v] == Weight::MAX {
                        self.touched.push(v);
                    }
                    self.distance[v] = nd;
                    self.parent[v] = Some(a);
                    self.heap.push(Reverse((nd, v)));
                }
            }
        }
    }

    /// Root of the last run.
    #[inline]
    pub fn root(&self) -> usize {
        self.root
    }

    /// Distance from the root, `Weight::MAX` if unreachable.
    #[inline]
    pub fn distance(&self, v: usize) -> Weight {
        self.distance[v]
    }

    /// All distances.
    #[inline]
    pub fn distances(&self) -> &[Weight] {
        &self.distance
    }

    /// Arc from `v`'s parent to `v`.
    #[inline]
    pub fn parent_arc(&self, v: usize) -> Option<usize> {
        self.parent[v]
    }

    /// Returns `true` if `v` was reached from the root.
    #[inline]
    pub fn is_reachable(&self, v: usize) -> bool {
        self.settled[v]
    }

    /// Vertices in settlement order; every parent precedes its children.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_paths_prefer_light_detour() {
        // 0-1 heavy, 0-2-1 light
        let g = CsrGraph::from_edges(4, &[(0, 1, 10), (0, 2, 1), (2, 1, 2)]).unwrap();
        let mut sp = ShortestPaths::new(4);
        sp.run(&g, 0);
        assert_eq!(sp.distance(1), 3);
        assert_eq!(sp.distance(2), 1);
        assert_eq!(sp.order(), &[0, 2, 1]);
        let p = sp.parent_arc(1).unwrap();
        assert_eq!((g.row(p), g.col(p)), (2, 1));
        assert!(!sp.is_reachable(3));
        assert_eq!(sp.distance(3), Weight::MAX);
        assert_eq!(sp.parent_arc(0), None);
    }

    #[test]
    fn test_ties_keep_first_parent() {
        // both 1 and 2 reach 3 at distance 2; 1 settles first
        let g = CsrGraph::from_edges(4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]).unwrap();
        let mut sp = ShortestPaths::new(4);
        sp.run(&g, 0);
        let p = sp.parent_arc(3).unwrap();
        assert_eq!(g.row(p), 1);
    }

    #[test]
    fn test_scratch_is_reusable() {
        let g = CsrGraph::from_edges(3, &[(0, 1, 1), (1, 2, 1)]).unwrap();
        let mut sp = ShortestPaths::new(3);
        sp.run(&g, 0);
        sp.run(&g, 2);
        assert_eq!(sp.root(), 2);
        assert_eq!(sp.distances(), &[2, 1, 0]);
        assert_eq!(sp.parent_arc(2), None);
        assert_eq!(sp.order(), &[2, 1, 0]);
    }
}
