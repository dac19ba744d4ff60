//! The spanning forest that fixes the coordinates of the cycle space.
//!
//! Every undirected edge outside the forest is one coordinate: support vectors and cycle
//! membership vectors are indexed by it.

use std::collections::VecDeque;

use super::csr::{CsrGraph, Weight};
use crate::error::{McbError, Result};

/// A BFS spanning forest and its non-tree edges.
#[derive(Clone, Debug)]
pub struct SpanningTree {
    /// Root of the first tree (vertex 0 for a non-empty graph).
    pub root: usize,
    /// Forest arcs oriented parent to child, in discovery order.
    pub tree_edges: Vec<usize>,
    /// Canonical arc of each non-tree edge; position is the coordinate.
    pub non_tree_edges: Vec<usize>,
    /// `parent_edges[v]` is the arc from `v`'s parent to `v`, `None` for roots.
    pub parent_edges: Vec<Option<usize>>,
    /// Forest distance from the root of `v`'s tree.
    pub distance: Vec<Weight>,
    non_tree_edges_map: Vec<Option<usize>>,
    components: usize,
}

impl SpanningTree {
    /// Builds a BFS forest: vertex 0 first, then each unvisited vertex in id order.
    ///
    /// # Errors
    /// Returns `McbError::Invariant` if the non-tree edge count is not
    /// `edges - nodes + components`.
    pub fn bfs(graph: &CsrGraph) -> Result<Self> {
        let n = graph.node_count();
        let mut parent_edges = vec![None; n];
        let mut distance = vec![0; n];
        let mut seen = vec![false; n];
        let mut is_tree = vec![false; graph.arc_count()];
        let mut tree_edges = Vec::with_capacity(n);
        let mut components = 0;
        let mut queue = VecDeque::new();

        for s in 0..n {
            if seen[s] {
                continue;
            }
            components += 1;
            seen[s] = true;
            queue.push_back(s);
            while let Some(u) = queue.pop_front() {
                for (a, v) in graph.neighbors(u) {
                    if seen[v] {
                        continue;
                    }
                    seen[v] = true;
                    parent_edges[v] = Some(a);
                    distance[v] = distance[u] + graph.weight(a);
                    is_tree[a] = true;
                    is_tree[graph.reverse(a)] = true;
                    tree_edges.push(a);
                    queue.push_back(v);
                }
            }
        }

        let mut non_tree_edges = Vec::new();
        let mut non_tree_edges_map = vec![None; graph.arc_count()];
        for a in graph.edges().filter(|&a| !is_tree[a]) {
            non_tree_edges_map[a] = Some(non_tree_edges.len());
            non_tree_edges_map[graph.reverse(a)] = Some(non_tree_edges.len());
            non_tree_edges.push(a);
        }

        let expected = graph.edge_count() + components - n;
        if non_tree_edges.len() != expected {
            return Err(McbError::invariant(format!(
                "spanning forest has {} non-tree edges, expected {expected}",
                non_tree_edges.len()
            )));
        }

        Ok(Self {
            root: 0,
            tree_edges,
            non_tree_edges,
            parent_edges,
            distance,
            non_tree_edges_map,
            components,
        })
    }

    /// Cycle-space dimension.
    #[inline]
    pub fn num_non_tree_edges(&self) -> usize {
        self.non_tree_edges.len()
    }

    /// Coordinate of the edge containing `arc`, or `None` for forest edges.
    #[inline]
    pub fn non_tree_index(&self, arc: usize) -> Option<usize> {
        self.non_tree_edges_map[arc]
    }

    /// Number of trees in the forest.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_has_one_non_tree_edge() {
        let g = CsrGraph::from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)]).unwrap();
        let t = SpanningTree::bfs(&g).unwrap();
        assert_eq!(t.num_non_tree_edges(), 1);
        assert_eq!(t.tree_edges.len(), 3);
        assert_eq!(t.parent_edges[0], None);
        assert_eq!(t.components(), 1);
        let e = t.non_tree_edges[0];
        assert_eq!(t.non_tree_index(e), Some(0));
        assert_eq!(t.non_tree_index(g.reverse(e)), Some(0));
        for &a in &t.tree_edges {
            assert_eq!(t.non_tree_index(a), None);
            assert_eq!(t.parent_edges[g.col(a)], Some(a));
        }
    }

    #[test]
    fn test_forest_counts_components() {
        // triangle + isolated edge + isolated vertex
        let g = CsrGraph::from_edges(6, &[(0, 1, 1), (1, 2, 1), (2, 0, 1), (3, 4, 1)]).unwrap();
        let t = SpanningTree::bfs(&g).unwrap();
        assert_eq!(t.components(), 3);
        assert_eq!(t.num_non_tree_edges(), 1);
        assert_eq!(t.tree_edges.len(), 3);
    }

    #[test]
    fn test_self_loops_and_parallel_edges_are_non_tree() {
        let mut b = crate::graph::CsrGraphBuilder::new(2);
        b.insert(0, 1, 1, None, Some(0));
        b.insert(0, 1, 2, None, Some(1));
        b.insert(1, 1, 3, None, Some(2));
        let g = b.build();
        let t = SpanningTree::bfs(&g).unwrap();
        assert_eq!(t.num_non_tree_edges(), 2);
        assert_eq!(t.distance[1], 1);
    }
}
