//! Rebuilding a graph after arcs are deleted and synthetic edges are added.
//!
//! Vertices are relabeled densely in first-seen order: the endpoints of the new edges first,
//! then the endpoints of the surviving edges in arc-index order. Vertices touched by no edge
//! are dropped. The traversal order is fixed, so identical inputs give identical graphs.

use super::csr::{CsrGraph, CsrGraphBuilder, Weight};

/// A synthetic edge added by a rewrite, with endpoints in the source graph's labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewEdge {
    /// First endpoint.
    pub row: usize,
    /// Second endpoint.
    pub col: usize,
    /// Edge weight.
    pub weight: Weight,
}

/// Result of `get_modified_graph`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relabeled {
    /// The rebuilt graph.
    pub graph: CsrGraph,
    /// `old_to_new[v]` is the new label of source vertex `v`, or `None` if it was dropped.
    pub old_to_new: Vec<Option<usize>>,
    /// `new_to_old[v]` is the source label of new vertex `v`.
    pub new_to_old: Vec<usize>,
}

/// Builds the graph left after deleting the arcs flagged in `removed` and adding `new_edges`.
///
/// New edge `k` gets `chain == Some(k)` and no original arc. A surviving edge keeps a
/// back-reference to its canonical source arc in `original`. Both arcs of an edge must carry
/// the same `removed` flag.
///
/// # Panics
/// Panics if `removed.len()` differs from the arc count or a new edge endpoint is out of bounds.
pub fn get_modified_graph(graph: &CsrGraph, removed: &[bool], new_edges: &[NewEdge]) -> Relabeled {
    assert_eq!(removed.len(), graph.arc_count(), "removed flags must cover every arc");
    let n = graph.node_count();
    let mut old_to_new = vec![None; n];
    let mut new_to_old = Vec::new();

    let mut label = |v: usize| -> usize {
        *old_to_new[v].get_or_insert_with(|| {
            new_to_old.push(v);
            new_to_old.len() - 1
        })
    };

    let mut edges = Vec::with_capacity(new_edges.len() + graph.edge_count());
    for (k, e) in new_edges.iter().enumerate() {
        assert!(e.row < n && e.col < n, "new edge {k} out of bounds");
        let (a, b) = (label(e.row), label(e.col));
        edges.push((a, b, e.weight, Some(k), None));
    }
    for arc in graph.edges() {
        debug_assert_eq!(removed[arc], removed[graph.reverse(arc)]);
        if removed[arc] {
            continue;
        }
        let (a, b) = (label(graph.row(arc)), label(graph.col(arc)));
        edges.push((a, b, graph.weight(arc), None, Some(arc)));
    }

    let mut builder = CsrGraphBuilder::new(new_to_old.len());
    builder.reserve(edges.len());
    for (a, b, w, chain, original) in edges {
        builder.insert(a, b, w, chain, original);
    }

    Relabeled {
        graph: builder.build(),
        old_to_new,
        new_to_old,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_edges_are_labeled_first() {
        // path 0-1-2 plus edge 2-3; replace 0-1-2 by a new edge 0-2
        let g = CsrGraph::from_edges(4, &[(0, 1, 1), (1, 2, 2), (2, 3, 5)]).unwrap();
        let mut removed = vec![false; g.arc_count()];
        for a in 0..g.arc_count() {
            if g.row(a) == 1 || g.col(a) == 1 {
                removed[a] = true;
            }
        }
        let r = get_modified_graph(&g, &removed, &[NewEdge { row: 0, col: 2, weight: 3 }]);
        assert_eq!(r.new_to_old, vec![0, 2, 3]);
        assert_eq!(r.old_to_new, vec![Some(0), None, Some(1), Some(2)]);
        assert_eq!(r.graph.node_count(), 3);
        assert_eq!(r.graph.edge_count(), 2);
        assert_eq!(r.graph.total_weight(), 8);
        r.graph.validate().unwrap();

        let synthetic: Vec<usize> = (0..r.graph.arc_count())
            .filter(|&a| r.graph.chain(a) == Some(0))
            .collect();
        assert_eq!(synthetic.len(), 2);
        for a in synthetic {
            assert_eq!(r.graph.original(a), None);
            assert_eq!(r.graph.weight(a), 3);
        }
    }

    #[test]
    fn test_surviving_edges_point_at_source_arcs() {
        let g = CsrGraph::from_edges(3, &[(0, 1, 4), (1, 2, 6)]).unwrap();
        let removed = vec![false; g.arc_count()];
        let r = get_modified_graph(&g, &removed, &[]);
        for a in 0..r.graph.arc_count() {
            let src = r.graph.original(a).unwrap();
            assert_eq!(g.weight(src), r.graph.weight(a));
            assert!(src < g.reverse(src));
        }
    }

    #[test]
    fn test_is_deterministic() {
        let g = CsrGraph::from_edges(
            6,
            &[(5, 4, 1), (4, 3, 2), (3, 0, 3), (0, 5, 4), (1, 2, 5), (2, 5, 6)],
        )
        .unwrap();
        let mut removed = vec![false; g.arc_count()];
        removed[0] = true;
        removed[g.reverse(0)] = true;
        let extra = [NewEdge { row: 2, col: 4, weight: 9 }];
        let a = get_modified_graph(&g, &removed, &extra);
        let b = get_modified_graph(&g, &removed, &extra);
        assert_eq!(a, b);
    }
}
