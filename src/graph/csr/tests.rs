//! Tests for the CSR multigraph.

use super::*;

fn square() -> CsrGraph {
    // 0-1-2-3-0, unit weights
    CsrGraph::from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)]).unwrap()
}

#[test]
fn test_square_layout() {
    let g = square();
    assert_eq!(g.node_count(), 4);
    assert_eq!(g.arc_count(), 8);
    assert_eq!(g.edge_count(), 4);
    assert_eq!(g.row_offsets(), &[0, 2, 4, 6, 8]);
    for v in 0..4 {
        assert_eq!(g.degree(v), 2);
    }
    assert_eq!(g.vertices_of_degree(2), 4);
    g.validate().unwrap();
}

#[test]
fn test_arcs_sorted_by_row_then_col() {
    let g = square();
    let pairs: Vec<(usize, usize)> = (0..g.arc_count()).map(|a| (g.row(a), g.col(a))).collect();
    let mut sorted = pairs.clone();
    sorted.sort();
    assert_eq!(pairs, sorted);
}

#[test]
fn test_reverse_edges_pair_up() {
    let g = square();
    for a in 0..g.arc_count() {
        let r = g.reverse(a);
        assert_eq!(g.reverse(r), a);
        assert_eq!(g.row(r), g.col(a));
        assert_eq!(g.col(r), g.row(a));
    }
}

#[test]
fn test_origins_point_at_input_ordinals() {
    let g = CsrGraph::from_edges(3, &[(2, 1, 5), (0, 2, 7)]).unwrap();
    for a in 0..g.arc_count() {
        let k = g.original(a).unwrap();
        assert_eq!(g.chain(a), None);
        let expected = if k == 0 { 5 } else { 7 };
        assert_eq!(g.weight(a), expected);
    }
    assert_eq!(g.total_weight(), 12);
}

#[test]
fn test_parallel_edges_keep_insertion_order() {
    let mut b = CsrGraphBuilder::new(2);
    b.insert(0, 1, 3, None, Some(0));
    b.insert(0, 1, 9, Some(0), None);
    let g = b.build();
    assert_eq!(g.arcs(0), 0..2);
    assert_eq!(g.weight(0), 3);
    assert_eq!(g.weight(1), 9);
    assert_eq!(g.chain(1), Some(0));
    g.validate().unwrap();
}

#[test]
fn test_self_loop_arcs_reverse_each_other() {
    let mut b = CsrGraphBuilder::new(2);
    b.insert(1, 1, 4, Some(0), None);
    b.insert(0, 1, 1, None, Some(0));
    let g = b.build();
    let loops: Vec<usize> = (0..g.arc_count()).filter(|&a| g.is_self_loop(a)).collect();
    assert_eq!(loops.len(), 2);
    assert_eq!(g.reverse(loops[0]), loops[1]);
    assert_eq!(g.degree(1), 3);
    assert_eq!(g.total_weight(), 5);
    assert_eq!(g.edges().count(), 2);
    g.validate().unwrap();
}

#[test]
fn test_rejects_self_loop_and_out_of_range() {
    assert!(matches!(
        CsrGraph::from_edges(2, &[(1, 1, 1)]),
        Err(McbError::InvalidGraph(_))
    ));
    assert!(matches!(
        CsrGraph::from_edges(2, &[(0, 2, 1)]),
        Err(McbError::InvalidGraph(_))
    ));
}

#[test]
fn test_empty_graph() {
    let g = CsrGraph::from_edges(0, &[]).unwrap();
    assert_eq!(g.node_count(), 0);
    assert_eq!(g.arc_count(), 0);
    assert_eq!(g.row_offsets(), &[0]);
    g.validate().unwrap();
}

#[test]
fn test_connected_components() {
    // two triangles, disjoint, plus an isolated vertex
    let g = CsrGraph::from_edges(
        7,
        &[(0, 1, 1), (1, 2, 1), (2, 0, 1), (3, 4, 1), (4, 5, 1), (5, 3, 1)],
    )
    .unwrap();
    let (labels, count) = g.connected_components();
    assert_eq!(count, 3);
    assert_eq!(labels, vec![0, 0, 0, 1, 1, 1, 2]);
    assert!(!g.is_connected());
    assert!(square().is_connected());
}

#[test]
fn test_bfs_arcs_discover_tree() {
    let g = square();
    let order = g.bfs_arcs(0);
    assert_eq!(order.len(), 4);
    assert_eq!(order[0], (0, None));
    for &(v, via) in &order[1..] {
        let a = via.unwrap();
        assert_eq!(g.col(a), v);
    }
}

#[test]
fn test_total_weight_is_bounded() {
    let g = CsrGraph::from_edges(2, &[(0, 1, MAX_TOTAL_WEIGHT)]).unwrap();
    assert_eq!(g.total_weight(), MAX_TOTAL_WEIGHT);

    let err = CsrGraph::from_edges(3, &[(0, 1, MAX_TOTAL_WEIGHT), (1, 2, 1)]).unwrap_err();
    assert!(matches!(err, McbError::InvalidGraph(_)));
    let err = CsrGraph::from_edges(3, &[(0, 1, Weight::MAX), (1, 2, Weight::MAX)]).unwrap_err();
    assert!(matches!(err, McbError::InvalidGraph(_)));
}

#[test]
fn test_built_graph_total_weight_saturates() {
    let mut builder = CsrGraphBuilder::new(3);
    builder.insert(0, 1, Weight::MAX, None, None);
    builder.insert(1, 2, Weight::MAX, None, None);
    assert_eq!(builder.build().total_weight(), Weight::MAX);
}
