mod common;

use common::*;
use mcb::graph::{contract, get_modified_graph, mark_degree_two_chains, SpanningTree};
use mcb::Reduction;

#[test]
fn contraction_conserves_weight_and_vertices() {
    let mut edges = grid_edges(3, 6);
    // a pendant path and a detached cycle
    edges.extend([(17, 18, 2), (18, 19, 3), (20, 21, 1), (21, 22, 1), (22, 20, 1)]);
    let g = graph(24, &edges);
    let r = Reduction::contract(&g, true).unwrap();

    assert_eq!(r.graph().total_weight(), g.total_weight());
    assert_eq!(r.graph().node_count() + r.nodes_removed() + r.isolated(), 24);
    assert_eq!(r.isolated(), 1);
    assert!(r.graph().validate().is_ok());
}

#[test]
fn contraction_keeps_cycle_space_dimension() {
    let mut edges = grid_edges(4, 3);
    edges.extend([(0, 11, 4), (2, 9, 4)]);
    let g = graph(12, &edges);
    let before = SpanningTree::bfs(&g).unwrap().num_non_tree_edges();
    let r = Reduction::contract(&g, true).unwrap();
    let after = SpanningTree::bfs(r.graph()).unwrap().num_non_tree_edges();
    assert_eq!(before, after);
    assert_eq!(before, edges.len() + components(12, &edges) - 12);
}

#[test]
fn every_input_edge_is_expanded_exactly_once() {
    let edges = vec![(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1), (0, 2, 5), (3, 4, 2), (4, 5, 2)];
    let g = graph(6, &edges);
    let r = Reduction::contract(&g, true).unwrap();
    let mut all: Vec<usize> = r.graph().edges().flat_map(|a| r.expand(a).to_vec()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..edges.len()).collect::<Vec<_>>());
}

#[test]
fn second_contraction_changes_nothing() {
    let edges = grid_edges(3, 4);
    let r = Reduction::contract(&graph(12, &edges), true).unwrap();
    let chains = mark_degree_two_chains(r.graph());
    assert_eq!(chains.nodes_removed, 0);
    assert!(chains.chains.is_empty());
}

#[test]
fn single_round_matches_mark_and_relabel() {
    let edges = vec![(0, 1, 1), (1, 2, 1), (2, 0, 1), (0, 3, 1), (3, 4, 1), (4, 0, 1), (0, 5, 1)];
    let g = graph(6, &edges);
    let (c, relabeled) = contract(&g);
    let marked = mark_degree_two_chains(&g);
    assert_eq!(c, marked);
    let manual = get_modified_graph(&g, &marked.removed, &marked.new_edges());
    assert_eq!(relabeled, manual);
    // both triangles become self-loops on vertex 0, which keeps its pendant edge
    assert_eq!(c.nodes_removed, 4);
    assert_eq!(relabeled.graph.node_count(), 2);
    assert_eq!(relabeled.graph.edge_count(), 3);
}

#[test]
fn relabel_is_deterministic() {
    let edges = grid_edges(5, 5);
    let g = graph(25, &edges);
    let marked = mark_degree_two_chains(&g);
    let a = get_modified_graph(&g, &marked.removed, &marked.new_edges());
    let b = get_modified_graph(&g, &marked.removed, &marked.new_edges());
    assert_eq!(a, b);
    for (new, &old) in a.new_to_old.iter().enumerate() {
        assert_eq!(a.old_to_new[old], Some(new));
    }
}

#[test]
fn spanning_forest_matches_component_count() {
    let mut edges = grid_edges(2, 3);
    edges.extend([(6, 7, 1), (8, 9, 1), (9, 10, 1), (10, 8, 1)]);
    let g = graph(12, &edges);
    let st = SpanningTree::bfs(&g).unwrap();
    assert_eq!(st.components(), components(12, &edges));
    let (_, count) = g.connected_components();
    assert_eq!(count, components(12, &edges));
}
