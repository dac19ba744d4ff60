//! Graph generators and independent checks shared by the integration tests.
#![allow(dead_code)]

use mcb::{BasisCycle, CsrGraph, Weight};

pub type Edge = (usize, usize, Weight);

pub fn cycle_edges(n: usize, weight: Weight) -> Vec<Edge> {
    (0..n).map(|i| (i, (i + 1) % n, weight)).collect()
}

pub fn complete_edges(n: usize) -> Vec<Edge> {
    let mut edges = Vec::new();
    for u in 0..n {
        for v in u + 1..n {
            edges.push((u, v, 1));
        }
    }
    edges
}

/// `rows x cols` grid with unit weights.
pub fn grid_edges(rows: usize, cols: usize) -> Vec<Edge> {
    let id = |r: usize, c: usize| r * cols + c;
    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                edges.push((id(r, c), id(r, c + 1), 1));
            }
            if r + 1 < rows {
                edges.push((id(r, c), id(r + 1, c), 1));
            }
        }
    }
    edges
}

pub fn graph(n: usize, edges: &[Edge]) -> CsrGraph {
    CsrGraph::from_edges(n, edges).unwrap()
}

/// Connected components, counted independently with petgraph.
pub fn components(n: usize, edges: &[Edge]) -> usize {
    let mut g = petgraph::graph::UnGraph::<(), ()>::new_undirected();
    let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
    for &(u, v, _) in edges {
        g.add_edge(nodes[u], nodes[v], ());
    }
    petgraph::algo::connected_components(&g)
}

/// Edge-incidence mask of a cycle (input graphs in the tests have at most 128 edges).
pub fn mask(cycle: &BasisCycle) -> u128 {
    cycle.edges.iter().fold(0u128, |m, &e| m ^ (1u128 << e))
}

/// GF(2) rank of a set of edge masks.
pub fn rank(masks: impl IntoIterator<Item = u128>) -> usize {
    let mut pivots: Vec<u128> = Vec::new();
    for mut m in masks {
        for &p in &pivots {
            m = m.min(m ^ p);
        }
        if m != 0 {
            pivots.push(m);
            pivots.sort_unstable_by(|a, b| b.cmp(a));
        }
    }
    pivots.len()
}

/// Checks that a basis cycle is an even subgraph whose weight matches its edges.
pub fn assert_is_cycle(edges: &[Edge], cycle: &BasisCycle) {
    let mut parity = std::collections::HashMap::new();
    let mut weight = 0;
    for &e in &cycle.edges {
        let (u, v, w) = edges[e];
        *parity.entry(u).or_insert(0usize) += 1;
        *parity.entry(v).or_insert(0usize) += 1;
        weight += w;
    }
    assert!(parity.values().all(|d| d % 2 == 0), "odd vertex in {cycle:?}");
    assert_eq!(weight, cycle.weight);
}

/// Minimum cycle basis weight from every vertex's shortest-path tree, by greedy elimination.
pub fn horton_weight(n: usize, edges: &[Edge]) -> Weight {
    let mut candidates: Vec<(Weight, u128)> = Vec::new();
    for root in 0..n {
        // Bellman-Ford style relaxation; parent edge per vertex
        let mut dist = vec![Weight::MAX; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        dist[root] = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for (k, &(u, v, w)) in edges.iter().enumerate() {
                for (a, b) in [(u, v), (v, u)] {
                    if dist[a] != Weight::MAX && dist[a] + w < dist[b] {
                        dist[b] = dist[a] + w;
                        parent[b] = Some(k);
                        changed = true;
                    }
                }
            }
        }
        let path = |mut x: usize| {
            let mut m = 0u128;
            while let Some(k) = parent[x] {
                m ^= 1u128 << k;
                let (u, v, _) = edges[k];
                x = if u == x { v } else { u };
            }
            m
        };
        for (k, &(u, v, _)) in edges.iter().enumerate() {
            if dist[u] == Weight::MAX || parent[u] == Some(k) || parent[v] == Some(k) {
                continue;
            }
            let m = path(u) ^ path(v) ^ (1u128 << k);
            if m == 0 {
                continue;
            }
            let w = (0..edges.len()).filter(|&e| m >> e & 1 == 1).map(|e| edges[e].2).sum();
            candidates.push((w, m));
        }
    }
    candidates.sort_unstable();

    let dim = edges.len() + components(n, edges) - n;
    let mut chosen: Vec<u128> = Vec::new();
    let mut total = 0;
    for (w, m) in candidates {
        if chosen.len() == dim {
            break;
        }
        let mut trial = chosen.clone();
        trial.push(m);
        if rank(trial.iter().copied()) > chosen.len() {
            chosen.push(m);
            total += w;
        }
    }
    assert_eq!(chosen.len(), dim);
    total
}
