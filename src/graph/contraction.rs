//! Degree-2 chain contraction.
//!
//! A chain is a maximal walk whose interior vertices all have degree exactly 2. Each chain is
//! replaced by a single edge between its two end vertices (anchors) carrying the summed weight;
//! the interior vertices disappear. Cycle-space dimension is unchanged because every removed
//! vertex takes exactly one edge with it.
//!
//! A chain that returns to its own anchor becomes a self-loop. A component in which every
//! vertex has degree 2 has no anchor; its smallest vertex is used as one, so the whole cycle
//! collapses into a self-loop on that vertex.

use tracing::debug;

use super::csr::{CsrGraph, Weight};
use super::relabel::{get_modified_graph, NewEdge, Relabeled};

/// A contracted chain, in the labels of the graph it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    /// Anchor the walk started from.
    pub row: usize,
    /// Anchor the walk ended at.
    pub col: usize,
    /// Sum of the weights along the chain.
    pub weight: Weight,
    /// Arcs of the chain in walk order.
    pub arcs: Vec<usize>,
}

/// Chains found in one graph plus the arcs and vertices they cover.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contraction {
    /// `removed[a]` is set for both arcs of every chain edge.
    pub removed: Vec<bool>,
    /// One entry per chain, in discovery order.
    pub chains: Vec<Chain>,
    /// Number of interior vertices.
    pub nodes_removed: usize,
}

impl Contraction {
    /// The synthetic edges replacing the chains, in chain order.
    pub fn new_edges(&self) -> Vec<NewEdge> {
        self.chains
            .iter()
            .map(|c| NewEdge {
                row: c.row,
                col: c.col,
                weight: c.weight,
            })
            .collect()
    }
}

/// Finds every contractible chain of `graph`.
pub fn mark_degree_two_chains(graph: &CsrGraph) -> Contraction {
    let n = graph.node_count();
    let mut out = Contraction {
        removed: vec![false; graph.arc_count()],
        ..Contraction::default()
    };
    let mut visited = vec![false; graph.arc_count()];
    let mut interior = vec![false; n];

    let is_anchor = |v: usize| graph.degree(v) != 2;
    for s in (0..n).filter(|&v| is_anchor(v)) {
        walk_from(graph, s, &is_anchor, &mut visited, &mut interior, &mut out);
    }

    // pure cycles: no anchor in the component
    for s in 0..n {
        if graph.degree(s) == 2 && !interior[s] && graph.arcs(s).any(|a| !visited[a]) {
            let only_s = |v: usize| v == s;
            walk_from(graph, s, &only_s, &mut visited, &mut interior, &mut out);
        }
    }

    debug!(
        chains = out.chains.len(),
        nodes_removed = out.nodes_removed,
        "marked degree-2 chains"
    );
    out
}

fn walk_from(
    graph: &CsrGraph,
    start: usize,
    is_anchor: &dyn Fn(usize) -> bool,
    visited: &mut [bool],
    interior: &mut [bool],
    out: &mut Contraction,
) {
    for first in graph.arcs(start) {
        if visited[first] {
            continue;
        }
        let mut arcs = vec![first];
        let mut weight = graph.weight(first);
        visited[first] = true;
        visited[graph.reverse(first)] = true;

        let mut last = first;
        let mut cur = graph.col(first);
        let mut inner = 0;
        while !is_anchor(cur) {
            interior[cur] = true;
            inner += 1;
            let mut pair = graph.arcs(cur);
            let (p, q) = match (pair.next(), pair.next()) {
                (Some(p), Some(q)) => (p, q),
                _ => unreachable!("interior vertex {cur} has degree 2"),
            };
            let next = if p == graph.reverse(last) { q } else { p };
            visited[next] = true;
            visited[graph.reverse(next)] = true;
            weight = weight.saturating_add(graph.weight(next));
            arcs.push(next);
            last = next;
            cur = graph.col(next);
        }

        if inner > 0 {
            for &a in &arcs {
                out.removed[a] = true;
                out.removed[graph.reverse(a)] = true;
            }
            out.nodes_removed += inner;
            out.chains.push(Chain {
                row: start,
                col: cur,
                weight,
                arcs,
            });
        }
    }
}

/// Contracts all chains of `graph` once and relabels the result.
pub fn contract(graph: &CsrGraph) -> (Contraction, Relabeled) {
    let contraction = mark_degree_two_chains(graph);
    let relabeled = get_modified_graph(graph, &contraction.removed, &contraction.new_edges());
    (contraction, relabeled)
}
