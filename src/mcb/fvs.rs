//! Feedback vertex set heuristic.
//!
//! Every cycle of a minimum cycle basis passes through a vertex of any feedback vertex set, so
//! shortest-path trees rooted at those vertices are enough to discover a full basis. Fewer
//! roots means fewer trees; the set only has to be complete, not minimum.
//!
//! The heuristic alternates the classic reductions with a greedy pick:
//! 1. a vertex with a self-loop must be in the set;
//! 2. a vertex of degree 0 or 1 is on no cycle and is deleted;
//! 3. a vertex of degree 2 is bypassed by joining its two neighbours (a double edge to one
//!    neighbour becomes a self-loop on it);
//! 4. when no rule applies, the vertex of maximum degree (smallest id on ties) is taken.

use std::collections::{BTreeMap, BinaryHeap};

use core::cmp::Reverse;
use tracing::debug;

use crate::collections::DisjointSet;
use crate::graph::CsrGraph;

/// A feedback vertex set together with its compact indexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVertexSet {
    final_vertices: Vec<usize>,
    vertices_map: Vec<Option<usize>>,
}

/// Working multigraph of the heuristic; parallel edges are kept as multiplicities.
struct Residual {
    adj: Vec<BTreeMap<usize, usize>>,
    degree: Vec<usize>,
    self_loop: Vec<bool>,
    alive: Vec<bool>,
}

impl Residual {
    fn new(graph: &CsrGraph) -> Self {
        let n = graph.node_count();
        let mut r = Self {
            adj: vec![BTreeMap::new(); n],
            degree: vec![0; n],
            self_loop: vec![false; n],
            alive: vec![true; n],
        };
        for a in graph.edges() {
            let (u, v) = (graph.row(a), graph.col(a));
            if u == v {
                r.self_loop[u] = true;
            } else {
                r.link(u, v);
            }
        }
        r
    }

    fn link(&mut self, u: usize, v: usize) {
        *self.adj[u].entry(v).or_insert(0) += 1;
        *self.adj[v].entry(u).or_insert(0) += 1;
        self.degree[u] += 1;
        self.degree[v] += 1;
    }

    /// Deletes `v`, returning its former neighbours.
    fn remove(&mut self, v: usize) -> Vec<usize> {
        self.alive[v] = false;
        let neighbours = core::mem::take(&mut self.adj[v]);
        self.degree[v] = 0;
        let mut out = Vec::with_capacity(neighbours.len());
        for (u, count) in neighbours {
            self.adj[u].remove(&v);
            self.degree[u] -= count;
            out.push(u);
        }
        out
    }

    /// Replaces degree-2 vertex `v` by an edge between its neighbours.
    fn bypass(&mut self, v: usize) -> Vec<usize> {
        let ends: Vec<(usize, usize)> = self.adj[v].iter().map(|(&u, &c)| (u, c)).collect();
        let neighbours = self.remove(v);
        match ends.as_slice() {
            [(a, 2)] => self.self_loop[*a] = true,
            [(a, 1), (b, 1)] => self.link(*a, *b),
            _ => unreachable!("vertex {v} does not have degree 2"),
        }
        neighbours
    }
}

impl FeedbackVertexSet {
    /// Runs the heuristic on `graph`.
    pub fn select(graph: &CsrGraph) -> Self {
        let n = graph.node_count();
        let mut r = Residual::new(graph);
        let mut chosen = Vec::new();
        let mut queue: Vec<usize> = (0..n).rev().collect();
        let mut heap: BinaryHeap<(usize, Reverse<usize>)> =
            (0..n).map(|v| (r.degree[v], Reverse(v))).collect();

        loop {
            while let Some(v) = queue.pop() {
                if !r.alive[v] {
                    continue;
                }
                let touched = if r.self_loop[v] {
                    chosen.push(v);
                    r.remove(v)
                } else if r.degree[v] <= 1 {
                    r.remove(v)
                } else if r.degree[v] == 2 {
                    r.bypass(v)
                } else {
                    continue;
                };
                for u in touched {
                    heap.push((r.degree[u], Reverse(u)));
                    queue.push(u);
                }
            }

            // stale entries are skipped until one matches the live degree
            let pick = loop {
                match heap.pop() {
                    Some((d, Reverse(v))) if r.alive[v] && r.degree[v] == d => break Some(v),
                    Some(_) => continue,
                    None => break None,
                }
            };
            let Some(v) = pick else { break };
            chosen.push(v);
            for u in r.remove(v) {
                heap.push((r.degree[u], Reverse(u)));
                queue.push(u);
            }
        }

        chosen.sort_unstable();
        let mut vertices_map = vec![None; n];
        for (i, &v) in chosen.iter().enumerate() {
            vertices_map[v] = Some(i);
        }
        debug!(fvs = chosen.len(), nodes = n, "selected feedback vertex set");
        Self {
            final_vertices: chosen,
            vertices_map,
        }
    }

    /// Number of selected vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.final_vertices.len()
    }

    /// Returns `true` if the graph is a forest.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.final_vertices.is_empty()
    }

    /// Selected vertices in ascending order; position is the compact index.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        &self.final_vertices
    }

    /// Vertex with compact index `idx`.
    #[inline]
    pub fn vertex(&self, idx: usize) -> usize {
        self.final_vertices[idx]
    }

    /// Compact index of `v`, or `None` if `v` was not selected.
    #[inline]
    pub fn index_of(&self, v: usize) -> Option<usize> {
        self.vertices_map[v]
    }
}

/// Returns `true` if deleting `set` from `graph` leaves a forest.
pub fn is_feedback_vertex_set(graph: &CsrGraph, set: &[usize]) -> bool {
    let mut deleted = vec![false; graph.node_count()];
    for &v in set {
        deleted[v] = true;
    }
    let mut ds = DisjointSet::new(graph.node_count());
    graph
        .edges()
        .filter(|&a| !deleted[graph.row(a)] && !deleted[graph.col(a)])
        .all(|a| ds.union(graph.row(a), graph.col(a)))
}
