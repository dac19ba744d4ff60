//! Graph layer: the CSR multigraph and the passes that run over it.
//!
//! - `csr`: arc storage with reverse-edge and origin indices
//! - `contraction` / `relabel`: degree-2 chain removal and dense relabeling
//! - `spanning`: the forest whose non-tree edges are the cycle-space coordinates
//! - `dijkstra`: shortest-path trees for the basis search

pub mod contraction;
pub mod csr;
pub mod dijkstra;
pub mod relabel;
pub mod spanning;

pub use contraction::{contract, mark_degree_two_chains, Chain, Contraction};
pub use csr::{CsrGraph, CsrGraphBuilder, Weight, MAX_TOTAL_WEIGHT};
pub use dijkstra::ShortestPaths;
pub use relabel::{get_modified_graph, NewEdge, Relabeled};
pub use spanning::SpanningTree;
