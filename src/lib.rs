//! # `mcb` - Minimum Cycle Basis
//!
//! Computes a minimum cycle basis of a weighted undirected graph: a set of cycles, independent
//! over GF(2), that spans the cycle space and has the smallest possible total weight.
//!
//! ## Pipeline
//!
//! 1. **Chain contraction**: maximal paths through degree-2 vertices collapse into single
//!    weighted edges. The cycle space keeps its dimension and the graph usually shrinks a lot.
//! 2. **Coordinates**: a spanning forest fixes one cycle-space coordinate per non-tree edge.
//! 3. **Tree roots**: a feedback vertex set heuristic picks the roots. Every cycle passes through
//!    one of them, so their shortest-path trees expose a full minimum basis.
//! 4. **Trees and candidates**: shortest-path trees are built in parallel into chunked flat
//!    storage; every non-tree edge of a tree closes one candidate cycle. Candidates found from
//!    several roots are deduplicated and sorted by weight.
//! 5. **Selection**: for each coordinate the lightest candidate with odd inner product against
//!    the current support vector joins the basis, and the later support vectors are updated by
//!    GF(2) elimination.
//!
//! ## Layout
//!
//! - [`graph`]: CSR multigraph, contraction, relabeling, spanning forest, Dijkstra
//! - [`collections`]: packed bit vectors, union-find
//! - [`alloc`]: heap and page-locked allocation strategies for tree storage
//! - [`concurrency`]: fixed-size pool with statically partitioned parallel-for regions
//! - [`mcb`]: feedback vertex set, tree storage, candidate cycles, the driver
//! - [`io`]: edge-list input and the output formats
//!
//! ## Example
//!
//! ```rust
//! use mcb::{CsrGraph, McbConfig, MinimumCycleBasis};
//!
//! // two triangles sharing the edge 1-2
//! let graph = CsrGraph::from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 0, 1), (1, 3, 1), (3, 2, 1)])?;
//! let basis = MinimumCycleBasis::compute(&graph, &McbConfig::default())?;
//!
//! assert_eq!(basis.len(), 2);
//! assert_eq!(basis.total_weight, 6);
//! # Ok::<(), mcb::McbError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod alloc;
pub mod collections;
pub mod concurrency;
pub mod error;
pub mod graph;
pub mod io;
pub mod mcb;

pub use collections::BitVector;
pub use error::{McbError, Result};
pub use graph::{CsrGraph, CsrGraphBuilder, Weight};
pub use mcb::{
    AllocationStrategy, BasisCycle, McbConfig, MinimumCycleBasis, Reduction, RunContext, RunStats,
};

// Compile-time layout checks for the packed tree arrays.
const _: () = {
    use core::mem;

    assert!(mem::size_of::<Weight>() == 8);
    assert!(mem::size_of::<mcb::compressed::TreeView<'static>>() <= mem::size_of::<usize>() * 14);
};
