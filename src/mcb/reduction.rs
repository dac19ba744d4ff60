//! Contraction history: the reduced graph plus the way back to input edges.

use tracing::{debug, info_span};

use crate::error::{McbError, Result};
use crate::graph::{contract, CsrGraph};

/// The graph the basis is computed on, and how its arcs map to input edges.
#[derive(Clone, Debug)]
pub struct Reduction {
    graph: CsrGraph,
    origins: Vec<Vec<usize>>,
    to_input: Vec<usize>,
    nodes_removed: usize,
    isolated: usize,
    rounds: usize,
}

impl Reduction {
    /// Wraps `input` without contracting it.
    pub fn identity(input: &CsrGraph) -> Self {
        let origins = (0..input.arc_count())
            .map(|a| input.original(a).into_iter().collect())
            .collect();
        Self {
            graph: input.clone(),
            origins,
            to_input: (0..input.node_count()).collect(),
            nodes_removed: 0,
            isolated: 0,
            rounds: 0,
        }
    }

    /// Contracts degree-2 chains of `input`, once or until nothing changes.
    ///
    /// # Errors
    /// Returns `McbError::Invariant` if a round changes the total weight or loses vertices.
    pub fn contract(input: &CsrGraph, fixed_point: bool) -> Result<Self> {
        let _span = info_span!("contract").entered();
        let mut state = Self::identity(input);
        loop {
            let (contraction, relabeled) = contract(&state.graph);
            if contraction.nodes_removed == 0 && state.rounds > 0 {
                break;
            }
            let before = &state.graph;
            let after = &relabeled.graph;
            if before.total_weight() != after.total_weight() {
                return Err(McbError::invariant(format!(
                    "contraction changed total weight from {} to {}",
                    before.total_weight(),
                    after.total_weight()
                )));
            }
            let isolated = before
                .node_count()
                .checked_sub(after.node_count() + contraction.nodes_removed)
                .ok_or_else(|| McbError::invariant("contraction produced extra vertices"))?;

            let origins = (0..after.arc_count())
                .map(|a| match (after.chain(a), after.original(a)) {
                    (Some(k), _) => {
                        let mut edges: Vec<usize> = contraction.chains[k]
                            .arcs
                            .iter()
                            .flat_map(|&old| state.origins[old].iter().copied())
                            .collect();
                        edges.sort_unstable();
                        edges
                    }
                    (None, Some(old)) => state.origins[old].clone(),
                    (None, None) => Vec::new(),
                })
                .collect();
            let to_input = relabeled
                .new_to_old
                .iter()
                .map(|&old| state.to_input[old])
                .collect();

            debug!(
                round = state.rounds,
                removed = contraction.nodes_removed,
                isolated,
                nodes = after.node_count(),
                "contraction round"
            );
            let removed = contraction.nodes_removed;
            state = Self {
                graph: relabeled.graph,
                origins,
                to_input,
                nodes_removed: state.nodes_removed + removed,
                isolated: state.isolated + isolated,
                rounds: state.rounds + 1,
            };
            if !fixed_point || removed == 0 {
                break;
            }
        }
        Ok(state)
    }

    /// The reduced graph.
    #[inline]
    pub fn graph(&self) -> &CsrGraph {
        &self.graph
    }

    /// Input edge ordinals (sorted) that arc `arc` of the reduced graph stands for.
    #[inline]
    pub fn expand(&self, arc: usize) -> &[usize] {
        &self.origins[arc]
    }

    /// Input edge ordinals of a set of reduced arcs, sorted.
    pub fn expand_all(&self, arcs: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut edges: Vec<usize> = arcs
            .into_iter()
            .flat_map(|a| self.origins[a].iter().copied())
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Input label of reduced vertex `v`.
    #[inline]
    pub fn input_vertex(&self, v: usize) -> usize {
        self.to_input[v]
    }

    /// Vertices removed as chain interiors.
    #[inline]
    pub fn nodes_removed(&self) -> usize {
        self.nodes_removed
    }

    /// Vertices dropped for having no edges.
    #[inline]
    pub fn isolated(&self) -> usize {
        self.isolated
    }

    /// Contraction rounds applied.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}
