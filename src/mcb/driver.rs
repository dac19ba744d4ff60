//! The minimum cycle basis pipeline.
//!
//! 1. contract degree-2 chains ([`Reduction`])
//! 2. fix cycle-space coordinates with a spanning forest
//! 3. pick tree roots ([`FeedbackVertexSet`])
//! 4. build every root's shortest-path tree in parallel ([`Worker`], [`CompressedTrees`])
//! 5. deduplicate and sort the candidate cycles ([`CycleStorage`])
//! 6. for each coordinate `e`, take the lightest candidate `C` with `<C, S_e> = 1`, then
//!    update every later support vector `S_j` with `<C, S_j> = 1` to `S_j + S_e`
//!
//! Step 6 is sequential over `e`; its precompute and update halves are parallel over trees and
//! over `j` respectively, and each thread writes only its own range.

use serde::Serialize;
use tracing::{debug, info, info_span, trace, warn};

use super::compressed::CompressedTrees;
use super::config::{AllocationStrategy, McbConfig};
use super::cycle::CandidateList;
use super::fvs::{is_feedback_vertex_set, FeedbackVertexSet};
use super::reduction::Reduction;
use super::stats::{Phase, RunContext, RunStats};
use super::storage::CycleStorage;
use super::worker::{cycle_arcs, cycle_vector, inner_product, precompute, Worker};
use crate::alloc::{AllocError, HeapAlloc, PinnedAlloc};
use crate::collections::BitVector;
use crate::concurrency::{CachePadded, ThreadPool};
use crate::error::{McbError, Result};
use crate::graph::{CsrGraph, SpanningTree, Weight};

/// One cycle of the basis, in input terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BasisCycle {
    /// Cycle weight.
    pub weight: Weight,
    /// Input vertex whose tree produced the cycle.
    pub root: usize,
    /// Input edge ordinals (0-based), ascending.
    pub edges: Vec<usize>,
}

/// A minimum cycle basis and the statistics of the run that produced it.
#[derive(Clone, Debug, Serialize)]
pub struct MinimumCycleBasis {
    /// Basis cycles in selection order (non-decreasing weight).
    pub cycles: Vec<BasisCycle>,
    /// Sum of the cycle weights.
    pub total_weight: Weight,
    /// Counters and timings.
    pub stats: RunStats,
}

impl MinimumCycleBasis {
    /// Computes a minimum cycle basis of `graph`.
    ///
    /// # Errors
    /// Fails if the thread pool or tree storage cannot be created, or an internal invariant is
    /// violated.
    pub fn compute(graph: &CsrGraph, config: &McbConfig) -> Result<Self> {
        let mut ctx = RunContext::new();
        Self::compute_with(graph, config, &mut ctx)
    }

    /// Like [`compute`](Self::compute), recording into a caller-owned context.
    ///
    /// # Errors
    /// See [`compute`](Self::compute).
    pub fn compute_with(graph: &CsrGraph, config: &McbConfig, ctx: &mut RunContext) -> Result<Self> {
        let _span = info_span!("mcb", nodes = graph.node_count(), edges = graph.edge_count()).entered();
        ctx.stats.nodes = graph.node_count();
        ctx.stats.edges = graph.edge_count();
        ctx.stats.threads = config.threads;

        if let Some(cycle) = single_cycle(graph) {
            info!(weight = cycle.weight, "graph is a single cycle");
            let stats = &mut ctx.stats;
            stats.nodes_removed = graph.node_count() - 1;
            stats.reduced_nodes = 1;
            stats.reduced_edges = 1;
            stats.fvs_size = 1;
            stats.num_non_tree_edges = 1;
            stats.initial_cycles = 1;
            stats.unique_cycles = 1;
            stats.final_cycles = 1;
            stats.total_weight = cycle.weight;
            return Ok(Self {
                total_weight: cycle.weight,
                cycles: vec![cycle],
                stats: stats.clone(),
            });
        }

        let pool = ThreadPool::new(config.threads)?;
        let reduction = ctx.time(Phase::Contraction, || {
            Reduction::contract(graph, config.contract_to_fixed_point)
        })?;
        let reduced = reduction.graph();
        ctx.stats.nodes_removed = reduction.nodes_removed();
        ctx.stats.isolated = reduction.isolated();
        ctx.stats.reduced_nodes = reduced.node_count();
        ctx.stats.reduced_edges = reduced.edge_count();
        info!(
            removed = reduction.nodes_removed(),
            isolated = reduction.isolated(),
            nodes = reduced.node_count(),
            edges = reduced.edge_count(),
            "contracted degree-2 chains"
        );

        let spanning = SpanningTree::bfs(reduced)?;
        let dim = spanning.num_non_tree_edges();
        ctx.stats.num_non_tree_edges = dim;
        if dim == 0 {
            info!("graph is a forest");
            return Ok(Self {
                cycles: Vec::new(),
                total_weight: 0,
                stats: ctx.stats.clone(),
            });
        }

        let fvs = {
            let _span = info_span!("fvs").entered();
            let fvs = FeedbackVertexSet::select(reduced);
            if !is_feedback_vertex_set(reduced, fvs.vertices()) {
                return Err(McbError::invariant("selected vertices leave a cycle uncovered"));
            }
            fvs
        };
        ctx.stats.fvs_size = fvs.len();
        info!(fvs = fvs.len(), dim, "selected tree roots");

        let mut trees = allocate_trees(config, reduced.node_count(), fvs.vertices())?;
        debug!(
            allocator = trees.allocator(),
            pinned = trees.is_pinned(),
            chunks = trees.num_chunks(),
            bytes = trees.byte_len(),
            "allocated tree storage"
        );

        let mut workers: Vec<CachePadded<Worker>> = (0..pool.threads().min(fvs.len()).max(1))
            .map(|_| CachePadded::new(Worker::new(reduced.node_count())))
            .collect();
        {
            let _span = info_span!("trees").entered();
            let mut slots = trees.slots_mut();
            ctx.time(Phase::TreeConstruction, || {
                pool.for_each_static(&mut workers, &mut slots, |worker, _, slot| {
                    worker.build_tree(reduced, slot);
                });
            });
        }

        let mut candidates = {
            let _span = info_span!("collect").entered();
            ctx.time(Phase::CollectCycles, || collect(reduced.node_count(), &mut workers))
        };
        ctx.stats.initial_cycles = candidates.0;
        ctx.stats.unique_cycles = candidates.1.len();
        info!(
            initial = candidates.0,
            unique = candidates.1.len(),
            "collected candidate cycles"
        );

        let limit = config.pause_edge.map_or(dim, |p| p.min(dim));
        let cycles = {
            let _span = info_span!("outer_loop").entered();
            let state = LoopState {
                graph: reduced,
                reduction: &reduction,
                spanning: &spanning,
                pool: &pool,
            };
            state.run(&mut trees, &mut candidates.1, limit, ctx)?
        };

        let total_weight = cycles
            .iter()
            .fold(0, |acc: Weight, c| acc.saturating_add(c.weight));
        ctx.stats.final_cycles = cycles.len();
        ctx.stats.total_weight = total_weight;
        info!(cycles = cycles.len(), total_weight, "minimum cycle basis complete");
        Ok(Self {
            cycles,
            total_weight,
            stats: ctx.stats.clone(),
        })
    }

    /// Number of basis cycles.
    #[inline]
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Returns `true` if the graph is a forest.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

/// Basis of a connected graph in which every vertex has degree 2.
fn single_cycle(graph: &CsrGraph) -> Option<BasisCycle> {
    let n = graph.node_count();
    if n == 0 || graph.vertices_of_degree(2) != n || !graph.is_connected() {
        return None;
    }
    let mut edges: Vec<usize> = graph.edges().filter_map(|a| graph.original(a)).collect();
    edges.sort_unstable();
    Some(BasisCycle {
        weight: graph.total_weight(),
        root: 0,
        edges,
    })
}

fn allocate_trees(config: &McbConfig, nodes: usize, roots: &[usize]) -> Result<CompressedTrees> {
    let chunk = config.chunk_size;
    match config.allocation {
        AllocationStrategy::Heap => Ok(CompressedTrees::new(&HeapAlloc, nodes, roots, chunk)?),
        AllocationStrategy::Pinned => match CompressedTrees::new(&PinnedAlloc, nodes, roots, chunk) {
            Ok(trees) => Ok(trees),
            Err(err @ (AllocError::Pin { .. } | AllocError::Unsupported)) => {
                warn!(%err, "page locking unavailable, falling back to heap memory");
                Ok(CompressedTrees::new(&HeapAlloc, nodes, roots, chunk)?)
            }
            Err(err) => Err(err.into()),
        },
    }
}

/// Merges every worker's candidates; returns the raw count and the sorted unique list.
fn collect(nodes: usize, workers: &mut [CachePadded<Worker>]) -> (usize, CandidateList) {
    let mut storage = CycleStorage::new(nodes);
    for worker in workers {
        for (cycle, key) in worker.take_cycles() {
            storage.add(cycle, key);
        }
    }
    (storage.added(), storage.into_candidates())
}

struct LoopState<'a> {
    graph: &'a CsrGraph,
    reduction: &'a Reduction,
    spanning: &'a SpanningTree,
    pool: &'a ThreadPool,
}

impl LoopState<'_> {
    fn run(
        &self,
        trees: &mut CompressedTrees,
        candidates: &mut CandidateList,
        limit: usize,
        ctx: &mut RunContext,
    ) -> Result<Vec<BasisCycle>> {
        let dim = self.spanning.num_non_tree_edges();
        let mut support: Vec<BitVector> = (0..dim).map(|e| BitVector::unit(dim, e)).collect();
        let mut basis = Vec::with_capacity(limit);

        for e in 0..limit {
            ctx.time(Phase::Precompute, || {
                let se = &support[e];
                let mut pairs = trees.precompute_mut();
                self.pool.for_each(&mut pairs, |_, (view, pre)| {
                    precompute(*view, self.spanning, se, pre);
                });
            });

            let selected = ctx.time(Phase::CycleInspection, || {
                let se = &support[e];
                candidates
                    .active()
                    .find(|c| inner_product(self.graph, self.spanning, se, trees.precompute(c.tree), c))
                    .copied()
            });
            let Some(cycle) = selected else {
                return Err(McbError::NoIndependentCycle { edge: e });
            };
            candidates.consume(cycle.id);

            let view = trees.tree(cycle.tree);
            ctx.time(Phase::IndependenceTest, || {
                let vector = cycle_vector(self.graph, self.spanning, view, &cycle);
                debug_assert!(vector.dot_product(&support[e]));
                let (head, tail) = support.split_at_mut(e + 1);
                let se = &head[e];
                self.pool.for_each(tail, |_, sj| {
                    if vector.dot_product(sj) {
                        sj.xor_assign(se);
                    }
                });
            });

            let edges = self.reduction.expand_all(cycle_arcs(self.graph, view, &cycle));
            trace!(
                e,
                root = cycle.root,
                weight = cycle.total_length,
                edges = edges.len(),
                "selected cycle"
            );
            basis.push(BasisCycle {
                weight: cycle.total_length,
                root: self.reduction.input_vertex(cycle.root),
                edges,
            });
            if (e + 1) % 1024 == 0 {
                debug!(done = e + 1, dim, remaining = candidates.remaining(), "basis progress");
            }
        }
        if limit < dim {
            info!(limit, dim, "paused before completing the basis");
        }
        Ok(basis)
    }
}
