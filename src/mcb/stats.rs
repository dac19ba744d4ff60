//! Per-run counters and phase timers.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::graph::Weight;

/// Timed phases of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Chain contraction and relabeling.
    Contraction,
    /// Parallel shortest-path tree construction.
    TreeConstruction,
    /// Deduplication and sorting of candidates.
    CollectCycles,
    /// Recomputing the parity bits of every tree.
    Precompute,
    /// Scanning candidates for the first independent one.
    CycleInspection,
    /// Updating the remaining support vectors.
    IndependenceTest,
}

/// Counters and timings of one run, in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Vertices of the input graph.
    pub nodes: usize,
    /// Edges of the input graph.
    pub edges: usize,
    /// Vertices removed by chain contraction.
    pub nodes_removed: usize,
    /// Vertices dropped because no edge touched them.
    pub isolated: usize,
    /// Vertices of the reduced graph.
    pub reduced_nodes: usize,
    /// Edges of the reduced graph.
    pub reduced_edges: usize,
    /// Size of the feedback vertex set (number of trees).
    pub fvs_size: usize,
    /// Cycle-space dimension.
    pub num_non_tree_edges: usize,
    /// Candidates found across all trees.
    pub initial_cycles: usize,
    /// Candidates left after deduplication.
    pub unique_cycles: usize,
    /// Cycles in the basis.
    pub final_cycles: usize,
    /// Weight of the basis.
    pub total_weight: Weight,
    /// Worker threads.
    pub threads: usize,
    /// Contraction time.
    pub contraction_time: f64,
    /// Tree construction time.
    pub tree_construction_time: f64,
    /// Candidate collection time.
    pub collect_cycles_time: f64,
    /// Parity precompute time, summed over iterations.
    pub precompute_time: f64,
    /// Candidate scanning time, summed over iterations.
    pub cycle_inspection_time: f64,
    /// Support vector update time, summed over iterations.
    pub independence_test_time: f64,
}

impl RunStats {
    /// Time spent in the basis loop.
    pub fn total_loop_time(&self) -> f64 {
        self.precompute_time + self.cycle_inspection_time + self.independence_test_time
    }

    /// Fixed-width report line (no trailing newline).
    ///
    /// Five counters (`nodes_removed`, initial, unique and final cycles, total weight) then five
    /// timings (tree construction, collection, inspection, independence, basis loop).
    pub fn line(&self) -> String {
        format!(
            "{:5} {:5} {:5} {:5} {:5} {:15.6} {:15.6} {:15.6} {:15.6} {:15.6}",
            self.nodes_removed,
            self.initial_cycles,
            self.unique_cycles,
            self.final_cycles,
            self.total_weight,
            self.tree_construction_time,
            self.collect_cycles_time,
            self.cycle_inspection_time,
            self.independence_test_time,
            self.total_loop_time(),
        )
    }
}

/// Explicit per-run context: counters plus phase timers.
///
/// Passed by `&mut` through every driver stage; nothing is global.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    /// Counters and accumulated timings.
    pub stats: RunStats,
}

impl RunContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `elapsed` to `phase`.
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        let slot = match phase {
            Phase::Contraction => &mut self.stats.contraction_time,
            Phase::TreeConstruction => &mut self.stats.tree_construction_time,
            Phase::CollectCycles => &mut self.stats.collect_cycles_time,
            Phase::Precompute => &mut self.stats.precompute_time,
            Phase::CycleInspection => &mut self.stats.cycle_inspection_time,
            Phase::IndependenceTest => &mut self.stats.independence_test_time,
        };
        *slot += secs;
    }

    /// Runs `f` and charges its wall time to `phase`.
    pub fn time<R>(&mut self, phase: Phase, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.record(phase, start.elapsed());
        out
    }
}
