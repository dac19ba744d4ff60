//! Minimum cycle basis construction.
//!
//! The entry point is [`MinimumCycleBasis::compute`]; the submodules are the stages it runs.

pub mod compressed;
pub mod config;
pub mod cycle;
pub mod driver;
pub mod fvs;
pub mod reduction;
pub mod stats;
pub mod storage;
pub mod worker;

pub use compressed::{CompressedTrees, TreeSlotMut, TreeView};
pub use config::{AllocationStrategy, McbConfig};
pub use cycle::{CandidateList, Cycle};
pub use driver::{BasisCycle, MinimumCycleBasis};
pub use fvs::{is_feedback_vertex_set, FeedbackVertexSet};
pub use reduction::Reduction;
pub use stats::{Phase, RunContext, RunStats};
pub use storage::{CycleKey, CycleStorage, Signature};
pub use worker::Worker;
