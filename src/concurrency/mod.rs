//! Parallel execution primitives.

pub mod pool;

pub use crossbeam_utils::CachePadded;
pub use pool::ThreadPool;
