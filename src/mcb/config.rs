//! Run configuration.

use serde::{Deserialize, Serialize};

/// Where the compressed tree arrays are allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// Ordinary heap memory.
    #[default]
    Heap,
    /// Page-locked memory; falls back to the heap if locking is refused.
    Pinned,
}

/// Parameters of one basis computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McbConfig {
    /// Worker threads for the parallel regions.
    pub threads: usize,
    /// Trees per storage chunk; 0 keeps every tree in a single chunk.
    pub chunk_size: usize,
    /// Allocation strategy for the tree arrays.
    pub allocation: AllocationStrategy,
    /// Repeat chain contraction until nothing changes.
    pub contract_to_fixed_point: bool,
    /// Stop after this many basis cycles and return the partial basis.
    pub pause_edge: Option<usize>,
}

impl Default for McbConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            chunk_size: 0,
            allocation: AllocationStrategy::Heap,
            contract_to_fixed_point: true,
            pause_edge: None,
        }
    }
}

impl McbConfig {
    /// Sets the thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the allocation strategy.
    pub fn with_allocation(mut self, allocation: AllocationStrategy) -> Self {
        self.allocation = allocation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: McbConfig = serde_json::from_str(r#"{"threads": 4, "allocation": "pinned"}"#).unwrap();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.allocation, AllocationStrategy::Pinned);
        assert_eq!(cfg.chunk_size, 0);
        assert!(cfg.contract_to_fixed_point);
        assert_eq!(cfg.pause_edge, None);
    }

    #[test]
    fn test_builders() {
        let cfg = McbConfig::default()
            .with_threads(2)
            .with_chunk_size(8)
            .with_allocation(AllocationStrategy::Pinned);
        assert_eq!(cfg.threads, 2);
        assert_eq!(cfg.chunk_size, 8);
        assert_eq!(cfg.allocation, AllocationStrategy::Pinned);
    }
}
