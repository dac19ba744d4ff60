//! Allocation strategies for tree storage.

pub mod allocator;
pub mod page;

pub use allocator::{AllocError, ArrayAlloc, ArrayBuf};
pub use page::{HeapAlloc, PinnedAlloc};
