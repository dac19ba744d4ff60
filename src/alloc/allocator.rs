//! Allocation strategy for the flat per-tree arrays.
//!
//! The compressed tree store allocates a handful of large, fixed-size arrays once and then
//! reads them from every worker thread. Where that memory comes from is a construction-time
//! choice: plain heap memory, or page-locked memory that stays resident (and can be handed to
//! DMA-capable devices without staging copies). [`ArrayAlloc`] is the seam; the two
//! implementations live in [`super::page`].

use core::ops::{Deref, DerefMut};

/// A strategy for allocating zero-initialised arrays of plain values.
///
/// Consumers are generic over the strategy and never need to know whether the memory is
/// pinned.
pub trait ArrayAlloc: Send + Sync {
    /// Allocates `len` default-initialised elements.
    ///
    /// # Errors
    /// Returns `AllocError` if the memory cannot be reserved (or, for pinned strategies,
    /// cannot be locked).
    fn allocate<T>(&self, len: usize) -> Result<ArrayBuf<T>, AllocError>
    where
        T: Copy + Default + Send + Sync;

    /// Short human-readable name used in logs.
    fn name(&self) -> &'static str;
}

/// An owned array produced by an [`ArrayAlloc`].
///
/// Dereferences to a slice. If the memory was page-locked it is unlocked on drop.
pub struct ArrayBuf<T> {
    data: Vec<T>,
    pinned: bool,
}

impl<T> ArrayBuf<T> {
    pub(crate) fn from_vec(data: Vec<T>, pinned: bool) -> Self {
        Self { data, pinned }
    }

    /// Returns `true` if the backing pages are locked in memory.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Size of the array in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        core::mem::size_of_val(self.data.as_slice())
    }
}

impl<T> Deref for ArrayBuf<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for ArrayBuf<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for ArrayBuf<T> {
    fn drop(&mut self) {
        if self.pinned {
            // SAFETY: the range was locked by `PinnedAlloc` and is still owned by `data`.
            unsafe { super::page::unlock_region(self.data.as_ptr().cast(), self.byte_len()) };
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for ArrayBuf<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArrayBuf")
            .field("len", &self.data.len())
            .field("pinned", &self.pinned)
            .finish()
    }
}

/// The error type for allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator could not reserve `bytes` bytes.
    OutOfMemory {
        /// Requested size.
        bytes: usize,
    },
    /// The memory was reserved but could not be page-locked.
    Pin {
        /// OS error code, if one was reported.
        os_error: Option<i32>,
    },
    /// Page locking is not available on this platform.
    Unsupported,
}

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfMemory { bytes } => write!(f, "memory allocation of {bytes} bytes failed"),
            Self::Pin { os_error: Some(code) } => write!(f, "page locking failed (os error {code})"),
            Self::Pin { os_error: None } => f.write_str("page locking failed"),
            Self::Unsupported => f.write_str("page locking is not supported on this platform"),
        }
    }
}

impl std::error::Error for AllocError {}
