//! The two [`ArrayAlloc`] strategies: global heap and page-locked memory.

use super::allocator::{AllocError, ArrayAlloc, ArrayBuf};

fn reserve_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, AllocError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| AllocError::OutOfMemory {
        bytes: len.saturating_mul(core::mem::size_of::<T>()),
    })?;
    data.resize(len, T::default());
    Ok(data)
}

/// Allocates from the global allocator.
#[derive(Default, Clone, Copy, Debug)]
pub struct HeapAlloc;

impl ArrayAlloc for HeapAlloc {
    fn allocate<T>(&self, len: usize) -> Result<ArrayBuf<T>, AllocError>
    where
        T: Copy + Default + Send + Sync,
    {
        Ok(ArrayBuf::from_vec(reserve_zeroed(len)?, false))
    }

    fn name(&self) -> &'static str {
        "heap"
    }
}

/// Allocates from the global allocator and locks the pages in RAM (`mlock`).
///
/// Locking is subject to `RLIMIT_MEMLOCK`; when the limit is exceeded allocation fails with
/// [`AllocError::Pin`] rather than silently handing out pageable memory.
#[derive(Default, Clone, Copy, Debug)]
pub struct PinnedAlloc;

impl ArrayAlloc for PinnedAlloc {
    fn allocate<T>(&self, len: usize) -> Result<ArrayBuf<T>, AllocError>
    where
        T: Copy + Default + Send + Sync,
    {
        let data = reserve_zeroed::<T>(len)?;
        let bytes = core::mem::size_of_val(data.as_slice());
        if bytes == 0 {
            return Ok(ArrayBuf::from_vec(data, false));
        }
        // SAFETY: `data` owns `bytes` initialised bytes starting at its pointer.
        unsafe { lock_region(data.as_ptr().cast(), bytes)? };
        Ok(ArrayBuf::from_vec(data, true))
    }

    fn name(&self) -> &'static str {
        "pinned"
    }
}

#[cfg(unix)]
unsafe fn lock_region(ptr: *const u8, bytes: usize) -> Result<(), AllocError> {
    // SAFETY: caller guarantees `[ptr, ptr + bytes)` is a live allocation.
    if unsafe { libc::mlock(ptr.cast::<libc::c_void>(), bytes) } == 0 {
        Ok(())
    } else {
        Err(AllocError::Pin {
            os_error: std::io::Error::last_os_error().raw_os_error(),
        })
    }
}

#[cfg(not(unix))]
unsafe fn lock_region(_ptr: *const u8, _bytes: usize) -> Result<(), AllocError> {
    Err(AllocError::Unsupported)
}

/// Unlocks a region previously locked by [`PinnedAlloc`].
///
/// # Safety
/// `[ptr, ptr + bytes)` must be a live allocation that was successfully locked.
#[cfg(unix)]
pub(crate) unsafe fn unlock_region(ptr: *const u8, bytes: usize) {
    if bytes != 0 {
        // SAFETY: caller guarantees the range is live. A failed unlock leaves the pages locked
        // until the allocation is returned, which the kernel also unlocks.
        let _ = unsafe { libc::munlock(ptr.cast::<libc::c_void>(), bytes) };
    }
}

#[cfg(not(unix))]
pub(crate) unsafe fn unlock_region(_ptr: *const u8, _bytes: usize) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_alloc_is_zeroed_and_unpinned() {
        let buf = HeapAlloc.allocate::<u32>(128).unwrap();
        assert_eq!(buf.len(), 128);
        assert!(buf.iter().all(|&x| x == 0));
        assert!(!buf.is_pinned());
        assert_eq!(buf.byte_len(), 512);
    }

    #[test]
    fn heap_alloc_is_writable() {
        let mut buf = HeapAlloc.allocate::<usize>(4).unwrap();
        buf[2] = 7;
        assert_eq!(&buf[..], &[0, 0, 7, 0]);
    }

    #[test]
    fn pinned_alloc_locks_or_reports() {
        // Containers frequently run with a tiny RLIMIT_MEMLOCK, so both outcomes are legal.
        match PinnedAlloc.allocate::<u64>(64) {
            Ok(buf) => {
                assert!(buf.is_pinned());
                assert!(buf.iter().all(|&x| x == 0));
            }
            Err(err) => assert!(matches!(err, AllocError::Pin { .. } | AllocError::Unsupported)),
        }
    }

    #[test]
    fn pinned_alloc_of_nothing_is_not_locked() {
        let buf = PinnedAlloc.allocate::<u8>(0).unwrap();
        assert!(!buf.is_pinned());
    }
}
