//! Fixed-size worker pool with statically partitioned parallel-for regions.
//!
//! Every parallel phase of the basis computation has the same shape: a slice of independent
//! work items (tree slots, precompute arrays, support vectors) is split into contiguous ranges,
//! one range per thread, and the region ends with an implicit barrier. There is no message
//! passing and no work stealing between ranges, so a thread only ever writes the items of its
//! own range.
//!
//! With the `parallel` feature the regions run on a dedicated `rayon` pool sized to the
//! configured thread count. Without it they run on `std::thread::scope` threads spawned per
//! region.

use crate::error::{McbError, Result};

/// A fixed-size pool that executes statically partitioned parallel-for regions.
pub struct ThreadPool {
    threads: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl ThreadPool {
    /// Creates a pool with exactly `threads` workers.
    ///
    /// # Errors
    /// Returns `McbError::ThreadPool` if `threads == 0` or the OS refuses to spawn threads.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(McbError::ThreadPool("thread count must be > 0".into()));
        }
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("mcb-worker-{i}"))
                .build()
                .map_err(|e| McbError::ThreadPool(e.to_string()))?;
            Ok(Self { threads, pool })
        }
        #[cfg(not(feature = "parallel"))]
        {
            Ok(Self { threads })
        }
    }

    /// Number of worker threads.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `f(state, index, item)` for every item.
    ///
    /// `items` is cut into `states.len()` contiguous ranges; range `t` is processed in order by
    /// one thread holding `&mut states[t]`. `index` is the item's position in `items`.
    pub fn for_each_static<S, T, F>(&self, states: &mut [S], items: &mut [T], f: F)
    where
        S: Send,
        T: Send,
        F: Fn(&mut S, usize, &mut T) + Sync,
    {
        if states.is_empty() || items.is_empty() {
            return;
        }
        let f = &f;
        let parts = partition(items, states.len());

        if states.len() == 1 {
            for (state, (offset, range)) in states.iter_mut().zip(parts) {
                run_range(state, offset, range, f);
            }
            return;
        }

        #[cfg(feature = "parallel")]
        self.pool.scope(|scope| {
            for (state, (offset, range)) in states.iter_mut().zip(parts) {
                scope.spawn(move |_| run_range(state, offset, range, f));
            }
        });

        #[cfg(not(feature = "parallel"))]
        std::thread::scope(|scope| {
            for (state, (offset, range)) in states.iter_mut().zip(parts) {
                scope.spawn(move || run_range(state, offset, range, f));
            }
        });
    }

    /// Runs `f(index, item)` for every item, one contiguous range per pool thread.
    pub fn for_each<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        let mut lanes = vec![(); self.threads.min(items.len()).max(1)];
        self.for_each_static(&mut lanes, items, |_, i, item| f(i, item));
    }
}

impl core::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadPool").field("threads", &self.threads).finish()
    }
}

#[inline]
fn run_range<S, T, F>(state: &mut S, offset: usize, range: &mut [T], f: &F)
where
    F: Fn(&mut S, usize, &mut T),
{
    for (i, item) in range.iter_mut().enumerate() {
        f(state, offset + i, item);
    }
}

/// Splits `items` into `parts` contiguous ranges whose lengths differ by at most one.
///
/// Returns `(offset, range)` pairs in order.
pub fn partition<T>(items: &mut [T], parts: usize) -> Vec<(usize, &mut [T])> {
    assert!(parts != 0, "parts must be > 0");
    let n = items.len();
    let mut out = Vec::with_capacity(parts);
    let mut rest = items;
    let mut offset = 0;
    for p in 0..parts {
        let take = n / parts + usize::from(p < n % parts);
        let (head, tail) = core::mem::take(&mut rest).split_at_mut(take);
        out.push((offset, head));
        offset += take;
        rest = tail;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_is_contiguous_and_balanced() {
        let mut items: Vec<usize> = (0..10).collect();
        let parts = partition(&mut items, 3);
        let lens: Vec<usize> = parts.iter().map(|(_, r)| r.len()).collect();
        assert_eq!(lens, vec![4, 3, 3]);
        let offsets: Vec<usize> = parts.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0, 4, 7]);
        assert_eq!(parts[1].1[0], 4);
    }

    #[test]
    fn partition_with_more_parts_than_items() {
        let mut items = [1, 2];
        let parts = partition(&mut items, 4);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts.iter().filter(|(_, r)| r.is_empty()).count(), 2);
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(ThreadPool::new(0), Err(McbError::ThreadPool(_))));
    }

    #[test]
    fn static_partition_gives_each_state_its_range() {
        let pool = ThreadPool::new(3).unwrap();
        let mut seen = vec![Vec::new(); 3];
        let mut items: Vec<usize> = (0..8).collect();
        pool.for_each_static(&mut seen, &mut items, |log, i, item| {
            log.push(i);
            *item *= 10;
        });
        assert_eq!(seen, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7]]);
        assert_eq!(items, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn for_each_visits_every_item_once() {
        let pool = ThreadPool::new(4).unwrap();
        let mut items = vec![0usize; 1000];
        pool.for_each(&mut items, |i, item| *item = i + 1);
        assert!(items.iter().enumerate().all(|(i, &x)| x == i + 1));
    }
}
