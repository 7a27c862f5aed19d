//! Thread pool dispatcher: partitions per-pass work across a fixed
//! number of worker threads and joins before the pass returns.
//!
//! Even contiguous chunks over an index range (spec §4.5
//! `parallelForRange`): every pass in this crate (the three SPH passes
//! over the particle array, and the Marching Cubes density/vertex
//! passes, both of which spec §4.6 pins to `parallelForRange`
//! explicitly) is driven by `parallel_for_range`. Forks via
//! `rayon::scope` and fully joins before returning — there is no
//! cross-pass concurrency, matching spec §5's "a pass never yields
//! mid-chunk" ordering guarantee.

/// Dispatches parallel work over a configured number of worker threads.
///
/// Changing `num_threads` takes effect on the next dispatch (spec §5);
/// this type holds no persistent thread pool of its own — each
/// dispatch call forks exactly `num_threads` tasks via `rayon::scope`
/// and joins them before returning.
pub struct Dispatcher {
    num_threads: usize,
}

impl Dispatcher {
    /// `num_threads` is clamped to `[1, 8]` per spec §6's domain bound.
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.clamp(1, 8),
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads.clamp(1, 8);
    }

    /// Splits `[0, len)` into `num_threads` contiguous chunks of equal
    /// size (the last chunk absorbs the remainder); each worker invokes
    /// `f(chunk_start, chunk_end_inclusive)`.
    ///
    /// If `len == 0`, `f` is never called. If `num_threads == 1`, `f`
    /// is called once inline with `(0, len - 1)`, without spawning.
    pub fn parallel_for_range<F>(&self, len: usize, f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        if len == 0 {
            return;
        }

        if self.num_threads == 1 {
            f(0, len - 1);
            return;
        }

        let chunk = (len + self.num_threads - 1) / self.num_threads;
        rayon::scope(|scope| {
            let mut start = 0;
            while start < len {
                let end_inclusive = (start + chunk - 1).min(len - 1);
                let f = &f;
                scope.spawn(move |_| f(start, end_inclusive));
                start += chunk;
            }
        });
    }
}
