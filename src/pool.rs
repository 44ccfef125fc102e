//! Bounded worker pool for the parallel stages of this crate.

use std::fmt;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// A bounded pool of CPU-bound workers with an explicit lifetime.
///
/// The pool is an injected collaborator: callers construct one, hand it to
/// the operations that parallelize, and drop it to shut the workers down.
/// There is no process-wide singleton.
pub struct WorkerPool {
    inner: ThreadPool,
}

impl WorkerPool {
    /// Default number of workers.
    pub const DEFAULT_WORKERS: usize = 8;

    /// Spawns a pool with the given number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero or the threads cannot be spawned.
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "Worker pool must have at least one thread");
        let inner = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("anf-worker-{}", i))
            .build()
            .expect("Failed to spawn worker pool");
        Self { inner }
    }

    /// Number of worker threads in the pool.
    pub fn workers(&self) -> usize {
        self.inner.current_num_threads()
    }

    /// Runs `op` inside the pool and returns its result.
    ///
    /// This is a stage barrier: every task forked by `op` completes before
    /// the call returns. A panic in any worker propagates out of the
    /// barrier to the caller.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.inner.install(op)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORKERS)
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rayon::prelude::*;

    #[test]
    fn test_install_runs_in_pool() {
        let pool = WorkerPool::new(2);
        assert_eq!(pool.workers(), 2);
        let sum: u64 = pool.install(|| (0..1000u64).into_par_iter().sum());
        assert_eq!(sum, 499_500);
    }

    #[test]
    #[should_panic(expected = "at least one thread")]
    fn test_zero_workers_panics() {
        WorkerPool::new(0);
    }
}
