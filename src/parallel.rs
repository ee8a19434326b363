//! Splits per-particle passes across a fixed set of worker threads.

use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

use crate::{config::SERIAL_THRESHOLD, error::SimError};

pub struct ParallelExecutor {
    pool: ThreadPool,
    workers: usize,
    serial_threshold: usize,
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Result<Self, SimError> {
        Self::with_threshold(workers, SERIAL_THRESHOLD)
    }

    /// Passes over fewer than `serial_threshold` items run inline.
    pub fn with_threshold(workers: usize, serial_threshold: usize) -> Result<Self, SimError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("fluid-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            workers,
            serial_threshold,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `pass` over `items`, in `workers` contiguous chunks of equal length (the last may be
    /// shorter), and wait for all of them. `pass` gets the index of its chunk's first item, and
    /// can only write inside its own chunk.
    pub fn run<T, F>(&self, items: &mut [T], pass: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let count = items.len();
        if count == 0 {
            return;
        }

        if count < self.serial_threshold || self.workers == 1 {
            pass(0, items);
            return;
        }

        let chunk_len = count.div_ceil(self.workers);
        self.pool.install(|| {
            items
                .par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(chunk, slice)| pass(chunk * chunk_len, slice));
        });
    }
}
