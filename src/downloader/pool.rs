//! Bounded worker pool for reply fan-out
//!
//! A fixed number of workers share one cursor into the item slice. Each worker
//! claims the next unclaimed index, runs the task, and repeats until the slice
//! is exhausted. Workers are futures joined on the caller's task, so network
//! waits overlap while the code between awaits never runs in parallel.

use futures::future::try_join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Runs a task over a slice with at most `concurrency` tasks in flight
#[derive(Debug, Clone, Copy)]
pub struct BoundedWorkerPool {
    concurrency: usize,
}

impl BoundedWorkerPool {
    /// Create a pool. A concurrency of zero is treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Configured number of workers
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Process every item, returning once all have been attempted
    ///
    /// Tasks signal "nothing to contribute" by returning `Ok(())`. The first
    /// `Err` stops every worker and is returned; items not yet claimed are
    /// never started.
    pub async fn run<T, E, F, Fut>(&self, items: &[T], task: F) -> Result<(), E>
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        if items.is_empty() {
            return Ok(());
        }

        let workers = self.concurrency.min(items.len());
        let cursor = AtomicUsize::new(0);
        let cursor = &cursor;
        let task = &task;

        debug!(items = items.len(), workers, "Starting worker pool");

        let handles = (0..workers).map(|worker| async move {
            let mut processed = 0usize;
            while let Some(item) = items.get(cursor.fetch_add(1, Ordering::SeqCst)) {
                task(item.clone()).await?;
                processed += 1;
            }
            debug!(worker, processed, "Worker drained queue");
            Ok::<(), E>(())
        });

        try_join_all(handles).await?;
        Ok(())
    }
}
