//! Batched fan-out under a fixed per-window request budget.
//!
//! Items are split into consecutive batches of at most `batch_size`. Each
//! batch runs fully concurrently and is joined before the next one starts,
//! with a cooldown in between so the upstream rate window resets. Results
//! come back in input order regardless of completion order.

use std::future::Future;
use std::ops::Range;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

/// Progress hook invoked after every completed batch.
pub trait BatchObserver: Send + Sync {
    fn batch_completed(&self, completed: usize, total: usize);
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BatchObserver for NoProgress {
    fn batch_completed(&self, _completed: usize, _total: usize) {}
}

/// Consecutive index ranges covering `0..total` in chunks of at most `batch_size`.
/// A `batch_size` of 0 is treated as 1.
pub fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);
    (0..total)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(total))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    cooldown: Duration,
    trailing_cooldown: bool,
}

impl BatchScheduler {
    /// `batch_size` is normally the per-window request budget and `cooldown`
    /// the window length.
    pub fn new(batch_size: usize, cooldown: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            cooldown,
            trailing_cooldown: false,
        }
    }

    /// Also wait out the cooldown after the final batch. Needed when another
    /// request phase follows immediately against the same budget.
    pub fn with_trailing_cooldown(mut self, enabled: bool) -> Self {
        self.trailing_cooldown = enabled;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.batch_size)
    }

    /// Run `worker` over every item, one batch at a time.
    ///
    /// Workers report failure through their return value; nothing a worker
    /// returns stops the remaining items or batches.
    pub async fn run_batched<'a, T, R, F, Fut>(
        &self,
        items: &'a [T],
        worker: F,
        observer: &dyn BatchObserver,
    ) -> Vec<R>
    where
        T: Sync,
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let ranges = batch_ranges(total, self.batch_size);
        let batches = ranges.len();
        let mut results = Vec::with_capacity(total);

        for (index, range) in ranges.into_iter().enumerate() {
            debug!(
                "Starting batch {}/{} ({} items)",
                index + 1,
                batches,
                range.len()
            );

            let batch: &'a [T] = &items[range];
            let outputs = join_all(batch.iter().map(&worker)).await;
            results.extend(outputs);
            observer.batch_completed(results.len(), total);

            let is_last = index + 1 == batches;
            if !self.cooldown.is_zero() && (!is_last || self.trailing_cooldown) {
                debug!("Cooling down for {:?}", self.cooldown);
                tokio::time::sleep(self.cooldown).await;
            }
        }

        results
    }
}
