//! Consecutive 429 tracking
//!
//! One tracker is shared by every request of a run. Each 429 bumps the
//! consecutive counter and any successful response resets it, so a rate limit
//! hit by one reply fetch also moves every other in-flight request closer to
//! the abort threshold.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared consecutive-429 counter with a fixed retry delay
#[derive(Debug)]
pub struct RateLimitTracker {
    consecutive: AtomicU32,
    total_hits: AtomicU64,
    threshold: u32,
    retry_delay: Duration,
}

impl RateLimitTracker {
    /// Create a tracker
    ///
    /// # Arguments
    /// * `threshold` - Consecutive 429 responses that trip the fatal condition
    /// * `retry_delay` - Fixed wait before the same URL is retried
    pub fn new(threshold: u32, retry_delay: Duration) -> Self {
        Self {
            consecutive: AtomicU32::new(0),
            total_hits: AtomicU64::new(0),
            threshold: threshold.max(1),
            retry_delay,
        }
    }

    /// Create a tracker wrapped in [`Arc`] for sharing across requests
    pub fn shared(threshold: u32, retry_delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(threshold, retry_delay))
    }

    /// Count a 429 response and return the delay to wait before retrying
    ///
    /// # Errors
    /// Returns [`RateLimitError::ThresholdExceeded`] once the consecutive count
    /// reaches the threshold.
    pub fn record_rate_limited(&self) -> Result<Duration, RateLimitError> {
        self.total_hits.fetch_add(1, Ordering::SeqCst);
        let hits = self.consecutive.fetch_add(1, Ordering::SeqCst) + 1;

        if hits >= self.threshold {
            return Err(RateLimitError::ThresholdExceeded {
                hits,
                threshold: self.threshold,
            });
        }

        Ok(self.retry_delay)
    }

    /// Reset the consecutive counter after a successful response
    pub fn record_success(&self) {
        self.consecutive.store(0, Ordering::SeqCst);
    }

    /// Current consecutive 429 count
    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive.load(Ordering::SeqCst)
    }

    /// Total 429 responses seen during the run
    pub fn total_hits(&self) -> u64 {
        self.total_hits.load(Ordering::SeqCst)
    }

    /// Configured threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Configured retry delay
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Rate limit errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Too many consecutive 429 responses
    #[error("received {hits} consecutive 429 responses (threshold {threshold})")]
    ThresholdExceeded {
        /// Consecutive hits when the threshold tripped
        hits: u32,
        /// Configured threshold
        threshold: u32,
    },
}
