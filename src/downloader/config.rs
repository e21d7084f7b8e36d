//! Collection configuration constants

use std::time::Duration;

/// Base URL of the studio API. Resource paths are appended as `/{id}/comments`.
pub const DEFAULT_BASE_URL: &str = "https://api.scratch.mit.edu/studios";

/// Comments requested per page. 40 is the largest page the API serves.
pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Replies requested per thread. Only the first page of each thread is read.
pub const REPLY_PAGE_LIMIT: u32 = 40;

/// Trailing window of activity that is counted (24 hours).
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Pause between comment pages.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 150;

/// Number of reply threads fetched concurrently per page.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound for `--concurrency`.
pub const MAX_CONCURRENCY: usize = 32;

/// Fixed wait before retrying a request that returned 429.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Consecutive 429 responses, across all in-flight requests, that abort the run.
pub const DEFAULT_MAX_CONSECUTIVE_429: u32 = 5;

/// Hard cap on pages walked in one run.
pub const MAX_PAGES: usize = 10_000;

/// Tunables for one collection run
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// Comments per page
    pub page_size: u32,
    /// Trailing window that counts as recent activity
    pub window: chrono::Duration,
    /// Pause between pages
    pub page_delay: Duration,
    /// Reply threads fetched concurrently
    pub concurrency: usize,
    /// Wait before retrying a 429
    pub retry_delay: Duration,
    /// Consecutive 429 responses that abort the run
    pub max_consecutive_429: u32,
    /// Safety cap on pages walked
    pub max_pages: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            window: chrono::Duration::hours(DEFAULT_WINDOW_HOURS),
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            concurrency: DEFAULT_CONCURRENCY,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_consecutive_429: DEFAULT_MAX_CONSECUTIVE_429,
            max_pages: MAX_PAGES,
        }
    }
}

impl CollectorConfig {
    /// Override the API base URL (trailing slashes are stripped)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the trailing window
    pub fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = window;
        self
    }

    /// Override the inter-page delay
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Override the 429 retry delay
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Override the reply fan-out width, clamped to `1..=MAX_CONCURRENCY`
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Override the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the consecutive-429 threshold
    pub fn with_max_consecutive_429(mut self, threshold: u32) -> Self {
        self.max_consecutive_429 = threshold.max(1);
        self
    }

    /// Window length in whole hours, for report headers
    pub fn window_hours(&self) -> i64 {
        self.window.num_hours()
    }
}
