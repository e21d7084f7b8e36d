//! Collection run progress and outcome

use crate::tally::{ActivityTally, Ranking, Summary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Why the page loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// A comment older than the window was reached
    WindowBoundary {
        /// Offset of the page holding the boundary
        offset: u64,
    },
    /// The API returned an empty page
    EmptyPage {
        /// Offset of the empty page
        offset: u64,
    },
    /// A comment page could not be fetched and was treated as no data
    FetchFailed {
        /// Offset of the failed page
        offset: u64,
    },
    /// The consecutive 429 threshold tripped
    RateLimited {
        /// Offset of the page being processed
        offset: u64,
    },
    /// Shutdown was requested (Ctrl+C)
    Shutdown {
        /// Offset of the next page that would have been requested
        offset: u64,
    },
    /// The page cap was reached
    PageLimit {
        /// Pages walked
        pages: usize,
    },
}

impl StopReason {
    /// Whether the tallies cover the whole window
    ///
    /// An empty or failed page ends the feed walk the same way the window
    /// boundary does, so only rate limiting, shutdown and the page cap leave a
    /// report incomplete.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            StopReason::WindowBoundary { .. }
                | StopReason::EmptyPage { .. }
                | StopReason::FetchFailed { .. }
        )
    }
}

impl StopReason {
    /// Whether the walk ended because a comment page could not be fetched
    ///
    /// The tallies still count as complete, but the report flags the run so a
    /// failed first page is not mistaken for a quiet studio.
    pub fn ended_on_failure(&self) -> bool {
        matches!(self, StopReason::FetchFailed { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::WindowBoundary { offset } => {
                write!(f, "reached the end of the window at offset {offset}")
            }
            StopReason::EmptyPage { offset } => write!(f, "no more comments at offset {offset}"),
            StopReason::FetchFailed { offset } => {
                write!(f, "comment page at offset {offset} could not be fetched")
            }
            StopReason::RateLimited { offset } => {
                write!(f, "rate limited while processing the page at offset {offset}")
            }
            StopReason::Shutdown { offset } => {
                write!(f, "interrupted before the page at offset {offset}")
            }
            StopReason::PageLimit { pages } => write!(f, "stopped after the {pages}-page cap"),
        }
    }
}

/// Counters describing how a run went
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    /// Comment pages fetched (including the last, possibly empty, one)
    pub pages_fetched: u64,
    /// Reply threads requested
    pub reply_threads_requested: u64,
    /// Reply threads that returned no data
    pub reply_threads_failed: u64,
    /// Accepted comments newer than their predecessor on the page
    pub out_of_order_comments: u64,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    /// Final tally
    pub tally: ActivityTally,
    /// Why the loop ended
    pub stop: StopReason,
    /// Run counters
    pub progress: JobProgress,
    /// Reference time the window was measured from
    pub started_at: DateTime<Utc>,
}

impl CollectionOutcome {
    /// Ranking derived from the tally
    pub fn ranking(&self) -> Ranking {
        self.tally.ranking()
    }

    /// Aggregate counts derived from the tally
    pub fn summary(&self) -> Summary {
        self.tally.summary()
    }

    /// Whether the run ended on the fatal rate limit condition
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.stop, StopReason::RateLimited { .. })
    }
}
