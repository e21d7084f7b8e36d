//! # Studio Activity Library
//!
//! Polls the public comment feed of a Scratch studio, tallies how active each
//! user has been over a trailing time window, and renders a ranked report.
//!
//! ## Features
//!
//! - **Paginated Feed Walk**: Walks comment pages newest-first and stops at the window boundary
//! - **Reply Fan-out**: Fetches reply threads with a bounded worker pool
//! - **Rate Limit Handling**: Fixed-delay retry on HTTP 429 with a shared consecutive-hit threshold
//! - **Partial Reports**: A fatal rate limit or Ctrl+C still produces a report of what was tallied
//! - **Atomic Output**: Report artifacts are written via temp file and rename
//!
//! ## Quick Start
//!
//! ```no_run
//! use studio_activity::downloader::{CollectionExecutor, CollectorConfig};
//! use studio_activity::fetcher::http::FeedHttpClient;
//! use studio_activity::identifier::ResourceId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resource = ResourceId::parse("51358686")?;
//! let config = CollectorConfig::default();
//! let client = FeedHttpClient::from_config(&config);
//!
//! let executor = CollectionExecutor::new(client, resource, config);
//! let outcome = executor.run().await;
//! println!("{} users ranked", outcome.ranking().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`identifier`] - Resource id parsing and validation
//! - [`fetcher`] - HTTP access to the comment feed, retry classification and page scanning
//! - [`downloader`] - Run orchestration: configuration, 429 tracking, worker pool, page loop
//! - [`tally`] - Per-user counters and ranking
//! - [`output`] - Report rendering and artifact writing
//! - [`cli`] - Command line interface

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Command line interface
pub mod cli;

/// Run orchestration
pub mod downloader;

/// Feed fetchers
pub mod fetcher;

/// Resource identifier parsing and validation
pub mod identifier;

/// Runtime metrics
pub mod metrics;

/// Report rendering and artifact output
pub mod output;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Per-user activity tallies and ranking
pub mod tally;

pub use identifier::ResourceId;
pub use tally::{ActivityTally, Ranking, UserTally};

/// Author block embedded in comments and replies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    /// Username as shown on the site
    pub username: String,
}

/// Top-level comment on a studio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Comment id, used to address its reply thread
    pub id: u64,
    /// Comment author
    pub author: Author,
    /// Creation timestamp
    pub datetime_created: DateTime<Utc>,
    /// Number of replies in the thread
    #[serde(default)]
    pub reply_count: u32,
}

impl Comment {
    /// Username of the comment author
    pub fn author_username(&self) -> &str {
        &self.author.username
    }

    /// Whether the comment has a reply thread worth fetching
    pub fn has_replies(&self) -> bool {
        self.reply_count > 0
    }
}

/// Reply inside a comment thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    /// Reply author
    pub author: Author,
}

impl Reply {
    /// Username of the reply author
    pub fn author_username(&self) -> &str {
        &self.author.username
    }
}
