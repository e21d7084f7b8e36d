//! Collection orchestration
//!
//! This module drives one run over a studio comment feed:
//!
//! 1. **Configuration**: page size, window, delays and limits in [`config::CollectorConfig`]
//! 2. **Execution**: the page loop in [`executor::CollectionExecutor`]
//! 3. **Fan-out**: reply threads fetched through [`pool::BoundedWorkerPool`]
//! 4. **Rate limiting**: consecutive 429 tracking in [`rate_limit::RateLimitTracker`]
//! 5. **Outcome**: tallies, counters and the stop reason in [`job::CollectionOutcome`]
//!
//! # Quick Start
//!
//! ```no_run
//! use studio_activity::downloader::{CollectionExecutor, CollectorConfig};
//! use studio_activity::fetcher::http::FeedHttpClient;
//! use studio_activity::ResourceId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CollectorConfig::default().with_concurrency(4);
//! let client = FeedHttpClient::from_config(&config);
//! let resource = ResourceId::parse("https://scratch.mit.edu/studios/51358686/")?;
//!
//! let outcome = CollectionExecutor::new(client, resource, config).run().await;
//! println!("{} ({} users)", outcome.stop, outcome.summary().distinct_users);
//! # Ok(())
//! # }
//! ```
//!
//! # Related Modules
//!
//! - [`crate::fetcher`] - HTTP access and pagination helpers
//! - [`crate::tally`] - Aggregation and ranking
//! - [`crate::output`] - Report rendering and artifact files

pub mod config;
pub mod executor;
pub mod job;
pub mod pool;
pub mod rate_limit;

pub use config::CollectorConfig;
pub use executor::CollectionExecutor;
pub use job::{CollectionOutcome, JobProgress, StopReason};
pub use pool::BoundedWorkerPool;
pub use rate_limit::{RateLimitError, RateLimitTracker};
