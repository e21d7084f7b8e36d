//! Command line interface

pub mod error;
pub mod run;

pub use error::CliError;
pub use run::RunStatus;

use crate::downloader::config::{
    CollectorConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_MAX_CONSECUTIVE_429,
    DEFAULT_PAGE_DELAY_MS, DEFAULT_PAGE_SIZE, DEFAULT_RETRY_DELAY_MS, DEFAULT_WINDOW_HOURS,
    MAX_CONCURRENCY,
};
use crate::identifier::ResourceId;
use crate::output::ReportFormat;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Parse and validate the reply fan-out concurrency
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Studio activity ranker
#[derive(Parser, Debug, Clone)]
#[command(name = "studio-activity")]
#[command(about = "Rank the most active users of a Scratch studio's comment feed", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Studio id or studio URL (e.g. 51358686 or https://scratch.mit.edu/studios/51358686/)
    #[arg(long, short = 'r')]
    pub resource: ResourceId,

    /// API base URL the studio id is appended to
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Comments requested per page (the API serves at most 40)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=40))]
    pub page_size: u32,

    /// Trailing window in hours
    #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS, value_parser = clap::value_parser!(i64).range(1..=8760))]
    pub window_hours: i64,

    /// Pause between comment pages in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAGE_DELAY_MS)]
    pub page_delay_ms: u64,

    /// Reply threads fetched concurrently per page (max: 32)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Wait before retrying a rate limited request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Consecutive 429 responses that stop the run (range: 1-100)
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_429, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_rate_limit_hits: u32,

    /// Directory the report and username list are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the report and username list instead of writing files
    #[arg(long, default_value_t = false)]
    pub stdout: bool,

    /// Report format (text or json)
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Run configuration assembled from the flags
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig::default()
            .with_base_url(self.base_url.clone())
            .with_page_size(self.page_size)
            .with_window(chrono::Duration::hours(self.window_hours))
            .with_page_delay(Duration::from_millis(self.page_delay_ms))
            .with_concurrency(self.concurrency)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_max_consecutive_429(self.max_rate_limit_hits)
    }
}
