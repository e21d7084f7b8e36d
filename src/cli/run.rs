//! Collection command: run the page loop, then render and write the report

use super::{Cli, CliError};
use crate::downloader::{CollectionExecutor, CollectionOutcome, StopReason};
use crate::fetcher::http::FeedHttpClient;
use crate::metrics;
use crate::output::{
    render_json_report, render_report, render_usernames, write_artifacts, ArtifactPaths,
    ReportFormat, ReportHeader,
};
use crate::shutdown::SharedShutdown;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

/// How a run ended, as seen by the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The whole window was covered
    Complete,
    /// Stopped early by Ctrl+C or the page cap; a partial report was produced
    Partial,
    /// Stopped on the consecutive 429 threshold; a partial report was produced
    RateLimited,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Complete | RunStatus::Partial => 0,
            RunStatus::RateLimited => 3,
        }
    }
}

impl From<StopReason> for RunStatus {
    fn from(stop: StopReason) -> Self {
        match stop {
            StopReason::RateLimited { .. } => RunStatus::RateLimited,
            stop if stop.is_complete() => RunStatus::Complete,
            _ => RunStatus::Partial,
        }
    }
}

/// Rendered report and username list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Report body in the requested format
    pub report: String,
    /// Ranked usernames, one per line
    pub usernames: String,
}

/// Render both artifacts for an outcome
pub fn render_outcome(
    cli: &Cli,
    outcome: &CollectionOutcome,
) -> Result<RenderedReport, CliError> {
    let header = ReportHeader {
        resource: &cli.resource,
        window_hours: cli.window_hours,
        stop: outcome.stop,
    };
    let summary = outcome.summary();
    let ranking = outcome.ranking();

    let report = match cli.format {
        ReportFormat::Text => render_report(&header, &summary, &ranking),
        ReportFormat::Json => render_json_report(&header, &summary, &ranking)?,
    };

    Ok(RenderedReport {
        report,
        usernames: render_usernames(&ranking),
    })
}

fn page_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] pages: {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

impl Cli {
    /// Execute one collection run and emit its artifacts
    ///
    /// Rate limiting and Ctrl+C still produce a report; the returned status
    /// tells the caller how the run ended.
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<RunStatus, CliError> {
        if let Some(addr) = self.metrics_addr {
            metrics::init_metrics(addr).map_err(|e| {
                CliError::ConfigurationError(format!("cannot serve metrics on {addr}: {e}"))
            })?;
        }

        let config = self.collector_config();
        let client = FeedHttpClient::from_config(&config);
        let executor =
            CollectionExecutor::new(client, self.resource.clone(), config).with_shutdown(shutdown);

        let progress = (!self.stdout).then(page_spinner);
        let outcome = executor.run_with_progress(progress.clone()).await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let rendered = render_outcome(self, &outcome)?;

        if self.stdout {
            print!("{}", rendered.report);
            println!("==== usernames ====");
            print!("{}", rendered.usernames);
        } else {
            let paths = ArtifactPaths::new(
                &self.output_dir,
                &self.resource,
                self.format,
                outcome.started_at,
            );
            write_artifacts(&paths, &rendered.report, &rendered.usernames)?;
            println!("Report: {}", paths.report.display());
            println!("Usernames: {}", paths.usernames.display());
        }

        let status = RunStatus::from(outcome.stop);
        match status {
            RunStatus::Complete if outcome.stop.ended_on_failure() => {
                warn!(stop = %outcome.stop, "Run ended on a failed request; counts cover the pages fetched before it")
            }
            RunStatus::Complete => info!(stop = %outcome.stop, "Run complete"),
            RunStatus::Partial | RunStatus::RateLimited => {
                warn!(stop = %outcome.stop, "Run incomplete; report covers the pages processed so far")
            }
        }

        Ok(status)
    }
}
