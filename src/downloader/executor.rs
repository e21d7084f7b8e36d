//! Collection executor: the page loop
//!
//! Walks comment pages from offset zero. Each page is scanned against the
//! trailing window, its comment authors are tallied, and its reply threads are
//! fetched through the bounded worker pool before the next page is requested.
//! Reply authors are tallied after the fan-out, in the order their threads
//! appear on the page, so tie-breaking never depends on response timing.
//! The fatal rate limit condition ends the loop but never discards what was
//! already tallied.

use crate::downloader::config::CollectorConfig;
use crate::downloader::job::{CollectionOutcome, JobProgress, StopReason};
use crate::downloader::pool::BoundedWorkerPool;
use crate::fetcher::pagination::{scan_page, PageCursor};
use crate::fetcher::{CommentSource, FetcherError};
use crate::identifier::ResourceId;
use crate::metrics;
use crate::shutdown::{self, SharedShutdown};
use crate::tally::{lock_tally, ActivityTally};
use crate::Reply;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, error, info};

/// Reply threads of one page, one slot per reply target
struct ReplySlots {
    slots: Mutex<Vec<Option<Vec<Reply>>>>,
}

impl ReplySlots {
    fn new(len: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; len]),
        }
    }

    fn fill(&self, slot: usize, replies: Vec<Reply>) {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = slots.get_mut(slot) {
            *entry = Some(replies);
        }
    }

    /// Fetched replies, thread by thread in target order
    fn into_feed_order(self) -> impl Iterator<Item = Reply> {
        self.slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_iter()
            .flatten()
            .flatten()
    }
}

/// Drives one collection run against a [`CommentSource`]
pub struct CollectionExecutor<S> {
    source: S,
    resource: ResourceId,
    config: CollectorConfig,
    shutdown: Option<SharedShutdown>,
    reference_time: Option<DateTime<Utc>>,
}

impl<S: CommentSource> CollectionExecutor<S> {
    /// Create an executor using the globally registered shutdown handle, if any
    pub fn new(source: S, resource: ResourceId, config: CollectorConfig) -> Self {
        Self {
            source,
            resource,
            config,
            shutdown: shutdown::get_global_shutdown(),
            reference_time: None,
        }
    }

    /// Use an explicit shutdown coordinator
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Measure the window from a fixed instant instead of the start of the run
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Run to completion without a progress display
    pub async fn run(&self) -> CollectionOutcome {
        self.run_with_progress(None).await
    }

    /// Run to completion, ticking `progress` once per page
    pub async fn run_with_progress(&self, progress: Option<ProgressBar>) -> CollectionOutcome {
        let started_at = self.reference_time.unwrap_or_else(Utc::now);
        let tally = ActivityTally::shared();
        let mut job = JobProgress::default();
        let mut cursor = PageCursor::new(self.config.page_size, self.config.max_pages);
        let pool = BoundedWorkerPool::new(self.config.concurrency);

        info!(
            resource = %self.resource,
            window_hours = self.config.window_hours(),
            page_size = cursor.page_size(),
            concurrency = pool.concurrency(),
            "Starting collection"
        );

        let stop = loop {
            let offset = cursor.offset();

            if self.shutdown_requested() {
                break StopReason::Shutdown { offset };
            }
            if cursor.exhausted() {
                break StopReason::PageLimit {
                    pages: cursor.pages(),
                };
            }

            debug!(offset, "Fetching comment page {}", cursor.pages() + 1);
            let page = match self
                .source
                .fetch_comments(&self.resource, offset, cursor.page_size())
                .await
            {
                Ok(Some(page)) => page,
                Ok(None) => break StopReason::FetchFailed { offset },
                Err(e) => {
                    error!(offset, "Stopping collection: {}", e);
                    break StopReason::RateLimited { offset };
                }
            };
            job.pages_fetched += 1;

            if page.is_empty() {
                break StopReason::EmptyPage { offset };
            }

            let scan = scan_page(&page, started_at, self.config.window);
            {
                let mut tally = lock_tally(&tally);
                for comment in scan.accepted {
                    tally.record_primary(comment.author_username());
                }
            }
            metrics::record_page(scan.accepted.len() as u64);
            job.out_of_order_comments += scan.out_of_order as u64;
            job.reply_threads_requested += scan.reply_targets.len() as u64;

            let failed_threads = AtomicU64::new(0);
            let threads = ReplySlots::new(scan.reply_targets.len());
            let targets: Vec<(usize, u64)> =
                scan.reply_targets.iter().copied().enumerate().collect();
            let replies = pool
                .run(&targets, |(slot, comment_id)| {
                    self.collect_replies(slot, comment_id, &threads, &failed_threads)
                })
                .await;
            job.reply_threads_failed += failed_threads.load(Ordering::SeqCst);

            // Threads are tallied in feed order whatever order they completed in
            {
                let mut tally = lock_tally(&tally);
                for reply in threads.into_feed_order() {
                    tally.record_secondary(reply.author_username());
                }
            }

            if let Some(pb) = &progress {
                let tally = lock_tally(&tally);
                pb.inc(1);
                pb.set_message(format!(
                    "{} comments, {} replies, {} users",
                    tally.total_primary(),
                    tally.total_secondary(),
                    tally.distinct_users()
                ));
            }

            debug!(
                offset,
                accepted = scan.accepted.len(),
                reply_threads = scan.reply_targets.len(),
                "Page processed"
            );

            if let Err(e) = replies {
                error!(offset, "Stopping collection during reply fan-out: {}", e);
                break StopReason::RateLimited { offset };
            }

            if scan.reached_boundary {
                break StopReason::WindowBoundary { offset };
            }

            self.page_pause().await;
            cursor.advance();
        };

        let tally = lock_tally(&tally).clone();
        info!(
            pages = job.pages_fetched,
            comments = tally.total_primary(),
            replies = tally.total_secondary(),
            users = tally.distinct_users(),
            stop = %stop,
            "Collection finished"
        );

        CollectionOutcome {
            tally,
            stop,
            progress: job,
            started_at,
        }
    }

    /// Fetch one reply thread into its slot
    async fn collect_replies(
        &self,
        slot: usize,
        comment_id: u64,
        threads: &ReplySlots,
        failed_threads: &AtomicU64,
    ) -> Result<(), FetcherError> {
        match self.source.fetch_replies(&self.resource, comment_id).await? {
            Some(replies) => {
                metrics::record_replies(replies.len() as u64);
                threads.fill(slot, replies);
            }
            None => {
                debug!(comment_id, "Reply thread returned no data");
                failed_threads.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    /// Inter-page delay, cut short by a shutdown request
    async fn page_pause(&self) {
        match &self.shutdown {
            Some(shutdown) => {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.page_delay) => {}
                    _ = shutdown.wait_for_shutdown() => {}
                }
            }
            None => tokio::time::sleep(self.config.page_delay).await,
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|shutdown| shutdown.is_shutdown_requested())
    }
}
