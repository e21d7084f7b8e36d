//! Offset pagination over the comment feed
//!
//! The feed is served newest-first in fixed-size pages. [`PageCursor`] tracks
//! the offset and guards against runaway loops, and [`scan_page`] splits a page
//! at the first comment that falls outside the trailing window.

use crate::Comment;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Whether a timestamp is older than the trailing window
///
/// Strictly greater-than: a comment exactly `window` old is still counted.
pub fn is_outside_window(created: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now.signed_duration_since(created) > window
}

/// Result of scanning one page against the window
#[derive(Debug, Clone, PartialEq)]
pub struct PageScan<'a> {
    /// Comments inside the window, in feed order
    pub accepted: &'a [Comment],
    /// Ids of accepted comments with a reply thread
    pub reply_targets: Vec<u64>,
    /// A comment outside the window was found; nothing after it was examined
    pub reached_boundary: bool,
    /// Accepted comments newer than the comment before them
    pub out_of_order: usize,
}

/// Scan a page in feed order, stopping at the first comment outside the window
pub fn scan_page(page: &[Comment], now: DateTime<Utc>, window: Duration) -> PageScan<'_> {
    let boundary = page
        .iter()
        .position(|comment| is_outside_window(comment.datetime_created, now, window));

    let accepted = match boundary {
        Some(index) => &page[..index],
        None => page,
    };

    let reply_targets = accepted
        .iter()
        .filter(|comment| comment.has_replies())
        .map(|comment| comment.id)
        .collect();

    let out_of_order = accepted
        .windows(2)
        .filter(|pair| pair[1].datetime_created > pair[0].datetime_created)
        .count();

    if out_of_order > 0 {
        warn!(
            out_of_order,
            "Feed out of order: newer comment follows an older one on the same page"
        );
    }

    if let Some(index) = boundary {
        debug!(
            accepted = index,
            skipped = page.len() - index,
            "Window boundary reached mid-page"
        );
    }

    PageScan {
        accepted,
        reply_targets,
        reached_boundary: boundary.is_some(),
        out_of_order,
    }
}

/// Offset cursor for the comment feed
#[derive(Debug, Clone)]
pub struct PageCursor {
    offset: u64,
    page_size: u32,
    pages: usize,
    max_pages: usize,
}

impl PageCursor {
    /// Start at offset zero
    pub fn new(page_size: u32, max_pages: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
            pages: 0,
            max_pages,
        }
    }

    /// Offset of the next page to request
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Page size used for `limit`
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Pages consumed so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Whether the page cap has been reached
    pub fn exhausted(&self) -> bool {
        self.pages >= self.max_pages
    }

    /// Move past the current page
    pub fn advance(&mut self) {
        self.pages += 1;
        self.offset += u64::from(self.page_size);
    }
}
