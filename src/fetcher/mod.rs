//! Feed fetcher implementations

use crate::downloader::rate_limit::RateLimitError;
use crate::identifier::ResourceId;
use crate::{Comment, Reply};
use async_trait::async_trait;
use retry_formatter::RetryErrorType;

pub mod http;
pub mod pagination;
pub mod retry_formatter;
pub mod shared_resources;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Consecutive 429 threshold reached; the only fatal error
    #[error("rate limit threshold exceeded: {0}")]
    RateLimitThresholdExceeded(#[from] RateLimitError),

    /// Non-success HTTP status other than 429
    #[error("HTTP error: {status} {}", .kind.description())]
    HttpStatus {
        /// Status code
        status: u16,
        /// Classified kind
        kind: RetryErrorType,
    },

    /// Transport failure before a status was received
    #[error("network error ({}): {message}", .kind.description())]
    NetworkError {
        /// Classified kind
        kind: RetryErrorType,
        /// Underlying error text
        message: String,
    },

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),
}

impl FetcherError {
    /// Whether this error must halt the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetcherError::RateLimitThresholdExceeded(_))
    }

    /// Classified kind of the failure
    pub fn error_type(&self) -> RetryErrorType {
        match self {
            FetcherError::RateLimitThresholdExceeded(_) => RetryErrorType::RateLimit,
            FetcherError::HttpStatus { kind, .. } => *kind,
            FetcherError::NetworkError { kind, .. } => *kind,
            FetcherError::ParseError(_) => RetryErrorType::MalformedBody,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Source of comment pages and reply threads
///
/// `Ok(None)` means "no data": the request failed in a way the run absorbs.
/// Implementations return `Err` only for fatal conditions.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch one page of top-level comments, newest first
    ///
    /// # Arguments
    /// * `resource` - Studio whose comments are read
    /// * `offset` - Number of comments to skip
    /// * `limit` - Page size
    async fn fetch_comments(
        &self,
        resource: &ResourceId,
        offset: u64,
        limit: u32,
    ) -> FetcherResult<Option<Vec<Comment>>>;

    /// Fetch the first page of replies under a comment
    async fn fetch_replies(
        &self,
        resource: &ResourceId,
        comment_id: u64,
    ) -> FetcherResult<Option<Vec<Reply>>>;
}
