//! Failure classification and retry message formatting.
//!
//! Every failed request is classified into a [`RetryErrorType`] so the kind of
//! failure stays visible in logs even when the caller collapses it into
//! "no data". [`RetryContext`] formats the 429 retry lines and the final
//! message printed when the consecutive-429 threshold trips.

use reqwest::{Error as ReqwestError, StatusCode};
use std::time::Duration;

/// Classification of request failures for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Network timeout or connection stalled long enough to trigger a timeout
    NetworkTimeout,
    /// Connection refused, DNS failure, or other offline scenarios
    NetworkOffline,
    /// HTTP 429 rate limit exceeded
    RateLimit,
    /// HTTP 5xx server error
    ServerError(u16),
    /// HTTP 404, typically a deleted studio or comment
    NotFound,
    /// Other client errors (4xx, except 404 and 429)
    ClientError(u16),
    /// Body was not the JSON shape we expected
    MalformedBody,
    /// Generic fallback when no better classification fits
    NetworkGeneric,
}

impl RetryErrorType {
    /// User-friendly description string used inside log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::NotFound => "resource not found",
            Self::ClientError(code) => match code {
                401 | 403 => "access denied",
                _ => "client error",
            },
            Self::MalformedBody => "malformed response body",
            Self::NetworkGeneric => "network error",
        }
    }

    /// Suggested remediation presented with failures.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Check your network connection and firewall settings",
            Self::NetworkOffline => "Verify internet connectivity and DNS resolution",
            Self::RateLimit => "Lower --concurrency or raise --page-delay-ms and --retry-delay-ms",
            Self::ServerError(_) => "The API may be having issues, try again later",
            Self::NotFound => "Check that the studio id exists and its comments are public",
            Self::ClientError(_) => "Review the base URL and resource id",
            Self::MalformedBody => "The API response format may have changed",
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }

    /// Whether the failure is retried by the fetcher. Only 429 is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryErrorType::RateLimit)
    }
}

/// Context for formatting rate limit retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Consecutive 429 count (1-based)
    pub attempt: u32,
    /// Consecutive 429 count that aborts the run
    pub threshold: u32,
    /// Type of error that triggered retry
    pub error_type: RetryErrorType,
    /// Wait until next attempt
    pub backoff_duration: Duration,
    /// Path or URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used by the HTTP client.
    pub fn new(
        attempt: u32,
        threshold: u32,
        error_type: RetryErrorType,
        backoff_duration: Duration,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            threshold,
            error_type,
            backoff_duration,
            endpoint: endpoint.into(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (consecutive {}/{}) after {} - waiting {:.1} seconds... ({})",
            self.attempt,
            self.threshold,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64(),
            self.endpoint
        )
    }

    /// Format retry success message when a later attempt works.
    pub fn format_success(&self) -> String {
        format!(
            "Request succeeded after {} rate limited attempt(s) ({})",
            self.attempt, self.endpoint
        )
    }

    /// Format final failure summary with actionable suggestions.
    pub fn format_failure(&self) -> String {
        let mut lines = vec![
            format!(
                "[FAILED] Aborted after {} consecutive {} responses",
                self.threshold,
                self.error_type.description()
            ),
            format!("  Endpoint: {}", self.endpoint),
            "  Suggestions:".to_string(),
        ];

        for suggestion in self.format_suggestions() {
            lines.push(format!("    - {suggestion}"));
        }

        lines.join("\n")
    }

    /// Derive suggestions tailored to the current retry context.
    pub fn format_suggestions(&self) -> Vec<String> {
        vec![
            self.error_type.suggestion().to_string(),
            format!(
                "Try increasing --max-rate-limit-hits (current: {})",
                self.threshold
            ),
        ]
    }
}

/// Extract a [`RetryErrorType`] from an HTTP status or reqwest error.
pub fn extract_error_type(
    status: Option<StatusCode>,
    err: Option<&ReqwestError>,
) -> RetryErrorType {
    if let Some(status) = status {
        match status.as_u16() {
            404 => return RetryErrorType::NotFound,
            429 => return RetryErrorType::RateLimit,
            _ => {}
        }

        if status.is_server_error() {
            return RetryErrorType::ServerError(status.as_u16());
        }

        if status.is_client_error() {
            return RetryErrorType::ClientError(status.as_u16());
        }
    }

    if let Some(err) = err {
        if err.is_timeout() {
            return RetryErrorType::NetworkTimeout;
        }

        if err.is_connect() {
            return RetryErrorType::NetworkOffline;
        }

        if err.is_decode() {
            return RetryErrorType::MalformedBody;
        }
    }

    RetryErrorType::NetworkGeneric
}
