//! Studio API HTTP client
//!
//! Provides the single GET path used for comment pages and reply threads:
//! - Fixed-delay retry on 429, counted in the shared [`RateLimitTracker`]
//! - Fatal error once the consecutive 429 threshold trips
//! - Every other failure classified and returned without retry

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::downloader::config::{CollectorConfig, REPLY_PAGE_LIMIT};
use crate::downloader::rate_limit::RateLimitTracker;
use crate::fetcher::retry_formatter::{extract_error_type, RetryContext, RetryErrorType};
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::{CommentSource, FetcherError, FetcherResult};
use crate::identifier::ResourceId;
use crate::metrics::{record_retry_backoff, HttpRequestMetrics};
use crate::{Comment, Reply};

/// HTTP client for the studio comment API
#[derive(Clone)]
pub struct FeedHttpClient {
    client: Arc<Client>,
    base_url: String,
    rate_limits: Arc<RateLimitTracker>,
}

impl FeedHttpClient {
    /// Create new HTTP client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client
    /// * `base_url` - Base URL, e.g. `https://api.scratch.mit.edu/studios`
    /// * `rate_limits` - Consecutive-429 tracker shared by every request of the run
    pub fn new(
        client: Arc<Client>,
        base_url: impl Into<String>,
        rate_limits: Arc<RateLimitTracker>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limits,
        }
    }

    /// Build a client on the global connection pool from run configuration
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(
            global_http_client(),
            config.base_url.clone(),
            RateLimitTracker::shared(config.max_consecutive_429, config.retry_delay),
        )
    }

    /// Base URL requests are built on
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared consecutive-429 tracker
    pub fn rate_limits(&self) -> &Arc<RateLimitTracker> {
        &self.rate_limits
    }

    /// GET `{base_url}/{path}` and deserialize the JSON body
    ///
    /// A 429 is retried on the same URL after the tracker's fixed delay until
    /// the consecutive threshold trips. Any other failure is returned at once.
    ///
    /// # Errors
    /// [`FetcherError::RateLimitThresholdExceeded`] is fatal; every other
    /// variant describes a failure the caller may treat as "no data".
    pub async fn try_fetch<T>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut rate_limited_attempts = 0u32;

        loop {
            debug!("GET {} with {} params", url, params.len());
            let request_metrics = HttpRequestMetrics::start(endpoint);

            let response = match self.client.get(&url).query(params).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    request_metrics.record_network_error();
                    return Err(FetcherError::NetworkError {
                        kind: extract_error_type(None, Some(&e)),
                        message: e.to_string(),
                    });
                }
            };

            let status = response.status();
            request_metrics.record_complete(status.as_u16());
            let failure = (!status.is_success()).then(|| extract_error_type(Some(status), None));

            if failure.is_some_and(|kind| kind.is_retryable()) {
                rate_limited_attempts += 1;
                let delay = match self.rate_limits.record_rate_limited() {
                    Ok(delay) => delay,
                    Err(e) => {
                        let ctx = RetryContext::new(
                            self.rate_limits.consecutive_hits(),
                            self.rate_limits.threshold(),
                            RetryErrorType::RateLimit,
                            self.rate_limits.retry_delay(),
                            &url,
                        );
                        error!("{}", ctx.format_failure());
                        return Err(FetcherError::RateLimitThresholdExceeded(e));
                    }
                };

                let ctx = RetryContext::new(
                    self.rate_limits.consecutive_hits(),
                    self.rate_limits.threshold(),
                    RetryErrorType::RateLimit,
                    delay,
                    &url,
                );
                warn!("{}", ctx.format_retry());
                record_retry_backoff(delay, ctx.attempt);
                sleep(delay).await;
                continue;
            }

            // Any answer that is not retried breaks the consecutive chain
            self.rate_limits.record_success();

            if rate_limited_attempts > 0 {
                let ctx = RetryContext::new(
                    rate_limited_attempts,
                    self.rate_limits.threshold(),
                    RetryErrorType::RateLimit,
                    self.rate_limits.retry_delay(),
                    &url,
                );
                info!("{}", ctx.format_success());
            }

            if let Some(kind) = failure {
                return Err(FetcherError::HttpStatus {
                    status: status.as_u16(),
                    kind,
                });
            }

            return response
                .json::<T>()
                .await
                .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")));
        }
    }

    /// Like [`try_fetch`](Self::try_fetch), but non-fatal failures become `Ok(None)`
    ///
    /// The failure kind is logged at `warn` before it is dropped.
    pub async fn fetch<T>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> FetcherResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.try_fetch(endpoint, path, params).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(
                    path,
                    kind = e.error_type().description(),
                    "Treating failed request as no data: {}",
                    e
                );
                Ok(None)
            }
        }
    }
}

/// Path of the comment list for a studio
pub fn comments_path(resource: &ResourceId) -> String {
    format!("{resource}/comments")
}

/// Path of the reply list under one comment
pub fn replies_path(resource: &ResourceId, comment_id: u64) -> String {
    format!("{resource}/comments/{comment_id}/replies")
}

#[async_trait]
impl CommentSource for FeedHttpClient {
    async fn fetch_comments(
        &self,
        resource: &ResourceId,
        offset: u64,
        limit: u32,
    ) -> FetcherResult<Option<Vec<Comment>>> {
        let params = [("offset", offset.to_string()), ("limit", limit.to_string())];
        self.fetch("comments", &comments_path(resource), &params)
            .await
    }

    async fn fetch_replies(
        &self,
        resource: &ResourceId,
        comment_id: u64,
    ) -> FetcherResult<Option<Vec<Reply>>> {
        let params = [("offset", "0".to_string()), ("limit", REPLY_PAGE_LIMIT.to_string())];
        self.fetch("replies", &replies_path(resource, comment_id), &params)
            .await
    }
}
