use std::time::Duration;

use reqwest::StatusCode;
use studio_activity::fetcher::retry_formatter::{
    extract_error_type, RetryContext, RetryErrorType,
};

fn sample_context(error_type: RetryErrorType) -> RetryContext {
    RetryContext::new(
        2,
        5,
        error_type,
        Duration::from_millis(1500),
        "https://api.scratch.mit.edu/studios/51358686/comments",
    )
}

#[test]
fn format_retry_captures_count_and_wait() {
    let message = sample_context(RetryErrorType::RateLimit).format_retry();
    assert!(message.contains("consecutive 2/5"));
    assert!(message.contains("rate limit exceeded"));
    assert!(message.contains("1.5 seconds"));
    assert!(message.contains("51358686/comments"));
}

#[test]
fn format_success_reports_attempts() {
    let message = sample_context(RetryErrorType::RateLimit).format_success();
    assert!(message.contains("after 2 rate limited attempt(s)"));
}

#[test]
fn format_failure_lists_suggestions() {
    let output = sample_context(RetryErrorType::RateLimit).format_failure();
    assert!(output.starts_with("[FAILED] Aborted after 5 consecutive rate limit exceeded responses"));
    assert!(output.contains("Endpoint: https://api.scratch.mit.edu"));
    assert!(output.contains("--concurrency"));
    assert!(output.contains("--max-rate-limit-hits (current: 5)"));
}

#[test]
fn status_codes_are_classified() {
    assert_eq!(
        extract_error_type(Some(StatusCode::TOO_MANY_REQUESTS), None),
        RetryErrorType::RateLimit
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::NOT_FOUND), None),
        RetryErrorType::NotFound
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::BAD_GATEWAY), None),
        RetryErrorType::ServerError(502)
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::FORBIDDEN), None),
        RetryErrorType::ClientError(403)
    );
    assert_eq!(extract_error_type(None, None), RetryErrorType::NetworkGeneric);
}

#[test]
fn only_rate_limit_is_retryable() {
    assert!(RetryErrorType::RateLimit.is_retryable());
    for kind in [
        RetryErrorType::NetworkTimeout,
        RetryErrorType::NetworkOffline,
        RetryErrorType::ServerError(503),
        RetryErrorType::NotFound,
        RetryErrorType::ClientError(400),
        RetryErrorType::MalformedBody,
        RetryErrorType::NetworkGeneric,
    ] {
        assert!(!kind.is_retryable(), "{kind:?} should not be retried");
    }
    assert_eq!(RetryErrorType::ClientError(401).description(), "access denied");
}
