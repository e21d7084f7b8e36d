//! HTTP client behaviour against a mock studio API
//!
//! Verifies the 429 retry loop, the shared consecutive counter and the
//! "no data" collapse for every other failure.

use crate::support::{comment_json, reply_json};
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use studio_activity::downloader::RateLimitTracker;
use studio_activity::fetcher::http::FeedHttpClient;
use studio_activity::fetcher::retry_formatter::RetryErrorType;
use studio_activity::fetcher::{CommentSource, FetcherError};
use studio_activity::identifier::ResourceId;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, threshold: u32) -> FeedHttpClient {
    FeedHttpClient::new(
        Arc::new(Client::new()),
        format!("{}/studios", server.uri()),
        RateLimitTracker::shared(threshold, Duration::from_millis(10)),
    )
}

fn studio() -> ResourceId {
    ResourceId::parse("123").unwrap()
}

#[tokio::test]
async fn test_comment_page_request_and_parse() {
    let server = MockServer::start().await;
    let now = Utc::now();
    Mock::given(method("GET"))
        .and(path("/studios/123/comments"))
        .and(query_param("offset", "80"))
        .and(query_param("limit", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            comment_json(11, "alice", now, 2),
            comment_json(10, "bob", now, 0)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let page = client
        .fetch_comments(&studio(), 80, 40)
        .await
        .unwrap()
        .expect("page should parse");

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, 11);
    assert_eq!(page[0].author_username(), "alice");
    assert_eq!(page[0].reply_count, 2);
    assert_eq!(page[1].author_username(), "bob");
}

#[tokio::test]
async fn test_reply_request_uses_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studios/123/comments/11/replies"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "40"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([reply_json(1, "carol"), reply_json(2, "alice")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let replies = client.fetch_replies(&studio(), 11).await.unwrap().unwrap();

    let names: Vec<_> = replies.iter().map(|r| r.author_username()).collect();
    assert_eq!(names, vec!["carol", "alice"]);
}

#[tokio::test]
async fn test_429_is_retried_and_success_resets_counter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/studios/123/comments"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/studios/123/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let page = client.fetch_comments(&studio(), 0, 40).await.unwrap();

    assert_eq!(page, Some(Vec::new()));
    assert_eq!(client.rate_limits().consecutive_hits(), 0);
    assert_eq!(client.rate_limits().total_hits(), 2);
}

#[tokio::test]
async fn test_threshold_of_consecutive_429_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(5)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let result = client.fetch_comments(&studio(), 0, 40).await;

    match result {
        Err(FetcherError::RateLimitThresholdExceeded(e)) => {
            assert!(e.to_string().contains("5 consecutive 429"));
        }
        other => panic!("expected fatal rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_counter_is_shared_across_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    // Another request already pushed the shared counter to 2
    client.rate_limits().record_rate_limited().unwrap();
    client.rate_limits().record_rate_limited().unwrap();

    let result = client.fetch_replies(&studio(), 5).await;
    assert!(matches!(
        result,
        Err(FetcherError::RateLimitThresholdExceeded(_))
    ));
    assert_eq!(client.rate_limits().total_hits(), 3);
}

#[tokio::test]
async fn test_server_error_is_no_data_and_resets_counter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    client.rate_limits().record_rate_limited().unwrap();

    let result = client.fetch_comments(&studio(), 0, 40).await.unwrap();
    assert!(result.is_none());
    assert_eq!(client.rate_limits().consecutive_hits(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    assert!(client.fetch_comments(&studio(), 0, 40).await.unwrap().is_none());

    let err = client
        .try_fetch::<Vec<serde_json::Value>>("comments", "123/comments", &[])
        .await
        .unwrap_err();
    assert_eq!(err.error_type(), RetryErrorType::MalformedBody);
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client
        .try_fetch::<Vec<serde_json::Value>>("replies", "123/comments/9/replies", &[])
        .await
        .unwrap_err();

    match err {
        FetcherError::HttpStatus { status, kind } => {
            assert_eq!(status, 404);
            assert_eq!(kind, RetryErrorType::NotFound);
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
    assert!(client.fetch_replies(&studio(), 9).await.unwrap().is_none());
}

#[tokio::test]
async fn test_connection_failure_is_no_data() {
    // Unpooled so dropping it closes the listener
    let server = MockServer::builder().start().await;
    let base = format!("{}/studios", server.uri());
    drop(server);

    let client = FeedHttpClient::new(
        Arc::new(Client::new()),
        base,
        RateLimitTracker::shared(5, Duration::from_millis(10)),
    );

    assert!(client.fetch_comments(&studio(), 0, 40).await.unwrap().is_none());
    assert_eq!(client.rate_limits().consecutive_hits(), 0);
}
