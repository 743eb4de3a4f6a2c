use anyhow::Result;
use std::time::{Duration, Instant};

use fetchway::{ClientConfig, ClientError, RequestOptions, ResilientClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client tuned for fast tests: 100ms attempt timeout, 50ms base backoff.
fn fast_client(base_url: &str, max_retries: u32) -> Result<ResilientClient> {
    let mut config = ClientConfig::new(base_url)?;
    config.http.timeout = "100ms".to_string();
    config.retry.max_retries = max_retries;
    config.retry.base_delay = "50ms".to_string();
    Ok(ResilientClient::new(config)?)
}

/// A response slow enough that every attempt hits the client timeout.
fn hung_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_delay(Duration::from_secs(5))
}

#[tokio::test]
async fn transient_failures_then_success_yields_success() -> Result<()> {
    let server = MockServer::start().await;
    // first two attempts hang past the timeout, the third answers
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(hung_response())
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = fast_client(&server.uri(), 3)?;
    let started = Instant::now();
    let response = client.get("/data").await?;

    assert_eq!(response.status, 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    // two timeouts (~100ms each) plus backoffs of 50ms then 100ms
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(client.stats().retries, 2);
    Ok(())
}

#[tokio::test]
async fn exhausted_timeouts_return_408() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(hung_response())
        .mount(&server)
        .await;

    let client = fast_client(&server.uri(), 2)?;
    let err = client.get("/slow").await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(err.status_code(), 408);
    assert_eq!(err.to_string(), "Request timeout. Please try again.");
    // initial attempt + 2 retries, no more
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn timeout_aborts_the_inflight_attempt() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(hung_response())
        .mount(&server)
        .await;

    let client = fast_client(&server.uri(), 0)?;
    let started = Instant::now();
    let err = client.get("/slow").await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout));
    // aborted at the 100ms deadline, not after the 5s server delay
    assert!(started.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[tokio::test]
async fn connection_failure_returns_status_zero() -> Result<()> {
    // discard port: connections are refused immediately
    let client = fast_client("http://127.0.0.1:9", 1)?;
    let started = Instant::now();
    let err = client.get("/anything").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.status_code(), 0);
    // one backoff of 50ms happened between the two attempts
    assert!(started.elapsed() >= Duration::from_millis(50));
    Ok(())
}

#[tokio::test]
async fn http_errors_are_terminal_not_retried() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "email is required"})))
        .mount(&server)
        .await;

    let client = fast_client(&server.uri(), 3)?;
    let err = client.post("/contact", json!({})).await.unwrap_err();

    match err {
        ClientError::Http { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "email is required");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    // retrying a 400 cannot change the outcome
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert_eq!(client.stats().retries, 0);
    Ok(())
}

#[tokio::test]
async fn per_call_overrides_beat_client_defaults() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(hung_response())
        .mount(&server)
        .await;

    let client = fast_client(&server.uri(), 5)?;
    let err = client
        .execute("/slow", RequestOptions::get().with_retries(0))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    Ok(())
}
