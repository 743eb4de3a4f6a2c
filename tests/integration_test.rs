use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use fetchway::{ClientConfig, ClientError, Payload, RequestOptions, ResilientClient};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "services": [
                {"name": "automation", "price": 499},
                {"name": "chatbot", "price": 299}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contact"))
        .and(body_json(json!({"name": "Ada", "email": "ada@example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Contact request received"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("all systems operational")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Internal server error. Please try again later."
        })))
        .mount(&server)
        .await;

    server
}

fn test_client(server: &MockServer) -> Result<ResilientClient> {
    let mut config = ClientConfig::new(server.uri())?;
    config.rate_limit.requests = 100;
    config.rate_limit.window = "1s".to_string();
    config.retry.base_delay = "50ms".to_string();
    Ok(ResilientClient::new(config)?)
}

#[tokio::test]
async fn test_all_client_features() -> Result<()> {
    let server = start_backend().await;
    let client = test_client(&server)?;

    // --- JSON GET, cached ---
    let first: Value = client.get_cached("/services").await?.json()?;
    assert_eq!(first["services"].as_array().unwrap().len(), 2);
    let second: Value = client.get_cached("/services").await?.json()?;
    assert_eq!(first, second);

    // --- POST passthrough: 201 body comes back verbatim ---
    let created = client
        .post("/contact", json!({"name": "Ada", "email": "ada@example.com"}))
        .await?;
    assert_eq!(created.status, 201);
    let body = created.data.as_json().unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Contact request received");

    // --- text content type stays text ---
    let status_page = client.get("/status").await?;
    match &status_page.data {
        Payload::Text(text) => assert_eq!(text, "all systems operational"),
        Payload::Json(_) => panic!("text/plain response must not parse as JSON"),
    }

    // --- application-level error: actual status, message from body ---
    let err = client.get("/broken").await.unwrap_err();
    match &err {
        ClientError::Http { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Internal server error. Please try again later.");
        }
        other => panic!("expected Http error, got {:?}", other),
    }

    // /services was served once from the network, /broken exactly once
    let requests = server.received_requests().await.unwrap();
    let services_hits = requests.iter().filter(|r| r.url.path() == "/services").count();
    let broken_hits = requests.iter().filter(|r| r.url.path() == "/broken").count();
    assert_eq!(services_hits, 1);
    assert_eq!(broken_hits, 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_calls_are_independent() -> Result<()> {
    let server = start_backend().await;
    let client = Arc::new(test_client(&server)?);

    let mut tasks = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                client.get("/services").await
            } else {
                client.get("/status").await
            }
        }));
    }

    let responses = join_all(tasks).await;
    for response in responses {
        assert!(response?.is_ok());
    }

    let stats = client.stats();
    assert_eq!(stats.requests, 20);
    assert_eq!(stats.failures, 0);
    Ok(())
}

#[tokio::test]
async fn stats_reflect_every_outcome() -> Result<()> {
    let server = start_backend().await;
    let mut config = ClientConfig::new(server.uri())?;
    config.rate_limit.requests = 1;
    config.rate_limit.window = "1s".to_string();
    let client = ResilientClient::new(config)?;

    client.get_cached("/services").await?; // miss + network
    client.get_cached("/services").await?; // hit
    assert!(matches!(
        client.get("/services").await, // limiter slot already used
        Err(ClientError::RateLimited)
    ));

    let stats = client.stats();
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.rate_limited, 1);
    assert_eq!(stats.failures, 1);
    Ok(())
}

#[tokio::test]
async fn maintenance_task_keeps_running() -> Result<()> {
    let server = start_backend().await;
    let mut config = ClientConfig::new(server.uri())?;
    config.rate_limit.window = "100ms".to_string();
    let client = Arc::new(ResilientClient::new(config)?);
    let handle = client.start_maintenance();

    client.get("/services").await?;
    tokio::time::sleep(Duration::from_millis(250)).await;

    // idle for more than one window-width: purged by the opportunistic
    // sweep on the next call (the periodic task observes the same cutoff)
    client.get("/status").await?;
    assert!(!handle.is_finished());
    handle.abort();
    Ok(())
}

#[tokio::test]
async fn typed_deserialization_round_trips() -> Result<()> {
    #[derive(serde::Deserialize)]
    struct ServiceList {
        success: bool,
        services: Vec<Service>,
    }

    #[derive(serde::Deserialize)]
    struct Service {
        name: String,
        price: u32,
    }

    let server = start_backend().await;
    let client = test_client(&server)?;

    let list: ServiceList = client.get("/services").await?.json()?;
    assert!(list.success);
    assert_eq!(list.services[0].name, "automation");
    assert_eq!(list.services[1].price, 299);
    Ok(())
}

#[tokio::test]
async fn options_compose_across_features() -> Result<()> {
    let server = start_backend().await;
    let client = test_client(&server)?;

    let options = RequestOptions::get()
        .with_cache()
        .with_retries(1)
        .with_retry_delay(Duration::from_millis(10))
        .with_timeout(Duration::from_secs(2))
        .without_rate_limit();

    let response = client.execute("/services", options.clone()).await?;
    assert_eq!(response.status, 200);

    // second call with the same options is a cache hit
    client.execute("/services", options).await?;
    let services_hits = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/services")
        .count();
    assert_eq!(services_hits, 1);
    Ok(())
}
