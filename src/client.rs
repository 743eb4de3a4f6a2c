//! The resilient client: cache read, rate-limit gate, timeout-bounded
//! attempts with exponential backoff, and result normalization.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use http::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::constants::monitoring;
use crate::errors::ClientError;
use crate::features::cache::ResponseCache;
use crate::features::rate_limiter::{InMemoryRateLimitState, RateLimitState};
use crate::features::retry::RetryPolicy;
use crate::options::RequestOptions;
use crate::response::{ApiResponse, CachedResponse, Payload};
use crate::utils::logging::*;

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    rate_limited: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Snapshot of the client's cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientStats {
    pub requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rate_limited: u64,
    pub retries: u64,
    pub failures: u64,
}

/// HTTP client wrapping every call with rate limiting, optional response
/// caching, per-attempt timeouts, and retry with exponential backoff.
///
/// One instance owns all of its state (rate-limit ledger, response cache,
/// counters); construct it once per application and share it via `Arc`.
pub struct ResilientClient {
    config: ClientConfig,
    http_client: Client,
    rate_limit_store: Arc<dyn RateLimitState>,
    cache: ResponseCache,
    counters: Counters,
}

impl ResilientClient {
    /// Builds a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let cache = ResponseCache::new(config.cache_ttl(), config.cache.max_capacity);

        Ok(Self {
            config,
            http_client: Client::new(),
            rate_limit_store: Arc::new(InMemoryRateLimitState::new()),
            cache,
            counters: Counters::default(),
        })
    }

    /// Builds a client configured from the environment (`API_URL`).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClientConfig::from_env()?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            rate_limited: self.counters.rate_limited.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Starts the periodic maintenance task: purges idle rate-limit
    /// windows, flushes cache housekeeping, and logs store sizes.
    pub fn start_maintenance(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(
                monitoring::MAINTENANCE_INTERVAL_SECONDS,
            ));
            loop {
                interval.tick().await;
                client.rate_limit_store.cleanup_expired_windows();
                client.cache.run_pending_tasks().await;

                log_performance_metric(
                    "rate_limit_windows",
                    client.rate_limit_store.active_windows_count() as f64,
                    "count",
                    "maintenance",
                );
                log_performance_metric(
                    "cache_entries",
                    client.cache.entry_count() as f64,
                    "count",
                    "maintenance",
                );
                log_performance_metric(
                    "requests_total",
                    client.counters.requests.load(Ordering::Relaxed) as f64,
                    "count",
                    "maintenance",
                );
            }
        })
    }

    /// Performs one logical call against `endpoint` (path + query, appended
    /// to the configured base URL).
    ///
    /// Order of operations: cache read first (a hit is free and consumes no
    /// rate-limit slot), then a single rate-limit check gating the whole
    /// call (retries do not re-check), then up to `retries + 1`
    /// timeout-bounded attempts with doubling backoff between them. Only
    /// transport-level failures are retried; any received HTTP response is
    /// terminal, and a non-2xx status comes back as
    /// [`ClientError::Http`] with the body's error message.
    pub async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let request_id = Uuid::new_v4().to_string();
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        let body_bytes = options.body.as_ref().map(|body| body.to_bytes());
        let cache_key = (options.cache && options.is_cacheable_shape())
            .then(|| ResponseCache::cache_key(&options.method, endpoint, body_bytes.as_ref()));

        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.lookup(key).await {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                log_cache_event(endpoint, &request_id, "hit");
                return Ok(cached.to_response());
            }
            self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
            log_cache_event(endpoint, &request_id, "miss");
        }

        if !options.skip_rate_limit {
            let max_requests = self.config.rate_limit.requests;
            let allowed = self
                .rate_limit_store
                .check_and_update(endpoint, max_requests, self.config.window())
                .await;
            log_rate_limit_event(endpoint, &request_id, !allowed, max_requests);

            if !allowed {
                self.counters.rate_limited.fetch_add(1, Ordering::Relaxed);
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                return Err(ClientError::RateLimited);
            }
        }

        let url = self.join_url(endpoint);
        let policy = RetryPolicy::new(
            options.retries.unwrap_or(self.config.retry.max_retries),
            options.retry_delay.unwrap_or_else(|| self.config.base_delay()),
        );
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());

        let mut attempt: u32 = 0;
        loop {
            match self.attempt(&url, &options, body_bytes.clone(), timeout).await {
                Ok(response) => {
                    if let Some(key) = cache_key {
                        self.cache
                            .store(
                                key,
                                Arc::new(CachedResponse {
                                    status: response.status,
                                    headers: response.headers.clone(),
                                    payload: response.data.clone(),
                                    inserted_at: Instant::now(),
                                }),
                            )
                            .await;
                        log_cache_event(endpoint, &request_id, "store");
                    }
                    log_request_outcome(
                        endpoint,
                        &request_id,
                        response.status.as_u16(),
                        true,
                        attempt + 1,
                    );
                    return Ok(response);
                }
                Err(error) if error.is_retryable() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for(attempt);
                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    log_retry_attempt(
                        endpoint,
                        &request_id,
                        attempt + 1,
                        delay.as_millis() as u64,
                        &error.to_string(),
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    log_request_outcome(
                        endpoint,
                        &request_id,
                        error.status_code(),
                        false,
                        attempt + 1,
                    );
                    return Err(error);
                }
            }
        }
    }

    /// One transport attempt, fully normalized.
    ///
    /// A transport-level failure (connect, DNS, timeout) maps through
    /// `From<reqwest::Error>` into a retryable error; a received HTTP
    /// response is parsed by content type and classified by status.
    async fn attempt(
        &self,
        url: &str,
        options: &RequestOptions,
        body_bytes: Option<bytes::Bytes>,
        timeout: std::time::Duration,
    ) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .http_client
            .request(options.method.clone(), url)
            .headers(options.headers.clone())
            .timeout(timeout);

        if let Some(body) = &options.body {
            if !options.headers.contains_key(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, body.content_type());
            }
        }
        if let Some(bytes) = body_bytes {
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await?;

        let payload = Payload::from_parts(content_type.as_deref(), &bytes);

        if status.is_success() {
            Ok(ApiResponse { status, headers, data: payload })
        } else {
            let message = payload.error_message().unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            });
            Err(ClientError::Http { status, message })
        }
    }

    fn join_url(&self, endpoint: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    // Convenience wrappers over `execute`.

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::get()).await
    }

    pub async fn get_cached(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::get().with_cache()).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::post(body)).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::put(body)).await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::patch(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.execute(endpoint, RequestOptions::delete()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        let client =
            ResilientClient::new(ClientConfig::new("http://localhost:3000/").unwrap()).unwrap();
        assert_eq!(client.join_url("/services"), "http://localhost:3000/services");
        assert_eq!(client.join_url("services"), "http://localhost:3000/services");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = ClientConfig::new("http://localhost:3000").unwrap();
        config.base_url = "not a url".to_string();
        assert!(matches!(
            ResilientClient::new(config),
            Err(ClientError::Config(_))
        ));
    }
}
