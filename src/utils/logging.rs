//! Structured logging helpers built on tracing.
//!
//! Keeps log field names consistent across the client so events can be
//! filtered by `request_id`, `endpoint`, or `event` in any subscriber.

use tracing::{error, info, warn};

/// Installs a console subscriber with env-filter support.
///
/// Intended for binaries and tests; the library itself never installs a
/// global subscriber. Safe to call more than once (later calls are no-ops).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Logs a rate limiter decision for an endpoint.
pub fn log_rate_limit_event(endpoint: &str, request_id: &str, limited: bool, max_requests: u64) {
    if limited {
        warn!(
            event = "rate_limit",
            endpoint = %endpoint,
            request_id = %request_id,
            max_requests,
            "Rate limit exceeded, rejecting request"
        );
    } else {
        tracing::debug!(
            event = "rate_limit",
            endpoint = %endpoint,
            request_id = %request_id,
            max_requests,
            "Request within rate limit"
        );
    }
}

/// Logs a cache lookup outcome ("hit", "stale", "miss") or write ("store").
pub fn log_cache_event(endpoint: &str, request_id: &str, outcome: &str) {
    info!(
        event = "cache",
        endpoint = %endpoint,
        request_id = %request_id,
        outcome = %outcome,
        "Cache {}", outcome
    );
}

/// Logs a retry attempt and the delay before it.
pub fn log_retry_attempt(endpoint: &str, request_id: &str, attempt: u32, delay_ms: u64, reason: &str) {
    warn!(
        event = "retry",
        endpoint = %endpoint,
        request_id = %request_id,
        attempt,
        delay_ms,
        reason = %reason,
        "Transient failure, scheduling retry"
    );
}

/// Logs the terminal outcome of one logical call.
pub fn log_request_outcome(endpoint: &str, request_id: &str, status: u16, success: bool, attempts: u32) {
    if success {
        info!(
            event = "request",
            endpoint = %endpoint,
            request_id = %request_id,
            status,
            attempts,
            "Request completed"
        );
    } else {
        warn!(
            event = "request",
            endpoint = %endpoint,
            request_id = %request_id,
            status,
            attempts,
            "Request failed"
        );
    }
}

/// Logs a numeric gauge or counter for monitoring.
pub fn log_performance_metric(name: &str, value: f64, unit: &str, context: &str) {
    info!(
        event = "metric",
        metric = %name,
        value,
        unit = %unit,
        context = %context,
        "Performance metric"
    );
}

/// Logs an unexpected error with its context.
pub fn log_error(err: &dyn std::error::Error, context: &str, kind: &str) {
    error!(
        event = "error",
        context = %context,
        kind = %kind,
        "{}", err
    );
}
