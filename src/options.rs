//! Per-call request options.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};

/// Outgoing request body, tagged like [`crate::response::Payload`].
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
}

impl RequestBody {
    /// Serialized bytes handed to the transport and folded into cache keys.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            // serde_json::Value maps are ordered, so serialization is
            // deterministic and identical bodies produce identical keys
            RequestBody::Json(value) => Bytes::from(serde_json::to_vec(value).unwrap_or_default()),
            RequestBody::Text(text) => Bytes::from(text.clone().into_bytes()),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain",
        }
    }
}

/// Options for one logical call through the client.
///
/// Everything has a default: GET, no body, no caching, rate limiting on,
/// and the client-level retry/timeout settings. Per-call overrides are
/// opt-in via the builder methods.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    /// Override for the client-level retry count.
    pub retries: Option<u32>,
    /// Override for the client-level base backoff delay.
    pub retry_delay: Option<Duration>,
    /// Override for the client-level per-attempt timeout.
    pub timeout: Option<Duration>,
    /// Opt into the read-through response cache. Only honored for GET.
    pub cache: bool,
    /// Bypass the rate limiter for this call.
    pub skip_rate_limit: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            retries: None,
            retry_delay: None,
            timeout: None,
            cache: false,
            skip_rate_limit: false,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn patch(body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_cache(mut self) -> Self {
        self.cache = true;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.skip_rate_limit = true;
        self
    }

    pub fn with_header(mut self, name: http::header::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Mutating calls must never be served from cache or written to it,
    /// even when the cache flag is set.
    pub fn is_cacheable_shape(&self) -> bool {
        self.method == Method::GET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_flag_does_not_make_post_cacheable() {
        let options = RequestOptions::post(json!({"a": 1})).with_cache();
        assert!(options.cache);
        assert!(!options.is_cacheable_shape());
    }

    #[test]
    fn json_body_serialization_is_deterministic() {
        let a = RequestBody::Json(json!({"b": 2, "a": 1})).to_bytes();
        let b = RequestBody::Json(json!({"a": 1, "b": 2})).to_bytes();
        assert_eq!(a, b);
    }
}
