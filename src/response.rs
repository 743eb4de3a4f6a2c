//! Normalized response types shared by the executor and the cache.

use std::time::Instant;

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// Body of a completed response, tagged by how it was parsed.
///
/// The transport branches on the response `Content-Type`: JSON bodies are
/// parsed into a value, everything else is kept as raw text. Callers
/// pattern-match instead of assuming a shape. A body that declares JSON but
/// fails to parse is demoted to `Text` rather than treated as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Parses raw body bytes according to the declared content type.
    pub fn from_parts(content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json {
            if let Ok(value) = serde_json::from_slice(body) {
                return Payload::Json(value);
            }
        }
        Payload::Text(String::from_utf8_lossy(body).into_owned())
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }

    /// Extracts the backend's `error`/`message` convention from a JSON body,
    /// for surfacing application-level HTTP errors to users.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Payload::Json(value) => value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string()),
            Payload::Text(text) if !text.is_empty() => Some(text.clone()),
            Payload::Text(_) => None,
        }
    }
}

/// A successful (2xx) API call, normalized.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: Payload,
}

impl ApiResponse {
    /// Deserializes the payload into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.data {
            Payload::Json(value) => serde_json::from_value(value.clone()),
            Payload::Text(text) => serde_json::from_str(text),
        }
    }
}

/// A response held by the cache, stamped with its insertion time.
///
/// Stored behind `Arc` so replaying a hit never copies headers or body
/// until the caller materializes an `ApiResponse`.
#[derive(Debug)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub payload: Payload,
    pub inserted_at: Instant,
}

impl CachedResponse {
    pub fn to_response(&self) -> ApiResponse {
        ApiResponse {
            status: self.status,
            headers: self.headers.clone(),
            data: self.payload.clone(),
        }
    }
}
