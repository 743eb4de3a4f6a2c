//! Feature stores composed by the client.
//!
//! - `rate_limiter` - fixed-window request counting per endpoint
//! - `cache` - read-through TTL response cache
//! - `retry` - backoff schedule for transient failures

pub mod rate_limiter;
pub mod cache;
pub mod retry;
