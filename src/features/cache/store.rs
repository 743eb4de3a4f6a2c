use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::response::CachedResponse;

/// Read-through response cache.
///
/// Backed by a TTL + capacity bounded store, so expired entries are evicted
/// by the store itself rather than only swept on writes. Reads still
/// double-check `inserted_at` against the configured TTL and invalidate
/// stale entries, so a TTL tighter than the store's is honored.
pub struct ResponseCache {
    entries: Cache<String, Arc<CachedResponse>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { entries, ttl }
    }

    /// Derives the cache key for a request.
    ///
    /// Two logically identical requests (same method, same endpoint
    /// including query string, same serialized body) must map to the same
    /// key; bodies are folded in as a SHA-256 digest so arbitrarily large
    /// payloads keep keys short and collisions negligible.
    pub fn cache_key(method: &Method, endpoint: &str, body: Option<&Bytes>) -> String {
        match body {
            Some(bytes) if !bytes.is_empty() => {
                let digest = Sha256::digest(bytes);
                format!("{}:{}:{:x}", method, endpoint, digest)
            }
            _ => format!("{}:{}", method, endpoint),
        }
    }

    /// Returns the entry for `key` if present and unexpired. Stale entries
    /// are invalidated and reported as absent.
    pub async fn lookup(&self, key: &str) -> Option<Arc<CachedResponse>> {
        let cached = self.entries.get(key).await?;

        if cached.inserted_at.elapsed() < self.ttl {
            Some(cached)
        } else {
            self.entries.invalidate(key).await;
            None
        }
    }

    pub async fn store(&self, key: String, response: Arc<CachedResponse>) {
        self.entries.insert(key, response).await;
    }

    /// Flushes the store's deferred housekeeping (eviction, expiry).
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Get current number of cached entries for monitoring
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
