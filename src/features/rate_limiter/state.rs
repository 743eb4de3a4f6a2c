use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::constants::rate_limiter as rl_constants;

#[async_trait]
pub trait RateLimitState: Send + Sync {
    /// Counts one call against `key`'s current fixed window. Returns false
    /// when the window is already at `max_requests`; the rejected call is
    /// not queued or delayed.
    async fn check_and_update(&self, key: &str, max_requests: u64, window: Duration) -> bool;
    /// Manual cleanup method to remove idle window entries
    fn cleanup_expired_windows(&self);
    /// Get current number of tracked endpoints for monitoring
    fn active_windows_count(&self) -> usize;
}

struct Window {
    index: u64,
    count: u64,
    width: Duration,
    last_access: Instant, // Track when entry was last accessed
}

pub struct InMemoryRateLimitState {
    endpoints: DashMap<String, Arc<RwLock<Window>>>,
    epoch: Instant, // window indices are measured from construction time
    idle_windows: u32,
}

impl Default for InMemoryRateLimitState {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRateLimitState {
    pub fn new() -> Self {
        Self::with_idle_windows(rl_constants::IDLE_TTL_WINDOWS)
    }

    pub fn with_idle_windows(idle_windows: u32) -> Self {
        Self {
            endpoints: DashMap::new(),
            epoch: Instant::now(),
            idle_windows: idle_windows.max(1),
        }
    }

    fn window_index(&self, now: Instant, width: Duration) -> u64 {
        let elapsed = now.duration_since(self.epoch).as_millis() as u64;
        let width_ms = width.as_millis().max(1) as u64;
        elapsed / width_ms
    }

    /// Drop entries whose last access is more than `idle_windows` window
    /// widths in the past. Counters reset on access anyway, so this only
    /// bounds memory for endpoints that stopped being called.
    fn perform_cleanup(&self) {
        let now = Instant::now();

        let keys_to_remove: Vec<String> = self.endpoints
            .iter()
            .filter_map(|entry| {
                if let Ok(window) = entry.value().try_read() {
                    let idle_cutoff = window.width * self.idle_windows;
                    if now.duration_since(window.last_access) > idle_cutoff {
                        Some(entry.key().clone())
                    } else {
                        None
                    }
                } else {
                    // Entry is locked by an in-flight check, keep it
                    None
                }
            })
            .collect();

        let removed_count = keys_to_remove.len();
        for key in &keys_to_remove {
            self.endpoints.remove(key);
        }

        if removed_count > 0 {
            tracing::debug!("Cleaned up {} idle rate limit windows", removed_count);
        }
    }
}

#[async_trait]
impl RateLimitState for InMemoryRateLimitState {

    async fn check_and_update(&self, key: &str, max_requests: u64, window: Duration) -> bool {
        // Opportunistic purge of idle entries, mirroring the periodic task
        self.perform_cleanup();

        let now = Instant::now();
        let current_index = self.window_index(now, window);

        let entry = self.endpoints
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(RwLock::new(Window {
                    index: current_index,
                    count: 0,
                    width: window,
                    last_access: now,
                }))
            })
            .clone();

        let mut state = entry.write().await;

        // Counts from a previous window are discarded, never carried over
        if state.index != current_index {
            state.index = current_index;
            state.count = 0;
        }
        state.width = window;
        state.last_access = now;

        if state.count < max_requests {
            state.count += 1;
            true // Allowed
        } else {
            false // Denied
        }
    }

    fn cleanup_expired_windows(&self) {
        self.perform_cleanup()
    }

    fn active_windows_count(&self) -> usize {
        self.endpoints.len()
    }
}
