use std::time::Duration;

use crate::constants::retry as retry_constants;

/// Backoff schedule for transient failures.
///
/// `max_retries` counts retries after the first attempt, so a call makes at
/// most `max_retries + 1` transport invocations. Delays double per attempt:
/// base, 2x base, 4x base, ... The exponent is capped so a caller-supplied
/// retry count cannot overflow the multiplication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry_constants::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(retry_constants::DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Delay before the retry following failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(retry_constants::MAX_BACKOFF_EXPONENT);
        self.base_delay * 2u32.pow(exponent)
    }

    /// True while failed attempt `attempt` (0-based) still has retries left.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
