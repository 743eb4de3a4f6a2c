// Application-wide constants

/// Retry configuration
pub mod retry {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1000; // doubles per attempt
    pub const MAX_BACKOFF_EXPONENT: u32 = 10;
}

/// Rate limiter configuration
pub mod rate_limiter {
    pub const DEFAULT_MAX_REQUESTS: u64 = 10;
    pub const DEFAULT_WINDOW_SECONDS: u64 = 60; // 1 minute
    pub const IDLE_TTL_WINDOWS: u32 = 1; // purge entries idle for more than one window
}

/// Cache configuration
pub mod cache {
    pub const MAX_CAPACITY: u64 = 10_000;
    pub const TTL_SECONDS: u64 = 300; // 5 minutes
}

/// HTTP configuration
pub mod http {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000; // 30 seconds per attempt
}

/// Monitoring configuration
pub mod monitoring {
    pub const MAINTENANCE_INTERVAL_SECONDS: u64 = 60; // 1 minute
}

/// Time conversion helpers
pub mod time {
    pub const SECONDS_PER_MINUTE: u64 = 60;
    pub const SECONDS_PER_HOUR: u64 = 3600;
}
