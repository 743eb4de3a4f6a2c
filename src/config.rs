use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::constants::{cache as cache_constants, http as http_constants, rate_limiter as rl_constants, retry as retry_constants};
use crate::errors::ClientError;
use crate::utils::parse_duration;

/// Custom error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Base URL '{0}' is not a valid URL: {1}")]
    InvalidBaseUrl(String, String),

    #[error("Only HTTP and HTTPS base URLs are allowed, got scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid duration '{value}' for {field}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("API_URL must be set (environment or .env file)")]
    MissingBaseUrl,
}

impl From<ConfigError> for ClientError {
    fn from(error: ConfigError) -> Self {
        ClientError::Config(error.to_string())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Per-attempt timeout, e.g. "30s"
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay, e.g. "1s"; doubles per attempt
    #[serde(default = "default_base_delay")]
    pub base_delay: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub requests: u64,
    /// Fixed window width, e.g. "60s"
    #[serde(default = "default_window")]
    pub window: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Entry time-to-live, e.g. "5m"
    #[serde(default = "default_ttl")]
    pub ttl: String,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_timeout() -> String {
    format!("{}ms", http_constants::DEFAULT_TIMEOUT_MS)
}

fn default_max_retries() -> u32 {
    retry_constants::DEFAULT_MAX_RETRIES
}

fn default_base_delay() -> String {
    format!("{}ms", retry_constants::DEFAULT_BASE_DELAY_MS)
}

fn default_max_requests() -> u64 {
    rl_constants::DEFAULT_MAX_REQUESTS
}

fn default_window() -> String {
    format!("{}s", rl_constants::DEFAULT_WINDOW_SECONDS)
}

fn default_ttl() -> String {
    format!("{}s", cache_constants::TTL_SECONDS)
}

fn default_max_capacity() -> u64 {
    cache_constants::MAX_CAPACITY
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout: default_timeout() }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: default_max_requests(),
            window: default_window(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url.into(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from the environment, honoring `.env` files.
    ///
    /// `API_URL` supplies the base URL; all other settings use defaults.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("API_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        Ok(Self::new(base_url)?)
    }

    /// Validates the base URL and every duration string up front, so bad
    /// configuration fails at construction instead of on the first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(self.base_url.clone(), e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        for (field, value) in [
            ("http.timeout", &self.http.timeout),
            ("retry.base_delay", &self.retry.base_delay),
            ("rate_limit.window", &self.rate_limit.window),
            ("cache.ttl", &self.cache.ttl),
        ] {
            parse_duration(value).map_err(|_| ConfigError::InvalidDuration {
                field,
                value: value.clone(),
            })?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        parse_duration(&self.http.timeout)
            .unwrap_or_else(|_| Duration::from_millis(http_constants::DEFAULT_TIMEOUT_MS))
    }

    pub fn base_delay(&self) -> Duration {
        parse_duration(&self.retry.base_delay)
            .unwrap_or_else(|_| Duration::from_millis(retry_constants::DEFAULT_BASE_DELAY_MS))
    }

    pub fn window(&self) -> Duration {
        parse_duration(&self.rate_limit.window)
            .unwrap_or_else(|_| Duration::from_secs(rl_constants::DEFAULT_WINDOW_SECONDS))
    }

    pub fn cache_ttl(&self) -> Duration {
        parse_duration(&self.cache.ttl)
            .unwrap_or_else(|_| Duration::from_secs(cache_constants::TTL_SECONDS))
    }
}
