//! # Rust API Client
//!
//! A resilient HTTP API client built on reqwest, featuring:
//! - Fixed-window rate limiting per endpoint
//! - Read-through response caching with configurable TTL
//! - Timeout-bounded attempts with exponential-backoff retry
//! - Uniform success/error results for every failure mode
//! - Structured tracing of every call
//!
//! Construct one [`ResilientClient`] per application and share it:
//!
//! ```no_run
//! use fetchway::{ClientConfig, RequestOptions, ResilientClient};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://api.example.com")?;
//! let client = std::sync::Arc::new(ResilientClient::new(config)?);
//! client.start_maintenance();
//!
//! let services = client
//!     .execute("/services", RequestOptions::get().with_cache())
//!     .await?;
//! println!("{:?}", services.data);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod client;
pub mod options;
pub mod response;
pub mod features;
pub mod utils;
pub mod constants;

pub use client::{ClientStats, ResilientClient};
pub use config::ClientConfig;
pub use errors::ClientError;
pub use options::{RequestBody, RequestOptions};
pub use response::{ApiResponse, Payload};
