use http::StatusCode;
use std::fmt;

/// Failure modes of a resilient API call.
///
/// Every expected failure is returned as one of these variants rather than
/// propagated as a panic, so callers branch on the result instead of
/// unwinding. `status_code()` gives the HTTP-like status callers key UI
/// behavior on: 429 for local rate limiting, 408 for exhausted timeouts,
/// 0 for network-level failures, and the actual status for HTTP errors.
#[derive(Debug)]
pub enum ClientError {
    RateLimited,
    Timeout,
    Network(String),

    // Application-level HTTP errors (a response was received)
    Http { status: StatusCode, message: String },

    // Configuration / request construction errors
    Config(String),
    RequestBuild(String),
}

impl ClientError {
    /// Numeric status for the uniform result shape. Network-level failures
    /// have no HTTP status and report 0.
    pub fn status_code(&self) -> u16 {
        match self {
            ClientError::RateLimited => StatusCode::TOO_MANY_REQUESTS.as_u16(),
            ClientError::Timeout => StatusCode::REQUEST_TIMEOUT.as_u16(),
            ClientError::Network(_) => 0,
            ClientError::Http { status, .. } => status.as_u16(),
            ClientError::Config(_) | ClientError::RequestBuild(_) => 0,
        }
    }

    /// True for failures worth retrying: transient transport problems.
    /// Rate limiting and HTTP errors are terminal, retrying them cannot
    /// change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Network(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::RateLimited => {
                write!(f, "Rate limit exceeded. Please try again later.")
            }
            ClientError::Timeout => write!(f, "Request timeout. Please try again."),
            ClientError::Network(reason) => {
                write!(f, "Network error. Please check your connection. ({})", reason)
            }
            ClientError::Http { status, message } => {
                write!(f, "HTTP {}: {}", status.as_u16(), message)
            }
            ClientError::Config(reason) => write!(f, "Invalid client configuration: {}", reason),
            ClientError::RequestBuild(reason) => write!(f, "Failed to build request: {}", reason),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ClientError::Timeout
        } else if error.is_builder() {
            ClientError::RequestBuild(error.to_string())
        } else {
            ClientError::Network(error.to_string())
        }
    }
}
