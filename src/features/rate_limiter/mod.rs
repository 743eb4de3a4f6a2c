pub mod state;

pub use state::{InMemoryRateLimitState, RateLimitState};
