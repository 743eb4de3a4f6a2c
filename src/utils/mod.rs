pub mod logging;
pub mod duration;

pub use duration::parse_duration;
