//! Data models and structures for tcping

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{Config, ProbeTarget};
pub use metrics::{LongestTime, ProbeOutcome, RttResults, StatisticsReport};
