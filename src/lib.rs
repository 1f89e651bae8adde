//! tcping
//!
//! Continuously probes a TCP endpoint by opening (and immediately closing)
//! connections at a fixed rate, and keeps availability statistics: success
//! and failure streaks, uptime and downtime totals, the longest sessions in
//! each direction and round-trip time extremes.

pub mod app;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;
pub mod updater;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{ProbeExecutor, RunOutcome};
pub use models::{Config, ProbeOutcome, ProbeTarget, StatisticsReport};
pub use output::{Reporter, ReporterFactory};
pub use stats::RunningStats;

use serde::Serialize;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata printed by `-v`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub build_time: String,
    pub git_commit: String,
    pub target: String,
}

/// Version and build metadata of the running binary
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: VERSION.to_string(),
        build_time: env!("BUILD_TIME").to_string(),
        git_commit: env!("GIT_COMMIT").to_string(),
        target: env!("TARGET_TRIPLE").to_string(),
    }
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Period of one probe cycle, also the connect timeout
    pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const REPOSITORY_OWNER: &str = "pouriyajamshidi";
    pub const REPOSITORY_NAME: &str = "tcping";
    pub const REPOSITORY_URL: &str = "https://github.com/pouriyajamshidi/tcping";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.version, VERSION);
        assert!(!info.git_commit.is_empty());
        assert!(!info.target.is_empty());
    }

    #[test]
    fn test_repository_url_matches_parts() {
        assert_eq!(
            defaults::REPOSITORY_URL,
            format!("https://github.com/{}/{}", defaults::REPOSITORY_OWNER, defaults::REPOSITORY_NAME)
        );
    }
}
