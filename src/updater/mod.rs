//! Update check against the project's published releases
//!
//! ```rust,ignore
//! let checker = UpdateChecker::new(logger)?;
//! for line in checker.check().await?.messages() {
//!     reporter.print_info(&line);
//! }
//! ```

pub mod feeds;
pub mod types;
pub mod version;

pub use feeds::FeedsClient;
pub use types::{Release, VersionRelation};
pub use version::VersionManager;

use crate::logging::Logger;
use crate::{AppError, Result};

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateResult {
    /// A release newer than the running binary exists
    UpdateAvailable {
        current: String,
        latest_version: String,
        release: Release,
    },
    /// The running binary is the newest release (or newer)
    AlreadyUpToDate { current: String },
}

impl UpdateResult {
    /// Lines to show the user
    pub fn messages(&self) -> Vec<String> {
        match self {
            UpdateResult::UpdateAvailable {
                latest_version,
                release,
                ..
            } => vec![
                format!("Found newer version {}", latest_version),
                "Please update TCPING from the URL below:".to_string(),
                release.html_url.clone(),
            ],
            UpdateResult::AlreadyUpToDate { current } => {
                vec![format!("Newer version not found. {} is the latest version.", current)]
            }
        }
    }
}

/// Compares the running version with the newest published release
pub struct UpdateChecker {
    feeds: FeedsClient,
    versions: VersionManager,
    current_version: String,
}

impl UpdateChecker {
    /// Checker for the official repository and the running version
    pub fn new(logger: Logger) -> Result<Self> {
        let feeds = FeedsClient::new(crate::defaults::REPOSITORY_URL.to_string(), logger)?;
        Self::with_client(feeds, crate::VERSION)
    }

    pub fn with_client(feeds: FeedsClient, current_version: &str) -> Result<Self> {
        Ok(Self {
            feeds,
            versions: VersionManager::new()?,
            current_version: current_version.to_string(),
        })
    }

    /// Fetch releases and decide whether a newer one exists.
    ///
    /// Every failure is reported as "Failed to check for updates ...".
    pub async fn check(&self) -> Result<UpdateResult> {
        let releases = self
            .feeds
            .fetch_releases()
            .await
            .map_err(|e| AppError::update(format!("Failed to check for updates {}", e)))?;

        let newest = releases
            .iter()
            .filter_map(|release| {
                let version = self.versions.extract_version(&release.tag_name)?;
                let parsed = self.versions.parse_version(version).ok()?;
                Some((parsed, version.to_string(), release))
            })
            .max_by(|a, b| a.0.cmp(&b.0));

        let Some((_, latest_version, release)) = newest else {
            return Err(match releases.first() {
                Some(release) => AppError::update(format!(
                    "Failed to check for updates. The version name does not match the rule: {}",
                    release.tag_name
                )),
                None => AppError::update("Failed to check for updates. No releases were published"),
            });
        };

        let relation = self
            .versions
            .compare_versions(&self.current_version, &latest_version)
            .map_err(|e| AppError::update(format!("Failed to check for updates {}", e)))?;

        Ok(match relation {
            VersionRelation::Upgrade => UpdateResult::UpdateAvailable {
                current: self.current_version.clone(),
                latest_version,
                release: release.clone(),
            },
            VersionRelation::Same | VersionRelation::Downgrade => UpdateResult::AlreadyUpToDate {
                current: self.current_version.clone(),
            },
        })
    }
}
