//! Release tag matching and semantic version comparison

use crate::updater::types::VersionRelation;
use crate::{AppError, Result};
use regex::Regex;
use semver::Version as SemVer;
use std::str::FromStr;

/// Tags that count as releases: plain `MAJOR.MINOR.PATCH`, optionally `v`-prefixed
pub const RELEASE_TAG_PATTERN: &str = r"^v?(\d+\.\d+\.\d+)$";

/// Version manager for tag matching and comparisons
pub struct VersionManager {
    tag_pattern: Regex,
}

impl VersionManager {
    pub fn new() -> Result<Self> {
        let tag_pattern = Regex::new(RELEASE_TAG_PATTERN)
            .map_err(|e| AppError::internal(format!("Invalid release tag pattern: {}", e)))?;
        Ok(Self { tag_pattern })
    }

    /// Version part of a release tag, `None` when the tag does not follow the rule
    pub fn extract_version<'a>(&self, tag: &'a str) -> Option<&'a str> {
        self.tag_pattern
            .captures(tag.trim())
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// Parse a version string, accepting an optional `v` prefix
    pub fn parse_version(&self, version: &str) -> Result<SemVer> {
        let normalized = version.trim();
        let normalized = normalized.strip_prefix('v').unwrap_or(normalized);
        SemVer::from_str(normalized)
            .map_err(|e| AppError::parse(format!("Invalid semantic version '{}': {}", version, e)))
    }

    /// How `target` relates to `current`
    pub fn compare_versions(&self, current: &str, target: &str) -> Result<VersionRelation> {
        let current = self.parse_version(current)?;
        let target = self.parse_version(target)?;

        Ok(match current.cmp(&target) {
            std::cmp::Ordering::Less => VersionRelation::Upgrade,
            std::cmp::Ordering::Equal => VersionRelation::Same,
            std::cmp::Ordering::Greater => VersionRelation::Downgrade,
        })
    }
}
