//! Core data types for the update check

use serde::{Deserialize, Serialize};
use std::fmt;

/// A published release as seen in the releases feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    /// Release tag name (e.g., "v2.5.0")
    pub tag_name: String,
    /// Human-readable release name
    pub name: String,
    /// RFC 3339 publication date, empty when the feed has none
    pub published_at: String,
    /// Release page URL
    pub html_url: String,
}

impl Release {
    pub fn new(tag_name: String, name: String, published_at: String, html_url: String) -> Self {
        Self {
            tag_name,
            name,
            published_at,
            html_url,
        }
    }

    /// Get the version from tag_name, stripping 'v' prefix if present
    pub fn version(&self) -> String {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name).to_string()
    }
}

/// Relationship between the running version and a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionRelation {
    /// The release is newer
    Upgrade,
    Same,
    /// The release is older than what is running
    Downgrade,
}

impl fmt::Display for VersionRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRelation::Upgrade => write!(f, "upgrade"),
            VersionRelation::Same => write!(f, "same"),
            VersionRelation::Downgrade => write!(f, "downgrade"),
        }
    }
}
