//! Releases Atom feed client
//!
//! The public `releases.atom` feed needs no API token and has no rate
//! limit, which makes it the only data source the update check uses.

use crate::logging::Logger;
use crate::updater::types::Release;
use crate::{AppError, Result};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default timeout for feed requests
const FEED_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Atom feed client for one repository
pub struct FeedsClient {
    client: Client,
    /// Repository page URL, e.g. `https://github.com/owner/repo`
    repo_url: String,
    logger: Logger,
}

impl FeedsClient {
    pub fn new(repo_url: String, logger: Logger) -> Result<Self> {
        Self::with_timeout(repo_url, FEED_REQUEST_TIMEOUT, logger)
    }

    pub fn with_timeout(repo_url: String, timeout: Duration, logger: Logger) -> Result<Self> {
        let parsed = Url::parse(&repo_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::update(format!("Unsupported repository URL: {}", repo_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{} ({})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::defaults::REPOSITORY_URL
            ))
            .build()
            .map_err(|e| AppError::update(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            repo_url: repo_url.trim_end_matches('/').to_string(),
            logger,
        })
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Fetch and parse releases, newest first as published in the feed
    pub async fn fetch_releases(&self) -> Result<Vec<Release>> {
        let feed_url = self.feed_url();
        self.logger.debug("Fetching releases feed").field("url", &feed_url).log();

        let response = self
            .client
            .get(&feed_url)
            .send()
            .await
            .map_err(|e| AppError::update(format!("Failed to fetch '{}': {}", feed_url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::update(format!(
                "HTTP {} from '{}'",
                response.status(),
                feed_url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::update(format!("Failed to read feed content: {}", e)))?;

        let feed = parser::parse(body.as_ref())
            .map_err(|e| AppError::update(format!("Failed to parse feed: {}", e)))?;

        let releases: Vec<Release> = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.convert_entry(entry))
            .collect();

        self.logger
            .debug("Parsed releases feed")
            .field("releases", releases.len())
            .field("bytes", body.len())
            .log();
        Ok(releases)
    }

    fn feed_url(&self) -> String {
        format!("{}/releases.atom", self.repo_url)
    }

    fn convert_entry(&self, entry: feed_rs::model::Entry) -> Option<Release> {
        let tag_name = extract_tag_name(&entry)?;

        let name = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_else(|| tag_name.clone());

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        let html_url = entry
            .links
            .iter()
            .find(|link| link.href.contains("/releases/tag/"))
            .map(|link| link.href.clone())
            .unwrap_or_else(|| format!("{}/releases/tag/{}", self.repo_url, tag_name));

        Some(Release::new(tag_name, name, published_at, html_url))
    }
}

/// The tag is the last path segment of the entry id
/// (`tag:github.com,2008:Repository/123/v1.2.3`) or of its release link.
fn extract_tag_name(entry: &feed_rs::model::Entry) -> Option<String> {
    let from_id = entry.id.rsplit('/').next().filter(|tag| !tag.is_empty());
    let from_link = || {
        entry
            .links
            .iter()
            .find_map(|link| link.href.split("/releases/tag/").nth(1))
            .filter(|tag| !tag.is_empty())
    };

    from_id.or_else(from_link).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>tag:github.com,2008:https://github.com/owner/repo/releases</id>
  <title>Release notes from repo</title>
  <updated>2024-05-01T10:00:00Z</updated>
  <entry>
    <id>tag:github.com,2008:Repository/1/v2.6.0</id>
    <updated>2024-05-01T10:00:00Z</updated>
    <link rel="alternate" type="text/html" href="https://github.com/owner/repo/releases/tag/v2.6.0"/>
    <title>v2.6.0</title>
  </entry>
  <entry>
    <id>tag:github.com,2008:Repository/1/v2.5.0</id>
    <updated>2024-04-01T10:00:00Z</updated>
    <link rel="alternate" type="text/html" href="https://github.com/owner/repo/releases/tag/v2.5.0"/>
    <title>Second release</title>
  </entry>
</feed>"#;

    fn client() -> FeedsClient {
        FeedsClient::new(
            "https://github.com/owner/repo/".to_string(),
            Logger::with_writer("updater", Box::new(std::io::sink())),
        )
        .unwrap()
    }

    #[test]
    fn test_feed_url_construction() {
        let client = client();
        assert_eq!(client.repo_url(), "https://github.com/owner/repo");
        assert_eq!(client.feed_url(), "https://github.com/owner/repo/releases.atom");
    }

    #[test]
    fn test_rejects_invalid_repository_url() {
        let logger = || Logger::with_writer("updater", Box::new(std::io::sink()));
        assert!(FeedsClient::new("github.com/owner/repo".to_string(), logger()).is_err());
        assert!(FeedsClient::new("ftp://example.com/owner/repo".to_string(), logger()).is_err());
    }

    #[test]
    fn test_entries_convert_to_releases() {
        let client = client();
        let feed = parser::parse(FEED.as_bytes()).unwrap();
        let releases: Vec<Release> = feed
            .entries
            .into_iter()
            .filter_map(|entry| client.convert_entry(entry))
            .collect();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag_name, "v2.6.0");
        assert_eq!(releases[0].html_url, "https://github.com/owner/repo/releases/tag/v2.6.0");
        assert_eq!(releases[1].name, "Second release");
        assert!(releases[1].published_at.starts_with("2024-04-01"));
    }
}
