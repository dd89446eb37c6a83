use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::constants::USER_AGENT;

/// A single paper from the feed.
///
/// `id` is the trimmed item link and is the key used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
}

/// Client for an arXiv subject RSS feed.
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Create a client for the subject feed named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config.feed_url()))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the feed and return its entries in feed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be fetched or parsed, or if an item
    /// lacks a link, title or description.
    pub async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        debug!(url = %self.url, "Fetching RSS feed");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch RSS feed")?;

        if !response.status().is_success() {
            anyhow::bail!("RSS fetch failed with status {}", response.status());
        }

        let body = response.bytes().await.context("Failed to read RSS body")?;
        let entries = parse_feed(&body)?;

        debug!(url = %self.url, entries = entries.len(), "Parsed RSS feed");
        Ok(entries)
    }
}

/// Parse an RSS/Atom document into feed entries.
///
/// Items sharing a link with an earlier item are dropped.
///
/// # Errors
///
/// Returns an error if the document is not a feed or an item is missing a
/// required field.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body).context("Failed to parse RSS feed")?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(feed.entries.len());

    for entry in feed.entries {
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .with_context(|| format!("Feed item {} has no link", entry.id))?;
        let title = entry
            .title
            .map(|t| t.content)
            .with_context(|| format!("Feed item {link} has no title"))?;
        let description = entry
            .summary
            .map(|s| s.content)
            .with_context(|| format!("Feed item {link} has no description"))?;

        if !seen.insert(link.clone()) {
            debug!(link = %link, "Skipping duplicate feed item");
            continue;
        }

        entries.push(FeedEntry {
            id: link.clone(),
            title,
            link,
            description,
        });
    }

    Ok(entries)
}
