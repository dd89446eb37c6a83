//! One fetch, diff, publish and persist cycle.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use crate::archive::Archive;
use crate::bluesky::{
    parse_facets, PostRecord, PublishReceipt, Publisher, RegexUrlScanner, UrlScanner,
};
use crate::config::Config;
use crate::rss::{compose_post_text, no_new_papers_text, FeedClient};

/// Outcome of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries in the fetched feed.
    pub fetched: usize,
    /// Feed entries published this run.
    pub published: usize,
    pub placeholder_posted: bool,
    /// Archive size at the end of the run.
    pub archive_size: usize,
    /// Whether the archive file was rewritten.
    pub persisted: bool,
}

/// Uniformly random pause between consecutive posts.
#[derive(Debug, Clone, Copy)]
pub struct PostDelay {
    min: Duration,
    max: Duration,
}

impl PostDelay {
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Draw a delay in `[min, max]` with one-second granularity.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min.as_secs()..=self.max.as_secs());
        Duration::from_secs(secs)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        debug!(delay_secs = delay.as_secs(), "Waiting before next post");
        tokio::time::sleep(delay).await;
    }
}

/// The posting bot for one arXiv subject.
pub struct Bot<P> {
    feed: FeedClient,
    publisher: P,
    scanner: Box<dyn UrlScanner>,
    archive_path: PathBuf,
    subject: String,
    delay: PostDelay,
    no_new_posts_threshold: usize,
}

impl<P: Publisher> Bot<P> {
    #[must_use]
    pub fn new(config: &Config, feed: FeedClient, publisher: P) -> Self {
        Self {
            feed,
            publisher,
            scanner: Box::new(RegexUrlScanner),
            archive_path: config.archive_path.clone(),
            subject: config.arxiv_subject.clone(),
            delay: PostDelay::new(config.post_delay_min, config.post_delay_max),
            no_new_posts_threshold: config.no_new_posts_threshold,
        }
    }

    /// Replace the URL scanner used to build link facets.
    #[must_use]
    pub fn with_scanner(mut self, scanner: impl UrlScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Post every feed entry that is not yet archived, then save the archive.
    ///
    /// A fetch or publish error aborts the run before the archive is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be fetched, a post cannot be
    /// published or the archive cannot be written.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let mut archive = Archive::load(&self.archive_path).await;
        let fetched = self.feed.fetch().await?;
        let diff = archive.diff(&fetched);

        info!(
            subject = %self.subject,
            fetched = fetched.len(),
            new = diff.new_entries.len(),
            archived = archive.len(),
            "Fetched feed"
        );

        let mut published = 0;
        for entry in &diff.new_entries {
            let text = compose_post_text(entry);
            let receipt = self
                .publish_text(&text)
                .await
                .with_context(|| format!("Failed to publish {}", entry.link))?;
            info!(link = %entry.link, uri = %receipt.uri, "Published paper");
            published += 1;

            self.delay.wait().await;
            archive.insert(entry.clone());
        }

        let placeholder_posted =
            diff.new_entries.is_empty() && archive.len() > self.no_new_posts_threshold;
        if placeholder_posted {
            let receipt = self
                .publish_text(&no_new_papers_text(&self.subject))
                .await
                .context("Failed to publish no-new-papers post")?;
            info!(uri = %receipt.uri, "Published no-new-papers post");
        }

        if diff.should_persist {
            archive.save(&self.archive_path).await?;
        }

        Ok(RunSummary {
            fetched: fetched.len(),
            published,
            placeholder_posted,
            archive_size: archive.len(),
            persisted: diff.should_persist,
        })
    }

    async fn publish_text(&self, text: &str) -> Result<PublishReceipt> {
        let facets = parse_facets(self.scanner.as_ref(), text);
        let record = PostRecord::new(text, facets, Utc::now());
        self.publisher.publish(&record).await
    }
}
