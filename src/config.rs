use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Bluesky
    pub bsky_handle: String,
    pub bsky_app_password: String,
    pub pds_url: String,

    // arXiv feed
    pub arxiv_subject: String,
    pub feed_base_url: String,

    // Archive
    pub archive_path: PathBuf,

    // Posting policy
    pub post_delay_min: Duration,
    pub post_delay_max: Duration,
    pub no_new_posts_threshold: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Bluesky
            bsky_handle: required_env("BSKYBOT")?,
            bsky_app_password: required_env("BSKYPWD")?,
            pds_url: env_or_default("BSKY_PDS_URL", "https://bsky.social"),

            // arXiv feed
            arxiv_subject: env_or_default("ARXIV_SUBJECT", "stat.ME"),
            feed_base_url: env_or_default("ARXIV_FEED_BASE_URL", "https://export.arxiv.org/rss"),

            // Archive
            archive_path: PathBuf::from(env_or_default("ARCHIVE_PATH", "./data/archive.json")),

            // Posting policy
            post_delay_min: Duration::from_secs(parse_env_u64("POST_DELAY_MIN_SECS", 60)?),
            post_delay_max: Duration::from_secs(parse_env_u64("POST_DELAY_MAX_SECS", 600)?),
            no_new_posts_threshold: parse_env_usize("NO_NEW_POSTS_THRESHOLD", 10)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("BSKYBOT", &self.bsky_handle),
            ("BSKYPWD", &self.bsky_app_password),
            ("BSKY_PDS_URL", &self.pds_url),
            ("ARXIV_SUBJECT", &self.arxiv_subject),
            ("ARXIV_FEED_BASE_URL", &self.feed_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "cannot be empty".to_string(),
                });
            }
        }
        if self.post_delay_min > self.post_delay_max {
            return Err(ConfigError::InvalidValue {
                name: "POST_DELAY_MIN_SECS".to_string(),
                message: format!(
                    "must not exceed POST_DELAY_MAX_SECS ({}s > {}s)",
                    self.post_delay_min.as_secs(),
                    self.post_delay_max.as_secs()
                ),
            });
        }
        Ok(())
    }

    /// URL of the RSS feed for the configured subject.
    #[must_use]
    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}",
            self.feed_base_url.trim_end_matches('/'),
            self.arxiv_subject
        )
    }

    /// Configuration with harmless defaults and no posting delay.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bsky_handle: "paperbot.test".to_string(),
            bsky_app_password: "app-password".to_string(),
            pds_url: "http://127.0.0.1:1".to_string(),
            arxiv_subject: "stat.ME".to_string(),
            feed_base_url: "http://127.0.0.1:1/rss".to_string(),
            archive_path: PathBuf::from("./archive.json"),
            post_delay_min: Duration::ZERO,
            post_delay_max: Duration::ZERO,
            no_new_posts_threshold: 10,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bsky_handle", &self.bsky_handle)
            .field("bsky_app_password", &"<redacted>")
            .field("pds_url", &self.pds_url)
            .field("arxiv_subject", &self.arxiv_subject)
            .field("feed_base_url", &self.feed_base_url)
            .field("archive_path", &self.archive_path)
            .field("post_delay_min", &self.post_delay_min)
            .field("post_delay_max", &self.post_delay_max)
            .field("no_new_posts_threshold", &self.no_new_posts_threshold)
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
