//! arXiv-to-Bluesky posting bot.
//!
//! Fetches an arXiv subject RSS feed, skips papers already recorded in a JSON
//! archive, and posts the rest to Bluesky with link facets.

pub mod archive;
pub mod bluesky;
pub mod bot;
pub mod config;
pub mod constants;
pub mod rss;
