//! arXiv RSS feed fetching and post composition.

pub mod compose;
pub mod feed;

pub use compose::{compose_post_text, no_new_papers_text};
pub use feed::{parse_feed, FeedClient, FeedEntry};
