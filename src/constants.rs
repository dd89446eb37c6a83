//! Shared constants used across the application.

/// User agent sent with feed and XRPC requests.
pub const USER_AGENT: &str = concat!("arxiv-skeeter/", env!("CARGO_PKG_VERSION"));

/// Maximum number of characters of composed content before [`POST_SUFFIX`].
pub const MAX_CONTENT_CHARS: usize = 293;

/// Appended to every post, whether or not the content was truncated.
pub const POST_SUFFIX: &str = "...📈🤖";

/// Marker in arXiv item descriptions that precedes the abstract.
pub const ABSTRACT_MARKER: &str = "Abstract:";

/// Record collection for Bluesky posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";
