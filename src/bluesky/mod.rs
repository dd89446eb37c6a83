//! Bluesky publishing over AT Protocol XRPC.

pub mod client;
pub mod facets;
pub mod models;

pub use client::{BlueskyClient, Publisher};
pub use facets::{parse_facets, Facet, RegexUrlScanner, UrlScanner, UrlSpan};
pub use models::{PostRecord, PublishReceipt, Session};
