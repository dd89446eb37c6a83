//! URL detection and `app.bsky.richtext.facet` construction.
//!
//! Facet offsets are UTF-8 byte offsets into the post text. Matching runs on
//! the raw bytes with ASCII-only classes, so any non-ASCII byte counts as a
//! boundary next to a URL.

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

/// Naive URL pattern with common trailing punctuation excluded.
///
/// Group 1 is the URL; the boundary character in front of it is consumed but
/// is not part of the span.
static URL_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"(?-u)(?:^|[$|\W])(https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*[-a-zA-Z0-9@%_+~#/=])?)",
    )
    .expect("URL pattern is valid")
});

/// A URL located in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSpan {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub url: String,
}

/// Finds URLs in post text.
pub trait UrlScanner: Send + Sync {
    /// Spans ordered by `start`, never overlapping.
    fn scan(&self, text: &str) -> Vec<UrlSpan>;
}

/// Regex-based scanner for `http` and `https` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexUrlScanner;

impl UrlScanner for RegexUrlScanner {
    fn scan(&self, text: &str) -> Vec<UrlSpan> {
        URL_PATTERN
            .captures_iter(text.as_bytes())
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| {
                let url = std::str::from_utf8(m.as_bytes()).ok()?;
                Some(UrlSpan {
                    start: m.start(),
                    end: m.end(),
                    url: url.to_string(),
                })
            })
            .collect()
    }
}

/// A rich-text annotation on a byte range of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    // The lexicon field is `uri`, not `url`.
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
}

impl Facet {
    #[must_use]
    pub fn link(span: &UrlSpan) -> Self {
        Self {
            index: ByteSlice {
                byte_start: span.start,
                byte_end: span.end,
            },
            features: vec![FacetFeature::Link {
                uri: span.url.clone(),
            }],
        }
    }
}

/// Build one link facet per URL found in `text`, in text order.
#[must_use]
pub fn parse_facets(scanner: &dyn UrlScanner, text: &str) -> Vec<Facet> {
    scanner.scan(text).iter().map(Facet::link).collect()
}
