//! XRPC request and response bodies.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::facets::Facet;
use crate::constants::POST_COLLECTION;

/// An `app.bsky.feed.post` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
}

impl PostRecord {
    #[must_use]
    pub fn new(text: impl Into<String>, facets: Vec<Facet>, created_at: DateTime<Utc>) -> Self {
        Self {
            record_type: POST_COLLECTION,
            text: text.into(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            facets,
        }
    }
}

/// Body of `com.atproto.server.createSession`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Authenticated session returned by `com.atproto.server.createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
}

/// Body of `com.atproto.repo.createRecord`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'a str,
    pub record: &'a PostRecord,
}

/// Reference to a created record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishReceipt {
    pub uri: String,
    pub cid: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::bluesky::facets::{parse_facets, RegexUrlScanner};

    #[test]
    fn test_post_record_without_facets() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let record = PostRecord::new("hello", Vec::new(), created_at);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "$type": "app.bsky.feed.post",
                "text": "hello",
                "createdAt": "2024-01-02T03:04:05.000000Z"
            })
        );
    }

    #[test]
    fn test_post_record_with_facets() {
        let text = "read https://arxiv.org/abs/1";
        let record = PostRecord::new(text, parse_facets(&RegexUrlScanner, text), Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["facets"][0]["index"]["byteStart"], 5);
        assert_eq!(json["facets"][0]["features"][0]["uri"], "https://arxiv.org/abs/1");
        assert!(json["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_session_ignores_extra_fields() {
        let session: Session = serde_json::from_str(
            r#"{"accessJwt":"jwt","refreshJwt":"r","handle":"bot.bsky.social","did":"did:plc:abc"}"#,
        )
        .unwrap();
        assert_eq!(session.access_jwt, "jwt");
        assert_eq!(session.did, "did:plc:abc");
    }
}
