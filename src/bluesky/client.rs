use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::models::{
    CreateRecordRequest, CreateSessionRequest, PostRecord, PublishReceipt, Session,
};
use crate::config::Config;
use crate::constants::{POST_COLLECTION, USER_AGENT};

/// Something that can publish a post record.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `record` and return a reference to the created record.
    async fn publish(&self, record: &PostRecord) -> Result<PublishReceipt>;
}

/// XRPC client for a Bluesky PDS.
///
/// Every publish logs in again; sessions are not reused.
pub struct BlueskyClient {
    client: reqwest::Client,
    pds_url: String,
    identifier: String,
    password: String,
}

impl BlueskyClient {
    /// Create a client using the PDS and credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            pds_url: config.pds_url.trim_end_matches('/').to_string(),
            identifier: config.bsky_handle.clone(),
            password: config.bsky_app_password.clone(),
        })
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{method}", self.pds_url)
    }

    /// Log in with the configured handle and app password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the PDS rejects the credentials.
    pub async fn create_session(&self) -> Result<Session> {
        let session: Session = self
            .client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &self.identifier,
                password: &self.password,
            })
            .send()
            .await
            .context("Failed to create Bluesky session")?
            .error_for_status()
            .context("Session creation returned error")?
            .json()
            .await
            .context("Failed to parse session response")?;

        debug!(did = %session.did, "Created Bluesky session");
        Ok(session)
    }

    /// Create a post record in the session's repository.
    ///
    /// The response body is logged before the status is checked.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the PDS does not accept the record.
    pub async fn create_record(
        &self,
        session: &Session,
        record: &PostRecord,
    ) -> Result<PublishReceipt> {
        let response = self
            .client
            .post(self.xrpc_url("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&CreateRecordRequest {
                repo: &session.did,
                collection: POST_COLLECTION,
                record,
            })
            .send()
            .await
            .context("Failed to submit post to Bluesky")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read createRecord response")?;
        info!(status = status.as_u16(), body = %body, "createRecord response");

        if !status.is_success() {
            anyhow::bail!("createRecord failed with status {status}: {body}");
        }

        serde_json::from_str(&body).context("Failed to parse createRecord response")
    }
}

#[async_trait]
impl Publisher for BlueskyClient {
    async fn publish(&self, record: &PostRecord) -> Result<PublishReceipt> {
        let session = self.create_session().await?;
        self.create_record(&session, record).await
    }
}
