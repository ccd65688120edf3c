use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Url};
use tracing::debug;

use crate::config::ListenBrainzConfig;
use crate::models::{ListensEnvelope, Page};

use super::trait_def::{ListenSource, SourceError, SourceResult};

/// Longest error body echoed back in a status error
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the ListenBrainz listens endpoint.
///
/// Holds only immutable state, so one instance can serve every request.
#[derive(Clone)]
pub struct ListenBrainzClient {
    client: Client,
    listens_url: Url,
    user: String,
    token: String,
}

impl ListenBrainzClient {
    pub fn from_config(config: &ListenBrainzConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("listenstats/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client for ListenBrainz")?;

        Ok(Self {
            client,
            listens_url: config.listens_url()?,
            user: config.user.clone(),
            token: config.token.clone(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

#[async_trait]
impl ListenSource for ListenBrainzClient {
    async fn fetch_page(&self, min_ts: i64, count: u32) -> SourceResult<Page> {
        debug!(url = %self.listens_url, min_ts, count, "fetching listens page");

        let response = self
            .client
            .get(self.listens_url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .query(&[("min_ts", min_ts.to_string()), ("count", count.to_string())])
            .send()
            .await
            .map_err(SourceError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SourceError::Transport)?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(SourceError::Status { status, body });
        }

        let envelope: ListensEnvelope = serde_json::from_str(&body).map_err(SourceError::Decode)?;
        Ok(envelope.payload)
    }
}
