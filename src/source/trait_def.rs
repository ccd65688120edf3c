use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::Page;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to listening history service failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("listening history service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode listening history response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SourceError {
    /// Whether another attempt at the same page could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport(_) => true,
            SourceError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            SourceError::Decode(_) => false,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait ListenSource: Send + Sync {
    /// Fetch up to `count` listens newer than `min_ts`
    async fn fetch_page(&self, min_ts: i64, count: u32) -> SourceResult<Page>;
}
