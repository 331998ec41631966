//! Fetching source content from the content-processor service when a request
//! carries no text of its own.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ContentError {
  #[error("Content processor URL is not configured")]
  NotConfigured,

  #[error("Failed to retrieve document content: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Document {0} has no content")]
  Empty(String),
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
  async fn fetch(&self, book_id: &str) -> Result<String, ContentError>;
}

#[derive(Deserialize)]
struct DocumentOut {
  #[serde(default)]
  content: Option<String>,
}

/// GET `{base_url}{book_id}` and read the `content` field of the JSON reply.
pub struct HttpContentFetcher {
  client: reqwest::Client,
  base_url: Option<String>,
}

impl HttpContentFetcher {
  pub fn new(base_url: Option<String>) -> Result<Self, ContentError> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    Ok(Self { client, base_url })
  }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
  #[instrument(level = "info", skip(self))]
  async fn fetch(&self, book_id: &str) -> Result<String, ContentError> {
    let base = self.base_url.as_deref().ok_or(ContentError::NotConfigured)?;
    let url = format!("{base}{book_id}");

    let res = self.client.get(&url).send().await
      .and_then(|r| r.error_for_status())
      .map_err(|e| {
        error!(%book_id, error = %e, "Failed to fetch document from content processor");
        ContentError::from(e)
      })?;

    let doc: DocumentOut = res.json().await?;
    match doc.content.filter(|c| !c.is_empty()) {
      Some(content) => {
        info!(%book_id, content_len = content.len(), "Fetched document content");
        Ok(content)
      }
      None => Err(ContentError::Empty(book_id.to_string())),
    }
  }
}
