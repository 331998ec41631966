//! Minimal Anthropic Messages API client for quiz generation.
//!
//! One call shape: a single user message, plain-text reply. Calls are instrumented and
//! log model name, latency and response size (not contents).
//!
//! NOTE: We never log the API key. The underlying HTTP client is built on first use.

use std::time::Instant;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::Settings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum CompletionError {
  #[error("Model client error: {0}")]
  Client(#[from] reqwest::Error),

  #[error("Model API HTTP {status}: {message}")]
  Status { status: reqwest::StatusCode, message: String },

  #[error("Model response contained no text")]
  EmptyResponse,
}

/// Anything that turns a prompt into free text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
  /// Model identifier recorded on generated quizzes.
  fn model(&self) -> &str;

  async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

pub struct AnthropicClient {
  http: OnceCell<reqwest::Client>,
  api_key: String,
  base_url: String,
  model: String,
  max_tokens: u32,
  temperature: f32,
}

impl AnthropicClient {
  pub fn from_settings(settings: &Settings) -> Self {
    Self {
      http: OnceCell::new(),
      api_key: settings.anthropic_api_key.clone(),
      base_url: settings.anthropic_base_url.trim_end_matches('/').to_string(),
      model: settings.default_ai_model.clone(),
      max_tokens: settings.ai_max_tokens,
      temperature: settings.ai_temperature,
    }
  }

  /// HTTP client, created once on first use and reused afterwards.
  fn http(&self) -> Result<&reqwest::Client, CompletionError> {
    self.http.get_or_try_init(|| {
      info!(target: "quiz_generator", base_url = %self.base_url, model = %self.model, "Creating model API client");
      reqwest::Client::builder()
        .build()
        .map_err(CompletionError::from)
    })
  }

  fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
    MessagesRequest {
      model: &self.model,
      max_tokens: self.max_tokens,
      temperature: self.temperature,
      messages: vec![MessageReq { role: "user", content: prompt }],
    }
  }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
  fn model(&self) -> &str {
    &self.model
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
    let url = format!("{}/v1/messages", self.base_url);
    let start = Instant::now();

    let res = self.http()?
      .post(&url)
      .header(USER_AGENT, concat!("quiz-generator/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", ANTHROPIC_VERSION)
      .json(&self.request_body(prompt))
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), %status, "Model API call failed");
      return Err(CompletionError::Status { status, message });
    }

    let body: MessagesResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(input_tokens = ?usage.input_tokens, output_tokens = ?usage.output_tokens, "Model usage");
    }
    let text = first_text(&body).ok_or(CompletionError::EmptyResponse)?;
    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    Ok(text)
  }
}

// --- Messages DTOs ---

#[derive(Serialize)]
struct MessagesRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  temperature: f32,
  messages: Vec<MessageReq<'a>>,
}
#[derive(Serialize)]
struct MessageReq<'a> { role: &'a str, content: &'a str }

#[derive(Deserialize)]
struct MessagesResponse {
  #[serde(default)] content: Vec<ContentBlock>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")] kind: String,
  #[serde(default)] text: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] input_tokens: Option<u32>,
  #[serde(default)] output_tokens: Option<u32>,
}

/// Trimmed text of the first text block, if any.
fn first_text(body: &MessagesResponse) -> Option<String> {
  body.content.iter()
    .find(|b| b.kind == "text")
    .and_then(|b| b.text.as_deref())
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
