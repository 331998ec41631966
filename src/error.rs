use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::anthropic::CompletionError;
use crate::content::ContentError;
use crate::domain::ValidationError;
use crate::extract::ExtractError;
use crate::protocol::ErrorOut;
use crate::store::StoreError;

/// Every failure a request can end with. The message is returned verbatim as `detail`.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{0}")]
  InputValidation(String),

  #[error("Content must be at least 100 characters long (got {0})")]
  ContentTooShort(usize),

  #[error(transparent)]
  ContentUnavailable(#[from] ContentError),

  #[error(transparent)]
  Extraction(#[from] ExtractError),

  #[error("Generated quiz is invalid: {0}")]
  QuizConstruction(#[from] ValidationError),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  ListQueryInvalid(String),

  #[error(transparent)]
  Completion(#[from] CompletionError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl ServiceError {
  pub fn status(&self) -> StatusCode {
    match self {
      ServiceError::InputValidation(_) | ServiceError::ContentTooShort(_) => StatusCode::BAD_REQUEST,
      ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
      ServiceError::ListQueryInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ServiceError::ContentUnavailable(_)
      | ServiceError::Extraction(_)
      | ServiceError::QuizConstruction(_)
      | ServiceError::Completion(_)
      | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { detail: self.to_string() })).into_response()
  }
}
