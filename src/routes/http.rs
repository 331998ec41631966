//! HTTP endpoint handlers. These are thin wrappers that forward to the generator.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::domain::QuizDocument;
use crate::error::ServiceError;
use crate::protocol::*;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  let service = state.settings.service_name.clone();
  let version = env!("CARGO_PKG_VERSION");
  match state.store.ping().await {
    Ok(()) => Json(HealthOut { status: "healthy", service, version, database: "connected", error: None }),
    Err(e) => {
      error!(target: "quiz_generator", error = %e, "Health check failed");
      Json(HealthOut {
        status: "unhealthy",
        service,
        version,
        database: "disconnected",
        error: Some(e.to_string()),
      })
    }
  }
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_generate_quiz(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateQuizIn>, JsonRejection>,
) -> Result<Json<GenerateQuizOut>, ServiceError> {
  let Json(req) = body.map_err(|rej| {
    warn!(target: "quiz_generator", error = %rej.body_text(), "Rejected generation request body");
    ServiceError::InputValidation(rej.body_text())
  })?;

  info!(target: "quiz_generator", book_id = %req.book_id, "Received quiz generation request");
  let out = state.generator.generate(req).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<QuizDocument>, ServiceError> {
  let doc = state.generator.get_quiz(&quiz_id).await?;
  Ok(Json(doc))
}

/// Query rules: limit in [1, 100] (default 10), offset >= 0 (default 0).
pub fn validate_list_query(q: &ListQuery) -> Result<(i64, u64), ServiceError> {
  let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
  if !(1..=MAX_LIMIT).contains(&limit) {
    return Err(ServiceError::ListQueryInvalid(format!(
      "limit must be between 1 and {MAX_LIMIT} (got {limit})"
    )));
  }
  let offset = q.offset.unwrap_or(0);
  let offset = u64::try_from(offset).map_err(|_| {
    ServiceError::ListQueryInvalid(format!("offset must be greater than or equal to 0 (got {offset})"))
  })?;
  Ok((limit, offset))
}

#[instrument(level = "info", skip(state, query))]
pub async fn http_list_quizzes(
  State(state): State<Arc<AppState>>,
  query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<QuizPage>, ServiceError> {
  let Query(q) = query.map_err(|rej| ServiceError::ListQueryInvalid(rej.body_text()))?;
  let (limit, offset) = validate_list_query(&q)?;
  let page = state.generator.list_quizzes(q.book_id.as_deref(), limit, offset).await?;
  info!(target: "quiz_generator", count = page.count, limit, offset, "Quizzes listed");
  Ok(Json(page))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<DeleteOut>, ServiceError> {
  if state.generator.delete_quiz(&quiz_id).await? {
    Ok(Json(DeleteOut { message: format!("Quiz {quiz_id} deleted successfully") }))
  } else {
    Err(ServiceError::NotFound(format!("Quiz with ID {quiz_id} not found")))
  }
}
