//! Router assembly: quiz endpoints, health probe, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `POST /generate-quiz`
/// - `GET /quizzes`, `GET /quizzes/:quiz_id`, `DELETE /quizzes/:quiz_id`
/// - `GET /health`
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate-quiz", post(http::http_generate_quiz))
        .route("/quizzes", get(http::http_list_quizzes))
        .route(
            "/quizzes/:quiz_id",
            get(http::http_get_quiz).delete(http::http_delete_quiz),
        )
        .route("/health", get(http::http_health))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
