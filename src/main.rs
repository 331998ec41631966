//! Quiz Generator · learning-platform microservice
//!
//! - Axum HTTP API: generate quizzes from content, read/list/delete stored quizzes
//! - Quiz questions generated by the Anthropic Messages API
//! - Quizzes persisted in MongoDB (or in memory with QUIZ_STORE=memory)
//!
//! Important env variables (see `config` for the full list):
//!   SERVICE_PORT              : u16 (default 8002)
//!   MONGODB_URL               : MongoDB connection string
//!   ANTHROPIC_API_KEY         : model API key
//!   DEFAULT_AI_MODEL          : default "claude-3-5-haiku-20241022"
//!   CONTENT_PROCESSOR_API_URL : prefix for fetching content by book_id
//!   LOG_LEVEL                 : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                : "pretty" (default) or "json"

mod anthropic;
mod config;
mod content;
mod domain;
mod error;
mod extract;
mod generator;
mod protocol;
mod routes;
mod state;
mod store;
mod telemetry;
mod util;

#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Settings;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  // A missing .env file is fine; real environment variables still apply.
  let _ = dotenvy::dotenv();
  let development = std::env::var("ENVIRONMENT")
    .map(|e| e.eq_ignore_ascii_case("development"))
    .unwrap_or(true);
  telemetry::init_tracing(development);
  let settings = Settings::from_env();
  info!(target: "quiz_generator", service = %settings.service_name, "Starting service");

  // Connect the store and build the generator once; handlers share it.
  let state = Arc::new(AppState::from_settings(settings).await?);
  let app = build_router(state.clone());

  let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.service_port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_generator", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!(target: "quiz_generator", service = %state.settings.service_name, "Shutting down service");
  state.store.disconnect().await;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "quiz_generator", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
