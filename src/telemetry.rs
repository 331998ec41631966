//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL overrides the filter (e.g. "debug" or directives like
//!   "info,quiz_generator=debug,tower_http=info").
//! - Without LOG_LEVEL the service logs at debug in development and info elsewhere;
//!   the database driver and HTTP client stay at warn.
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.

use tracing_subscriber::EnvFilter;

pub fn default_directives(development: bool) -> String {
    let level = if development { "debug" } else { "info" };
    format!("{level},quiz_generator={level},tower_http=info,axum=info,mongodb=warn,reqwest=warn,hyper=warn")
}

pub fn init_tracing(development: bool) {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(default_directives(development)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
