//! Application state: settings, the quiz store and the generator.
//!
//! Built once in `main` and shared with every handler as `Arc<AppState>`.
//! The model client inside the generator creates its HTTP client on first use.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::anthropic::AnthropicClient;
use crate::config::{load_prompts_from_env, Settings, StoreBackend};
use crate::content::{ContentError, HttpContentFetcher};
use crate::generator::QuizGenerator;
use crate::store::{MemoryQuizStore, MongoQuizStore, QuizStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to build content fetcher: {0}")]
    Content(#[from] ContentError),
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn QuizStore>,
    pub generator: QuizGenerator,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn QuizStore>, generator: QuizGenerator) -> Self {
        Self { settings, store, generator }
    }

    /// Connect the configured store and wire the production collaborators.
    #[instrument(level = "info", skip_all)]
    pub async fn from_settings(settings: Settings) -> Result<Self, StartupError> {
        let store: Arc<dyn QuizStore> = match settings.store_backend {
            StoreBackend::Mongo => {
                Arc::new(MongoQuizStore::connect(&settings.mongodb_url, &settings.mongodb_database).await?)
            }
            StoreBackend::Memory => {
                info!(target: "quiz_generator", "Using in-memory quiz store");
                Arc::new(MemoryQuizStore::new())
            }
        };

        let fetcher = HttpContentFetcher::new(settings.content_processor_api_url.clone())?;
        if settings.content_processor_api_url.is_none() {
            info!(target: "quiz_generator", "CONTENT_PROCESSOR_API_URL not set; requests must carry content");
        }
        if settings.anthropic_api_key.is_empty() {
            info!(target: "quiz_generator", "ANTHROPIC_API_KEY not set; generation calls will be rejected by the model API");
        }

        let completion = AnthropicClient::from_settings(&settings);
        let prompts = load_prompts_from_env().unwrap_or_default();
        let generator = QuizGenerator::new(Arc::new(completion), Arc::new(fetcher), store.clone(), prompts);

        info!(
            target: "quiz_generator",
            service = %settings.service_name,
            model = %settings.default_ai_model,
            environment = %settings.environment,
            development = settings.is_development(),
            "Application state ready"
        );
        Ok(Self::new(settings, store, generator))
    }
}
