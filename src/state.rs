//! Application state: document store, prompts, generation settings and the
//! optional text-generation client.
//!
//! The generation client is injected; `new()` builds the OpenAI-compatible one
//! from the environment, tests pass their own.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{AppConfig, GenerationConfig, Prompts, ServerConfig};
use crate::openai::{OpenAI, TextGenerator};
use crate::store::DocumentStore;

pub struct AppState {
    pub documents: DocumentStore,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub prompts: Prompts,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
}

impl AppState {
    /// Build state from env: load config, init the generation client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = AppConfig::from_env();

        let generator: Option<Arc<dyn TextGenerator>> = match OpenAI::from_env() {
            Some(oa) => {
                info!(target: "docquiz_backend", base_url = %oa.base_url, model = %config.generation.model, "Generation service enabled.");
                Some(Arc::new(oa))
            }
            None => {
                warn!(target: "docquiz_backend", "Generation service disabled (no OPENAI_API_KEY). Ask and quiz requests will fail.");
                None
            }
        };

        Self::with_generator(generator, config)
    }

    pub fn with_generator(generator: Option<Arc<dyn TextGenerator>>, config: AppConfig) -> Self {
        Self {
            documents: DocumentStore::new(),
            generator,
            prompts: config.prompts,
            generation: config.generation,
            server: config.server,
        }
    }
}
