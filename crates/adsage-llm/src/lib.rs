//! Text generation backends for adsage
//!
//! Every stage talks to one [`GenerationBackend`]. The backend is chosen once
//! at process start by [`select_backend`] and shared by all stages of a run.

mod chat_completions;
mod offline;
#[cfg(any(test, feature = "test-utils"))]
mod scripted;
mod transport;
mod types;

use std::sync::Arc;

use adsage_config::{Config, ProviderKind};
use tracing::info;

pub use adsage_utils::error::GenerationError;
pub use chat_completions::{ChatCompletionsBackend, ProviderProfile};
pub use offline::OfflineBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedBackend;
pub use types::{
    GenerationBackend, GenerationRequest, GenerationResponse, Message, Role, SamplingParams,
};

/// Construct the backend named by `config.llm.provider`, reading API keys from
/// the process environment.
///
/// # Errors
///
/// Returns `GenerationError::Misconfiguration` when the chosen provider has no
/// API key, or when `auto` finds neither key.
pub fn select_backend(config: &Config) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
    select_backend_with(config, &|name| std::env::var(name).ok())
}

/// [`select_backend`] with an explicit environment lookup.
pub fn select_backend_with(
    config: &Config,
    lookup_env: &dyn Fn(&str) -> Option<String>,
) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
    let backend: Arc<dyn GenerationBackend> = match config.llm.provider {
        ProviderKind::Offline => Arc::new(OfflineBackend),
        ProviderKind::Groq => Arc::new(ChatCompletionsBackend::from_config(
            ProviderProfile::GROQ,
            config,
            lookup_env,
        )?),
        ProviderKind::OpenAi => Arc::new(ChatCompletionsBackend::from_config(
            ProviderProfile::OPENAI,
            config,
            lookup_env,
        )?),
        ProviderKind::Auto => {
            match ChatCompletionsBackend::from_config(ProviderProfile::GROQ, config, lookup_env) {
                Ok(groq) => Arc::new(groq),
                Err(groq_error) => {
                    match ChatCompletionsBackend::from_config(
                        ProviderProfile::OPENAI,
                        config,
                        lookup_env,
                    ) {
                        Ok(openai) => Arc::new(openai),
                        Err(_) => {
                            return Err(GenerationError::Misconfiguration(format!(
                                "no generation provider available ({groq_error}); set GROQ_API_KEY or OPENAI_API_KEY"
                            )));
                        }
                    }
                }
            }
        }
    };

    info!(provider = backend.name(), "Generation backend selected");
    Ok(backend)
}
