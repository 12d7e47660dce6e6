//! Provider factory - creates clients from config

use super::clients::{GeminiClient, OpenAIClient};
use super::traits::ModelClient;
use crate::config::ModelProviderConfig;
use std::env;
use tracing::warn;

/// Resolve API key from environment variable
pub fn resolve_api_key(provider: &str, spec: Option<&str>) -> Option<String> {
    let raw = spec.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = raw,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// - `gemini`, `google`, `google-ai` → Gemini function calling
    /// - Others → OpenAI-compatible tool calling (default)
    pub fn create(config: &ModelProviderConfig) -> Box<dyn ModelClient> {
        if config.is_gemini() {
            Box::new(GeminiClient::from_config(config))
        } else {
            Box::new(OpenAIClient::from_config(config))
        }
    }
}
