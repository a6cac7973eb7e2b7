//! Text generation backends.
//!
//! [`TextGenerator`] is the seam between the section logic and the network.
//! Two implementations ship with the crate:
//!
//! * [`crate::pipeline::gemini::GeminiClient`]: direct calls to the Gemini
//!   `generateContent` REST endpoint with an explicit API key (default).
//! * [`ProviderGenerator`]: any `edgequake-llm` provider (OpenAI,
//!   Anthropic, Ollama, …) resolved through `ProviderFactory`.
//!
//! A generator issues exactly one request per call. There is no retry
//! here or anywhere above it.

use crate::config::ReviewConfig;
use crate::error::{ReviewError, SectionError};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Sampling parameters shared by every section of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Model identifier, e.g. "models/gemini-1.5-pro".
    pub model: String,
    pub temperature: f32,
    /// None → the model's own output limit.
    pub max_tokens: Option<usize>,
}

impl GenerationOptions {
    pub fn from_config(model: impl Into<String>, config: &ReviewConfig) -> Self {
        Self {
            model: model.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// One blocking request-response round trip to a language model.
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` as a single user turn and return the reply text.
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, SectionError>> + Send;
}

/// [`TextGenerator`] over an `edgequake-llm` provider.
///
/// The provider was created for a specific model, so
/// [`GenerationOptions::model`] is informational only here.
#[derive(Clone)]
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the provider from the config: a pre-built provider wins,
    /// otherwise `provider_name` + model go through `ProviderFactory`.
    pub fn from_config(config: &ReviewConfig, model: &str) -> Result<Self, ReviewError> {
        if let Some(ref provider) = config.provider {
            return Ok(Self::new(Arc::clone(provider)));
        }
        let name = config
            .provider_name
            .as_deref()
            .ok_or_else(|| ReviewError::ProviderNotConfigured {
                provider: "<none>".to_string(),
                hint: "Set a provider name or supply a provider instance.".to_string(),
            })?;
        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            ReviewError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider))
    }
}

impl TextGenerator for ProviderGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, SectionError> {
        let messages = vec![ChatMessage::user(prompt)];
        let completion = CompletionOptions {
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&completion))
            .await
            .map_err(|e| SectionError::Provider(format!("{e}")))?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let config = ReviewConfig::builder()
            .temperature(0.3)
            .max_tokens(8192)
            .build()
            .unwrap();
        let opts = GenerationOptions::from_config("models/gemini-1.5-flash", &config);
        assert_eq!(opts.model, "models/gemini-1.5-flash");
        assert_eq!(opts.temperature, 0.3);
        assert_eq!(opts.max_tokens, Some(8192));
    }

    #[test]
    fn default_options_have_no_token_cap() {
        let opts = GenerationOptions::from_config("m", &ReviewConfig::default());
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.max_tokens, None);
    }

    #[test]
    fn provider_required_for_provider_generator() {
        let err = ProviderGenerator::from_config(&ReviewConfig::default(), "gpt-4.1")
            .err()
            .expect("no provider configured");
        assert!(matches!(err, ReviewError::ProviderNotConfigured { .. }));
    }
}
