//! Model discovery with a fixed fallback list.
//!
//! Discovery never fails a run: if the catalog query errors or yields no
//! usable model, [`FALLBACK_MODELS`] is offered instead and the reason is
//! kept in [`ModelSource::Fallback`] so the caller can show a warning.

use crate::error::ReviewError;
use serde::Serialize;
use std::future::Future;
use tracing::warn;

/// Offered when discovery fails or finds nothing.
pub const FALLBACK_MODELS: [&str; 2] = ["models/gemini-1.5-pro", "models/gemini-1.5-flash"];

/// The generation method a model must support to be offered.
pub const GENERATE_CONTENT: &str = "generateContent";

/// One entry from the provider's model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }
}

/// Anything that can list the models available to a credential.
pub trait ModelCatalog: Send + Sync {
    fn list_models(&self) -> impl Future<Output = Result<Vec<ModelInfo>, ReviewError>> + Send;
}

/// Where the candidate list came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModelSource {
    Discovered,
    Fallback { reason: String },
}

/// Candidate model identifiers, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDiscovery {
    pub models: Vec<String>,
    pub source: ModelSource,
}

impl ModelDiscovery {
    fn fallback(reason: impl Into<String>) -> Self {
        Self {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            source: ModelSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// The model to use when the caller did not pick one.
    pub fn default_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ModelSource::Fallback { .. })
    }
}

/// Keep models that support content generation and whose name contains `name_filter`.
pub fn filter_models(models: &[ModelInfo], name_filter: &str) -> Vec<String> {
    models
        .iter()
        .filter(|m| m.supports(GENERATE_CONTENT) && m.name.contains(name_filter))
        .map(|m| m.name.clone())
        .collect()
}

/// Query the catalog, substituting [`FALLBACK_MODELS`] on error or empty result.
pub async fn discover_models<C: ModelCatalog>(catalog: &C, name_filter: &str) -> ModelDiscovery {
    match catalog.list_models().await {
        Ok(models) => {
            let usable = filter_models(&models, name_filter);
            if usable.is_empty() {
                warn!(
                    "No '{}' models support {} ({} listed); using fallback list",
                    name_filter,
                    GENERATE_CONTENT,
                    models.len()
                );
                ModelDiscovery::fallback("no matching models returned")
            } else {
                ModelDiscovery {
                    models: usable,
                    source: ModelSource::Discovered,
                }
            }
        }
        Err(e) => {
            warn!("Model discovery failed: {}; using fallback list", e);
            ModelDiscovery::fallback(e.to_string())
        }
    }
}
