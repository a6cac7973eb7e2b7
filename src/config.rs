//! Configuration types for review generation.
//!
//! Every per-run knob lives in [`ReviewConfig`], built via its
//! [`ReviewConfigBuilder`]. The credential and model are part of the config
//! and are threaded into every section request; nothing is held in
//! module-level state.

use crate::error::ReviewError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default review topic used in the framing sentence of every prompt.
pub const DEFAULT_TOPIC: &str = "industrial robot trajectory interpolation";

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Substring a model name must contain to be offered by discovery.
pub const DEFAULT_MODEL_FILTER: &str = "gemini";

/// Character budget for the corpus embedded in each section prompt.
pub const DEFAULT_MAX_CORPUS_CHARS: usize = 50_000;

/// Pause between consecutive section requests.
pub const DEFAULT_SECTION_DELAY: Duration = Duration::from_secs(5);

/// An opaque API key.
///
/// `Debug` is redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for placing in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Model identifier plus credential, fixed once per run and reused for
/// every section request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: String,
    pub credential: Credential,
}

/// Configuration for one review run.
///
/// # Example
/// ```rust
/// use edgequake_litreview::ReviewConfig;
/// use std::time::Duration;
///
/// let config = ReviewConfig::builder()
///     .topic("graph neural networks for traffic forecasting")
///     .model("models/gemini-1.5-pro")
///     .api_key("AIza...")
///     .section_delay(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReviewConfig {
    /// Free-text subject of the review, substituted into every prompt.
    pub topic: String,

    /// Top-level `#` title line. If None, derived from `topic`.
    pub title: Option<String>,

    /// Model identifier, e.g. "models/gemini-1.5-pro".
    /// If None, the first model from discovery is used.
    pub model: Option<String>,

    /// API key for the built-in Gemini backend.
    pub credential: Option<Credential>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// If set, requests go through `ProviderFactory` instead of the Gemini
    /// client and the provider reads its own key from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Optional output cap. Default: None (the model's own limit applies).
    pub max_tokens: Option<usize>,

    /// Corpus characters embedded in each prompt (prefix truncation). Default: 50 000.
    pub max_corpus_chars: usize,

    /// Pause between section requests. Default: 5 s. Zero in tests.
    pub section_delay: Duration,

    /// Name substring used to filter discovered models. Default: "gemini".
    pub model_filter: String,

    /// Base URL of the Gemini REST API.
    pub api_base_url: String,

    /// Per-request timeout in seconds for generation calls. Default: 300.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            title: None,
            model: None,
            credential: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: None,
            max_corpus_chars: DEFAULT_MAX_CORPUS_CHARS,
            section_delay: DEFAULT_SECTION_DELAY,
            model_filter: DEFAULT_MODEL_FILTER.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout_secs: 300,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("topic", &self.topic)
            .field("title", &self.title)
            .field("model", &self.model)
            .field("credential", &self.credential)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_corpus_chars", &self.max_corpus_chars)
            .field("section_delay", &self.section_delay)
            .field("model_filter", &self.model_filter)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ReviewProgressCallback>"),
            )
            .finish()
    }
}

impl ReviewConfig {
    /// Create a new builder for `ReviewConfig`.
    pub fn builder() -> ReviewConfigBuilder {
        ReviewConfigBuilder {
            config: Self::default(),
        }
    }

    /// The `#` title line text.
    pub fn resolved_title(&self) -> String {
        match self.title {
            Some(ref t) if !t.trim().is_empty() => t.clone(),
            _ => format!("A Review of Research on {}", title_case_first(&self.topic)),
        }
    }

    /// True when requests go through an edgequake-llm provider rather than
    /// the built-in Gemini client.
    pub fn uses_external_provider(&self) -> bool {
        self.provider.is_some() || self.provider_name.is_some()
    }
}

fn title_case_first(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builder for [`ReviewConfig`].
pub struct ReviewConfigBuilder {
    config: ReviewConfig,
}

impl fmt::Debug for ReviewConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ReviewConfigBuilder {
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.config.topic = topic.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.credential = Some(Credential::new(key));
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Sampling temperature. `build()` rejects values outside `0.0..=2.0`.
    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn max_corpus_chars(mut self, n: usize) -> Self {
        self.config.max_corpus_chars = n;
        self
    }

    pub fn section_delay(mut self, delay: Duration) -> Self {
        self.config.section_delay = delay;
        self
    }

    pub fn model_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.model_filter = filter.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReviewConfig, ReviewError> {
        let c = &self.config;
        if c.topic.trim().is_empty() {
            return Err(ReviewError::InvalidConfig("topic must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(ReviewError::InvalidConfig(format!(
                "temperature must be within 0.0..=2.0, got {}",
                c.temperature
            )));
        }
        if c.max_corpus_chars == 0 {
            return Err(ReviewError::InvalidConfig(
                "max_corpus_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ReviewError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(ReviewError::InvalidConfig(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                c.api_base_url
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReviewConfig::default();
        assert_eq!(c.temperature, 0.7);
        assert_eq!(c.max_corpus_chars, 50_000);
        assert_eq!(c.section_delay, Duration::from_secs(5));
        assert_eq!(c.max_tokens, None);
        assert_eq!(c.model_filter, "gemini");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = ReviewConfig::builder().api_key("AIza-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("AIza-secret"), "got: {dbg}");
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn title_derived_from_topic() {
        let c = ReviewConfig::builder()
            .topic("swarm robotics")
            .build()
            .unwrap();
        assert_eq!(c.resolved_title(), "A Review of Research on Swarm robotics");
    }

    #[test]
    fn explicit_title_wins() {
        let c = ReviewConfig::builder().title("My Survey").build().unwrap();
        assert_eq!(c.resolved_title(), "My Survey");
    }

    #[test]
    fn empty_topic_rejected() {
        let err = ReviewConfig::builder().topic("  ").build().unwrap_err();
        assert!(matches!(err, ReviewError::InvalidConfig(_)));
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        for t in [9.0, -0.1, f32::NAN, f32::INFINITY] {
            let err = ReviewConfig::builder().temperature(t).build().unwrap_err();
            assert!(matches!(err, ReviewError::InvalidConfig(_)), "accepted {t}");
        }
        let c = ReviewConfig::builder().temperature(2.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn debug_lists_every_setting() {
        let c = ReviewConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        for field in [
            "api_timeout_secs: 300",
            "download_timeout_secs: 120",
            "<dyn ReviewProgressCallback>",
        ] {
            assert!(dbg.contains(field), "missing {field} in {dbg}");
        }
    }

    #[test]
    fn bad_base_url_rejected() {
        let err = ReviewConfig::builder()
            .api_base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    fn provider_name_marks_external_provider() {
        let c = ReviewConfig::builder().provider_name("openai").build().unwrap();
        assert!(c.uses_external_provider());
        assert!(!ReviewConfig::default().uses_external_provider());
    }
}
