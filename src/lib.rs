//! # edgequake-litreview
//!
//! Turn a stack of PDF papers into a long-form Markdown literature review
//! by asking an LLM to write it one chapter at a time.
//!
//! ## Why sections?
//!
//! A single request for a ten-thousand-word review comes back short: models
//! stop long before their output limit. Asking for five chapters separately,
//! each with the same source text and its own instructions, yields a review
//! several times longer. The chapters are concatenated in a fixed order
//! under one title.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs
//!  │
//!  ├─ 1. Input     resolve local files or download URLs
//!  ├─ 2. Extract   per-page text via pdfium; unreadable files are skipped
//!  ├─ 3. Sections  5 × (truncate corpus → prompt → one LLM request)
//!  │               with a pause between requests
//!  └─ 4. Output    "# title" + five "## chapter" blocks
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_litreview::{generate_review, ReviewConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReviewConfig::builder()
//!         .topic("industrial robot trajectory interpolation")
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .model("models/gemini-1.5-pro")
//!         .build()?;
//!     let inputs = vec!["paper1.pdf".to_string(), "paper2.pdf".to_string()];
//!     let review = generate_review(&inputs, &config).await?;
//!     println!("{}", review.markdown);
//!     eprintln!("{}/5 sections ok", review.stats.sections_succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `litreview` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Failure behaviour
//!
//! A file that cannot be parsed is skipped. A section whose request fails is
//! replaced by a bracketed error line. Only missing inputs, a missing
//! credential, or an unloadable pdfium library stop a run, and they stop it
//! before any request is sent.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod review;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Credential, ModelSelection, ReviewConfig, ReviewConfigBuilder};
pub use error::{ExtractError, ReviewError, SectionError};
pub use output::{ReviewDocument, ReviewStats, SectionResult, SourceCorpus, SECTION_ERROR_MARKER};
pub use pipeline::extract::{PageTextReader, PdfiumReader};
pub use pipeline::gemini::GeminiClient;
pub use pipeline::llm::{GenerationOptions, ProviderGenerator, TextGenerator};
pub use pipeline::models::{ModelCatalog, ModelDiscovery, ModelInfo, ModelSource, FALLBACK_MODELS};
pub use progress::{NoopProgressCallback, ProgressCallback, ReviewProgressCallback};
pub use prompts::{SectionSpec, DEFAULT_SECTIONS};
pub use review::{
    generate_review, generate_review_sync, generate_review_to_file, generate_review_with,
    list_models, resolve_selection, DEFAULT_OUTPUT_FILE_NAME,
};
