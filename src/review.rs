//! Run-level entry points: preconditions, backend selection, extraction,
//! the section loop, and writing the artifact.

use crate::config::{Credential, ModelSelection, ReviewConfig};
use crate::error::ReviewError;
use crate::output::{ReviewDocument, ReviewStats};
use crate::pipeline::assemble::assemble_review;
use crate::pipeline::extract::{extract_corpus, PageTextReader, PdfiumReader};
use crate::pipeline::gemini::GeminiClient;
use crate::pipeline::generate::truncate_corpus;
use crate::pipeline::llm::{GenerationOptions, ProviderGenerator, TextGenerator};
use crate::pipeline::models::{discover_models, ModelDiscovery};
use crate::prompts::DEFAULT_SECTIONS;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// File name used when the output path is a directory.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "Deep_Review.md";

/// Label recorded as the model when a pre-built provider picks its own.
const PROVIDER_DEFAULT_MODEL: &str = "provider default";

/// Generate a full review from PDF paths or URLs.
///
/// # Errors
/// Returns `Err(ReviewError)` only when the run cannot start (no inputs, no
/// credential, provider not configured, pdfium unavailable). Section
/// failures are embedded in the document instead.
pub async fn generate_review(
    inputs: &[String],
    config: &ReviewConfig,
) -> Result<ReviewDocument, ReviewError> {
    check_preconditions(inputs, config)?;
    let reader: Arc<dyn PageTextReader> = Arc::new(PdfiumReader::from_env());

    if config.uses_external_provider() {
        let model = match (&config.model, &config.provider) {
            (Some(m), _) => m.clone(),
            (None, Some(_)) => PROVIDER_DEFAULT_MODEL.to_string(),
            (None, None) => return Err(ReviewError::NoModelSelected),
        };
        let generator = ProviderGenerator::from_config(config, &model)?;
        return generate_review_with(&generator, reader, inputs, &model, config).await;
    }

    let selection = resolve_selection(config).await?;
    info!("Using model {}", selection.model);
    let client = GeminiClient::new(
        &config.api_base_url,
        selection.credential.clone(),
        config.api_timeout_secs,
    )?;
    generate_review_with(&client, reader, inputs, &selection.model, config).await
}

/// Fix the model and credential for a Gemini run.
///
/// Uses `config.model` when set, otherwise the first model discovery offers
/// (falling back to [`crate::FALLBACK_MODELS`] if the listing fails).
pub async fn resolve_selection(config: &ReviewConfig) -> Result<ModelSelection, ReviewError> {
    let credential = require_credential(config)?.clone();
    let model = match config.model {
        Some(ref m) if !m.trim().is_empty() => m.clone(),
        _ => {
            let discovery = discover_models(&gemini_client(config)?, &config.model_filter).await;
            if discovery.is_fallback() {
                warn!("Using fallback model list");
            }
            if let Some(ref cb) = config.progress_callback {
                cb.on_model_discovery(&discovery);
            }
            discovery
                .default_model()
                .map(str::to_string)
                .ok_or(ReviewError::NoModelSelected)?
        }
    };
    Ok(ModelSelection { model, credential })
}

/// Core of [`generate_review`] with the generator and PDF reader supplied.
///
/// Lets callers (and tests) plug in any [`TextGenerator`] and
/// [`PageTextReader`].
pub async fn generate_review_with<G: TextGenerator>(
    generator: &G,
    reader: Arc<dyn PageTextReader>,
    inputs: &[String],
    model: &str,
    config: &ReviewConfig,
) -> Result<ReviewDocument, ReviewError> {
    if inputs.is_empty() {
        return Err(ReviewError::NoInputs);
    }
    let total_start = Instant::now();

    // ── Step 1: Extract ──────────────────────────────────────────────────
    let extract_start = Instant::now();
    let corpus = extract_corpus(reader, inputs, config).await?;
    let extraction_duration_ms = extract_start.elapsed().as_millis() as u64;
    if corpus.is_empty() {
        warn!("Corpus is empty; sections will be written without source text");
    }

    // ── Step 2: Generate sections ────────────────────────────────────────
    let title = config.resolved_title();
    let options = GenerationOptions::from_config(model, config);
    let gen_start = Instant::now();
    let assembled =
        assemble_review(generator, &DEFAULT_SECTIONS, &corpus, &title, &options, config).await;
    let generation_duration_ms = gen_start.elapsed().as_millis() as u64;

    // ── Step 3: Stats ────────────────────────────────────────────────────
    let succeeded = assembled.sections.iter().filter(|s| s.is_ok()).count();
    let stats = ReviewStats {
        files_total: corpus.files_total,
        files_skipped: corpus.files_skipped,
        total_pages: corpus.total_pages,
        corpus_chars: corpus.char_count(),
        corpus_chars_used: truncate_corpus(&corpus.text, config.max_corpus_chars)
            .chars()
            .count(),
        sections_succeeded: succeeded,
        sections_failed: assembled.sections.len() - succeeded,
        extraction_duration_ms,
        generation_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Review complete: {}/{} sections, {} pages, {}ms total",
        succeeded,
        assembled.sections.len(),
        stats.total_pages,
        stats.total_duration_ms
    );

    Ok(ReviewDocument {
        markdown: assembled.markdown,
        title,
        model: model.to_string(),
        sections: assembled.sections,
        stats,
    })
}

/// Generate a review and write it to `output_path`.
///
/// If `output_path` is a directory, or ends with a path separator,
/// [`DEFAULT_OUTPUT_FILE_NAME`] is created inside it. The destination is
/// checked before any request is sent. Returns the path written and the
/// run stats.
pub async fn generate_review_to_file(
    inputs: &[String],
    output_path: impl AsRef<Path>,
    config: &ReviewConfig,
) -> Result<(PathBuf, ReviewStats), ReviewError> {
    check_preconditions(inputs, config)?;
    let path = prepare_output_path(output_path.as_ref()).await?;
    let doc = generate_review(inputs, config).await?;
    write_review(&path, &doc.markdown).await?;
    Ok((path, doc.stats))
}

/// Synchronous wrapper around [`generate_review`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_review_sync(
    inputs: &[String],
    config: &ReviewConfig,
) -> Result<ReviewDocument, ReviewError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReviewError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_review(inputs, config))
}

/// List candidate models for the configured credential.
///
/// Fails only when no credential is configured; query failures degrade to
/// the fallback list.
pub async fn list_models(config: &ReviewConfig) -> Result<ModelDiscovery, ReviewError> {
    let client = gemini_client(config)?;
    Ok(discover_models(&client, &config.model_filter).await)
}

/// Map a user-supplied output path to the file actually written.
///
/// An existing directory, or a path ending in a separator, names the
/// directory to write [`DEFAULT_OUTPUT_FILE_NAME`] into.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    let names_dir = path
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);
    if names_dir || path.is_dir() {
        path.join(DEFAULT_OUTPUT_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Resolve the output path and make sure it can be written.
///
/// Creates missing parent directories and writes then removes the temp
/// file, so a bad destination fails before any generation work.
pub async fn prepare_output_path(path: &Path) -> Result<PathBuf, ReviewError> {
    let resolved = resolve_output_path(path);
    let write_err = |source: std::io::Error| ReviewError::OutputWriteFailed {
        path: resolved.clone(),
        source,
    };

    if resolved.is_dir() {
        return Err(write_err(std::io::Error::new(
            std::io::ErrorKind::IsADirectory,
            "output path is a directory",
        )));
    }
    if let Some(parent) = resolved.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = temp_path(&resolved);
    tokio::fs::write(&tmp_path, b"").await.map_err(write_err)?;
    tokio::fs::remove_file(&tmp_path).await.map_err(write_err)?;
    debug!("Output will be written to {}", resolved.display());
    Ok(resolved)
}

/// Write `markdown` to `path` atomically (temp file + rename).
///
/// The temp file is removed again if the rename fails.
pub async fn write_review(path: &Path, markdown: &str) -> Result<(), ReviewError> {
    let write_err = |source: std::io::Error| ReviewError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = temp_path(path);
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_err(e));
    }

    info!("Wrote review to {}", path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn check_preconditions(inputs: &[String], config: &ReviewConfig) -> Result<(), ReviewError> {
    if inputs.is_empty() {
        return Err(ReviewError::NoInputs);
    }
    if !config.uses_external_provider() {
        require_credential(config)?;
    }
    Ok(())
}

fn require_credential(config: &ReviewConfig) -> Result<&Credential, ReviewError> {
    match config.credential {
        Some(ref c) if !c.is_empty() => Ok(c),
        _ => Err(ReviewError::MissingCredential),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("md.tmp")
}

fn gemini_client(config: &ReviewConfig) -> Result<GeminiClient, ReviewError> {
    let credential = require_credential(config)?.clone();
    GeminiClient::new(&config.api_base_url, credential, config.api_timeout_secs)
}
