//! Text extraction: turn the input documents into one [`SourceCorpus`].
//!
//! Each file is handled independently. A file that cannot be read or parsed
//! is dropped without affecting the others and without any user-visible
//! report; only a `debug!` line and the `files_skipped` counter record it.
//! The one failure that does propagate is an unloadable pdfium library,
//! since then no file can ever be read.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and no async API, so each
//! file is parsed on the blocking pool to keep the Tokio workers free.

use crate::config::ReviewConfig;
use crate::error::{ExtractError, ReviewError};
use crate::output::SourceCorpus;
use crate::pipeline::input;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Reads per-page text from raw PDF bytes.
///
/// The production implementation is [`PdfiumReader`]; tests substitute a
/// fake so extraction semantics can be checked without a pdfium library.
pub trait PageTextReader: Send + Sync {
    /// Text of every page, in order. A page whose text cannot be extracted
    /// contributes an empty string but still counts as a page.
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// [`PageTextReader`] backed by pdfium-render.
#[derive(Debug, Clone, Default)]
pub struct PdfiumReader {
    /// Directory holding the platform pdfium library. None → system library.
    library_dir: Option<PathBuf>,
}

impl PdfiumReader {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    /// Honour `PDFIUM_LIB_PATH` when set.
    pub fn from_env() -> Self {
        let library_dir = std::env::var_os("PDFIUM_LIB_PATH")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self { library_dir }
    }

    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bindings = match self.library_dir {
            Some(ref dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ExtractError::Binding(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageTextReader for PdfiumReader {
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| ExtractError::Parse(format!("{:?}", e)))?;

        let pages = document
            .pages()
            .iter()
            .map(|page| page.text().map(|t| t.all()).unwrap_or_default())
            .collect();
        Ok(pages)
    }
}

/// Extract and concatenate the text of every input.
///
/// Returns `Err` only when the reader reports that the PDF backend itself is
/// unavailable. Per-file failures are absorbed.
pub async fn extract_corpus(
    reader: Arc<dyn PageTextReader>,
    inputs: &[String],
    config: &ReviewConfig,
) -> Result<SourceCorpus, ReviewError> {
    let mut corpus = SourceCorpus {
        files_total: inputs.len(),
        ..Default::default()
    };

    for (i, name) in inputs.iter().enumerate() {
        match extract_one(Arc::clone(&reader), name, config.download_timeout_secs).await {
            Ok(pages) => {
                debug!("{}: {} pages", name, pages.len());
                corpus.total_pages += pages.len();
                for page in pages {
                    corpus.text.push_str(&page);
                }
            }
            Err(ExtractError::Binding(detail)) => {
                return Err(ReviewError::PdfiumBindingFailed(detail));
            }
            Err(e) => {
                debug!("Skipping {}: {}", name, e);
                corpus.files_skipped += 1;
            }
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_extraction_progress(i + 1, inputs.len());
        }
    }

    info!(
        "Extracted {} chars from {} pages across {} files",
        corpus.char_count(),
        corpus.total_pages,
        inputs.len() - corpus.files_skipped
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(corpus.files_total, corpus.total_pages, corpus.char_count());
    }

    Ok(corpus)
}

async fn extract_one(
    reader: Arc<dyn PageTextReader>,
    name: &str,
    timeout_secs: u64,
) -> Result<Vec<String>, ExtractError> {
    let file = input::load_input(name, timeout_secs).await?;
    tokio::task::spawn_blocking(move || reader.read_pages(&file.bytes))
        .await
        .map_err(|e| ExtractError::Parse(format!("parse task panicked: {}", e)))?
}
