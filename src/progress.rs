//! Progress-callback trait for extraction and per-section generation events.
//!
//! Inject an [`Arc<dyn ReviewProgressCallback>`] via
//! [`crate::config::ReviewConfigBuilder::progress_callback`] to receive
//! events as the pipeline reads each file and writes each section. The
//! signals are informational only; nothing in the pipeline depends on them.
//!
//! # Example
//!
//! ```rust
//! use edgequake_litreview::{ReviewProgressCallback, ReviewConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     sections: Arc<AtomicUsize>,
//! }
//!
//! impl ReviewProgressCallback for CountingCallback {
//!     fn on_section_complete(&self, index: usize, total: usize, title: &str, len: usize) {
//!         self.sections.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {title} ({len} bytes)", index + 1, total);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     sections: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ReviewConfig::builder()
//!     .progress_callback(counter as Arc<dyn ReviewProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::models::ModelDiscovery;
use std::sync::Arc;

/// Called by the pipeline as it extracts files and generates sections.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Section indices are 0-based; the fraction shown to
/// a user is `(index + 1) / total`.
pub trait ReviewProgressCallback: Send + Sync {
    /// Called after model discovery when no model was configured.
    ///
    /// A fallback `discovery.source` carries the reason the listing failed;
    /// the run continues with the first fallback model.
    fn on_model_discovery(&self, discovery: &ModelDiscovery) {
        let _ = discovery;
    }

    /// Called after each input file has been attempted, whether or not it parsed.
    fn on_extraction_progress(&self, files_done: usize, files_total: usize) {
        let _ = (files_done, files_total);
    }

    /// Called once the corpus is built.
    fn on_extraction_complete(&self, files_total: usize, total_pages: usize, corpus_chars: usize) {
        let _ = (files_total, total_pages, corpus_chars);
    }

    /// Called just before the request for a section is sent.
    fn on_section_start(&self, index: usize, total: usize, title: &str) {
        let _ = (index, total, title);
    }

    /// Called when a section returned text.
    fn on_section_complete(&self, index: usize, total: usize, title: &str, text_len: usize) {
        let _ = (index, total, title, text_len);
    }

    /// Called when a section request failed; the placeholder still goes into the document.
    fn on_section_error(&self, index: usize, total: usize, title: &str, error: &str) {
        let _ = (index, total, title, error);
    }

    /// Called once after all sections have been attempted.
    fn on_review_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReviewProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReviewConfig`].
pub type ProgressCallback = Arc<dyn ReviewProgressCallback>;
