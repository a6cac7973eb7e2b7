//! Error types for the edgequake-litreview library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`ReviewError`]: **Fatal**: the run cannot start at all (no inputs,
//!   no credential, provider not configured) or its artifact cannot be
//!   written. Returned as `Err(ReviewError)` from the `generate_review*`
//!   functions.
//!
//! * [`SectionError`]: **Non-fatal**: one section's generation request
//!   failed. Stored inside [`crate::output::SectionResult`] and rendered
//!   inline in the final document; the remaining sections still run.
//!
//! * [`ExtractError`]: **Non-fatal**: one input file could not be resolved
//!   or parsed. The extractor drops the file from the corpus and moves on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-litreview library.
///
/// Section-level failures use [`SectionError`] and are embedded in the
/// document rather than propagated here.
#[derive(Debug, Error)]
pub enum ReviewError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// No input documents were supplied.
    #[error("No input documents supplied.\nPass at least one PDF path or URL.")]
    NoInputs,

    /// The Gemini backend needs an API key and none was given.
    #[error("No API credential supplied.\nSet GEMINI_API_KEY or pass --api-key.")]
    MissingCredential,

    /// No model identifier was chosen and discovery produced none.
    #[error("No model selected.\nPass --model or run with --list-models to see candidates.")]
    NoModelSelected,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The named edgequake-llm provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Model discovery ───────────────────────────────────────────────────
    /// Listing models against the API failed (network or auth).
    #[error("Failed to list models: {detail}")]
    ModelListFailed { detail: String },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library; no input can be read at all.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install pdfium\n\
system-wide. Prebuilt binaries: https://github.com/bblanchon/pdfium-binaries\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single section request.
///
/// Never raised to the caller of the assembler: it lives in
/// [`crate::output::SectionResult::outcome`] and is formatted into the
/// review by [`crate::output::SectionResult::render`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SectionError {
    /// The request could not be sent or the connection dropped.
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered 401/403.
    #[error("authentication rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The API answered 429 (quota or rate limit).
    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response decoded but carried no text (e.g. blocked by a safety filter).
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// An edgequake-llm provider returned an error.
    #[error("provider error: {0}")]
    Provider(String),
}

/// A non-fatal error for a single input file.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The path or URL could not be read.
    #[error("could not read '{input}': {reason}")]
    Resolve { input: String, reason: String },

    /// The bytes do not start with the `%PDF` magic.
    #[error("'{input}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { input: String, magic: Vec<u8> },

    /// pdfium could not open or parse the document.
    #[error("PDF parse failed: {0}")]
    Parse(String),

    /// The pdfium shared library could not be loaded.
    ///
    /// Unlike the other variants this is not per-file: the extractor turns
    /// it into [`ReviewError::PdfiumBindingFailed`].
    #[error("pdfium library unavailable: {0}")]
    Binding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_mentions_env_var() {
        let msg = ReviewError::MissingCredential.to_string();
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn auth_error_display() {
        let e = SectionError::Auth {
            status: 403,
            message: "API key not valid".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("API key not valid"));
    }

    #[test]
    fn api_error_display() {
        let e = SectionError::Api {
            status: 500,
            message: "internal".into(),
        };
        assert!(e.to_string().contains("HTTP 500"));
    }

    #[test]
    fn section_error_serialises() {
        let e = SectionError::RateLimited("quota".into());
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("RateLimited"), "got: {json}");
    }

    #[test]
    fn not_a_pdf_display() {
        let e = ExtractError::NotAPdf {
            input: "notes.txt".into(),
            magic: b"hell".to_vec(),
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
