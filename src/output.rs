//! Output types: the corpus, per-section results, and the assembled review.

use crate::error::SectionError;
use serde::Serialize;

/// Concatenated text of every input that parsed, plus page and file counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceCorpus {
    /// Page texts of all parsed files, concatenated with no separator.
    pub text: String,
    /// Pages iterated across successfully opened files only.
    pub total_pages: usize,
    /// Inputs supplied.
    pub files_total: usize,
    /// Inputs dropped because they could not be read or parsed.
    pub files_skipped: usize,
}

impl SourceCorpus {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The outcome of one section request.
#[derive(Debug, Clone, Serialize)]
pub struct SectionResult {
    /// 0-based position in the section plan.
    pub index: usize,
    pub title: String,
    /// Generated text on success, the request error otherwise.
    pub outcome: Result<String, SectionError>,
    pub duration_ms: u64,
}

impl SectionResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Text for insertion under the section heading.
    ///
    /// Successful text is returned verbatim; a failure becomes a bracketed
    /// placeholder naming the section and the error.
    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(e) => error_placeholder(&self.title, e),
        }
    }
}

/// Marker that opens every inline failure placeholder.
pub const SECTION_ERROR_MARKER: &str = "[Section generation failed";

/// Format a section failure for insertion into the document.
pub fn error_placeholder(title: &str, error: &SectionError) -> String {
    format!("\n\n{SECTION_ERROR_MARKER} for \"{title}\": {error}]\n\n")
}

/// The heading block that opens a section in the assembled Markdown.
pub fn section_heading(title: &str) -> String {
    format!("\n\n## {title}\n\n")
}

/// Timing and count summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewStats {
    pub files_total: usize,
    pub files_skipped: usize,
    pub total_pages: usize,
    pub corpus_chars: usize,
    /// Corpus characters actually embedded in each prompt.
    pub corpus_chars_used: usize,
    pub sections_succeeded: usize,
    pub sections_failed: usize,
    pub extraction_duration_ms: u64,
    pub generation_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The assembled review: the Markdown artifact plus its parts.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDocument {
    /// Title line followed by one `## ` block per section, in plan order.
    pub markdown: String,
    pub title: String,
    pub model: String,
    pub sections: Vec<SectionResult>,
    pub stats: ReviewStats,
}

impl ReviewDocument {
    /// Titles of the section blocks present in the Markdown, in document order.
    ///
    /// Only the `## <title>` blocks written by the assembler count; headings
    /// inside a generated section body are not sections.
    pub fn headings(&self) -> Vec<&str> {
        let mut found = Vec::with_capacity(self.sections.len());
        let mut cursor = 0;
        for section in &self.sections {
            let block = section_heading(&section.title);
            if let Some(at) = self.markdown[cursor..].find(&block) {
                cursor += at + block.len();
                found.push(section.title.as_str());
            }
        }
        found
    }
}
