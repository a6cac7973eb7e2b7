//! Pipeline stages for review generation.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ assemble ─┬─▶ generate ──▶ llm / gemini
//! (path/URL) (pdfium)  (loop × 5) └── delay between sections
//! ```
//!
//! 1. [`input`]   : read a local file or download a URL into memory
//! 2. [`extract`] : per-page text via pdfium, concatenated into one corpus
//! 3. [`assemble`]: the ordered section loop and Markdown accumulator
//! 4. [`generate`]: truncate the corpus, build the prompt, issue one request
//! 5. [`llm`] / [`gemini`]: the request backends behind [`llm::TextGenerator`]
//! 6. [`models`]  : model discovery with a fixed fallback list

pub mod assemble;
pub mod extract;
pub mod gemini;
pub mod generate;
pub mod input;
pub mod llm;
pub mod models;
