//! Section generation: one prompt, one request, one [`SectionResult`].
//!
//! Always returns a `SectionResult` and never propagates the request error
//! upward, so one failed section can't abort the other four.

use crate::output::SectionResult;
use crate::pipeline::llm::{GenerationOptions, TextGenerator};
use crate::prompts::{build_section_prompt, SectionSpec};
use std::time::Instant;
use tracing::{debug, warn};

/// Prefix of `text` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values, not bytes, and never splits a character.
/// Text at or under the budget is returned unchanged.
pub fn truncate_corpus(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Generate one section of the review.
pub async fn generate_section<G: TextGenerator>(
    generator: &G,
    index: usize,
    section: &SectionSpec,
    topic: &str,
    corpus: &str,
    max_corpus_chars: usize,
    options: &GenerationOptions,
) -> SectionResult {
    let start = Instant::now();
    let excerpt = truncate_corpus(corpus, max_corpus_chars);
    let prompt = build_section_prompt(topic, section, excerpt);
    debug!(
        "Section {} '{}': prompt {} chars ({} corpus chars)",
        index + 1,
        section.title,
        prompt.chars().count(),
        excerpt.chars().count()
    );

    let outcome = generator.generate(&prompt, options).await;
    if let Err(ref e) = outcome {
        warn!("Section {} '{}' failed: {}", index + 1, section.title, e);
    }

    SectionResult {
        index,
        title: section.title.to_string(),
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SectionError;
    use crate::prompts::DEFAULT_SECTIONS;
    use std::sync::Mutex;

    #[test]
    fn short_text_unchanged() {
        assert_eq!(truncate_corpus("abc", 5), "abc");
        assert_eq!(truncate_corpus("abcde", 5), "abcde");
        assert_eq!(truncate_corpus("", 5), "");
    }

    #[test]
    fn long_text_cut_to_exact_char_count() {
        let text = "x".repeat(50_010);
        assert_eq!(truncate_corpus(&text, 50_000).len(), 50_000);
    }

    #[test]
    fn multibyte_text_cut_on_char_boundary() {
        let text = "轨迹插补技术";
        assert_eq!(truncate_corpus(text, 2), "轨迹");
    }

    /// Records prompts; replies with the prompt length or a fixed error.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl TextGenerator for RecordingGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, SectionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(SectionError::Auth {
                    status: 400,
                    message: "API key not valid".into(),
                })
            } else {
                Ok(format!("{} chars", prompt.len()))
            }
        }
    }

    fn options() -> GenerationOptions {
        GenerationOptions {
            model: "models/gemini-1.5-pro".into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn embeds_truncated_corpus() {
        let generator = RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        };
        let corpus = format!("{}{}", "α".repeat(10), "ω".repeat(10));
        let result =
            generate_section(&generator, 0, &DEFAULT_SECTIONS[0], "topic", &corpus, 10, &options())
                .await;
        assert!(result.is_ok());
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains(&"α".repeat(10)));
        assert!(!prompts[0].contains('ω'));
    }

    #[tokio::test]
    async fn failure_becomes_placeholder() {
        let generator = RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        };
        let result =
            generate_section(&generator, 3, &DEFAULT_SECTIONS[3], "topic", "text", 100, &options())
                .await;
        assert_eq!(result.index, 3);
        assert!(!result.is_ok());
        let rendered = result.render();
        assert!(rendered.contains(crate::output::SECTION_ERROR_MARKER));
        assert!(rendered.contains(DEFAULT_SECTIONS[3].title));
        assert!(rendered.contains("API key not valid"));
    }
}
