//! The driver loop: one request per section, strictly in plan order.
//!
//! Sections are independent and could be requested concurrently, but the
//! loop is sequential with a pause between requests to stay under the
//! provider's rate limit. The accumulator is append-only.

use crate::config::ReviewConfig;
use crate::output::{section_heading, SectionResult, SourceCorpus};
use crate::pipeline::generate::generate_section;
use crate::pipeline::llm::{GenerationOptions, TextGenerator};
use crate::prompts::SectionSpec;
use tracing::{debug, info};

/// Markdown plus the per-section results it was built from.
#[derive(Debug, Clone)]
pub struct AssembledReview {
    pub markdown: String,
    pub sections: Vec<SectionResult>,
}

/// The title line that opens every review.
pub fn title_line(title: &str) -> String {
    format!("# {title}\n\n")
}

/// Append one section block to the accumulator.
pub fn push_section(markdown: &mut String, title: &str, body: &str) {
    markdown.push_str(&section_heading(title));
    markdown.push_str(body);
}

/// Generate every section in order and concatenate them under `title`.
///
/// Never fails: a failed section contributes its error placeholder.
pub async fn assemble_review<G: TextGenerator>(
    generator: &G,
    sections: &[SectionSpec],
    corpus: &SourceCorpus,
    title: &str,
    options: &GenerationOptions,
    config: &ReviewConfig,
) -> AssembledReview {
    let total = sections.len();
    let mut markdown = title_line(title);
    let mut results = Vec::with_capacity(total);

    for (idx, section) in sections.iter().enumerate() {
        info!("Writing section {}/{}: {}", idx + 1, total, section.title);
        if let Some(ref cb) = config.progress_callback {
            cb.on_section_start(idx, total, section.title);
        }

        let result = generate_section(
            generator,
            idx,
            section,
            &config.topic,
            &corpus.text,
            config.max_corpus_chars,
            options,
        )
        .await;

        push_section(&mut markdown, &result.title, &result.render());

        if let Some(ref cb) = config.progress_callback {
            match result.outcome {
                Ok(ref text) => cb.on_section_complete(idx, total, section.title, text.len()),
                Err(ref e) => cb.on_section_error(idx, total, section.title, &e.to_string()),
            }
        }
        results.push(result);

        if idx + 1 < total && !config.section_delay.is_zero() {
            debug!("Pausing {:?} before next section", config.section_delay);
            tokio::time::sleep(config.section_delay).await;
        }
    }

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_review_complete(total, succeeded);
    }

    AssembledReview {
        markdown,
        sections: results,
    }
}
