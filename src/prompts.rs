//! Section plan and prompt templates.
//!
//! All prompt text lives here so it can be changed without touching the
//! request or assembly logic, and so tests can inspect it directly.
//!
//! Every section prompt has the same shape:
//!
//! ```text
//! framing sentence (topic)
//! task line (section title)
//! [Source papers] truncated corpus
//! [Writing requirements] four fixed clauses
//! [Section instructions] section-specific instruction
//! closing line (section title)
//! ```

use serde::Serialize;

/// One fixed thematic division of the review.
///
/// `instruction` may contain a `{topic}` placeholder, replaced when the
/// prompt is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionSpec {
    pub title: &'static str,
    pub instruction: &'static str,
}

/// Number of sections in every review.
pub const SECTION_COUNT: usize = 5;

/// The ordered section plan. Order here is the order in the document.
pub const DEFAULT_SECTIONS: [SectionSpec; SECTION_COUNT] = [
    SectionSpec {
        title: "Chapter 1: Research Background and Origins",
        instruction: "Explain in detail the origins of {topic} and the motivations behind its \
development. Analyse how the underlying techniques migrated from earlier technologies into \
their current form. Describe the concrete application requirements that drive the field in \
its major industrial and scientific domains.",
    },
    SectionSpec {
        title: "Chapter 2: Evolution of Key Techniques",
        instruction: "Trace the technical breakthroughs in {topic} along a detailed timeline. \
Divide it into an emergence period, a growth period, a maturity period and the recent \
AI-driven period. For each period, analyse the representative methods and algorithms in \
depth.",
    },
    SectionSpec {
        title: "Chapter 3: In-Depth Comparison of Mainstream Methods",
        instruction: "This is the core chapter; give it the most space. Classify the mainstream \
methods of {topic} into their principal families. For each method, explain its mathematical \
principles, its design strategy and how it controls error, then compare strengths and \
weaknesses in a table.",
    },
    SectionSpec {
        title: "Chapter 4: Open Research Gaps and Technical Bottlenecks",
        instruction: "Based on the literature, analyse the unsolved problems in {topic}, such as \
accuracy under demanding operating conditions, coordination and synchronisation issues, and \
the tension between real-time performance and computational cost. List at least 5 key pain \
points and discuss each in detail.",
    },
    SectionSpec {
        title: "Chapter 5: Future Trends and Conclusion",
        instruction: "Combining emerging technologies such as artificial intelligence and \
digital twins, forecast the direction of {topic} over the next 5-10 years. Discuss the \
potential of deep learning in this area. Finish with a conclusion summarising the whole \
review.",
    },
];

/// The four fixed writing requirements shared by every section.
pub const WRITING_REQUIREMENTS: &str = "\
1. **Length**: this part must be extremely detailed and as long as possible; write at least 2000 words.
2. **Depth**: do not stay on the surface; go down to mathematical principles, concrete algorithm steps and parameter comparisons.
3. **Citations**: include many citations, formatted as (Author, Year).
4. **Format**: use Markdown with multi-level headings.";

/// Build the single prompt for one section.
///
/// `corpus_excerpt` must already be truncated; see
/// [`crate::pipeline::generate::truncate_corpus`].
pub fn build_section_prompt(topic: &str, section: &SectionSpec, corpus_excerpt: &str) -> String {
    let instruction = section.instruction.replace("{topic}", topic);
    format!(
        "You are a rigorous academic researcher. We are writing a very long literature review \
on \"{topic}\".\n\
\n\
Current task: write **only** the part titled [{title}].\n\
\n\
[Source papers]\n\
{corpus_excerpt}\n\
(Note: synthesise the literature above; do not fabricate content.)\n\
\n\
[Writing requirements]\n\
{WRITING_REQUIREMENTS}\n\
\n\
[Section instructions]\n\
{instruction}\n\
\n\
Begin writing [{title}]:\n",
        title = section.title,
    )
}
