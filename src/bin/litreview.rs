//! CLI binary for edgequake-litreview.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReviewConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_litreview::{
    generate_review, generate_review_to_file, list_models, ModelDiscovery, ModelSource,
    ProgressCallback, ReviewConfig, ReviewProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

fn fallback_warning(reason: &str) -> String {
    format!(
        "{} Model list unavailable ({}); using fallback models",
        cyan("⚠"),
        reason
    )
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while files are read, then a five-step bar
/// with one log line per finished section.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the section currently in flight. Sections run one at a time.
    section_started: std::sync::Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Opening PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            section_started: std::sync::Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>1}/{len} sections  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Writing");
        self.bar.reset_elapsed();
    }

    fn section_elapsed(&self) -> f64 {
        self.section_started
            .lock()
            .ok()
            .and_then(|mut g| g.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ReviewProgressCallback for CliProgressCallback {
    fn on_model_discovery(&self, discovery: &ModelDiscovery) {
        match discovery.source {
            ModelSource::Fallback { ref reason } => self.bar.println(fallback_warning(reason)),
            ModelSource::Discovered => self.bar.println(format!(
                "{} {}",
                cyan("◆"),
                dim(&format!("Using model {}", discovery.default_model().unwrap_or("?")))
            )),
        }
    }

    fn on_extraction_progress(&self, files_done: usize, files_total: usize) {
        self.bar
            .set_message(format!("file {files_done}/{files_total}"));
    }

    fn on_extraction_complete(&self, files_total: usize, total_pages: usize, corpus_chars: usize) {
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("Read {files_total} files, {total_pages} pages")),
            dim(&format!("{corpus_chars} chars")),
        ));
    }

    fn on_section_start(&self, index: usize, total: usize, title: &str) {
        if index == 0 {
            self.activate_bar(total);
        }
        if let Ok(mut g) = self.section_started.lock() {
            *g = Some(Instant::now());
        }
        self.bar.set_message(title.to_string());
    }

    fn on_section_complete(&self, index: usize, total: usize, title: &str, text_len: usize) {
        let secs = self.section_elapsed();
        self.bar.println(format!(
            "  {} Section {}/{}  {:<40}  {}  {}",
            green("✓"),
            index + 1,
            total,
            title,
            dim(&format!("{text_len:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
        if index + 1 < total {
            self.bar.set_message("waiting…");
        }
    }

    fn on_section_error(&self, index: usize, total: usize, title: &str, error: &str) {
        let secs = self.section_elapsed();
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Section {}/{}  {}  {}  {}",
            red("✗"),
            index + 1,
            total,
            title,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_review_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} sections written successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} sections written  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Review a folder of papers (stdout)
  litreview papers/*.pdf

  # Write to a file, custom topic
  litreview --topic "swarm robotics" papers/*.pdf -o review.md

  # Write into a directory (creates Deep_Review.md there)
  litreview papers/*.pdf -o out/

  # Mix local files and URLs
  litreview local.pdf https://arxiv.org/pdf/1706.03762

  # Show which models the key can use
  litreview --list-models

  # Use another provider through edgequake-llm
  litreview --provider openai --model gpt-4.1 papers/*.pdf

  # JSON output with per-section results and stats
  litreview --json papers/*.pdf > review.json

SECTIONS (always in this order):
  Chapter 1: Research Background and Origins
  Chapter 2: Evolution of Key Techniques
  Chapter 3: In-Depth Comparison of Mainstream Methods
  Chapter 4: Open Research Gaps and Technical Bottlenecks
  Chapter 5: Future Trends and Conclusion

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (required unless --provider is set)
  LITREVIEW_MODEL         Model ID, e.g. models/gemini-1.5-pro
  LITREVIEW_TOPIC         Review topic
  PDFIUM_LIB_PATH         Directory containing libpdfium (default: system library)
  RUST_LOG                Override the log filter

NOTES:
  Files that cannot be read are skipped; use -v to see why.
  A failed section is replaced by a bracketed error line; the review is
  still written. Sections are requested one at a time with a pause between
  them (--section-delay-secs) to stay under rate limits.
"#;

/// Write a literature review from a set of PDF papers using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "litreview",
    version,
    about = "Write a Markdown literature review from PDF papers using an LLM",
    long_about = "Extract the text of every PDF given (local files or URLs), then ask an LLM \
to write a five-chapter literature review on a topic, one chapter per request. The chapters \
are concatenated under a single title into one Markdown document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file paths or HTTP/HTTPS URLs.
    #[arg(required_unless_present = "list_models")]
    inputs: Vec<String>,

    /// Write Markdown to this file (or into this directory) instead of stdout.
    #[arg(short, long, env = "LITREVIEW_OUTPUT")]
    output: Option<PathBuf>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID (e.g. models/gemini-1.5-pro). Discovered if not set.
    #[arg(long, env = "LITREVIEW_MODEL")]
    model: Option<String>,

    /// edgequake-llm provider instead of the built-in Gemini client:
    /// openai, anthropic, ollama, azure, ...
    #[arg(long, env = "LITREVIEW_PROVIDER")]
    provider: Option<String>,

    /// Subject of the review, inserted into every section prompt.
    #[arg(long, env = "LITREVIEW_TOPIC")]
    topic: Option<String>,

    /// Document title. Default: "A Review of Research on <topic>".
    #[arg(long, env = "LITREVIEW_TITLE")]
    title: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "LITREVIEW_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max output tokens per section. Default: the model's own limit.
    #[arg(long, env = "LITREVIEW_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Corpus characters embedded in each prompt.
    #[arg(long, env = "LITREVIEW_MAX_CORPUS_CHARS", default_value_t = 50_000)]
    max_corpus_chars: usize,

    /// Pause between section requests, in seconds.
    #[arg(long, env = "LITREVIEW_SECTION_DELAY", default_value_t = 5)]
    section_delay_secs: u64,

    /// Substring a discovered model name must contain.
    #[arg(long, default_value = "gemini")]
    model_filter: String,

    /// Gemini API base URL.
    #[arg(long, env = "LITREVIEW_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Per-section LLM call timeout in seconds.
    #[arg(long, env = "LITREVIEW_API_TIMEOUT", default_value_t = 300)]
    api_timeout: u64,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "LITREVIEW_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// List the models available to the key and exit.
    #[arg(long)]
    list_models: bool,

    /// Print structured JSON (ReviewDocument) to stdout instead of Markdown.
    #[arg(long, conflicts_with = "output")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "LITREVIEW_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LITREVIEW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LITREVIEW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_models;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-models mode ─────────────────────────────────────────────────
    if cli.list_models {
        let config = build_config(&cli, None)?;
        let discovery = list_models(&config)
            .await
            .context("Failed to list models")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&discovery).context("Failed to serialise models")?
            );
        } else {
            if let ModelSource::Fallback { ref reason } = discovery.source {
                eprintln!("{}", fallback_warning(reason));
            }
            for m in &discovery.models {
                println!("{m}");
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReviewProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let (written, stats) = generate_review_to_file(&cli.inputs, output_path, &config)
            .await
            .context("Review generation failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} sections  {} pages  {}ms  →  {}",
                if stats.sections_failed == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.sections_succeeded,
                stats.sections_succeeded + stats.sections_failed,
                stats.total_pages,
                stats.total_duration_ms,
                bold(&written.display().to_string()),
            );
            if stats.files_skipped > 0 {
                eprintln!(
                    "   {} of {} files skipped (unreadable)",
                    red(&stats.files_skipped.to_string()),
                    stats.files_total
                );
            }
        }
    } else {
        let review = generate_review(&cli.inputs, &config)
            .await
            .context("Review generation failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&review).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(review.markdown.as_bytes())
                .context("Failed to write to stdout")?;
            if !review.markdown.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Wrote {}/{} sections from {} pages in {}ms (model {})",
                review.stats.sections_succeeded,
                review.sections.len(),
                review.stats.total_pages,
                review.stats.total_duration_ms,
                review.model
            );
            if review.stats.files_skipped > 0 {
                eprintln!("  {} files skipped", review.stats.files_skipped);
            }
        } else if !cli.quiet && !cli.json {
            eprintln!(
                "   {} pages  /  {} of {} corpus chars used  /  {}ms total",
                dim(&review.stats.total_pages.to_string()),
                dim(&review.stats.corpus_chars_used.to_string()),
                review.stats.corpus_chars,
                review.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ReviewConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReviewConfig> {
    let mut builder = ReviewConfig::builder()
        .temperature(cli.temperature)
        .max_corpus_chars(cli.max_corpus_chars)
        .section_delay(Duration::from_secs(cli.section_delay_secs))
        .model_filter(cli.model_filter.clone())
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref topic) = cli.topic {
        builder = builder.topic(topic.clone());
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_map_to_config() {
        let cli = Cli::try_parse_from(["litreview", "a.pdf", "b.pdf"]).unwrap();
        assert_eq!(cli.inputs, vec!["a.pdf", "b.pdf"]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.max_corpus_chars, 50_000);
        assert_eq!(config.section_delay, Duration::from_secs(5));
        assert_eq!(config.model_filter, "gemini");
    }

    #[test]
    fn list_models_needs_no_inputs() {
        let cli = Cli::try_parse_from(["litreview", "--list-models"]).unwrap();
        assert!(cli.inputs.is_empty());
        assert!(cli.list_models);
    }

    #[test]
    fn inputs_required_otherwise() {
        assert!(Cli::try_parse_from(["litreview", "--json"]).is_err());
    }

    #[test]
    fn json_and_output_are_exclusive() {
        let err = Cli::try_parse_from(["litreview", "--json", "-o", "out.md", "a.pdf"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(Cli::try_parse_from(["litreview", "--json", "a.pdf"]).is_ok());
    }

    #[test]
    fn topic_and_delay_flags() {
        let cli = Cli::try_parse_from([
            "litreview",
            "--topic",
            "swarm robotics",
            "--section-delay-secs",
            "0",
            "x.pdf",
        ])
        .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.topic, "swarm robotics");
        assert!(config.section_delay.is_zero());
    }
}
