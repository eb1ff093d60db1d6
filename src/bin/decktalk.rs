//! CLI binary for decktalk.
//!
//! A thin shim over the library crate: maps flags to `NarrationConfig`,
//! runs the narrator on a background task, and renders the run's event
//! channel as a live progress bar. Ctrl-C flips the cooperative cancel
//! flag instead of killing the process, so temp files are cleaned up and
//! partially narrated runs still report how far they got.

use anyhow::{Context, Result};
use clap::Parser;
use decktalk::{
    NarrationConfig, Narrator, RetryPolicy, RunControls, RunEvent, RunState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Narrate a deck (report + guide land next to the PDF)
  decktalk pitch.pdf --context "Series A pitch for a logistics startup"

  # Read the project context from a file
  decktalk pitch.pdf --context-file brief.txt

  # Quick preview: first 5 slides, no guide
  decktalk pitch.pdf --preview 5 --no-guide

  # Use a specific model
  decktalk --model gpt-4o --provider openai deck.pdf

  # Structured JSON output for scripting
  decktalk --json deck.pdf > run.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  DECKTALK_LLM_PROVIDER   Override provider (openai, anthropic, gemini, ollama)
  DECKTALK_MODEL          Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Narrate:         decktalk deck.pdf --context "what this deck is for"
"#;

/// Narrate PDF slide decks with Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "decktalk",
    version,
    about = "Turn a PDF slide deck into a narrated walkthrough and presenter guide",
    long_about = "Rasterises each slide of a PDF deck, narrates the visual ones with a Vision \
Language Model while accumulating context across slides, and writes a text report plus an \
illustrated presenter guide. Supports OpenAI, Anthropic, Google Gemini, and any \
OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF slide deck.
    input: PathBuf,

    /// Free-text project context embedded in every narration prompt.
    #[arg(short, long, env = "DECKTALK_CONTEXT")]
    context: Option<String>,

    /// Read the project context from a text file instead.
    #[arg(long, conflicts_with = "context")]
    context_file: Option<PathBuf>,

    /// Directory for the report and guide (default: next to the deck).
    #[arg(short, long, env = "DECKTALK_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4o-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "DECKTALK_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "DECKTALK_PROVIDER")]
    provider: Option<String>,

    /// Preview mode: narrate only the first N slides, paced 2s apart.
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Skip the illustrated presenter guide.
    #[arg(long, env = "DECKTALK_NO_GUIDE")]
    no_guide: bool,

    /// Maximum input deck size in MB.
    #[arg(long, env = "DECKTALK_MAX_SIZE_MB", default_value_t = 50)]
    max_size_mb: u64,

    /// Narration attempts per page.
    #[arg(long, env = "DECKTALK_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Delay between narration attempts, in milliseconds.
    #[arg(long, env = "DECKTALK_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Per-API-call timeout in seconds.
    #[arg(long, env = "DECKTALK_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Max LLM output tokens per narration.
    #[arg(long, env = "DECKTALK_MAX_TOKENS", default_value_t = 500)]
    max_tokens: usize,

    /// Output the run result as structured JSON instead of a summary.
    #[arg(long, env = "DECKTALK_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DECKTALK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECKTALK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECKTALK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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
        .with_writer(std::io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli).await?;
    let narrator = Narrator::from_config(&config).context("Failed to configure LLM provider")?;

    let (controls, mut events) = RunControls::with_channel();

    // Ctrl-C flips the cooperative flag; the run stops between pages.
    let cancel = controls.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} finishing the current page, then stopping…", cyan("⚠"));
            cancel.store(true, Ordering::SeqCst);
        }
    });

    // ── Run on a background task, watch from here ────────────────────────
    let input = cli.input.clone();
    let run_config = config.clone();
    let worker =
        tokio::spawn(async move { narrator.run(&input, &run_config, controls).await });

    let bar = if show_progress {
        Some(spinner_bar())
    } else {
        None
    };

    while let Some(event) = events.recv().await {
        let Some(bar) = &bar else { continue };
        match event {
            RunEvent::StateChanged(RunState::Converting) => {
                bar.set_prefix("Rendering");
                bar.set_message("rasterising deck…");
            }
            RunEvent::StateChanged(RunState::Reporting) => {
                bar.set_message("writing report…");
            }
            RunEvent::PageStarted { page, total } => {
                if bar.length().unwrap_or(0) != total as u64 {
                    activate_bar(bar, total);
                }
                bar.set_message(format!("slide {page}"));
            }
            RunEvent::PageNarrated { page, total, chars } => {
                bar.println(format!(
                    "  {} Slide {:>3}/{:<3}  {}",
                    green("✓"),
                    page,
                    total,
                    dim(&format!("{chars:>5} chars")),
                ));
                bar.inc(1);
            }
            RunEvent::PageSkipped { page, total } => {
                bar.println(format!(
                    "  {} Slide {:>3}/{:<3}  {}",
                    dim("–"),
                    page,
                    total,
                    dim("skipped (text page)"),
                ));
                bar.inc(1);
            }
            RunEvent::PageFailed { page, total, error } => {
                let msg = if error.len() > 80 {
                    format!("{}\u{2026}", &error[..79])
                } else {
                    error
                };
                bar.println(format!(
                    "  {} Slide {:>3}/{:<3}  {}",
                    red("✗"),
                    page,
                    total,
                    red(&msg),
                ));
                bar.inc(1);
            }
            RunEvent::Log(message) => {
                bar.println(format!("  {}", dim(&message)));
            }
            RunEvent::Finished { state, summary } => {
                bar.finish_and_clear();
                let tick = if state == RunState::Done {
                    green("✔")
                } else {
                    red("✘")
                };
                eprintln!("{tick} {}", bold(&summary));
            }
            RunEvent::StateChanged(_) => {}
        }
    }

    let output = worker
        .await
        .context("Narration task panicked")?
        .context("Narration run failed")?;

    // ── Final output ─────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!("   report: {}", bold(&output.report_path.display().to_string()));
        if let Some(guide) = &output.guide_path {
            eprintln!("   guide:  {}", bold(&guide.display().to_string()));
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `NarrationConfig`.
async fn build_config(cli: &Cli) -> Result<NarrationConfig> {
    let project_context = if let Some(ref path) = cli.context_file {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read context from {:?}", path))?,
        )
    } else {
        cli.context.clone()
    };

    let mut builder = NarrationConfig::builder()
        .max_input_mb(cli.max_size_mb)
        .retry(RetryPolicy {
            max_attempts: cli.max_attempts.max(1),
            delay_ms: cli.retry_delay_ms,
        })
        .api_timeout_secs(cli.api_timeout)
        .max_tokens(cli.max_tokens)
        .build_guide(!cli.no_guide);

    if let Some(text) = project_context {
        builder = builder.project_context(text);
    }
    if let Some(n) = cli.preview {
        builder = builder.preview_pages(n);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }

    builder.build().context("Invalid configuration")
}

/// Initial spinner; swapped for a counting bar once the slide total is known.
fn spinner_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(spinner_style);
    bar.set_prefix("Preparing");
    bar.set_message("opening deck…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Switch to the full progress-bar style once the slide count is known.
fn activate_bar(bar: &ProgressBar, total: usize) {
    let progress_style = ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:.bold}  \
         [{bar:42.green/238}] {pos:>3}/{len} slides  \
         ⏱ {elapsed_precise}  ETA {eta_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

    bar.set_length(total as u64);
    bar.set_style(progress_style);
    bar.set_prefix("Narrating");
    bar.reset_eta();
}
