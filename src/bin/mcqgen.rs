//! CLI binary for edgequake-mcq.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints the written artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_mcq::{
    generate, generate_from_markup, ArtifactFormat, Difficulty, GenerationConfig,
    GenerationOutput, GenerationProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the pipeline stages and logs one line per
/// artifact.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style =
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Reading");
        bar.set_message("Extracting document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_extraction_complete(&self, chars: usize, images: usize) {
        self.bar.println(format!(
            "  {} Extracted  {}",
            green("✓"),
            dim(&format!("{chars} chars, {images} images")),
        ));
    }

    fn on_generation_start(&self, num_questions: usize) {
        self.bar.set_prefix("Generating");
        self.bar.set_message(format!("asking the model for {num_questions} MCQs…"));
    }

    fn on_generation_complete(&self, records: usize) {
        let mark = if records == 0 { red("✗") } else { green("✓") };
        self.bar.println(format!("  {} Parsed     {}", mark, dim(&format!("{records} questions"))));
        self.bar.set_prefix("Rendering");
        self.bar.set_message("TXT, PDF, DOCX…");
    }

    fn on_artifact_complete(&self, format: ArtifactFormat, path: &Path) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            green("✓"),
            format.to_string(),
            dim(&path.display().to_string()),
        ));
    }

    fn on_artifact_error(&self, format: ArtifactFormat, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<10} {}", red("✗"), format.to_string(), red(&msg)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 10 medium questions, all formats into ./results
  mcqgen lecture.pdf

  # 25 hard questions, PDF only, custom directory
  mcqgen -n 25 --difficulty hard --formats pdf -o quizzes notes.docx

  # From a URL, with a specific model
  mcqgen --provider openai --model gpt-4.1 https://example.org/chapter3.pdf

  # Re-render markup saved earlier (no API key needed)
  mcqgen --from-markup saved.txt --base-name chapter3

  # Machine-readable result
  mcqgen --json notes.txt > result.json

OUTPUT:
  <dir>/generated_mcqs_<base>.txt    plain text, "Generated on:" header
  <dir>/generated_mcqs_<base>.pdf    correct option in bold green
  <dir>/generated_mcqs_<base>.docx   correct option in bold green

  The exit code is non-zero if any requested artifact could not be written.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, e.g. edgequake_mcq=debug
"#;

/// Generate multiple-choice questions from PDF, DOCX and TXT documents.
#[derive(Parser, Debug)]
#[command(
    name = "mcqgen",
    version,
    about = "Generate multiple-choice questions from PDF, DOCX and TXT documents",
    long_about = "Extract the text of a PDF, DOCX or TXT document (local file or URL), ask an LLM \
for multiple-choice questions, and write them as TXT, PDF and DOCX files. Supports OpenAI, \
Anthropic, Google Gemini, Azure OpenAI and any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local .pdf/.docx/.txt path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "from_markup")]
    input: Option<String>,

    /// Number of questions to request (1–200).
    #[arg(short = 'n', long, env = "MCQGEN_NUM_QUESTIONS", default_value_t = 10,
          value_parser = clap::value_parser!(u16).range(1..=200))]
    num_questions: u16,

    /// Question difficulty.
    #[arg(long, env = "MCQGEN_DIFFICULTY", value_enum, default_value = "medium")]
    difficulty: DifficultyArg,

    /// Directory for the generated files.
    #[arg(short, long, env = "MCQGEN_OUTPUT_DIR", default_value = "results")]
    output_dir: PathBuf,

    /// Base name for the generated files (default: input file stem).
    #[arg(long, env = "MCQGEN_BASE_NAME")]
    base_name: Option<String>,

    /// Comma-separated output formats: txt, pdf, docx.
    #[arg(long, env = "MCQGEN_FORMATS", value_delimiter = ',',
          default_value = "txt,pdf,docx", value_parser = parse_format)]
    formats: Vec<ArtifactFormat>,

    /// LLM model ID (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MCQGEN_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "MCQGEN_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Retries on LLM failure.
    #[arg(long, env = "MCQGEN_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Do not attach images embedded in PDFs to the request.
    #[arg(long, env = "MCQGEN_NO_IMAGES")]
    no_images: bool,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "MCQGEN_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Render MCQ markup from this file instead of calling a model.
    #[arg(long, conflicts_with = "input")]
    from_markup: Option<PathBuf>,

    /// Print the result (questions, artifact paths, stats) as JSON on stdout.
    #[arg(long, env = "MCQGEN_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "MCQGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MCQGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MCQGEN_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MCQGEN_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(v: DifficultyArg) -> Self {
        match v {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

fn parse_format(s: &str) -> Result<ArtifactFormat, String> {
    ArtifactFormat::from_extension(s)
        .ok_or_else(|| format!("unknown format '{s}' (expected txt, pdf or docx)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback that matters; keep INFO logs out of it.
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
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        progress.clone().map(|cb| cb as Arc<dyn GenerationProgressCallback>),
    )
    .await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match (&cli.from_markup, &cli.input) {
        (Some(markup_path), _) => {
            let markup = tokio::fs::read_to_string(markup_path)
                .await
                .with_context(|| format!("Failed to read markup from {:?}", markup_path))?;
            let stem = markup_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            generate_from_markup(&markup, &stem, &config).await
        }
        (None, Some(input)) => generate(input, &config).await,
        (None, None) => anyhow::bail!("an INPUT document or --from-markup is required"),
    };

    if let Some(ref cb) = progress {
        cb.finish();
    }
    let output = result.context("Generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        for (_, path) in output.written() {
            println!("{}", path.display());
        }
        if !cli.quiet {
            print_summary(&output);
        }
    }

    output.into_result().context("Some artifacts could not be written")?;
    Ok(())
}

fn print_summary(output: &GenerationOutput) {
    let stats = &output.stats;
    let failed = output.failed().len();
    eprintln!(
        "{}  {} questions  {}/{} files  {}ms",
        if failed == 0 { green("✔") } else { cyan("⚠") },
        bold(&stats.records.to_string()),
        output.artifacts.len() - failed,
        output.artifacts.len(),
        stats.total_ms,
    );
    if stats.input_tokens + stats.output_tokens > 0 {
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.input_tokens.to_string()),
            dim(&stats.output_tokens.to_string()),
        );
    }
    for report in output.failed() {
        if let Some(e) = report.error() {
            eprintln!("   {} {}", red("✗"), e);
        }
    }
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = GenerationConfig::builder()
        .num_questions(cli.num_questions as usize)
        .difficulty(cli.difficulty.clone().into())
        .output_dir(&cli.output_dir)
        .formats(cli.formats.iter().copied())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .include_images(!cli.no_images)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref name) = cli.base_name {
        builder = builder.base_name(name);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
