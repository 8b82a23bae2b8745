//! # edgequake-mcq
//!
//! Generate multiple-choice questions from study material with an LLM and
//! deliver them as TXT, PDF and DOCX files.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / DOCX / TXT
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Extract   text (+ embedded PDF images), spawn_blocking
//!  ├─ 3. Encode    images → base64 ImageData
//!  ├─ 4. LLM       one request, retried with backoff
//!  ├─ 5. Polish    strip fences / stray emphasis from the markup
//!  ├─ 6. Parse     "## MCQ" blocks → McqBatch
//!  └─ 7. Render    TXT, PDF, DOCX concurrently, atomic writes
//! ```
//!
//! The model answers in a small line-oriented markup:
//!
//! ```text
//! ## MCQ
//! Question: What is 2+2?
//! A) 3
//! B) 4
//! C) 5
//! D) 6
//! Correct Answer: B
//! ```
//!
//! Parsing never fails: blocks that cannot be read are skipped and missing
//! answers render as `None`. The option whose line starts with the answer
//! label followed by `)` is highlighted in green in the PDF and DOCX.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_mcq::{generate, Difficulty, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = GenerationConfig::builder()
//!         .num_questions(5)
//!         .difficulty(Difficulty::Hard)
//!         .build()?;
//!     let output = generate("lecture.pdf", &config).await?.into_result()?;
//!     for (format, path) in output.written() {
//!         println!("{format}: {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Already have markup? Skip the model entirely:
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), edgequake_mcq::McqError> {
//! use edgequake_mcq::{generate_from_markup, GenerationConfig};
//!
//! let markup = std::fs::read_to_string("mcqs.txt").unwrap_or_default();
//! let output = generate_from_markup(&markup, "mcqs", &GenerationConfig::default()).await?;
//! println!("{} questions", output.batch.len());
//! # Ok(()) }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mcqgen` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! edgequake-mcq = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Difficulty, GenerationConfig, GenerationConfigBuilder};
pub use error::{McqError, RenderError};
pub use generate::{
    extract_document, generate, generate_from_markup, generate_sync, render_batch,
    resolve_provider,
};
pub use model::{McqBatch, McqRecord, OptionLine};
pub use output::{ArtifactReport, GenerationOutput, GenerationStats};
pub use pipeline::parse::parse;
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::{secure_base_name, ArtifactFormat};
