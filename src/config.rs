//! Configuration types for MCQ generation.
//!
//! Every knob lives in [`GenerationConfig`], built via
//! [`GenerationConfigBuilder`]. The config is passed by reference into each
//! entry point; nothing is read from global state.

use crate::error::McqError;
use crate::progress::ProgressCallback;
use crate::render::ArtifactFormat;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Upper bound accepted by [`GenerationConfigBuilder::build`].
pub const MAX_QUESTIONS: usize = 200;

/// Configuration for one generation run.
///
/// # Example
/// ```rust
/// use edgequake_mcq::{Difficulty, GenerationConfig};
///
/// let config = GenerationConfig::builder()
///     .num_questions(5)
///     .difficulty(Difficulty::Hard)
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.num_questions, 5);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Number of questions requested from the model. Range 1–200. Default: 10.
    ///
    /// The model may return fewer or more; every parsed block is kept.
    pub num_questions: usize,

    /// Difficulty level. Default: [`Difficulty::Medium`].
    pub difficulty: Difficulty,

    /// LLM model identifier, e.g. "gpt-4.1-mini". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini", "ollama").
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.4.
    ///
    /// Some variety helps distractors; high values drift from the source text.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    ///
    /// One MCQ block is roughly 60–120 tokens; 8192 leaves room for the
    /// 200-question ceiling on terse material.
    pub max_tokens: usize,

    /// Maximum retry attempts on a failed model call. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Attach images embedded in a PDF to the request. Default: true.
    pub include_images: bool,

    /// Cap on attached images. Default: 8.
    pub max_images: usize,

    /// Document text beyond this many characters is dropped. Default: 100 000.
    pub max_content_chars: usize,

    /// Custom system prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Directory that receives the artifacts. Created if missing. Default: `results`.
    pub output_dir: PathBuf,

    /// Artifacts to produce. Default: TXT, PDF and DOCX.
    pub formats: Vec<ArtifactFormat>,

    /// Artifact base name. If None, derived from the input file stem.
    /// Always passed through [`crate::render::secure_base_name`].
    pub base_name: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional stage-event receiver.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_questions: 10,
            difficulty: Difficulty::default(),
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
            include_images: true,
            max_images: 8,
            max_content_chars: 100_000,
            system_prompt: None,
            output_dir: PathBuf::from("results"),
            formats: ArtifactFormat::ALL.to_vec(),
            base_name: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("num_questions", &self.num_questions)
            .field("difficulty", &self.difficulty)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("include_images", &self.include_images)
            .field("max_images", &self.max_images)
            .field("max_content_chars", &self.max_content_chars)
            .field("output_dir", &self.output_dir)
            .field("formats", &self.formats)
            .field("base_name", &self.base_name)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn num_questions(mut self, n: usize) -> Self {
        self.config.num_questions = n;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.config.difficulty = difficulty;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn include_images(mut self, v: bool) -> Self {
        self.config.include_images = v;
        self
    }

    pub fn max_images(mut self, n: usize) -> Self {
        self.config.max_images = n;
        self
    }

    pub fn max_content_chars(mut self, n: usize) -> Self {
        self.config.max_content_chars = n.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Replace the artifact set. Duplicates are dropped, order is kept.
    pub fn formats(mut self, formats: impl IntoIterator<Item = ArtifactFormat>) -> Self {
        let mut unique = Vec::new();
        for f in formats {
            if !unique.contains(&f) {
                unique.push(f);
            }
        }
        self.config.formats = unique;
        self
    }

    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = Some(name.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, McqError> {
        let c = &self.config;
        if c.num_questions == 0 || c.num_questions > MAX_QUESTIONS {
            return Err(McqError::InvalidConfig(format!(
                "number of questions must be 1–{MAX_QUESTIONS}, got {}",
                c.num_questions
            )));
        }
        if c.formats.is_empty() {
            return Err(McqError::InvalidConfig(
                "at least one output format is required".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Question difficulty. Selects the extra instructions in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Basic concepts and facts, plain wording.
    Easy,
    /// Relationships between concepts, some applied questions. (default)
    #[default]
    Medium,
    /// Analysis, synthesis and problem solving.
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Capitalised name shown in the prompt.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{s}' (expected easy, medium or hard)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GenerationConfig::default();
        assert_eq!(c.num_questions, 10);
        assert_eq!(c.difficulty, Difficulty::Medium);
        assert_eq!(c.formats, ArtifactFormat::ALL.to_vec());
        assert_eq!(c.output_dir, PathBuf::from("results"));
        assert!(c.include_images);
    }

    #[test]
    fn rejects_zero_and_too_many_questions() {
        assert!(GenerationConfig::builder().num_questions(0).build().is_err());
        assert!(GenerationConfig::builder()
            .num_questions(MAX_QUESTIONS + 1)
            .build()
            .is_err());
        assert!(GenerationConfig::builder()
            .num_questions(MAX_QUESTIONS)
            .build()
            .is_ok());
    }

    #[test]
    fn rejects_empty_formats() {
        let err = GenerationConfig::builder().formats(Vec::new()).build().unwrap_err();
        assert!(matches!(err, McqError::InvalidConfig(_)));
    }

    #[test]
    fn formats_are_deduplicated() {
        let c = GenerationConfig::builder()
            .formats([ArtifactFormat::Pdf, ArtifactFormat::Text, ArtifactFormat::Pdf])
            .build()
            .unwrap();
        assert_eq!(c.formats, vec![ArtifactFormat::Pdf, ArtifactFormat::Text]);
    }

    #[test]
    fn temperature_is_clamped() {
        let c = GenerationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.label(), "Medium");
    }

    #[test]
    fn debug_hides_provider() {
        let dbg = format!("{:?}", GenerationConfig::default());
        assert!(dbg.contains("GenerationConfig"));
        assert!(dbg.contains("num_questions: 10"));
    }
}
