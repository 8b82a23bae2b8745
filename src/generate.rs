//! Generation entry points.
//!
//! ```text
//! generate:             input ─▶ extract ─▶ encode ─▶ llm ─▶ postprocess ─▶ parse ─▶ render_batch
//! generate_from_markup:                                       postprocess ─▶ parse ─▶ render_batch
//! ```
//!
//! Fatal problems come back as `Err(McqError)`. Artifact failures do not:
//! they are reported per format in [`GenerationOutput::artifacts`]; call
//! [`GenerationOutput::into_result`] to treat them as fatal.

use crate::config::GenerationConfig;
use crate::error::McqError;
use crate::model::McqBatch;
use crate::output::{ArtifactReport, GenerationOutput, GenerationStats};
use crate::pipeline::extract::{self, DocumentContent, ExtractOptions};
use crate::pipeline::{encode, input, llm, parse, postprocess};
use crate::render::{self, secure_base_name};
use edgequake_llm::{ImageData, LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate MCQs from a PDF, DOCX or TXT file (path or URL) and write the
/// configured artifacts.
///
/// # Errors
/// Returns `Err(McqError)` only for fatal errors:
/// - file not found / unsupported format / download failure
/// - no extractable text
/// - provider not configured, or every model attempt failed
/// - the output directory cannot be created
pub async fn generate(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, McqError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting generation: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let base_name = artifact_base_name(config, resolved.path());

    // ── Step 2: Extract ──────────────────────────────────────────────────
    let extract_start = Instant::now();
    let content = extract_blocking(resolved.path(), resolved.kind(), config).await?;
    if content.text.trim().is_empty() {
        return Err(McqError::EmptyDocument {
            path: resolved.path().to_path_buf(),
        });
    }
    let extraction_ms = extract_start.elapsed().as_millis() as u64;

    let (text, truncated) = truncate_chars(&content.text, config.max_content_chars);
    if truncated {
        warn!(
            "Document text truncated to {} characters",
            config.max_content_chars
        );
    }
    let images = encode_images(&content);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(text.chars().count(), images.len());
    }

    // ── Step 3: Model call ───────────────────────────────────────────────
    let provider = resolve_provider(config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(config.num_questions);
    }
    let images_attached = images.len();
    let reply = llm::request_mcqs(&provider, text, images, config).await?;

    // ── Step 4: Clean and parse ──────────────────────────────────────────
    let markup = postprocess::clean_markup(&reply.markup);
    let batch = parse_batch(&markup, config);

    // ── Step 5: Render ───────────────────────────────────────────────────
    let render_start = Instant::now();
    let artifacts = render_batch(batch.clone(), &base_name, config).await?;

    let stats = GenerationStats {
        document_chars: text.chars().count(),
        truncated,
        page_count: content.page_count,
        images_attached,
        input_tokens: reply.input_tokens,
        output_tokens: reply.output_tokens,
        retries: reply.retries,
        records: batch.len(),
        extraction_ms,
        generation_ms: reply.duration_ms,
        render_ms: render_start.elapsed().as_millis() as u64,
        total_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Generation complete: {} questions, {} artifacts, {}ms total",
        stats.records,
        artifacts.iter().filter(|a| a.is_ok()).count(),
        stats.total_ms
    );

    Ok(GenerationOutput {
        batch,
        markup,
        artifacts,
        stats,
    })
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, McqError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| McqError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input_str, config))
}

/// Render markup that was produced elsewhere. No model is called.
///
/// `base_name` is used unless `config.base_name` is set.
pub async fn generate_from_markup(
    markup: &str,
    base_name: &str,
    config: &GenerationConfig,
) -> Result<GenerationOutput, McqError> {
    let start = Instant::now();
    let markup = postprocess::clean_markup(markup);
    let batch = parse_batch(&markup, config);

    let base = secure_base_name(config.base_name.as_deref().unwrap_or(base_name));
    let artifacts = render_batch(batch.clone(), &base, config).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let stats = GenerationStats {
        records: batch.len(),
        render_ms: elapsed,
        total_ms: elapsed,
        ..Default::default()
    };
    Ok(GenerationOutput {
        batch,
        markup,
        artifacts,
        stats,
    })
}

/// Write `batch` in every configured format into `config.output_dir`.
///
/// Creates the directory if needed. Only a directory failure is fatal;
/// renderer failures come back inside the reports.
pub async fn render_batch(
    batch: McqBatch,
    base_name: &str,
    config: &GenerationConfig,
) -> Result<Vec<ArtifactReport>, McqError> {
    let dir = &config.output_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| McqError::OutputDirFailed {
            path: dir.clone(),
            source,
        })?;

    let reports = render::render_all(Arc::new(batch), &config.formats, dir, base_name).await;

    if let Some(ref cb) = config.progress_callback {
        for report in &reports {
            match &report.result {
                Ok(path) => cb.on_artifact_complete(report.format, path),
                Err(e) => cb.on_artifact_error(report.format, &e.to_string()),
            }
        }
    }
    Ok(reports)
}

/// Extract text and images without calling a model.
///
/// Does not require an LLM provider or API key.
pub async fn extract_document(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<DocumentContent, McqError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    extract_blocking(resolved.path(), resolved.kind(), config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn extract_blocking(
    path: &Path,
    kind: input::DocumentKind,
    config: &GenerationConfig,
) -> Result<DocumentContent, McqError> {
    let path = path.to_path_buf();
    let opts = ExtractOptions {
        include_images: config.include_images,
        max_images: config.max_images,
    };
    tokio::task::spawn_blocking(move || extract::extract(&path, kind, opts))
        .await
        .map_err(|e| McqError::Internal(format!("Extraction task failed: {}", e)))?
}

fn parse_batch(markup: &str, config: &GenerationConfig) -> McqBatch {
    let batch = McqBatch::stamped_now(parse::parse_records(markup));
    if batch.is_empty() {
        warn!("No MCQ blocks found in the model output");
    } else if batch.len() != config.num_questions {
        debug!(
            "Requested {} questions, parsed {}",
            config.num_questions,
            batch.len()
        );
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(batch.len());
    }
    batch
}

fn encode_images(content: &DocumentContent) -> Vec<ImageData> {
    content
        .images
        .iter()
        .filter_map(|img| match encode::encode_image(img) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Skipping image on page {}: {}", img.page(), e);
                None
            }
        })
        .collect()
}

fn artifact_base_name(config: &GenerationConfig, path: &Path) -> String {
    let stem = config
        .base_name
        .clone()
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_default();
    secure_base_name(&stem)
}

/// The first `max` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((byte, _)) => (&text[..byte], true),
        None => (text, false),
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, McqError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        McqError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    then `OPENAI_API_KEY` if present.
/// 4. **Full auto-detection** (`ProviderFactory::from_env`).
pub async fn resolve_provider(
    config: &GenerationConfig,
) -> Result<Arc<dyn LLMProvider>, McqError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| McqError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
