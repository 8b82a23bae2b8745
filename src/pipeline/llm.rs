//! Model interaction: build the generation request and call the provider.
//!
//! Prompt wording lives in [`crate::prompts`]; this module owns message
//! layout, retries and the mapping of failures onto [`McqError`].
//!
//! ## Retry Strategy
//!
//! Exponential backoff `retry_backoff_ms * 2^(attempt-1)`: with 500 ms base
//! and 3 retries the waits are 500 ms → 1 s → 2 s.

use crate::config::GenerationConfig;
use crate::error::McqError;
use crate::prompts::{build_user_prompt, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// What the model sent back.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Raw response text, before cleanup.
    pub markup: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Failed attempts before the successful one.
    pub retries: u32,
    pub duration_ms: u64,
}

/// Ask the model for MCQs about `content`.
///
/// ## Message Layout
///
/// 1. **System message**: the generator role (or the configured override)
/// 2. **User message**: instructions, document text and output format, with
///    any embedded images attached
pub async fn request_mcqs(
    provider: &Arc<dyn LLMProvider>,
    content: &str,
    images: Vec<ImageData>,
    config: &GenerationConfig,
) -> Result<ModelReply, McqError> {
    let start = Instant::now();
    let messages = build_messages(content, images, config);
    let options = build_options(config);

    info!(
        "Requesting {} {} MCQs ({} chars of content)",
        config.num_questions,
        config.difficulty,
        content.chars().count()
    );

    let (response, retries) = with_retries(config.max_retries, config.retry_backoff_ms, || {
        provider.chat(&messages, Some(&options))
    })
    .await
    .map_err(|detail| McqError::GenerationFailed {
        retries: config.max_retries,
        detail,
    })?;

    let duration = start.elapsed();
    debug!(
        "{} input tokens, {} output tokens, {:?}",
        response.prompt_tokens, response.completion_tokens, duration
    );

    if response.content.trim().is_empty() {
        return Err(McqError::EmptyResponse);
    }

    Ok(ModelReply {
        markup: response.content,
        input_tokens: response.prompt_tokens,
        output_tokens: response.completion_tokens,
        retries,
        duration_ms: duration.as_millis() as u64,
    })
}

fn build_messages(
    content: &str,
    images: Vec<ImageData>,
    config: &GenerationConfig,
) -> Vec<ChatMessage> {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let user = build_user_prompt(
        content,
        config.num_questions,
        config.difficulty,
        !images.is_empty(),
    );
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(&user, images),
    ]
}

/// Build `CompletionOptions` from the generation config.
fn build_options(config: &GenerationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Run `op` until it succeeds or `max_retries` retries are spent.
///
/// Returns the value and the number of failed attempts before it, or the
/// last error message.
async fn with_retries<T, E, F, Fut>(
    max_retries: u32,
    backoff_ms: u64,
    mut op: F,
) -> Result<(T, u32), String>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_err = String::from("Unknown error");

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = backoff_ms.saturating_mul(2u64.saturating_pow(attempt - 1));
            warn!("Retry {}/{} after {}ms", attempt, max_retries, backoff);
            sleep(Duration::from_millis(backoff)).await;
        }

        match op().await {
            Ok(value) => return Ok((value, attempt)),
            Err(e) => {
                last_err = e.to_string();
                warn!("Attempt {} failed: {}", attempt + 1, last_err);
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn build_options_defaults() {
        let config = GenerationConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.4));
        assert_eq!(opts.max_tokens, Some(8192));
    }

    #[test]
    fn messages_are_system_then_user() {
        let config = GenerationConfig::default();
        let messages = build_messages("Cells divide.", vec![], &config);
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let (value, retries) = with_retries(3, 1, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("503 overloaded")
                } else {
                    Ok("done")
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, "done");
        assert_eq!(retries, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let err = with_retries(2, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("bad key") }
        })
        .await
        .unwrap_err();
        assert_eq!(err, "bad key");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
