//! Pipeline stages for MCQ generation.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ encode ──▶ llm ──▶ postprocess ──▶ parse
//! (URL/path) (lopdf/zip) (base64)  (LLM)    (cleanup)      (McqBatch)
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local file
//!    and classify it as PDF, DOCX or TXT
//! 2. [`extract`]: pull text and embedded images; CPU-bound, so callers run
//!    it in `spawn_blocking`
//! 3. [`encode`]: base64-wrap each image for the multimodal request body
//! 4. [`llm`]: the model call with retry/backoff; the only stage with
//!    network I/O besides URL download
//! 5. [`postprocess`]: deterministic cleanup of model quirks (fences,
//!    emphasised labels, numbered block markers)
//! 6. [`parse`]: the `## MCQ` markup grammar

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod parse;
pub mod postprocess;
