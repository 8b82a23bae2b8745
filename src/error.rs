//! Error types for the edgequake-mcq library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`McqError`] is **fatal**: nothing useful can be produced (bad input
//!   file, no extractable text, provider not configured, model call failed).
//!   Returned as `Err(McqError)` from the top-level `generate*` functions.
//!
//! * [`RenderError`] is **non-fatal**: one output artifact (TXT, PDF or DOCX)
//!   could not be produced. Stored inside [`crate::output::ArtifactReport`]
//!   so the other two artifacts are still delivered and the caller decides
//!   whether partial output is acceptable.
//!
//! Parse problems are neither: malformed blocks are skipped and logged.

use crate::render::ArtifactFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-mcq library.
#[derive(Debug, Error)]
pub enum McqError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// The file extension is not one of pdf, docx, txt.
    #[error("Unsupported file format '.{extension}' for '{path}'\nAllowed formats: PDF, TXT, DOCX")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document could not be opened or decoded.
    #[error("Could not extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The document was read but contains no text.
    #[error("Could not extract text from '{path}': document is empty")]
    EmptyDocument { path: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every attempt at the model call failed.
    #[error("Failed to generate MCQs after {retries} retries: {detail}")]
    GenerationFailed { retries: u32, detail: String },

    /// The model answered with nothing.
    #[error("The model returned an empty response; no MCQs generated")]
    EmptyResponse,

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// At least one artifact failed.
    ///
    /// Returned by [`crate::output::GenerationOutput::into_result`] when
    /// the caller wants to treat any artifact failure as an error.
    #[error("{} of {total} artifacts failed: {}", .failed.len(), .failed.join(", "))]
    ArtifactsFailed { failed: Vec<String>, total: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure to produce one artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be assembled in the target format.
    #[error("Failed to generate {format}: {detail}")]
    Layout {
        format: ArtifactFormat,
        detail: String,
    },

    /// The artifact was rendered but could not be written.
    #[error("Failed to write {format} file '{path}': {source}")]
    WriteFailed {
        format: ArtifactFormat,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer task panicked or was cancelled.
    #[error("{format} renderer task failed: {detail}")]
    TaskFailed {
        format: ArtifactFormat,
        detail: String,
    },
}

impl RenderError {
    /// Which artifact this failure belongs to.
    pub fn format(&self) -> ArtifactFormat {
        match self {
            RenderError::Layout { format, .. }
            | RenderError::WriteFailed { format, .. }
            | RenderError::TaskFailed { format, .. } => *format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_failed_display() {
        let e = McqError::ArtifactsFailed {
            failed: vec!["PDF".into(), "DOCX".into()],
            total: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("2 of 3"), "got: {msg}");
        assert!(msg.contains("PDF, DOCX"), "got: {msg}");
    }

    #[test]
    fn unsupported_format_lists_allowed() {
        let e = McqError::UnsupportedFormat {
            path: "notes.odt".into(),
            extension: "odt".into(),
        };
        assert!(e.to_string().contains("PDF, TXT, DOCX"));
    }

    #[test]
    fn render_error_knows_its_format() {
        let e = RenderError::WriteFailed {
            format: ArtifactFormat::Docx,
            path: "out.docx".into(),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(e.format(), ArtifactFormat::Docx);
        assert!(e.to_string().contains("disk full"));
        assert!(e.to_string().contains("DOCX"));
    }
}
