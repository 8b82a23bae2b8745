//! Artifact renderers: [`McqBatch`] → TXT, PDF and DOCX files.
//!
//! Each renderer is a pure function of the batch:
//!
//! ```text
//!                 ┌─▶ text::render_text  ──▶ generated_mcqs_<base>.txt
//! McqBatch (Arc) ─┼─▶ pdf::render_pdf    ──▶ generated_mcqs_<base>.pdf
//!                 └─▶ docx::render_docx  ──▶ generated_mcqs_<base>.docx
//! ```
//!
//! The PDF renderer only chooses styles; wrapping and page breaks happen in
//! the [`flow`] layout engine. DOCX needs neither, since word processors
//! reflow the text themselves.
//!
//! [`render_all`] runs the three on the blocking pool concurrently and
//! returns one [`ArtifactReport`] per format. A failing renderer never
//! stops the others.
//!
//! Files are written to a temp file in the target directory and renamed
//! into place, so a failed write never leaves a complete-looking artifact
//! behind. Names are derived from the caller's base name only; two
//! concurrent requests with the same base name overwrite each other.

pub mod docx;
pub mod flow;
pub mod pdf;
pub mod text;

use crate::error::RenderError;
use crate::model::McqBatch;
use crate::output::ArtifactReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prefix shared by every artifact file name.
pub const ARTIFACT_PREFIX: &str = "generated_mcqs_";

/// Title used in the PDF and DOCX headings.
pub const DOCUMENT_TITLE: &str = "Generated MCQs";

/// Highlight colour for the correct option and the answer line.
pub const CORRECT_RGB: [u8; 3] = [0, 128, 0];

/// The three output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactFormat {
    Text,
    Pdf,
    Docx,
}

impl ArtifactFormat {
    pub const ALL: [ArtifactFormat; 3] = [
        ArtifactFormat::Text,
        ArtifactFormat::Pdf,
        ArtifactFormat::Docx,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Text => "txt",
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Docx => "docx",
        }
    }

    /// Parse `txt`, `pdf` or `docx` (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext.trim()))
    }

    /// `generated_mcqs_<base>.<ext>`
    pub fn file_name(self, base_name: &str) -> String {
        format!("{ARTIFACT_PREFIX}{base_name}.{}", self.extension())
    }

    /// Render `batch` into this format's bytes.
    pub fn render(self, batch: &McqBatch) -> Result<Vec<u8>, RenderError> {
        match self {
            ArtifactFormat::Text => Ok(text::render_text(batch).into_bytes()),
            ArtifactFormat::Pdf => pdf::render_pdf(batch),
            ArtifactFormat::Docx => docx::render_docx(batch),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactFormat::Text => "TXT",
            ArtifactFormat::Pdf => "PDF",
            ArtifactFormat::Docx => "DOCX",
        };
        f.write_str(name)
    }
}

/// Reduce a user-supplied file stem to a safe artifact base name.
///
/// ASCII letters, digits, `-`, `_` and `.` are kept, whitespace runs
/// become `_`, everything else is dropped. Leading/trailing `.` and `_`
/// are trimmed. An empty result becomes `document`.
pub fn secure_base_name(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for word in stem.split_whitespace() {
        if !out.is_empty() {
            out.push('_');
        }
        out.extend(
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')),
        );
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render one format and write it atomically into `dir`.
pub fn write_artifact(
    batch: &McqBatch,
    format: ArtifactFormat,
    dir: &Path,
    base_name: &str,
) -> Result<PathBuf, RenderError> {
    let bytes = format.render(batch)?;
    let path = dir.join(format.file_name(base_name));
    write_atomic(&path, &bytes).map_err(|source| RenderError::WriteFailed {
        format,
        path: path.clone(),
        source,
    })?;
    debug!("Wrote {} ({} bytes) to {}", format, bytes.len(), path.display());
    Ok(path)
}

/// Write to a sibling temp file, then rename over `path`.
///
/// The temp file is removed on every error path when it is dropped.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Render `formats` concurrently and write them into `dir`.
///
/// Reports come back in the order of `formats`.
pub async fn render_all(
    batch: Arc<McqBatch>,
    formats: &[ArtifactFormat],
    dir: &Path,
    base_name: &str,
) -> Vec<ArtifactReport> {
    let tasks = formats.iter().map(|&format| {
        let batch = Arc::clone(&batch);
        let dir = dir.to_path_buf();
        let base_name = base_name.to_string();
        async move {
            let joined = tokio::task::spawn_blocking(move || {
                write_artifact(&batch, format, &dir, &base_name)
            })
            .await;
            let result = joined.unwrap_or_else(|e| {
                Err(RenderError::TaskFailed {
                    format,
                    detail: e.to_string(),
                })
            });
            match &result {
                Ok(path) => info!("{} written: {}", format, path.display()),
                Err(e) => warn!("{}", e),
            }
            ArtifactReport { format, result }
        }
    });

    futures::future::join_all(tasks).await
}
