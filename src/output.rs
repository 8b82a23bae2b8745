//! Output types returned by the generation entry points.

use crate::error::{McqError, RenderError};
use crate::model::McqBatch;
use crate::render::ArtifactFormat;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Outcome of one renderer.
#[derive(Debug)]
pub struct ArtifactReport {
    pub format: ArtifactFormat,
    /// Path of the written file, or why it could not be produced.
    pub result: Result<PathBuf, RenderError>,
}

impl ArtifactReport {
    pub fn path(&self) -> Option<&Path> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.result.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for ArtifactReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            format: ArtifactFormat,
            #[serde(skip_serializing_if = "Option::is_none")]
            path: Option<&'a Path>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }
        Repr {
            format: self.format,
            path: self.path(),
            error: self.error().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Characters of document text sent to the model.
    pub document_chars: usize,
    /// Whether the text was cut at `max_content_chars`.
    pub truncated: bool,
    /// Pages in the source, for PDFs.
    pub page_count: Option<usize>,
    pub images_attached: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Failed model attempts before the one that succeeded.
    pub retries: u32,
    pub records: usize,
    pub extraction_ms: u64,
    pub generation_ms: u64,
    pub render_ms: u64,
    pub total_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct GenerationOutput {
    /// The parsed questions every artifact was rendered from.
    pub batch: McqBatch,
    /// Cleaned markup as returned by the model.
    pub markup: String,
    /// One report per requested format, in request order.
    pub artifacts: Vec<ArtifactReport>,
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// Paths of the artifacts that were written.
    pub fn written(&self) -> impl Iterator<Item = (ArtifactFormat, &Path)> + '_ {
        self.artifacts
            .iter()
            .filter_map(|r| r.path().map(|p| (r.format, p)))
    }

    /// Reports of the artifacts that failed.
    pub fn failed(&self) -> Vec<&ArtifactReport> {
        self.artifacts.iter().filter(|r| !r.is_ok()).collect()
    }

    /// True when every requested artifact was written.
    pub fn is_complete(&self) -> bool {
        self.artifacts.iter().all(ArtifactReport::is_ok)
    }

    /// Turn any artifact failure into [`McqError::ArtifactsFailed`].
    pub fn into_result(self) -> Result<Self, McqError> {
        let failed: Vec<String> = self.failed().iter().map(|r| r.format.to_string()).collect();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(McqError::ArtifactsFailed {
                failed,
                total: self.artifacts.len(),
            })
        }
    }
}
