//! Progress-callback trait for generation stage events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to be told
//! when each stage of a run finishes.
//!
//! # Example
//!
//! ```rust
//! use edgequake_mcq::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl GenerationProgressCallback for Printer {
//!     fn on_generation_complete(&self, records: usize) {
//!         eprintln!("{records} questions parsed");
//!     }
//! }
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::render::ArtifactFormat;
use std::path::Path;
use std::sync::Arc;

/// Called by the generation pipeline as it moves through its stages.
///
/// All methods have default no-op implementations. Artifact events may
/// arrive concurrently from different threads, in any order.
pub trait GenerationProgressCallback: Send + Sync {
    /// Text and images have been extracted from the source document.
    ///
    /// # Arguments
    /// * `chars`: characters of document text sent to the model
    /// * `images`: images attached to the request
    fn on_extraction_complete(&self, chars: usize, images: usize) {
        let _ = (chars, images);
    }

    /// The model request is about to be sent.
    fn on_generation_start(&self, num_questions: usize) {
        let _ = num_questions;
    }

    /// The response has been cleaned and parsed into `records` questions.
    fn on_generation_complete(&self, records: usize) {
        let _ = records;
    }

    /// One artifact was written.
    fn on_artifact_complete(&self, format: ArtifactFormat, path: &Path) {
        let _ = (format, path);
    }

    /// One artifact failed; the others are unaffected.
    fn on_artifact_error(&self, format: ArtifactFormat, error: &str) {
        let _ = (format, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
