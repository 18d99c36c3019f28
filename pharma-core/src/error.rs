//! Error handling

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Typed failures surfaced by the pipeline. Nothing here is swallowed into
/// default values; callers decide the fallback policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Feature count or order differs from the fitted schema
    #[error("feature schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    /// Inference or introspection requested before fit/train/load
    #[error("model must be trained before use")]
    NotTrained,

    /// Second fit/train on the same instance
    #[error("{0} is already fitted; create a fresh instance to refit")]
    AlreadyFitted(&'static str),

    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("training failed: {0}")]
    TrainingFailure(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn schema_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        PipelineError::SchemaMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// True for failures the caller can answer with a client-side rejection
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::SchemaMismatch { .. } | PipelineError::InvalidData(_)
        )
    }
}
