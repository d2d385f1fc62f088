//! Error types for the core module.

use thiserror::Error;

use crate::stage::StageId;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
///
/// Transformation and identifier parsing never fail; these cover loading
/// rule files and wiring a pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Stage mismatch: expected {expected} stage, got {found}")]
    StageMismatch { expected: StageId, found: StageId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rules file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
