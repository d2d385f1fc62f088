//! Pipeline context shared by all stages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Execution parameters shared by the generate, test and cleanup stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Unique run ID
    pub run_id: Uuid,
    /// REST API example the configuration is generated from
    pub source_path: PathBuf,
    /// Directory holding the generated Terraform configuration
    pub working_dir: PathBuf,
    /// Overwrite existing configuration files
    pub overwrite: bool,
    /// Embed the example body as raw JSON instead of HCL
    pub raw_payload: bool,
}

impl PipelineContext {
    /// Create a new context.
    pub fn new(source_path: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source_path: source_path.into(),
            working_dir: working_dir.into(),
            overwrite: false,
            raw_payload: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_raw_payload(mut self, raw_payload: bool) -> Self {
        self.raw_payload = raw_payload;
        self
    }
}
