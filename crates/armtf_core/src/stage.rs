//! Stage definitions.
//!
//! A run is made of three stages executed in order: generate the Terraform
//! configuration, test it against the real API, and clean up what the test
//! created. Each stage reports an integer exit code; zero means success.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use armtf_core::{PipelineContext, Stage, StageId};
//!
//! struct NoopCleanup;
//!
//! #[async_trait]
//! impl Stage for NoopCleanup {
//!     fn id(&self) -> StageId { StageId::Cleanup }
//!     fn description(&self) -> &str { "Does nothing" }
//!
//!     async fn execute(&self, _context: &PipelineContext) -> i32 {
//!         0
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::PipelineContext;

/// Exit code reported by a successful stage.
pub const SUCCESS: i32 = 0;

/// Pipeline stage identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Generate,
    Test,
    Cleanup,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Generate => "generate",
            StageId::Test => "test",
            StageId::Cleanup => "cleanup",
        }
    }

    /// Get the order stages run in.
    pub fn default_order() -> Vec<StageId> {
        vec![StageId::Generate, StageId::Test, StageId::Cleanup]
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for stage implementations.
///
/// Stages own their own failure handling: any error is logged by the stage
/// and turned into a non-zero exit code.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Which slot of the pipeline this stage fills.
    fn id(&self) -> StageId;

    /// Get a human-readable description of the stage.
    fn description(&self) -> &str;

    /// Execute the stage and return its exit code.
    async fn execute(&self, context: &PipelineContext) -> i32;
}
