//! # armtf_core
//!
//! Core engine for armtf.
//!
//! This crate provides the pieces the generate, test and cleanup stages are
//! built on.
//!
//! # Architecture
//!
//! - **Body transform**: path-addressed rewriting of example request bodies
//! - **Resource ids**: parent id and type derivation from resource identifiers
//! - **Pipeline**: ordered generate → test → cleanup run with short-circuiting
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use armtf_core::{Pipeline, PipelineContext};
//!
//! let pipeline = Pipeline::new(Arc::new(generate), Arc::new(test), Arc::new(cleanup))?;
//! let context = PipelineContext::new("create.json", "./out").with_overwrite(true);
//! let exit_code = pipeline.execute(&context).await;
//! ```

pub mod body;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod resource_id;
pub mod stage;

// Re-export main types for convenience
pub use body::{transform, transform_owned, TransformRules, KEY_RULE_PREFIX};
pub use context::PipelineContext;
pub use error::{CoreError, CoreResult};
pub use pipeline::{ExecutionState, Pipeline, PipelineReport, StageRecord};
pub use resource_id::{extract_response_id, parent_identifier, ResourceId, PROVIDERS_SEGMENT};
pub use stage::{Stage, StageId, SUCCESS};
