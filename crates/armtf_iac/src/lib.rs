//! # armtf_iac
//!
//! Terraform generation and execution for armtf.
//!
//! This crate turns REST API "create" examples into `azapi_resource`
//! configuration and provides the generate, test and cleanup stages run by
//! the [`armtf_core::Pipeline`].
//!
//! ## Features
//!
//! - Example loading with resource id, type and api-version discovery
//! - Request body rewriting through path-addressed rules
//! - HCL or raw JSON rendering of the body
//! - Local terraform execution (init, apply, plan, destroy)
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use armtf_core::PipelineContext;
//! use armtf_iac::{default_pipeline, GenerateStage, LocalTerraform};
//!
//! # async fn run() -> armtf_core::CoreResult<i32> {
//! let terraform = Arc::new(LocalTerraform::new().verbose(true));
//! let pipeline = default_pipeline(terraform, GenerateStage::new())?;
//!
//! let context = PipelineContext::new("create.json", "./out").with_overwrite(true);
//! Ok(pipeline.execute(&context).await)
//! # }
//! ```

pub mod error;
pub mod example;
pub mod generator;
pub mod hcl;
pub mod mock;
pub mod stages;
pub mod terraform;

pub use error::{IacError, IacResult};
pub use example::ApiExample;
pub use generator::{AzapiResource, ConfigGenerator, CONFIG_FILE, RESOURCE_LABEL};
pub use mock::{CapturedCall, MockTerraform};
pub use stages::{default_pipeline, exit_code_for, CleanupStage, GenerateStage, TestStage, FAILURE};
pub use terraform::{LocalTerraform, TerraformExecutor, TerraformResult, TerraformRunner, TERRAFORM_BIN_ENV};
