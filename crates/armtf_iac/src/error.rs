//! Error types for IaC module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during IaC operations.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Terraform not available: {0}")]
    TerraformNotAvailable(String),

    #[error("Terraform {command} failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("Invalid example: {0}")]
    InvalidExample(String),

    #[error("Configuration already exists: {0:?} (use overwrite to replace it)")]
    ConfigExists(PathBuf),

    #[error("No Terraform configuration at {0:?}, run generate first")]
    ConfigMissing(PathBuf),

    #[error("Core error: {0}")]
    Core(#[from] armtf_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
