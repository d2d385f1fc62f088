//! Mock terraform executor for testing.
//!
//! Captures every invocation and answers with configurable exit codes
//! per terraform subcommand, so stages can be tested without terraform
//! or cloud credentials.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::IacResult;
use crate::terraform::{TerraformExecutor, TerraformResult};

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl CapturedCall {
    /// The terraform subcommand (`init`, `apply`, ...).
    pub fn command(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }
}

/// Mock terraform executor.
#[derive(Debug, Default)]
pub struct MockTerraform {
    /// Exit codes by subcommand; unlisted subcommands succeed.
    exit_codes: RwLock<HashMap<String, i32>>,
    captured_calls: RwLock<Vec<CapturedCall>>,
}

impl MockTerraform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit with `exit_code`.
    pub fn with_exit_code(self, command: impl Into<String>, exit_code: i32) -> Self {
        self.exit_codes.write().insert(command.into(), exit_code);
        self
    }

    /// Get all captured calls.
    pub fn captured_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Subcommands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.captured_calls
            .read()
            .iter()
            .map(|call| call.command().to_string())
            .collect()
    }
}

#[async_trait]
impl TerraformExecutor for MockTerraform {
    async fn run(&self, working_dir: &Path, args: &[&str]) -> IacResult<TerraformResult> {
        let call = CapturedCall {
            working_dir: working_dir.to_path_buf(),
            args: args.iter().map(|s| s.to_string()).collect(),
        };
        let exit_code = self
            .exit_codes
            .read()
            .get(call.command())
            .copied()
            .unwrap_or(0);
        self.captured_calls.write().push(call);

        Ok(TerraformResult::from_exit_code(exit_code, format!("mock terraform {}", args.join(" "))))
    }
}
