//! CLI command definitions.
//!
//! Each subcommand runs one stage, or all three in order with `auto`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use armtf_iac::GenerateStage;

pub mod auto;
pub mod cleanup;
pub mod generate;
pub mod test;

/// armtf - Terraform configuration from REST API examples
#[derive(Parser)]
#[command(name = "armtf")]
#[command(version, about = "armtf - Terraform configuration from REST API examples")]
#[command(long_about = r#"
armtf generates azapi Terraform configuration from a REST API 'Create'
example, applies it, checks the plan is clean, and destroys it again.

COMMANDS:
  auto      → Run generate and test, if test passed, run cleanup
  generate  → Generate main.tf from an example
  test      → Apply main.tf and verify the plan has no diff
  cleanup   → Destroy the resources created by test

EXIT CODES:
  0 - Success
  1 - General error, or the failing stage's exit code
  2 - Invalid arguments
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show terraform output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run generate and test, if test passed, run cleanup
    Auto(auto::AutoArgs),

    /// Generate Terraform configuration from a REST API example
    Generate(generate::GenerateArgs),

    /// Apply the configuration and verify it has no diff
    Test(test::TestArgs),

    /// Destroy the resources created by test
    Cleanup(cleanup::CleanupArgs),
}

/// Location of the Terraform configuration.
#[derive(Args, Debug, Clone)]
pub struct WorkingDirArgs {
    /// Output path to Terraform configuration files (defaults to the current directory)
    #[arg(long, env = "ARMTF_WORKING_DIR")]
    pub working_dir: Option<PathBuf>,
}

impl WorkingDirArgs {
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to resolve the current directory"),
        }
    }
}

/// Options shared by `auto` and `generate`.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Filepath of a REST API 'Create' example
    #[arg(long)]
    pub path: PathBuf,

    /// Use the raw JSON payload in 'body'
    #[arg(long)]
    pub raw: bool,

    /// Overwrite existing Terraform configuration
    #[arg(long)]
    pub overwrite: bool,

    /// YAML or JSON file with body replacement/removal rules
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

impl SourceArgs {
    pub fn generate_stage(&self) -> Result<GenerateStage> {
        let exists = self
            .path
            .try_exists()
            .with_context(|| format!("Failed to read example path {:?}", self.path))?;
        if !exists {
            anyhow::bail!("Example not found: {:?}", self.path);
        }
        let stage = GenerateStage::new();
        Ok(match &self.rules {
            Some(rules) => stage.with_rules_file(rules),
            None => stage,
        })
    }
}
