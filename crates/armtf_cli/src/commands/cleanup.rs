//! Cleanup command - Destroy the resources created by test.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use armtf_core::{PipelineContext, Stage};
use armtf_iac::{CleanupStage, LocalTerraform, TerraformRunner};

use super::WorkingDirArgs;

#[derive(Args)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub working_dir: WorkingDirArgs,
}

pub async fn execute(args: CleanupArgs, verbose: bool) -> Result<i32> {
    let context = PipelineContext::new("", args.working_dir.resolve()?);
    let runner = TerraformRunner::new(Arc::new(LocalTerraform::new().verbose(verbose)));

    Ok(CleanupStage::new(runner).execute(&context).await)
}
