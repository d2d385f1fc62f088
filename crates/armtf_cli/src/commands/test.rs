//! Test command - Apply the configuration and check for drift.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use armtf_core::{PipelineContext, Stage};
use armtf_iac::{LocalTerraform, TerraformRunner, TestStage};

use super::WorkingDirArgs;

#[derive(Args)]
pub struct TestArgs {
    #[command(flatten)]
    pub working_dir: WorkingDirArgs,
}

pub async fn execute(args: TestArgs, verbose: bool) -> Result<i32> {
    let context = PipelineContext::new("", args.working_dir.resolve()?);
    let runner = TerraformRunner::new(Arc::new(LocalTerraform::new().verbose(verbose)));

    Ok(TestStage::new(runner).execute(&context).await)
}
