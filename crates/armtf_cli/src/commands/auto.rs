//! Auto command - Generate, test and clean up in one run.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use armtf_core::PipelineContext;
use armtf_iac::{default_pipeline, LocalTerraform};

use super::{SourceArgs, WorkingDirArgs};

#[derive(Args)]
pub struct AutoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub working_dir: WorkingDirArgs,
}

pub async fn execute(args: AutoArgs, verbose: bool) -> Result<i32> {
    let generate = args.source.generate_stage()?;
    let working_dir = args.working_dir.resolve()?;

    info!("Running generate, test and cleanup for {:?}", args.source.path);

    let context = PipelineContext::new(&args.source.path, working_dir)
        .with_overwrite(args.source.overwrite)
        .with_raw_payload(args.source.raw);

    let terraform = Arc::new(LocalTerraform::new().verbose(verbose));
    let pipeline =
        default_pipeline(terraform, generate).context("Failed to assemble the pipeline")?;

    Ok(pipeline.execute(&context).await)
}
