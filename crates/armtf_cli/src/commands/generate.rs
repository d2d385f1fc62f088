//! Generate command - Write Terraform configuration for an example.

use anyhow::Result;
use clap::Args;

use armtf_core::{PipelineContext, Stage};

use super::{SourceArgs, WorkingDirArgs};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub working_dir: WorkingDirArgs,
}

pub async fn execute(args: GenerateArgs) -> Result<i32> {
    let stage = args.source.generate_stage()?;
    let context = PipelineContext::new(&args.source.path, args.working_dir.resolve()?)
        .with_overwrite(args.source.overwrite)
        .with_raw_payload(args.source.raw);

    Ok(stage.execute(&context).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_generate_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let example = dir.path().join("create.json");
        fs::write(
            &example,
            r#"{
                "parameters": {"api-version": "2021-04-01", "parameters": {"location": "westeurope"}},
                "responses": {"201": {"body": {"id": "/subscriptions/s/resourceGroups/rg1"}}}
            }"#,
        )
        .unwrap();

        let args = GenerateArgs {
            source: SourceArgs {
                path: example,
                raw: false,
                overwrite: false,
                rules: None,
            },
            working_dir: WorkingDirArgs {
                working_dir: Some(dir.path().join("out")),
            },
        };

        assert_eq!(execute(args).await.unwrap(), 0);

        let config = fs::read_to_string(dir.path().join("out").join("main.tf")).unwrap();
        assert!(config.contains("\"Microsoft.Resources/resourceGroups@2021-04-01\""));
        assert!(config.contains("parent_id = \"/subscriptions/s\""));
        assert!(config.contains("location = \"westeurope\""));
    }
}
