//! The generate, test and cleanup stages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use armtf_core::{CoreResult, Pipeline, PipelineContext, Stage, StageId, TransformRules, SUCCESS};

use crate::error::{IacError, IacResult};
use crate::example::ApiExample;
use crate::generator::{ConfigGenerator, CONFIG_FILE};
use crate::terraform::{TerraformExecutor, TerraformResult, TerraformRunner, PLAN_HAS_CHANGES};

/// Exit code for failures that carry no terraform exit code.
pub const FAILURE: i32 = 1;

/// Map a stage error to the exit code the stage reports.
pub fn exit_code_for(err: &IacError) -> i32 {
    match err {
        IacError::CommandFailed { exit_code, .. } if *exit_code != SUCCESS => *exit_code,
        _ => FAILURE,
    }
}

fn report(stage: StageId, result: IacResult<()>) -> i32 {
    match result {
        Ok(()) => SUCCESS,
        Err(e) => {
            error!("Stage '{}' failed: {}", stage, e);
            exit_code_for(&e)
        }
    }
}

fn check(result: TerraformResult, command: &str) -> IacResult<TerraformResult> {
    if !result.success {
        error!("terraform {} output:\n{}", command, result.output);
    }
    result.ensure_success(command)
}

fn require_config(working_dir: &Path) -> IacResult<()> {
    let path = working_dir.join(CONFIG_FILE);
    if path.exists() {
        Ok(())
    } else {
        Err(IacError::ConfigMissing(path))
    }
}

/// Generates `main.tf` from the example at the context's source path.
#[derive(Debug, Clone, Default)]
pub struct GenerateStage {
    rules: TransformRules,
    rules_file: Option<PathBuf>,
}

impl GenerateStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra transformation rules for the request body.
    pub fn with_rules(mut self, rules: TransformRules) -> Self {
        self.rules.merge(rules);
        self
    }

    /// Rules file loaded when the stage runs, layered over `with_rules`.
    pub fn with_rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    /// Generate and write the configuration, returning its path.
    pub fn generate(&self, context: &PipelineContext) -> IacResult<PathBuf> {
        let mut rules = self.rules.clone();
        if let Some(path) = &self.rules_file {
            rules.merge(TransformRules::load(path)?);
        }

        let example = ApiExample::load(&context.source_path)?;
        ConfigGenerator::new().with_rules(rules).write(
            &example,
            &context.working_dir,
            context.overwrite,
            context.raw_payload,
        )
    }
}

#[async_trait]
impl Stage for GenerateStage {
    fn id(&self) -> StageId {
        StageId::Generate
    }

    fn description(&self) -> &str {
        "Generate Terraform configuration from a REST API example"
    }

    async fn execute(&self, context: &PipelineContext) -> i32 {
        report(
            self.id(),
            self.generate(context).map(|path| {
                info!("Generated {:?} from {:?}", path, context.source_path);
            }),
        )
    }
}

/// Applies the configuration and checks a follow-up plan is empty.
#[derive(Debug, Clone)]
pub struct TestStage {
    runner: TerraformRunner,
}

impl TestStage {
    pub fn new(runner: TerraformRunner) -> Self {
        Self { runner }
    }

    pub async fn test(&self, working_dir: &Path) -> IacResult<()> {
        require_config(working_dir)?;

        check(self.runner.init(working_dir).await?, "init")?;
        check(self.runner.apply(working_dir).await?, "apply")?;

        let plan = self.runner.plan_detailed(working_dir).await?;
        match plan.exit_code {
            SUCCESS => Ok(()),
            PLAN_HAS_CHANGES => {
                warn!("Plan after apply is not empty:\n{}", plan.output);
                Err(IacError::CommandFailed {
                    command: "plan".to_string(),
                    exit_code: FAILURE,
                })
            }
            _ => check(plan, "plan").map(|_| ()),
        }
    }
}

#[async_trait]
impl Stage for TestStage {
    fn id(&self) -> StageId {
        StageId::Test
    }

    fn description(&self) -> &str {
        "Apply the configuration and verify it has no diff"
    }

    async fn execute(&self, context: &PipelineContext) -> i32 {
        report(self.id(), self.test(&context.working_dir).await)
    }
}

/// Destroys everything the test stage created.
#[derive(Debug, Clone)]
pub struct CleanupStage {
    runner: TerraformRunner,
}

impl CleanupStage {
    pub fn new(runner: TerraformRunner) -> Self {
        Self { runner }
    }

    pub async fn cleanup(&self, working_dir: &Path) -> IacResult<()> {
        require_config(working_dir)?;
        check(self.runner.destroy(working_dir).await?, "destroy").map(|_| ())
    }
}

#[async_trait]
impl Stage for CleanupStage {
    fn id(&self) -> StageId {
        StageId::Cleanup
    }

    fn description(&self) -> &str {
        "Destroy the resources created by the test"
    }

    async fn execute(&self, context: &PipelineContext) -> i32 {
        report(self.id(), self.cleanup(&context.working_dir).await)
    }
}

/// Wire the three stages into a pipeline sharing one terraform executor.
pub fn default_pipeline(
    executor: Arc<dyn TerraformExecutor>,
    generate: GenerateStage,
) -> CoreResult<Pipeline> {
    let runner = TerraformRunner::new(executor);
    Pipeline::new(
        Arc::new(generate),
        Arc::new(TestStage::new(runner.clone())),
        Arc::new(CleanupStage::new(runner)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTerraform;

    fn context_with_config() -> (tempfile::TempDir, PipelineContext) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let context = PipelineContext::new("create.json", dir.path());
        (dir, context)
    }

    #[test]
    fn test_exit_code_mapping() {
        let failed = IacError::CommandFailed {
            command: "apply".to_string(),
            exit_code: 4,
        };
        assert_eq!(exit_code_for(&failed), 4);
        assert_eq!(exit_code_for(&IacError::InvalidExample("x".to_string())), FAILURE);
    }

    #[tokio::test]
    async fn test_stage_runs_init_apply_plan() {
        let (_dir, context) = context_with_config();
        let mock = Arc::new(MockTerraform::new());
        let stage = TestStage::new(TerraformRunner::new(mock.clone()));

        assert_eq!(stage.execute(&context).await, SUCCESS);
        assert_eq!(mock.commands(), vec!["init", "apply", "plan"]);
    }

    #[tokio::test]
    async fn test_stage_stops_on_failed_apply() {
        let (_dir, context) = context_with_config();
        let mock = Arc::new(MockTerraform::new().with_exit_code("apply", 1));
        let stage = TestStage::new(TerraformRunner::new(mock.clone()));

        assert_eq!(stage.execute(&context).await, 1);
        assert_eq!(mock.commands(), vec!["init", "apply"]);
    }

    #[tokio::test]
    async fn test_stage_fails_on_plan_diff() {
        let (_dir, context) = context_with_config();
        let mock = Arc::new(MockTerraform::new().with_exit_code("plan", PLAN_HAS_CHANGES));
        let stage = TestStage::new(TerraformRunner::new(mock));

        assert_eq!(stage.execute(&context).await, FAILURE);
    }

    #[tokio::test]
    async fn test_stage_requires_config() {
        let dir = tempfile::tempdir().unwrap();
        let context = PipelineContext::new("create.json", dir.path());
        let mock = Arc::new(MockTerraform::new());
        let stage = TestStage::new(TerraformRunner::new(mock.clone()));

        assert_eq!(stage.execute(&context).await, FAILURE);
        assert!(mock.commands().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_reports_destroy_code() {
        let (_dir, context) = context_with_config();
        let mock = Arc::new(MockTerraform::new().with_exit_code("destroy", 3));
        let stage = CleanupStage::new(TerraformRunner::new(mock.clone()));

        assert_eq!(stage.execute(&context).await, 3);
        assert_eq!(mock.commands(), vec!["destroy"]);
    }

    #[tokio::test]
    async fn test_generate_reports_missing_example() {
        let dir = tempfile::tempdir().unwrap();
        let context = PipelineContext::new(dir.path().join("missing.json"), dir.path());

        assert_eq!(GenerateStage::new().execute(&context).await, FAILURE);
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }
}
