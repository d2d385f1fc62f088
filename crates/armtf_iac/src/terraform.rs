//! Terraform runner for local execution.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{IacError, IacResult};

/// Environment variable overriding the terraform binary.
pub const TERRAFORM_BIN_ENV: &str = "ARMTF_TERRAFORM_BIN";

/// Exit code of `terraform plan -detailed-exitcode` when changes are pending.
pub const PLAN_HAS_CHANGES: i32 = 2;

/// Result of a Terraform operation.
#[derive(Debug, Clone)]
pub struct TerraformResult {
    pub success: bool,
    pub output: String,
    pub exit_code: i32,
}

impl TerraformResult {
    pub fn from_exit_code(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            success: exit_code == 0,
            output: output.into(),
            exit_code,
        }
    }

    /// Turn a non-zero exit code into an error.
    pub fn ensure_success(self, command: &str) -> IacResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(IacError::CommandFailed {
                command: command.to_string(),
                exit_code: self.exit_code,
            })
        }
    }
}

/// Executes terraform commands in a working directory.
#[async_trait]
pub trait TerraformExecutor: Send + Sync {
    async fn run(&self, working_dir: &Path, args: &[&str]) -> IacResult<TerraformResult>;
}

/// Runs the terraform binary installed on this machine.
#[derive(Debug, Clone)]
pub struct LocalTerraform {
    binary: String,
    verbose: bool,
}

impl Default for LocalTerraform {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalTerraform {
    /// Use `$ARMTF_TERRAFORM_BIN`, or `terraform` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: std::env::var(TERRAFORM_BIN_ENV).unwrap_or_else(|_| "terraform".to_string()),
            verbose: false,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Log terraform output at info level instead of debug.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[async_trait]
impl TerraformExecutor for LocalTerraform {
    async fn run(&self, working_dir: &Path, args: &[&str]) -> IacResult<TerraformResult> {
        debug!("Executing {} {} in {:?}", self.binary, args.join(" "), working_dir);

        let mut child = Command::new(&self.binary)
            .args(args)
            .current_dir(working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => IacError::TerraformNotAvailable(format!(
                    "{} not found, install terraform or set {}",
                    self.binary, TERRAFORM_BIN_ENV
                )),
                _ => IacError::Io(e),
            })?;

        let (stdout, stderr) = tokio::join!(
            collect_lines(child.stdout.take(), self.verbose),
            collect_lines(child.stderr.take(), self.verbose),
        );
        let status = child.wait().await?;

        let output = if stderr.is_empty() {
            stdout
        } else if stdout.is_empty() {
            stderr
        } else {
            format!("{}\n{}", stdout, stderr)
        };

        // Killed by a signal.
        let exit_code = status.code().unwrap_or(-1);
        Ok(TerraformResult::from_exit_code(exit_code, output))
    }
}

async fn collect_lines<R: AsyncRead + Unpin>(stream: Option<R>, verbose: bool) -> String {
    let Some(stream) = stream else {
        return String::new();
    };
    let mut lines = BufReader::new(stream).lines();
    let mut output = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        if verbose {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&line);
    }
    output
}

/// Terraform commands used by the test and cleanup stages.
#[derive(Clone)]
pub struct TerraformRunner {
    executor: Arc<dyn TerraformExecutor>,
}

impl TerraformRunner {
    /// Create a new Terraform runner.
    pub fn new(executor: Arc<dyn TerraformExecutor>) -> Self {
        Self { executor }
    }

    /// Run terraform init.
    pub async fn init(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform init in {:?}", working_dir);
        self.executor
            .run(working_dir, &["init", "-input=false", "-no-color"])
            .await
    }


    /// Run terraform apply.
    pub async fn apply(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform apply in {:?}", working_dir);
        self.executor
            .run(working_dir, &["apply", "-auto-approve", "-input=false", "-no-color"])
            .await
    }

    /// Run terraform plan, exiting with 2 when changes are pending.
    pub async fn plan_detailed(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform plan in {:?}", working_dir);
        self.executor
            .run(
                working_dir,
                &["plan", "-detailed-exitcode", "-input=false", "-no-color"],
            )
            .await
    }

    /// Run terraform destroy.
    pub async fn destroy(&self, working_dir: &Path) -> IacResult<TerraformResult> {
        info!("Running terraform destroy in {:?}", working_dir);
        self.executor
            .run(working_dir, &["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await
    }
}

impl std::fmt::Debug for TerraformRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerraformRunner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTerraform;

    #[test]
    fn test_result_success() {
        let result = TerraformResult::from_exit_code(0, "ok");
        assert!(result.success);
        assert!(result.ensure_success("init").is_ok());
    }

    #[test]
    fn test_result_failure() {
        let err = TerraformResult::from_exit_code(1, "boom")
            .ensure_success("apply")
            .unwrap_err();

        assert!(matches!(
            err,
            IacError::CommandFailed { ref command, exit_code: 1 } if command == "apply"
        ));
    }

    #[tokio::test]
    async fn test_runner_arguments() {
        let mock = Arc::new(MockTerraform::new());
        let runner = TerraformRunner::new(mock.clone());
        let dir = Path::new("/tmp/armtf");

        runner.init(dir).await.unwrap();
        runner.plan_detailed(dir).await.unwrap();
        runner.destroy(dir).await.unwrap();

        let calls = mock.captured_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].args[0], "init");
        assert!(calls[1].args.contains(&"-detailed-exitcode".to_string()));
        assert!(calls[2].args.contains(&"-auto-approve".to_string()));
        assert_eq!(calls[2].working_dir, dir);
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let terraform = LocalTerraform::new().with_binary("armtf-terraform-does-not-exist");

        let err = terraform.run(Path::new("."), &["version"]).await.unwrap_err();

        assert!(matches!(err, IacError::TerraformNotAvailable(_)));
    }
}
