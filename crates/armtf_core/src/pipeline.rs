//! Generate → test → cleanup orchestration.
//!
//! Stages run strictly one after another. A failing generate or test stage
//! ends the run with its exit code and the remaining stages are skipped.
//! Once cleanup has been reached the run counts as passed, whatever cleanup
//! itself reports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::context::PipelineContext;
use crate::error::{CoreError, CoreResult};
use crate::stage::{Stage, StageId, SUCCESS};

/// Pipeline state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Pipeline has not started
    #[default]
    Pending,
    /// Pipeline is currently running
    Running,
    /// All stages ran and the test passed
    Completed,
    /// Pipeline stopped at a failing stage
    Failed,
}

/// Outcome of one stage slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: StageId,
    /// Exit code, `None` when the stage was skipped
    pub exit_code: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StageRecord {
    pub fn skipped(&self) -> bool {
        self.exit_code.is_none()
    }
}

/// Report of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub state: ExecutionState,
    /// Exit code of the run as a whole
    pub exit_code: i32,
    /// One record per stage, in execution order
    pub records: Vec<StageRecord>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: ExecutionState::Pending,
            exit_code: SUCCESS,
            records: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Get the record for a stage.
    pub fn record(&self, stage: StageId) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.stage == stage)
    }

    /// Get the stage the run failed at (if any).
    pub fn failed_stage(&self) -> Option<StageId> {
        if self.state != ExecutionState::Failed {
            return None;
        }
        self.records
            .iter()
            .find(|r| r.exit_code.is_some_and(|code| code != SUCCESS))
            .map(|r| r.stage)
    }

    fn skip(&mut self, stage: StageId) {
        self.records.push(StageRecord {
            stage,
            exit_code: None,
            started_at: None,
            completed_at: None,
        });
    }

    fn finish(mut self, state: ExecutionState, exit_code: i32) -> Self {
        self.state = state;
        self.exit_code = exit_code;
        self.completed_at = Some(Utc::now());
        self
    }
}

/// The three-stage pipeline.
pub struct Pipeline {
    generate: Arc<dyn Stage>,
    test: Arc<dyn Stage>,
    cleanup: Arc<dyn Stage>,
}

impl Pipeline {
    /// Create a pipeline, checking each stage fills its own slot.
    pub fn new(
        generate: Arc<dyn Stage>,
        test: Arc<dyn Stage>,
        cleanup: Arc<dyn Stage>,
    ) -> CoreResult<Self> {
        for (expected, stage) in StageId::default_order()
            .into_iter()
            .zip([&generate, &test, &cleanup])
        {
            if stage.id() != expected {
                return Err(CoreError::StageMismatch {
                    expected,
                    found: stage.id(),
                });
            }
        }
        Ok(Self {
            generate,
            test,
            cleanup,
        })
    }

    /// Run all stages and return the run's exit code.
    pub async fn execute(&self, context: &PipelineContext) -> i32 {
        self.run(context).await.exit_code
    }

    /// Run all stages and return the full report.
    pub async fn run(&self, context: &PipelineContext) -> PipelineReport {
        let mut report = PipelineReport::new(context.run_id);
        report.state = ExecutionState::Running;
        report.started_at = Some(Utc::now());

        info!("Starting run {} for {:?}", context.run_id, context.source_path);

        let code = Self::run_stage(self.generate.as_ref(), context, &mut report).await;
        if code != SUCCESS {
            error!("Generate failed, skip test");
            report.skip(StageId::Test);
            report.skip(StageId::Cleanup);
            return report.finish(ExecutionState::Failed, code);
        }

        let code = Self::run_stage(self.test.as_ref(), context, &mut report).await;
        if code != SUCCESS {
            error!("Test failed, skip cleanup");
            report.skip(StageId::Cleanup);
            return report.finish(ExecutionState::Failed, code);
        }

        let code = Self::run_stage(self.cleanup.as_ref(), context, &mut report).await;
        if code != SUCCESS {
            warn!("Cleanup exited with code {}, resources may need manual removal", code);
        }

        info!("Test passed!");
        report.finish(ExecutionState::Completed, SUCCESS)
    }

    async fn run_stage(stage: &dyn Stage, context: &PipelineContext, report: &mut PipelineReport) -> i32 {
        let index = report.records.len() + 1;
        info!("Executing stage [{}/3]: {}", index, stage.id());

        let started_at = Utc::now();
        let code = stage.execute(context).await;
        report.records.push(StageRecord {
            stage: stage.id(),
            exit_code: Some(code),
            started_at: Some(started_at),
            completed_at: Some(Utc::now()),
        });

        if code == SUCCESS {
            info!("Stage '{}' completed successfully", stage.id());
        }
        code
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("generate", &self.generate.description())
            .field("test", &self.test.description())
            .field("cleanup", &self.cleanup.description())
            .finish()
    }
}
