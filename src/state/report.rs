//! Run report: what each step did and how the run ended.

use crate::pipeline::{ErrorPolicy, StepId};
use crate::trigger::TriggerEvent;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Current version of the report format
pub const REPORT_FORMAT_VERSION: u32 = 1;

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every propagating step succeeded
    Succeeded,
    /// A propagating step failed
    Failed,
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step did its work
    Succeeded {
        /// Operator-facing details
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        details: Vec<String>,
    },
    /// Step had nothing to do
    NoOp {
        /// Why
        reason: String,
    },
    /// Step failed and aborted the run
    Failed {
        /// Error message
        error: String,
    },
    /// Step failed under the ignore policy
    FailedIgnored {
        /// Error message
        error: String,
    },
    /// Step did not run because the run had already failed
    Skipped,
}

impl StepOutcome {
    /// Whether the step counts as a failure of the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

/// Record of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step
    pub step: StepId,
    /// Policy it ran under
    pub policy: ErrorPolicy,
    /// What happened
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Artifact produced by the packaging step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// Path relative to the working directory
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 digest
    pub sha256: String,
}

/// Complete record of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Version of the report format
    pub format_version: u32,
    /// Unique ID of the run
    pub run_id: Uuid,
    /// Event that started the run
    pub trigger: TriggerEvent,
    /// Tag published on, if one was resolved
    pub release_tag: Option<String>,
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the run finished
    pub finished_at: chrono::DateTime<chrono::Utc>,
    /// Terminal state
    pub status: RunStatus,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
    /// Artifact, if packaging succeeded
    pub artifact: Option<ArtifactInfo>,
    /// Release URL, if publishing succeeded
    pub release_url: Option<String>,
}

impl RunReport {
    /// Start a report for a run
    pub fn new(run_id: Uuid, trigger: TriggerEvent) -> Self {
        let now = chrono::Utc::now();
        Self {
            format_version: REPORT_FORMAT_VERSION,
            run_id,
            trigger,
            release_tag: None,
            started_at: now,
            finished_at: now,
            status: RunStatus::Succeeded,
            steps: Vec::new(),
            artifact: None,
            release_url: None,
        }
    }

    /// Append a step record; a fatal outcome fails the run
    pub fn record(&mut self, record: StepRecord) {
        if record.outcome.is_fatal() {
            self.status = RunStatus::Failed;
        }
        self.steps.push(record);
    }

    /// Stamp the finish time
    pub fn finish(&mut self) {
        self.finished_at = chrono::Utc::now();
    }

    /// Record for a step, if it appears in the run
    pub fn step(&self, step: StepId) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }

    /// Whether the run succeeded
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    /// First fatal step, if any
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.outcome.is_fatal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: StepId, outcome: StepOutcome) -> StepRecord {
        StepRecord {
            step,
            policy: step.default_policy(),
            outcome,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_ignored_failure_keeps_run_successful() {
        let mut report = RunReport::new(Uuid::new_v4(), TriggerEvent::ManualDispatch { reference: None });
        report.record(record(
            StepId::Cleanup,
            StepOutcome::FailedIgnored {
                error: "locked".to_string(),
            },
        ));
        assert!(report.succeeded());
        assert!(report.failed_step().is_none());
    }

    #[test]
    fn test_fatal_failure_fails_run() {
        let mut report = RunReport::new(Uuid::new_v4(), TriggerEvent::ManualDispatch { reference: None });
        report.record(record(
            StepId::Package,
            StepOutcome::Failed {
                error: "missing".to_string(),
            },
        ));
        report.record(record(StepId::Publish, StepOutcome::Skipped));
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.failed_step().map(|r| r.step), Some(StepId::Package));
    }

    #[test]
    fn test_step_record_json_shape() {
        let json = serde_json::to_value(record(
            StepId::InstallDependencies,
            StepOutcome::NoOp {
                reason: "requirements.txt not present".to_string(),
            },
        ))
        .expect("serialize");
        assert_eq!(json["step"], "install_dependencies");
        assert_eq!(json["policy"], "propagate");
        assert_eq!(json["outcome"], "no_op");
        assert_eq!(json["reason"], "requirements.txt not present");
    }
}
