//! Helpers shared by the command implementations.

use crate::cli::{Args, RuntimeConfig};
use crate::config::PipelineConfig;
use crate::error::{CliError, ReleaseError, Result};
use crate::pipeline::{ErrorPolicy, StepId, StepObserver};
use crate::state::{RunReport, RunStatus, StepOutcome, StepRecord};
use std::path::{Path, PathBuf};

/// Canonical working directory from `--workdir`
pub(super) fn resolve_workdir(args: &Args) -> Result<PathBuf> {
    args.workdir.canonicalize().map_err(|e| {
        ReleaseError::Cli(CliError::InvalidArguments {
            reason: format!("Working directory {}: {}", args.workdir.display(), e),
        })
    })
}

/// Load the pipeline config for `dir`, honoring `--config`
pub(super) fn load_config(args: &Args, dir: &Path) -> Result<PipelineConfig> {
    PipelineConfig::load(dir, args.config.as_deref())
}

/// Prints step progress as the pipeline runs
pub(super) struct ConsoleObserver<'a> {
    pub(super) config: &'a RuntimeConfig,
}

impl StepObserver for ConsoleObserver<'_> {
    fn step_started(&self, step: StepId, policy: ErrorPolicy) {
        let position = StepId::ALL.iter().position(|s| *s == step).map_or(0, |i| i + 1);
        let _ = self.config.output().progress(&format!(
            "[{}/{}] {} ({})",
            position,
            StepId::ALL.len(),
            step,
            policy
        ));
    }

    fn step_finished(&self, record: &StepRecord) {
        let config = self.config;
        match &record.outcome {
            StepOutcome::Succeeded { details } => {
                config.success_println(&format!("{} ({} ms)", record.step, record.duration_ms));
                for detail in details {
                    config.indent(detail);
                }
            }
            StepOutcome::NoOp { reason } => {
                config.info_println(&format!("{}: {}", record.step, reason));
            }
            StepOutcome::Failed { error } => {
                config.error_println(&format!("{} failed: {}", record.step, error));
            }
            StepOutcome::FailedIgnored { error } => {
                config.warning_println(&format!("{} failed (ignored): {}", record.step, error));
            }
            StepOutcome::Skipped => {
                config.verbose_println(&format!("{} skipped", record.step));
            }
        }
    }
}

/// Print the summary of a finished run
pub(super) fn print_summary(config: &RuntimeConfig, report: &RunReport) {
    config.section("Summary");
    config.println(&format!("Run:      {}", report.run_id));
    config.println(&format!("Trigger:  {}", report.trigger));
    if let Some(tag) = &report.release_tag {
        config.println(&format!("Tag:      {}", tag));
    }
    if let Some(artifact) = &report.artifact {
        config.println(&format!(
            "Artifact: {} ({} bytes)",
            artifact.path.display(),
            artifact.size
        ));
        config.println(&format!("SHA-256:  {}", artifact.sha256));
    }
    if let Some(url) = &report.release_url {
        config.println(&format!("Release:  {}", url));
    }

    let elapsed = report.finished_at - report.started_at;
    match report.status {
        RunStatus::Succeeded => config.success_println(&format!(
            "Pipeline succeeded in {:.1}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        )),
        RunStatus::Failed => {
            let failed = report
                .failed_step()
                .map(|r| r.step.to_string())
                .unwrap_or_else(|| "unknown step".to_string());
            config.error_println(&format!("Pipeline failed at {}", failed));
        }
    }
}

/// Exit code for a finished run
pub(super) fn exit_code(report: &RunReport) -> i32 {
    match report.status {
        RunStatus::Succeeded => 0,
        RunStatus::Failed => 1,
    }
}
