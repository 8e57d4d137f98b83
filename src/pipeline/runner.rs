//! Sequential pipeline execution.

use super::context::StepContext;
use super::step::{ErrorPolicy, Step, StepCompletion, StepId};
use crate::state::{RunReport, StepOutcome, StepRecord};
use crate::steps::{
    CheckoutStep, CleanupStep, InstallDependenciesStep, ListOutputStep, PackageStep, PublishStep,
    RuntimeSetupStep,
};
use std::time::Instant;

/// Receives progress notifications while a pipeline runs
pub trait StepObserver {
    /// A step is about to run
    fn step_started(&self, _step: StepId, _policy: ErrorPolicy) {}

    /// A step finished or was skipped
    fn step_finished(&self, _record: &StepRecord) {}
}

/// Observer that ignores every notification
impl StepObserver for () {}

/// Ordered steps run one after another
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Pipeline over explicit steps
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self { steps }
    }

    /// The release pipeline: checkout through cleanup
    pub fn standard(publish: PublishStep) -> Self {
        Self::new(vec![
            Box::new(CheckoutStep),
            Box::new(RuntimeSetupStep),
            Box::new(InstallDependenciesStep),
            Box::new(PackageStep),
            Box::new(ListOutputStep),
            Box::new(publish),
            Box::new(CleanupStep),
        ])
    }

    /// Steps and their policies, in order
    pub fn plan(&self) -> Vec<(StepId, ErrorPolicy)> {
        self.steps.iter().map(|s| (s.id(), s.policy())).collect()
    }

    /// Run every step in order.
    ///
    /// A failure under [`ErrorPolicy::Propagate`] fails the run and every
    /// later step is recorded as skipped without running. A failure under
    /// [`ErrorPolicy::Ignore`] is recorded and the run continues.
    pub async fn run(&self, ctx: &mut StepContext<'_>, observer: &dyn StepObserver) -> RunReport {
        let mut report = RunReport::new(ctx.run_id, ctx.trigger.clone());
        report.release_tag = ctx.release_tag().ok();
        let mut aborted = false;

        for step in &self.steps {
            let id = step.id();
            let policy = step.policy();

            if aborted {
                let record = StepRecord {
                    step: id,
                    policy,
                    outcome: StepOutcome::Skipped,
                    duration_ms: 0,
                };
                observer.step_finished(&record);
                report.record(record);
                continue;
            }

            observer.step_started(id, policy);
            log::info!("Running step '{}' ({})", id, policy);
            let started = Instant::now();
            let result = step.run(ctx).await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            let outcome = match result {
                Ok(StepCompletion::Done { details }) => StepOutcome::Succeeded { details },
                Ok(StepCompletion::NoOp { reason }) => StepOutcome::NoOp { reason },
                Err(e) => match policy {
                    ErrorPolicy::Propagate => {
                        log::error!("Step '{}' failed: {}", id, e);
                        aborted = true;
                        StepOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                    ErrorPolicy::Ignore => {
                        log::warn!("Step '{}' failed (ignored): {}", id, e);
                        StepOutcome::FailedIgnored {
                            error: e.to_string(),
                        }
                    }
                },
            };

            let record = StepRecord {
                step: id,
                policy,
                outcome,
                duration_ms,
            };
            observer.step_finished(&record);
            report.record(record);
        }

        report.artifact = ctx.artifact.clone();
        report.release_url = ctx.release_url.clone();
        report.finish();
        report
    }
}
