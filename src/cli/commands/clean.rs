//! Clean command: run the cleanup step on its own.

use super::helpers::{ConsoleObserver, load_config, resolve_workdir};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{Pipeline, StepContext};
use crate::process::SystemCommandRunner;
use crate::steps::CleanupStep;
use crate::trigger::TriggerEvent;

/// Execute clean command.
///
/// Cleanup never fails the process; removal errors are reported as warnings.
pub(super) async fn execute_clean(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let workdir = resolve_workdir(args)?;
    let pipeline_config = load_config(args, &workdir)?;
    let trigger = TriggerEvent::ManualDispatch { reference: None };
    let runner = SystemCommandRunner;
    let mut ctx = StepContext::for_workdir(&pipeline_config, &trigger, &workdir, &runner);

    let pipeline = Pipeline::new(vec![Box::new(CleanupStep)]);
    let observer = ConsoleObserver { config };
    pipeline.run(&mut ctx, &observer).await;

    Ok(0)
}
