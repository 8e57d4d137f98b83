//! Status command: show the report of the last run.

use super::helpers::{exit_code, load_config, print_summary, resolve_workdir};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::state::{ReportStore, StepOutcome};

/// Execute status command
pub(super) fn execute_status(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Status { json } = &args.command else {
        unreachable!("execute_status called with non-Status command");
    };

    let workdir = resolve_workdir(args)?;
    // Parse the config so a broken file is reported here too
    let _ = load_config(args, &workdir)?;
    let store = ReportStore::for_workdir(&workdir);

    if !store.exists() {
        config.info_println("No pipeline run recorded in this directory");
        return Ok(0);
    }

    let report = store.load()?;

    if *json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_code(&report));
    }

    config.section("Last run");
    config.println(&format!(
        "Started:  {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for record in &report.steps {
        let line = match &record.outcome {
            StepOutcome::Succeeded { .. } => format!("✓ {}", record.step),
            StepOutcome::NoOp { reason } => format!("- {} ({})", record.step, reason),
            StepOutcome::Failed { error } => format!("✗ {}: {}", record.step, error),
            StepOutcome::FailedIgnored { error } => {
                format!("! {} (ignored): {}", record.step, error)
            }
            StepOutcome::Skipped => format!("· {} skipped", record.step),
        };
        config.indent(&line);
    }

    print_summary(config, &report);
    Ok(exit_code(&report))
}
