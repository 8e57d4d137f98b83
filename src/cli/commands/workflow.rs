//! Workflow command: render the GitHub Actions workflow.

use super::helpers::{load_config, resolve_workdir};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::workflow::render_workflow;
use std::io::Write;

/// Execute workflow command
pub(super) fn execute_workflow(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Workflow { output } = &args.command else {
        unreachable!("execute_workflow called with non-Workflow command");
    };

    let workdir = resolve_workdir(args)?;
    let pipeline_config = load_config(args, &workdir)?;
    let rendered = render_workflow(&pipeline_config)?;

    match output {
        Some(path) => {
            let path = workdir.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            config.success_println(&format!("Wrote {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(0)
}
