//! Plan command: list the steps a run would execute.

use super::helpers::{load_config, resolve_workdir};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{ErrorPolicy, Pipeline};
use crate::steps::PublishStep;

/// Execute plan command
pub(super) fn execute_plan(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Plan { skip_publish } = &args.command else {
        unreachable!("execute_plan called with non-Plan command");
    };

    let workdir = resolve_workdir(args)?;
    let pipeline_config = load_config(args, &workdir)?;
    let publish = if *skip_publish {
        PublishStep::disabled()
    } else {
        PublishStep::github()
    };
    let pipeline = Pipeline::standard(publish);

    config.section("Release plan");
    config.println(&format!(
        "Trigger:   tags matching '{}' or manual dispatch",
        pipeline_config.tag_pattern
    ));
    config.println(&format!("Python:    {}", pipeline_config.python_version));
    config.println(&format!("Entry:     {}", pipeline_config.entry_script.display()));
    config.println(&format!("Artifact:  {}", pipeline_config.artifact.display()));
    if let Some(repo) = &pipeline_config.repository {
        config.println(&format!("Repository: {}", repo));
    }
    config.println("");

    for (index, (step, policy)) in pipeline.plan().into_iter().enumerate() {
        let marker = match policy {
            ErrorPolicy::Propagate => "",
            ErrorPolicy::Ignore => " (errors ignored)",
        };
        config.println(&format!("  {}. {}{}", index + 1, step, marker));
    }
    if *skip_publish {
        config.indent("publish is disabled for this plan");
    }

    Ok(0)
}
