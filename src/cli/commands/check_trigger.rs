//! Check-trigger command: decide whether a ref starts a release.

use super::helpers::{load_config, resolve_workdir};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::trigger::{TriggerEvent, TriggerFilter};

/// Execute check-trigger command.
///
/// Exit code 0 when the ref would start the pipeline, 1 otherwise.
pub(super) fn execute_check_trigger(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::CheckTrigger { reference, event } = &args.command else {
        unreachable!("execute_check_trigger called with non-CheckTrigger command");
    };

    let workdir = resolve_workdir(args)?;
    let pipeline_config = load_config(args, &workdir)?;
    let filter = TriggerFilter::new(&pipeline_config.tag_pattern)?;
    let trigger = TriggerEvent::from_ref(event, Some(reference));

    if filter.activates(&trigger) {
        config.success_println(&format!("{} triggers a release", trigger));
        Ok(0)
    } else {
        config.info_println(&format!(
            "{} does not match '{}'",
            trigger,
            filter.pattern()
        ));
        Ok(1)
    }
}
