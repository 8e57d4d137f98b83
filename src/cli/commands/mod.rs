//! Command execution functions.
//!
//! Each command returns a process exit code; errors are reported here with
//! recovery suggestions and mapped to exit code 1.

mod check_trigger;
mod clean;
mod helpers;
mod plan;
mod run;
mod status;
mod workflow;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use check_trigger::execute_check_trigger;
use clean::execute_clean;
use plan::execute_plan;
use run::execute_run;
use status::execute_status;
use workflow::execute_workflow;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Validate arguments
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(2);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Run { .. } => execute_run(&args, &config).await,
        Command::CheckTrigger { .. } => execute_check_trigger(&args, &config),
        Command::Plan { .. } => execute_plan(&args, &config),
        Command::Clean => execute_clean(&args, &config).await,
        Command::Workflow { .. } => execute_workflow(&args, &config),
        Command::Status { .. } => execute_status(&args, &config),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }
            if !e.is_recoverable() {
                config.warning_println("Running again will fail the same way until this is fixed");
            }

            Ok(1)
        }
    }
}
