//! Run command: resolve the trigger and execute the release pipeline.

use super::helpers::{ConsoleObserver, exit_code, load_config, print_summary, resolve_workdir};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::pipeline::{Pipeline, StepContext};
use crate::process::SystemCommandRunner;
use crate::source::RepositorySource;
use crate::state::ReportStore;
use crate::steps::PublishStep;
use crate::trigger::{TriggerEvent, TriggerFilter};

/// Execute run command
pub(super) async fn execute_run(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Run {
        source,
        event,
        reference,
        tag,
        repo,
        skip_publish,
        no_report,
        keep_checkout,
    } = &args.command
    else {
        unreachable!("execute_run called with non-Run command");
    };

    let workdir = resolve_workdir(args)?;
    let source = match source {
        Some(source) => RepositorySource::parse(source)?,
        None => RepositorySource::Local(workdir.clone()),
    };

    // Config lives in the repository for local sources, else next to the caller
    let config_dir = match &source {
        RepositorySource::Local(path) => path.clone(),
        RepositorySource::GitHub { .. } => workdir.clone(),
    };
    let mut pipeline_config = load_config(args, &config_dir)?;
    if let Some(repo) = repo {
        pipeline_config.repository = Some(repo.clone());
        pipeline_config.validate()?;
    }

    let trigger = resolve_trigger(event.as_deref(), reference.as_deref())?;
    let filter = TriggerFilter::new(&pipeline_config.tag_pattern)?;
    if !filter.activates(&trigger) {
        config.warning_println(&format!(
            "{} does not trigger a release (tags matching '{}' or manual dispatch only)",
            trigger,
            filter.pattern()
        ));
        return Ok(0);
    }

    config.section("Release pipeline");
    config.println(&format!("Trigger: {}", trigger));
    config.verbose_println(&format!("Source: {:?}", source));

    let publish = if *skip_publish {
        PublishStep::disabled()
    } else {
        PublishStep::github()
    };
    let pipeline = Pipeline::standard(publish);

    let runner = SystemCommandRunner;
    let mut ctx = StepContext::new(&pipeline_config, &trigger, source, &runner);
    ctx.explicit_tag = tag.clone();
    ctx.keep_checkout = *keep_checkout;

    let observer = ConsoleObserver { config };
    let report = pipeline.run(&mut ctx, &observer).await;
    drop(ctx);

    if pipeline_config.write_report && !no_report {
        let store = ReportStore::for_workdir(&config_dir);
        match store.save(&report) {
            Ok(()) => config.verbose_println(&format!("Report saved to {}", store.path().display())),
            Err(e) => config.warning_println(&format!("Failed to save run report: {}", e)),
        }
    }

    print_summary(config, &report);
    Ok(exit_code(&report))
}

/// Trigger from explicit arguments, else the Actions environment, else a
/// manual dispatch
fn resolve_trigger(event: Option<&str>, reference: Option<&str>) -> Result<TriggerEvent> {
    match (event, reference) {
        (Some(event), reference) => Ok(TriggerEvent::from_ref(event, reference)),
        (None, Some(reference)) => Ok(TriggerEvent::from_ref("push", Some(reference))),
        (None, None) if std::env::var_os("GITHUB_EVENT_NAME").is_some() => {
            TriggerEvent::from_github_env()
        }
        (None, None) => Ok(TriggerEvent::ManualDispatch { reference: None }),
    }
}
