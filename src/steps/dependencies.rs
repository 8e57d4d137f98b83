//! Dependency installation: installer upgrade, packaging tool, optional manifest.

use crate::error::Result;
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use async_trait::async_trait;

/// Installs the packaging tool and, when present, the dependency manifest
pub struct InstallDependenciesStep;

#[async_trait]
impl Step for InstallDependenciesStep {
    fn id(&self) -> StepId {
        StepId::InstallDependencies
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let cwd = ctx.workdir()?.to_path_buf();
        let python = ctx.runtime()?.clone();
        let mut details = Vec::new();

        let upgrade = python
            .module("pip", &cwd)
            .args(["install", "--upgrade", "pip"]);
        ctx.runner.run(&upgrade).await?.ensure_success(&upgrade)?;
        details.push("Upgraded pip".to_string());

        let tool = python
            .module("pip", &cwd)
            .args(["install", ctx.config.packaging_tool.as_str()]);
        ctx.runner.run(&tool).await?.ensure_success(&tool)?;
        details.push(format!("Installed {}", ctx.config.packaging_tool));

        // The manifest is only touched by pip, and only when it exists
        let manifest = &ctx.config.requirements;
        if cwd.join(manifest).is_file() {
            let install = python.module("pip", &cwd).args([
                "install".to_string(),
                "-r".to_string(),
                manifest.to_string_lossy().into_owned(),
            ]);
            ctx.runner.run(&install).await?.ensure_success(&install)?;
            details.push(format!("Installed dependencies from {}", manifest.display()));
        } else {
            log::info!("{} not present, skipping", manifest.display());
            details.push(format!("No {} found, skipped", manifest.display()));
        }

        Ok(StepCompletion::with_details(details))
    }
}
