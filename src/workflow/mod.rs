//! Renders the GitHub Actions workflow that runs the same pipeline.

use crate::config::PipelineConfig;
use crate::error::{CliError, Result};
use handlebars::Handlebars;
use serde::Serialize;

const RELEASE_TEMPLATE: &str = include_str!("release.yml.hbs");

/// Default location of the rendered workflow in a repository
pub const WORKFLOW_PATH: &str = ".github/workflows/Release.yml";

#[derive(Serialize)]
struct WorkflowData {
    tag_pattern: String,
    python_version: String,
    packaging_tool: String,
    requirements: String,
    entry_script: String,
    artifact_stem: String,
    dist_dir: String,
    artifact: String,
    cleanup_targets: Vec<String>,
}

impl From<&PipelineConfig> for WorkflowData {
    fn from(config: &PipelineConfig) -> Self {
        let slash = |p: &std::path::Path| p.to_string_lossy().replace('\\', "/");
        Self {
            tag_pattern: config.tag_pattern.clone(),
            python_version: config.python_version.clone(),
            packaging_tool: config.packaging_tool.clone(),
            requirements: slash(&config.requirements),
            entry_script: slash(&config.entry_script),
            artifact_stem: config
                .artifact
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.entry_stem()),
            dist_dir: slash(&config.dist_dir),
            artifact: slash(&config.artifact),
            cleanup_targets: config.cleanup_targets.iter().map(|p| slash(p)).collect(),
        }
    }
}

/// Render the release workflow for a configuration
pub fn render_workflow(config: &PipelineConfig) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string("release", RELEASE_TEMPLATE)
        .map_err(|e| render_failed(e.to_string()))?;

    registry
        .render("release", &WorkflowData::from(config))
        .map_err(|e| render_failed(e.to_string()))
}

fn render_failed(reason: String) -> crate::error::ReleaseError {
    CliError::ExecutionFailed {
        command: "render_workflow".to_string(),
        reason,
    }
    .into()
}
