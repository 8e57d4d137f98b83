//! Cleanup: remove local build byproducts, best effort.

use crate::error::{CliError, Result};
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Removes every cleanup target, attempting all of them even after a failure
pub struct CleanupStep;

#[async_trait]
impl Step for CleanupStep {
    fn id(&self) -> StepId {
        StepId::Cleanup
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let cwd = ctx.workdir()?.to_path_buf();
        let summary = remove_targets(&cwd, &ctx.config.cleanup_targets).await;

        if !summary.failed.is_empty() {
            let reason = summary
                .failed
                .iter()
                .map(|(path, e)| format!("{}: {}", path.display(), e))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CliError::ExecutionFailed {
                command: "cleanup".to_string(),
                reason,
            }
            .into());
        }

        if summary.removed.is_empty() {
            return Ok(StepCompletion::no_op("nothing to clean"));
        }

        Ok(StepCompletion::with_details(
            summary
                .removed
                .iter()
                .map(|p| format!("Removed {}", p.display()))
                .collect(),
        ))
    }
}

/// What [`remove_targets`] did
#[derive(Debug, Default)]
pub struct CleanupSummary {
    /// Targets that existed and were removed
    pub removed: Vec<PathBuf>,
    /// Targets that did not exist
    pub missing: Vec<PathBuf>,
    /// Targets that could not be removed
    pub failed: Vec<(PathBuf, io::Error)>,
}

/// Remove each target under `cwd`; directories recursively
pub async fn remove_targets(cwd: &Path, targets: &[PathBuf]) -> CleanupSummary {
    let mut summary = CleanupSummary::default();
    for target in targets {
        match remove_path(&cwd.join(target)).await {
            Ok(true) => summary.removed.push(target.clone()),
            Ok(false) => summary.missing.push(target.clone()),
            Err(e) => {
                log::warn!("Failed to remove {}: {}", target.display(), e);
                summary.failed.push((target.clone(), e));
            }
        }
    }
    summary
}

/// Removes a file or directory tree; `Ok(false)` if nothing was there
async fn remove_path(path: &Path) -> io::Result<bool> {
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).await?;
    } else {
        fs::remove_file(path).await?;
    }
    Ok(true)
}
