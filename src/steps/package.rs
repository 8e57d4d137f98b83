//! Packaging: bundle the entry script into a single windowed executable.

use crate::error::{PackagingError, Result};
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use crate::state::ArtifactInfo;
use async_trait::async_trait;
use sha2::Digest as _;
use std::path::{Path, PathBuf};

/// Module name the packaging tool is invoked as
const PACKAGER_MODULE: &str = "PyInstaller";

/// Runs the packaging tool and verifies its single output
pub struct PackageStep;

#[async_trait]
impl Step for PackageStep {
    fn id(&self) -> StepId {
        StepId::Package
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let cwd = ctx.workdir()?.to_path_buf();
        let config = ctx.config;

        let script = cwd.join(&config.entry_script);
        if !script.is_file() {
            return Err(PackagingError::EntryScriptMissing { path: script }.into());
        }

        let name = config
            .artifact
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.entry_stem());

        let spec = ctx.runtime()?.module(PACKAGER_MODULE, &cwd).args([
            "--noconfirm".to_string(),
            "--onefile".to_string(),
            "--windowed".to_string(),
            "--name".to_string(),
            name,
            "--distpath".to_string(),
            config.dist_dir.to_string_lossy().into_owned(),
            config.entry_script.to_string_lossy().into_owned(),
        ]);

        let output = ctx.runner.run(&spec).await?;
        if !output.success {
            let reason = output
                .ensure_success(&spec)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_default();
            return Err(PackagingError::ToolFailed { reason }.into());
        }

        let artifact = verify_artifact(&cwd, &config.dist_dir, &config.artifact)?;
        let info = describe_artifact(&cwd, &config.artifact).await?;
        let detail = format!(
            "Built {} ({} bytes, sha256 {})",
            artifact.display(),
            info.size,
            info.sha256
        );
        ctx.artifact = Some(info);

        Ok(StepCompletion::with_details(vec![detail]))
    }
}

/// Check that `artifact` exists and is the only executable in `dist_dir`
pub fn verify_artifact(cwd: &Path, dist_dir: &Path, artifact: &Path) -> Result<PathBuf> {
    let artifact_path = cwd.join(artifact);
    if !artifact_path.is_file() {
        return Err(PackagingError::ArtifactMissing {
            path: artifact.to_path_buf(),
        }
        .into());
    }

    let mut extra = Vec::new();
    for entry in walkdir::WalkDir::new(cwd.join(dist_dir)).min_depth(1) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if entry.file_type().is_file()
            && entry.path() != artifact_path
            && is_executable(entry.path())
        {
            extra.push(
                entry
                    .path()
                    .strip_prefix(cwd)
                    .unwrap_or(entry.path())
                    .to_path_buf(),
            );
        }
    }

    if !extra.is_empty() {
        extra.sort();
        return Err(PackagingError::UnexpectedArtifacts { extra }.into());
    }

    Ok(artifact.to_path_buf())
}

/// Size and SHA-256 of the artifact.
///
/// Hashing runs on the blocking pool so it does not stall the runtime.
pub async fn describe_artifact(cwd: &Path, artifact: &Path) -> Result<ArtifactInfo> {
    let path = cwd.join(artifact);
    let data = tokio::fs::read(&path).await?;
    let size = data.len() as u64;

    let sha256 = tokio::task::spawn_blocking(move || {
        let mut hasher = sha2::Sha256::new();
        hasher.update(&data);
        hex::encode(hasher.finalize())
    })
    .await
    .map_err(|e| std::io::Error::other(format!("hash task failed: {e}")))?;

    Ok(ArtifactInfo {
        path: artifact.to_path_buf(),
        size,
        sha256,
    })
}

fn is_executable(path: &Path) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            ["exe", "com", "bat", "cmd"]
                .iter()
                .any(|x| e.eq_ignore_ascii_case(x))
        });
    if by_extension {
        return true;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = std::fs::metadata(path) {
            return meta.permissions().mode() & 0o111 != 0;
        }
    }

    false
}
