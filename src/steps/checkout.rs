//! Checkout: make the repository available at the triggering ref.

use crate::error::{CheckoutError, Result};
use crate::pipeline::{Step, StepCompletion, StepContext, StepId, TempCheckout};
use crate::process::CommandSpec;
use crate::source::RepositorySource;
use async_trait::async_trait;
use std::path::Path;

/// Clones remote sources; verifies local ones
pub struct CheckoutStep;

#[async_trait]
impl Step for CheckoutStep {
    fn id(&self) -> StepId {
        StepId::Checkout
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let reference = ctx.trigger.checkout_ref();

        match ctx.source.clone() {
            RepositorySource::Local(path) => {
                if !path.is_dir() {
                    return Err(CheckoutError::SourceNotFound { path }.into());
                }
                let mut details = vec![format!("Using checkout at {}", path.display())];

                if let Some(reference) = reference
                    && path.join(".git").exists()
                {
                    let commit = verify_head_at_ref(ctx, &path, &reference).await?;
                    details.push(format!("HEAD is at {reference} ({commit})"));
                }

                ctx.workdir = Some(path);
                Ok(StepCompletion::with_details(details))
            }
            source @ RepositorySource::GitHub { .. } => {
                let url = source.clone_url().ok_or_else(|| CheckoutError::InvalidSource {
                    source_spec: format!("{source:?}"),
                })?;
                let parent = std::env::temp_dir();
                let dest = parent.join(format!("auto-release-{}", ctx.run_id));

                let mut spec = CommandSpec::new("git", &parent).args(["clone", "--depth", "1"]);
                if let Some(reference) = &reference {
                    spec = spec.args(["--branch", reference.as_str()]);
                }
                let spec = spec
                    .arg(url.as_str())
                    .arg(dest.to_string_lossy().into_owned());

                // Track before cloning so a partial clone is removed too
                ctx.temp_checkout = Some(TempCheckout::new(dest.clone(), ctx.keep_checkout));

                let output = ctx.runner.run(&spec).await?;
                if !output.success {
                    return Err(CheckoutError::CloneFailed {
                        url,
                        reason: output.stderr.trim().to_string(),
                    }
                    .into());
                }

                let detail = match &reference {
                    Some(r) => format!("Cloned {url} at {r} into {}", dest.display()),
                    None => format!("Cloned {url} into {}", dest.display()),
                };
                ctx.workdir = Some(dest);
                Ok(StepCompletion::with_details(vec![detail]))
            }
        }
    }
}

/// Ensure the working tree at `repo` is checked out at `reference`.
///
/// Returns the commit both resolve to.
async fn verify_head_at_ref(ctx: &StepContext<'_>, repo: &Path, reference: &str) -> Result<String> {
    let expected = resolve_commit(ctx, repo, reference)
        .await?
        .ok_or_else(|| CheckoutError::RefNotFound {
            reference: reference.to_string(),
            path: repo.to_path_buf(),
        })?;
    let head = resolve_commit(ctx, repo, "HEAD")
        .await?
        .ok_or_else(|| CheckoutError::RefNotFound {
            reference: "HEAD".to_string(),
            path: repo.to_path_buf(),
        })?;

    if head != expected {
        return Err(CheckoutError::RefMismatch {
            reference: reference.to_string(),
            expected,
            head,
        }
        .into());
    }
    Ok(expected)
}

/// Commit id `reference` points to, `None` when it does not resolve
async fn resolve_commit(ctx: &StepContext<'_>, repo: &Path, reference: &str) -> Result<Option<String>> {
    let spec = CommandSpec::new("git", repo).args([
        "rev-parse".to_string(),
        "--verify".to_string(),
        "--quiet".to_string(),
        format!("{reference}^{{commit}}"),
    ]);
    let output = ctx.runner.run(&spec).await?;
    let commit = output.stdout.trim();
    if output.success && !commit.is_empty() {
        Ok(Some(commit.to_string()))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::error::ReleaseError;
    use crate::pipeline::Pipeline;
    use crate::process::{CommandOutput, CommandRunner};
    use crate::state::{RunStatus, StepOutcome};
    use crate::steps::PublishStep;
    use crate::trigger::TriggerEvent;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers `git rev-parse` from a ref table and `git clone` with a fixed result
    #[derive(Default)]
    struct ScriptedGit {
        commits: HashMap<String, String>,
        clone_fails: bool,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedGit {
        fn with_commits(commits: &[(&str, &str)]) -> Self {
            Self {
                commits: commits
                    .iter()
                    .map(|(r, c)| (r.to_string(), c.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    fn exit(success: bool, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            success,
            code: Some(if success { 0 } else { 128 }),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedGit {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().expect("calls lock").push(spec.clone());
            assert_eq!(spec.program, Path::new("git"));

            let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
            match args.as_slice() {
                ["rev-parse", "--verify", "--quiet", target] => {
                    let reference = target.trim_end_matches("^{commit}");
                    Ok(match self.commits.get(reference) {
                        Some(commit) => exit(true, &format!("{commit}\n"), ""),
                        None => exit(false, "", ""),
                    })
                }
                ["clone", ..] if self.clone_fails => Ok(exit(
                    false,
                    "",
                    "fatal: Remote branch v9.9.9 not found in upstream origin\n",
                )),
                ["clone", ..] => Ok(exit(true, "", "")),
                _ => Ok(exit(false, "", "unexpected git invocation")),
            }
        }
    }

    fn tag_push(tag: &str) -> TriggerEvent {
        TriggerEvent::TagPush {
            tag: tag.to_string(),
        }
    }

    fn git_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join(".git")).expect("create .git");
        dir
    }

    #[tokio::test]
    async fn test_remote_source_is_shallow_cloned_at_tag() {
        let config = PipelineConfig::default();
        let trigger = tag_push("v1.0.0");
        let git = ScriptedGit::default();
        let source = RepositorySource::GitHub {
            owner: "octo".to_string(),
            repo: "auto".to_string(),
        };
        let mut ctx = StepContext::new(&config, &trigger, source, &git);

        CheckoutStep.run(&mut ctx).await.expect("clone succeeds");

        let dest = std::env::temp_dir().join(format!("auto-release-{}", ctx.run_id));
        let calls = git.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec![
                "clone".to_string(),
                "--depth".to_string(),
                "1".to_string(),
                "--branch".to_string(),
                "v1.0.0".to_string(),
                "https://github.com/octo/auto.git".to_string(),
                dest.to_string_lossy().into_owned(),
            ]
        );
        assert_eq!(ctx.workdir.as_deref(), Some(dest.as_path()));
        assert_eq!(
            ctx.temp_checkout.as_ref().map(|t| t.path().to_path_buf()),
            Some(dest)
        );
    }

    #[tokio::test]
    async fn test_failed_clone_aborts_pipeline() {
        let config = PipelineConfig::default();
        let trigger = tag_push("v9.9.9");
        let git = ScriptedGit {
            clone_fails: true,
            ..ScriptedGit::default()
        };
        let source = RepositorySource::GitHub {
            owner: "octo".to_string(),
            repo: "auto".to_string(),
        };
        let mut ctx = StepContext::new(&config, &trigger, source, &git);

        let report = Pipeline::standard(PublishStep::disabled())
            .run(&mut ctx, &())
            .await;

        assert_eq!(report.status, RunStatus::Failed);
        match &report.steps[0].outcome {
            StepOutcome::Failed { error } => {
                assert!(error.contains("Failed to clone https://github.com/octo/auto.git"));
                assert!(error.contains("Remote branch v9.9.9 not found"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(
            report.steps[1..]
                .iter()
                .all(|r| r.outcome == StepOutcome::Skipped)
        );
        assert_eq!(git.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_ref_is_reported() {
        let dir = git_dir();
        let config = PipelineConfig::default();
        let trigger = tag_push("v1.0.0");
        let git = ScriptedGit::with_commits(&[("HEAD", "1111111")]);
        let mut ctx = StepContext::new(
            &config,
            &trigger,
            RepositorySource::Local(dir.path().to_path_buf()),
            &git,
        );

        let err = CheckoutStep.run(&mut ctx).await.expect_err("ref is missing");

        assert!(matches!(
            err,
            ReleaseError::Checkout(CheckoutError::RefNotFound { ref reference, .. })
                if reference == "v1.0.0"
        ));
        assert!(ctx.workdir.is_none());
    }

    #[tokio::test]
    async fn test_head_behind_or_ahead_of_tag_is_rejected() {
        let dir = git_dir();
        let config = PipelineConfig::default();
        let trigger = tag_push("v1.0.0");
        let git = ScriptedGit::with_commits(&[("v1.0.0", "1111111"), ("HEAD", "2222222")]);
        let mut ctx = StepContext::new(
            &config,
            &trigger,
            RepositorySource::Local(dir.path().to_path_buf()),
            &git,
        );

        let err = CheckoutStep.run(&mut ctx).await.expect_err("HEAD is elsewhere");

        match err {
            ReleaseError::Checkout(CheckoutError::RefMismatch {
                reference,
                expected,
                head,
            }) => {
                assert_eq!(reference, "v1.0.0");
                assert_eq!(expected, "1111111");
                assert_eq!(head, "2222222");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(ctx.workdir.is_none());
    }

    #[tokio::test]
    async fn test_head_at_tag_uses_checkout_in_place() {
        let dir = git_dir();
        let config = PipelineConfig::default();
        let trigger = tag_push("v1.0.0");
        let git = ScriptedGit::with_commits(&[("v1.0.0", "1111111"), ("HEAD", "1111111")]);
        let mut ctx = StepContext::new(
            &config,
            &trigger,
            RepositorySource::Local(dir.path().to_path_buf()),
            &git,
        );

        let completion = CheckoutStep.run(&mut ctx).await.expect("HEAD at tag");

        assert_eq!(ctx.workdir.as_deref(), Some(dir.path()));
        match completion {
            StepCompletion::Done { details } => {
                assert!(details.iter().any(|d| d.contains("v1.0.0 (1111111)")));
            }
            other => panic!("unexpected completion {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_source_without_git_skips_verification() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::default();
        let trigger = tag_push("v1.0.0");
        let git = ScriptedGit::default();
        let mut ctx = StepContext::new(
            &config,
            &trigger,
            RepositorySource::Local(dir.path().to_path_buf()),
            &git,
        );

        CheckoutStep.run(&mut ctx).await.expect("plain directory");

        assert!(git.calls().is_empty());
        assert_eq!(ctx.workdir.as_deref(), Some(dir.path()));
    }
}
