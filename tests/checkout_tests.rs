#[cfg(test)]
mod tests {
    use auto_release::pipeline::{Pipeline, StepContext, StepId};
    use auto_release::state::{RunStatus, StepOutcome};
    use auto_release::steps::CheckoutStep;
    use auto_release::{PipelineConfig, RepositorySource, SystemCommandRunner, TriggerEvent};
    use std::path::Path;
    use std::process::Command;

    fn git(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.name=Release Bot",
                "-c",
                "user.email=release@example.test",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .current_dir(repo)
            .status()
            .expect("run git");
        assert!(status.success(), "git {args:?} failed");
    }

    /// Repository with `v1.0.0` on the first commit and an unreleased
    /// change to `auto.py` checked out on top of it
    fn repo_ahead_of_tag() -> Option<tempfile::TempDir> {
        if which::which("git").is_err() {
            eprintln!("git not installed, skipping");
            return None;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        git(root, &["init", "-q"]);
        std::fs::write(root.join("auto.py"), "print('release')\n").expect("write auto.py");
        git(root, &["add", "auto.py"]);
        git(root, &["commit", "-q", "-m", "release"]);
        git(root, &["tag", "v1.0.0"]);
        std::fs::write(root.join("auto.py"), "print('unreleased main')\n").expect("write auto.py");
        git(root, &["commit", "-q", "-a", "-m", "unreleased"]);
        Some(dir)
    }

    async fn checkout(root: &Path, tag: &str) -> auto_release::RunReport {
        let config = PipelineConfig::default();
        let trigger = TriggerEvent::TagPush {
            tag: tag.to_string(),
        };
        let runner = SystemCommandRunner;
        let mut ctx = StepContext::new(
            &config,
            &trigger,
            RepositorySource::Local(root.to_path_buf()),
            &runner,
        );
        Pipeline::new(vec![Box::new(CheckoutStep)])
            .run(&mut ctx, &())
            .await
    }

    #[tokio::test]
    async fn test_checkout_ahead_of_tag_is_not_built() {
        let Some(dir) = repo_ahead_of_tag() else {
            return;
        };

        let report = checkout(dir.path(), "v1.0.0").await;

        assert_eq!(report.status, RunStatus::Failed);
        match &report.step(StepId::Checkout).expect("recorded").outcome {
            StepOutcome::Failed { error } => {
                assert!(error.contains("'v1.0.0'"), "unexpected error: {error}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_at_tag_is_accepted() {
        let Some(dir) = repo_ahead_of_tag() else {
            return;
        };
        git(dir.path(), &["checkout", "-q", "v1.0.0"]);

        let report = checkout(dir.path(), "v1.0.0").await;

        assert_eq!(report.status, RunStatus::Succeeded);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("auto.py")).expect("read auto.py"),
            "print('release')\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_tag_fails_checkout() {
        let Some(dir) = repo_ahead_of_tag() else {
            return;
        };

        let report = checkout(dir.path(), "v2.0.0").await;

        assert_eq!(report.failed_step().map(|r| r.step), Some(StepId::Checkout));
    }
}
