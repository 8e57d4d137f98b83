//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tag-triggered release runner for auto.py
#[derive(Parser, Debug)]
#[command(
    name = "auto_release",
    version,
    about = "Package auto.py into a windowed executable and publish it to a GitHub release",
    long_about = "Runs the release pipeline: checkout, Python setup, dependency install,
PyInstaller packaging, output listing, GitHub release upload and cleanup.

Usage:
  auto_release run                          # trigger read from GitHub Actions env
  auto_release run --ref refs/tags/v1.2.0   # as if v1.2.0 was pushed
  auto_release run --tag v1.2.0 --skip-publish
  auto_release check-trigger refs/tags/v1.2.0
  auto_release workflow > .github/workflows/Release.yml"
)]
pub struct Args {
    /// Repository root to work in
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub workdir: PathBuf,

    /// Config file (default: auto-release.toml in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the release pipeline
    Run {
        /// Repository source: local path, GitHub URL, or owner/repo (default: --workdir)
        #[arg(long, value_name = "SOURCE")]
        source: Option<String>,

        /// Event name (push, workflow_dispatch); default from GITHUB_EVENT_NAME
        #[arg(long, value_name = "EVENT")]
        event: Option<String>,

        /// Ref that triggered the run, e.g. refs/tags/v1.2.0; default from GITHUB_REF
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,

        /// Tag to publish on (manual dispatch)
        #[arg(long, value_name = "TAG")]
        tag: Option<String>,

        /// GitHub repository as owner/repo
        #[arg(long, value_name = "OWNER/REPO")]
        repo: Option<String>,

        /// Build and verify the artifact without uploading it
        #[arg(long)]
        skip_publish: bool,

        /// Do not write .auto-release/last-run.json
        #[arg(long)]
        no_report: bool,

        /// Keep a temporary clone of a remote source after the run
        #[arg(long)]
        keep_checkout: bool,
    },

    /// Check whether a ref would trigger a release
    CheckTrigger {
        /// Ref or tag name, e.g. refs/tags/v1.2.0 or main
        #[arg(value_name = "REF")]
        reference: String,

        /// Event name the ref arrives with
        #[arg(long, default_value = "push")]
        event: String,
    },

    /// Show the pipeline steps and their error policies
    Plan {
        /// Show the plan with publishing disabled
        #[arg(long)]
        skip_publish: bool,
    },

    /// Remove build byproducts (build/, dist/, auto.spec)
    Clean,

    /// Print the equivalent GitHub Actions workflow
    Workflow {
        /// Write to a file instead of stdout (bare flag: .github/workflows/Release.yml)
        #[arg(
            long,
            value_name = "FILE",
            num_args = 0..=1,
            default_missing_value = crate::workflow::WORKFLOW_PATH
        )]
        output: Option<PathBuf>,
    },

    /// Show the report of the last run
    Status {
        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::CheckTrigger { .. } => "check-trigger",
            Command::Plan { .. } => "plan",
            Command::Clean => "clean",
            Command::Workflow { .. } => "workflow",
            Command::Status { .. } => "status",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Run {
            event,
            reference,
            repo,
            ..
        } = &self.command
        {
            if event.as_deref() == Some("push") && reference.is_none() {
                return Err("--event push needs --ref".to_string());
            }
            if let Some(repo) = repo
                && repo.split_once('/').is_none_or(|(o, r)| o.is_empty() || r.is_empty())
            {
                return Err(format!("--repo must be owner/repo, got '{repo}'"));
            }
        }
        if let Command::CheckTrigger { reference, .. } = &self.command
            && reference.trim().is_empty()
        {
            return Err("REF must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_ref() {
        let args = Args::try_parse_from([
            "auto_release",
            "run",
            "--ref",
            "refs/tags/v1.0.0",
            "--skip-publish",
        ])
        .expect("valid args");
        match &args.command {
            Command::Run {
                reference,
                skip_publish,
                ..
            } => {
                assert_eq!(reference.as_deref(), Some("refs/tags/v1.0.0"));
                assert!(*skip_publish);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_global_workdir_after_subcommand() {
        let args = Args::try_parse_from(["auto_release", "clean", "--workdir", "/tmp/repo"])
            .expect("valid args");
        assert_eq!(args.workdir, PathBuf::from("/tmp/repo"));
        assert_eq!(args.command.name(), "clean");
    }

    #[test]
    fn test_validate_rejects_bad_repo() {
        let args = Args::try_parse_from(["auto_release", "run", "--repo", "nope"])
            .expect("parses");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_push_needs_ref() {
        let args = Args::try_parse_from(["auto_release", "run", "--event", "push"])
            .expect("parses");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_bare_workflow_output_uses_default_path() {
        let args = Args::try_parse_from(["auto_release", "workflow", "--output"])
            .expect("parses");
        match args.command {
            Command::Workflow { output } => {
                assert_eq!(output, Some(PathBuf::from(".github/workflows/Release.yml")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["auto_release", "-v", "-q", "plan"]).is_err());
    }
}
