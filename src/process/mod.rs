//! Child process execution for the external tools the pipeline drives.
//!
//! Steps describe invocations as [`CommandSpec`]s and hand them to a
//! [`CommandRunner`], so the ordering and error contract can be exercised
//! without git, Python or PyInstaller installed.

use crate::error::{CliError, ReleaseError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// A single program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl CommandSpec {
    /// Create a command running in `cwd`
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into an execution error carrying stderr
    pub fn ensure_success(self, spec: &CommandSpec) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(ReleaseError::Cli(CliError::ExecutionFailed {
            command: spec.to_string(),
            reason: format!(
                "exited with {}: {}",
                self.code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                last_lines(detail, 20)
            ),
        }))
    }
}

/// Executes commands on behalf of pipeline steps
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    ///
    /// A process that starts and exits non-zero is reported through
    /// [`CommandOutput::success`]; failure to start at all is an error.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::info!("$ {} (in {})", spec, spec.cwd.display());

        let output = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ReleaseError::Cli(CliError::ExecutionFailed {
                    command: spec.to_string(),
                    reason: e.to_string(),
                })
            })?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        for line in result.stdout.lines() {
            log::debug!("  {line}");
        }
        for line in result.stderr.lines() {
            log::debug!("  ! {line}");
        }
        if !result.success {
            log::warn!("{} exited with {:?}", spec.program.display(), result.code);
        }

        Ok(result)
    }
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
