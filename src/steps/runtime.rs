//! Runtime setup: find an interpreter reporting the pinned version.

use crate::error::{Result, RuntimeError};
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use crate::process::CommandSpec;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A resolved Python interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRuntime {
    /// Interpreter or launcher program
    pub program: PathBuf,
    /// Arguments selecting the version on a launcher (`py -3.12`)
    pub launcher_args: Vec<String>,
    /// Version the interpreter reported
    pub version: String,
}

impl PythonRuntime {
    /// Base command invoking this interpreter in `cwd`
    pub fn command(&self, cwd: &Path) -> CommandSpec {
        CommandSpec::new(self.program.clone(), cwd).args(self.launcher_args.iter().cloned())
    }

    /// Base command running `python -m <module>` in `cwd`
    pub fn module(&self, module: &str, cwd: &Path) -> CommandSpec {
        self.command(cwd).args(["-m", module])
    }
}

/// Tries interpreter candidates in order
pub struct RuntimeSetupStep;

#[async_trait]
impl Step for RuntimeSetupStep {
    fn id(&self) -> StepId {
        StepId::RuntimeSetup
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let pinned = ctx.config.python_version.clone();
        let cwd = ctx.workdir()?.to_path_buf();
        let candidates = interpreter_candidates(ctx.config.python.as_deref(), &pinned);

        for (program, launcher_args) in &candidates {
            let program = resolve_program(program);
            let spec = CommandSpec::new(program.clone(), &cwd)
                .args(launcher_args.iter().cloned())
                .arg("--version");

            let output = match ctx.runner.run(&spec).await {
                Ok(output) if output.success => output,
                Ok(_) => continue,
                Err(e) => {
                    log::debug!("Interpreter candidate {} unavailable: {}", spec, e);
                    continue;
                }
            };

            // Python 2 and some 3.x builds print the version on stderr
            let reported = parse_version(&output.stdout).or_else(|| parse_version(&output.stderr));
            match reported {
                Some(version) if version_matches(&pinned, &version) => {
                    log::info!("Using Python {} from {}", version, program.display());
                    let runtime = PythonRuntime {
                        program,
                        launcher_args: launcher_args.clone(),
                        version,
                    };
                    let detail = format!(
                        "Python {} ({})",
                        runtime.version,
                        runtime.command(&cwd)
                    );
                    ctx.runtime = Some(runtime);
                    return Ok(StepCompletion::with_details(vec![detail]));
                }
                Some(version) => {
                    log::debug!("{} reports Python {}, need {}", spec, version, pinned);
                }
                None => log::debug!("{} printed no version", spec),
            }
        }

        Err(RuntimeError::VersionUnavailable {
            version: pinned,
            candidates: candidates
                .iter()
                .map(|(p, a)| {
                    std::iter::once(p.display().to_string())
                        .chain(a.iter().cloned())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
        }
        .into())
    }
}

/// Interpreter candidates: explicit interpreter, versioned name, Windows
/// launcher, then the generic names.
pub fn interpreter_candidates(
    explicit: Option<&Path>,
    version: &str,
) -> Vec<(PathBuf, Vec<String>)> {
    let mut candidates = Vec::new();
    if let Some(explicit) = explicit {
        candidates.push((explicit.to_path_buf(), Vec::new()));
    }
    candidates.push((PathBuf::from(format!("python{version}")), Vec::new()));
    if cfg!(windows) {
        candidates.push((PathBuf::from("py"), vec![format!("-{version}")]));
    }
    candidates.push((PathBuf::from("python3"), Vec::new()));
    candidates.push((PathBuf::from("python"), Vec::new()));
    candidates
}

/// Full path for a bare program name when it is on PATH
fn resolve_program(program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        return program.to_path_buf();
    }
    which::which(program).unwrap_or_else(|_| program.to_path_buf())
}

/// Extract `3.12.4` from `Python 3.12.4`
pub fn parse_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Python ")?;
        let version = rest.split_whitespace().next()?;
        version
            .chars()
            .next()
            .filter(char::is_ascii_digit)
            .map(|_| version.to_string())
    })
}

/// Whether a reported version satisfies a pin, component by component.
///
/// `3.12` accepts `3.12.0` and `3.12.7` but not `3.1` or `3.120`.
pub fn version_matches(pin: &str, reported: &str) -> bool {
    let pin: Vec<&str> = pin.trim().split('.').collect();
    let reported: Vec<&str> = reported.trim().split('.').collect();
    if reported.len() < pin.len() {
        return false;
    }
    pin.iter().zip(reported.iter()).all(|(p, r)| {
        // Drop pre-release suffixes such as `0rc1`
        let r_digits: String = r.chars().take_while(char::is_ascii_digit).collect();
        !r_digits.is_empty() && *p == r_digits
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("Python 3.12.4\n").as_deref(), Some("3.12.4"));
        assert_eq!(parse_version("  Python 3.11.9").as_deref(), Some("3.11.9"));
        assert_eq!(parse_version("python: command not found"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_version_matches_component_wise() {
        assert!(version_matches("3.12", "3.12.0"));
        assert!(version_matches("3.12", "3.12.7"));
        assert!(version_matches("3.12", "3.12.0rc1"));
        assert!(!version_matches("3.12", "3.1"));
        assert!(!version_matches("3.12", "3.120.1"));
        assert!(!version_matches("3.12", "3.11.9"));
        assert!(version_matches("3", "3.12.1"));
    }

    #[test]
    fn test_candidates_start_with_explicit_interpreter() {
        let candidates = interpreter_candidates(Some(Path::new("/opt/py/bin/python")), "3.12");
        assert_eq!(candidates[0].0, PathBuf::from("/opt/py/bin/python"));
        assert_eq!(candidates[1].0, PathBuf::from("python3.12"));
        assert_eq!(
            candidates.last().map(|(p, _)| p.clone()),
            Some(PathBuf::from("python"))
        );
    }

    #[test]
    fn test_module_command() {
        let runtime = PythonRuntime {
            program: PathBuf::from("py"),
            launcher_args: vec!["-3.12".to_string()],
            version: "3.12.1".to_string(),
        };
        let spec = runtime.module("pip", Path::new("."));
        assert_eq!(spec.to_string(), "py -3.12 -m pip");
    }
}
