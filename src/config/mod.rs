//! Pipeline configuration.
//!
//! Defaults are the fixed identifiers of the release pipeline. A TOML file
//! and environment variables may override them; CLI flags are applied last
//! by the command layer.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "auto-release.toml";

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Glob a pushed tag must match
    pub tag_pattern: String,
    /// Entry-point script, relative to the repository root
    pub entry_script: PathBuf,
    /// Pinned interpreter version
    pub python_version: String,
    /// Explicit interpreter to try before probing PATH
    pub python: Option<PathBuf>,
    /// Optional dependency manifest
    pub requirements: PathBuf,
    /// Package installed unconditionally to do the packaging
    pub packaging_tool: String,
    /// Output directory of the packaging tool
    pub dist_dir: PathBuf,
    /// Artifact the packaging step must produce
    pub artifact: PathBuf,
    /// Paths removed after the run, errors ignored
    pub cleanup_targets: Vec<PathBuf>,
    /// GitHub repository as owner/repo
    pub repository: Option<String>,
    /// GitHub REST API base URL
    pub api_url: String,
    /// GitHub upload base URL
    pub upload_url: String,
    /// Persist a run report under the working directory
    pub write_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tag_pattern: "v*".to_string(),
            entry_script: PathBuf::from("auto.py"),
            python_version: "3.12".to_string(),
            python: None,
            requirements: PathBuf::from("requirements.txt"),
            packaging_tool: "pyinstaller".to_string(),
            dist_dir: PathBuf::from("dist"),
            artifact: PathBuf::from("dist/auto.exe"),
            cleanup_targets: vec![
                PathBuf::from("build"),
                PathBuf::from("dist"),
                PathBuf::from("auto.spec"),
            ],
            repository: None,
            api_url: "https://api.github.com".to_string(),
            upload_url: "https://uploads.github.com".to_string(),
            write_report: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration for a working directory.
    ///
    /// An explicit `path` must exist. Otherwise `auto-release.toml` in
    /// `workdir` is used when present. Environment overrides are applied
    /// on top in both cases.
    pub fn load(workdir: &Path, path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = workdir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            crate::error::ReleaseError::Config(ConfigError::LoadFailed { reason, .. }) => {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    reason,
                }
                .into()
            }
            other => other,
        })
    }

    /// Parse TOML config content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ConfigError::LoadFailed {
                path: PathBuf::from(CONFIG_FILE_NAME),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// `AUTO_RELEASE_REPO` wins over `GITHUB_REPOSITORY`, which only fills
    /// an unset repository.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(python) = non_empty("AUTO_RELEASE_PYTHON") {
            self.python = Some(PathBuf::from(python));
        }
        if let Some(repo) = non_empty("AUTO_RELEASE_REPO") {
            self.repository = Some(repo);
        } else if self.repository.is_none()
            && let Some(repo) = non_empty("GITHUB_REPOSITORY")
        {
            self.repository = Some(repo);
        }
        if let Some(url) = non_empty("AUTO_RELEASE_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = non_empty("AUTO_RELEASE_UPLOAD_URL") {
            self.upload_url = url;
        }
    }

    /// Validate values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.tag_pattern.trim().is_empty() {
            return Err(invalid("tag_pattern", "must not be empty"));
        }
        if let Err(e) = glob::Pattern::new(&self.tag_pattern) {
            return Err(invalid("tag_pattern", &e.to_string()));
        }
        if self.python_version.trim().is_empty() {
            return Err(invalid("python_version", "must not be empty"));
        }
        if self.packaging_tool.trim().is_empty() {
            return Err(invalid("packaging_tool", "must not be empty"));
        }

        check_relative("entry_script", &self.entry_script)?;
        check_relative("requirements", &self.requirements)?;
        check_relative("dist_dir", &self.dist_dir)?;
        check_relative("artifact", &self.artifact)?;
        for target in &self.cleanup_targets {
            check_relative("cleanup_targets", target)?;
        }

        if !self.artifact.starts_with(&self.dist_dir) {
            return Err(invalid(
                "artifact",
                &format!("must live inside dist_dir ({})", self.dist_dir.display()),
            ));
        }

        if let Some(repo) = &self.repository
            && repo.split_once('/').is_none_or(|(o, r)| o.is_empty() || r.is_empty())
        {
            return Err(invalid("repository", "expected owner/repo"));
        }

        Ok(())
    }

    /// File name of the artifact, used as the release asset name
    pub fn asset_name(&self) -> String {
        self.artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Stem of the entry script; the packaging tool names its output after it
    pub fn entry_stem(&self) -> String {
        self.entry_script
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::ReleaseError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Paths must stay inside the working directory
fn check_relative(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(invalid(
            field,
            &format!("{} must be relative to the repository root", path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_pipeline_identifiers() {
        let config = PipelineConfig::default();
        assert_eq!(config.tag_pattern, "v*");
        assert_eq!(config.entry_script, PathBuf::from("auto.py"));
        assert_eq!(config.python_version, "3.12");
        assert_eq!(config.requirements, PathBuf::from("requirements.txt"));
        assert_eq!(config.artifact, PathBuf::from("dist/auto.exe"));
        assert_eq!(config.asset_name(), "auto.exe");
        assert_eq!(config.entry_stem(), "auto");
        assert_eq!(config.cleanup_targets.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = PipelineConfig::from_toml(
            r#"
            python_version = "3.11"
            repository = "octo/tool"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.python_version, "3.11");
        assert_eq!(config.repository.as_deref(), Some("octo/tool"));
        assert_eq!(config.entry_script, PathBuf::from("auto.py"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(PipelineConfig::from_toml("retries = 3").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AUTO_RELEASE_PYTHON", "C:/Python312/python.exe"),
            ("GITHUB_REPOSITORY", "octo/from-actions"),
            ("AUTO_RELEASE_API_URL", "http://127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.python,
            Some(PathBuf::from("C:/Python312/python.exe"))
        );
        assert_eq!(config.repository.as_deref(), Some("octo/from-actions"));
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.upload_url, "https://uploads.github.com");
    }

    #[test]
    fn test_github_repository_does_not_override_configured_repo() {
        let mut config = PipelineConfig {
            repository: Some("octo/configured".to_string()),
            ..PipelineConfig::default()
        };
        config.apply_env(|name| (name == "GITHUB_REPOSITORY").then(|| "octo/env".to_string()));
        assert_eq!(config.repository.as_deref(), Some("octo/configured"));
    }

    #[test]
    fn test_validate_rejects_escaping_paths() {
        let config = PipelineConfig {
            entry_script: PathBuf::from("../auto.py"),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_artifact_outside_dist() {
        let config = PipelineConfig {
            artifact: PathBuf::from("out/auto.exe"),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_repository() {
        let config = PipelineConfig {
            repository: Some("just-a-name".to_string()),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_config_from_workdir() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "write_report = false\n",
        )
        .expect("write config");

        let config = PipelineConfig::load(dir.path(), None).expect("load config");
        assert!(!config.write_report);
    }
}
