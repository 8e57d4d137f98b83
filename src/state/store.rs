//! Persistence of the last run report.
//!
//! Reports are written to a temporary sibling file and renamed into place
//! so a crash never leaves a half-written report behind.

use super::report::{REPORT_FORMAT_VERSION, RunReport};
use crate::error::{ReportError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory under the working directory holding run reports
pub const REPORT_DIR: &str = ".auto-release";

/// File name of the last run report
pub const REPORT_FILE: &str = "last-run.json";

/// Stores the report of the most recent run
#[derive(Debug, Clone)]
pub struct ReportStore {
    /// Path to report file
    report_path: PathBuf,
}

impl ReportStore {
    /// Store rooted at a working directory
    pub fn for_workdir(workdir: &Path) -> Self {
        Self {
            report_path: workdir.join(REPORT_DIR).join(REPORT_FILE),
        }
    }

    /// Path to report file
    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// Whether a report exists
    pub fn exists(&self) -> bool {
        self.report_path.is_file()
    }

    /// Save a report, replacing the previous one
    pub fn save(&self, report: &RunReport) -> Result<()> {
        let dir = self
            .report_path
            .parent()
            .ok_or_else(|| ReportError::SaveFailed {
                reason: format!("{} has no parent directory", self.report_path.display()),
            })?;
        fs::create_dir_all(dir).map_err(save_failed)?;

        let json = serde_json::to_vec_pretty(report)?;
        let tmp_path = self.report_path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(save_failed)?;
            file.write_all(&json).map_err(save_failed)?;
            file.sync_all().map_err(save_failed)?;
        }
        fs::rename(&tmp_path, &self.report_path).map_err(save_failed)?;

        log::debug!("Saved run report to {}", self.report_path.display());
        Ok(())
    }

    /// Load the last report
    pub fn load(&self) -> Result<RunReport> {
        if !self.exists() {
            return Err(ReportError::NotFound {
                path: self.report_path.clone(),
            }
            .into());
        }
        let content = fs::read(&self.report_path)?;
        let report: RunReport =
            serde_json::from_slice(&content).map_err(|e| ReportError::Corrupted {
                reason: e.to_string(),
            })?;
        if report.format_version != REPORT_FORMAT_VERSION {
            return Err(ReportError::Corrupted {
                reason: format!(
                    "format version {} (expected {})",
                    report.format_version, REPORT_FORMAT_VERSION
                ),
            }
            .into());
        }
        Ok(report)
    }
}

fn save_failed(e: std::io::Error) -> ReportError {
    ReportError::SaveFailed {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StepId;
    use crate::state::{StepOutcome, StepRecord};
    use crate::trigger::TriggerEvent;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = ReportStore::for_workdir(dir.path());

        let mut report = RunReport::new(
            uuid::Uuid::new_v4(),
            TriggerEvent::TagPush {
                tag: "v1.0.0".to_string(),
            },
        );
        report.record(StepRecord {
            step: StepId::Checkout,
            policy: StepId::Checkout.default_policy(),
            outcome: StepOutcome::Succeeded { details: vec![] },
            duration_ms: 12,
        });
        report.finish();
        store.save(&report).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.steps, report.steps);
        assert!(!dir.path().join(REPORT_DIR).join("last-run.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_report() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = ReportStore::for_workdir(dir.path());
        assert!(!store.exists());
        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_corrupted_report() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store = ReportStore::for_workdir(dir.path());
        fs::create_dir_all(dir.path().join(REPORT_DIR)).expect("mkdir");
        fs::write(store.path(), b"{ not json").expect("write");

        let err = store.load().expect_err("corrupted");
        assert!(err.to_string().contains("corrupted"));
    }
}
