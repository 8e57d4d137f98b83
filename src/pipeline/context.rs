//! Context shared by the steps of one pipeline run.

use crate::config::PipelineConfig;
use crate::error::{CheckoutError, Result, RuntimeError};
use crate::process::CommandRunner;
use crate::source::RepositorySource;
use crate::state::ArtifactInfo;
use crate::steps::PythonRuntime;
use crate::trigger::TriggerEvent;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Temporary clone removed when dropped
#[derive(Debug)]
pub struct TempCheckout {
    path: PathBuf,
    keep: bool,
}

impl TempCheckout {
    /// Track a directory for removal
    pub fn new(path: PathBuf, keep: bool) -> Self {
        Self { path, keep }
    }

    /// Path of the clone
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempCheckout {
    fn drop(&mut self) {
        if self.keep {
            log::info!("Keeping temporary checkout at {}", self.path.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!(
                "Failed to remove temporary checkout {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Everything a step can read, plus what earlier steps produced
pub struct StepContext<'a> {
    /// Unique ID of this run
    pub run_id: Uuid,
    /// Resolved configuration
    pub config: &'a PipelineConfig,
    /// Event that started the run
    pub trigger: &'a TriggerEvent,
    /// Tag given explicitly on the command line
    pub explicit_tag: Option<String>,
    /// Where the repository comes from
    pub source: RepositorySource,
    /// Executes external tools
    pub runner: &'a dyn CommandRunner,
    /// Keep a temporary clone after the run
    pub keep_checkout: bool,
    /// Checked out working directory, set by the checkout step
    pub workdir: Option<PathBuf>,
    /// Temporary clone guard, if checkout cloned
    pub temp_checkout: Option<TempCheckout>,
    /// Interpreter found by the runtime setup step
    pub runtime: Option<PythonRuntime>,
    /// Artifact produced by the packaging step
    pub artifact: Option<ArtifactInfo>,
    /// Release URL, set by the publish step
    pub release_url: Option<String>,
}

impl<'a> StepContext<'a> {
    /// Create a context for a run over `source`
    pub fn new(
        config: &'a PipelineConfig,
        trigger: &'a TriggerEvent,
        source: RepositorySource,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
            trigger,
            explicit_tag: None,
            source,
            runner,
            keep_checkout: false,
            workdir: None,
            temp_checkout: None,
            runtime: None,
            artifact: None,
            release_url: None,
        }
    }

    /// Context over an already checked out directory
    pub fn for_workdir(
        config: &'a PipelineConfig,
        trigger: &'a TriggerEvent,
        workdir: &Path,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        let mut ctx = Self::new(
            config,
            trigger,
            RepositorySource::Local(workdir.to_path_buf()),
            runner,
        );
        ctx.workdir = Some(workdir.to_path_buf());
        ctx
    }

    /// Working directory; fails before checkout
    pub fn workdir(&self) -> Result<&Path> {
        self.workdir.as_deref().ok_or_else(|| {
            CheckoutError::SourceNotFound {
                path: PathBuf::from("<not checked out>"),
            }
            .into()
        })
    }

    /// Interpreter; fails before runtime setup
    pub fn runtime(&self) -> Result<&PythonRuntime> {
        self.runtime
            .as_ref()
            .ok_or_else(|| RuntimeError::NotProvisioned.into())
    }

    /// Path relative to the working directory
    pub fn resolve(&self, relative: &Path) -> Result<PathBuf> {
        Ok(self.workdir()?.join(relative))
    }

    /// Tag to publish on
    pub fn release_tag(&self) -> Result<String> {
        self.trigger.release_tag(self.explicit_tag.as_deref())
    }

    /// Repository to publish to: config, else the remote source
    pub fn repository(&self) -> Option<String> {
        self.config
            .repository
            .clone()
            .or_else(|| self.source.repository())
    }
}
