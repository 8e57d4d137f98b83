//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use auto_release::error::{ReleaseError, Result};
use auto_release::github::{AssetInfo, NewRelease, ReleaseHost, ReleaseInfo};
use auto_release::process::{CommandOutput, CommandRunner, CommandSpec};
use auto_release::PipelineConfig;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Interpreter path given explicitly so no PATH lookup happens
pub const FAKE_PYTHON: &str = "/opt/fake/bin/python3.12";

/// Bytes the fake packager writes as the executable
pub const FAKE_EXE: &[u8] = b"MZ\x90\x00fake windowed executable";

/// Config pointing at the fake interpreter
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        python: Some(PathBuf::from(FAKE_PYTHON)),
        repository: Some("octo/auto".to_string()),
        write_report: false,
        ..PipelineConfig::default()
    }
}

/// Repository layout with `auto.py` and, optionally, `requirements.txt`
pub fn write_project(root: &Path, with_requirements: bool) {
    std::fs::write(root.join("auto.py"), "print('auto')\n").expect("write auto.py");
    if with_requirements {
        std::fs::write(root.join("requirements.txt"), "mido\nkeyboard\n")
            .expect("write requirements.txt");
    }
}

/// Answers interpreter version checks, accepts pip, and emulates PyInstaller by
/// writing the executable and its byproducts
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<CommandSpec>>,
    fail_packaging: bool,
}

impl ScriptedRunner {
    /// Runner whose packaging invocation exits non-zero
    pub fn failing_packaging() -> Self {
        Self {
            fail_packaging: true,
            ..Self::default()
        }
    }

    /// Every command run so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Index of the first call whose arguments contain `needle` in order
    pub fn position(&self, needle: &[&str]) -> Option<usize> {
        self.calls().iter().position(|spec| {
            spec.args
                .windows(needle.len())
                .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
        })
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().expect("calls lock").push(spec.clone());

        if spec.program != Path::new(FAKE_PYTHON) {
            return Err(ReleaseError::Cli(
                auto_release::error::CliError::ExecutionFailed {
                    command: spec.to_string(),
                    reason: "program not found".to_string(),
                },
            ));
        }

        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["--version"] => Ok(ok("Python 3.12.4\n")),
            ["-m", "pip", ..] => Ok(ok("Successfully installed\n")),
            ["-m", "PyInstaller", ..] => {
                if self.fail_packaging {
                    return Ok(CommandOutput {
                        success: false,
                        code: Some(1),
                        stdout: String::new(),
                        stderr: "ERROR: script not found\n".to_string(),
                    });
                }
                let dist = spec.cwd.join("dist");
                std::fs::create_dir_all(&dist)?;
                std::fs::write(dist.join("auto.exe"), FAKE_EXE)?;
                std::fs::create_dir_all(spec.cwd.join("build").join("auto"))?;
                std::fs::write(spec.cwd.join("auto.spec"), "# generated\n")?;
                Ok(ok("Building EXE completed successfully.\n"))
            }
            _ => Ok(CommandOutput {
                success: false,
                code: Some(2),
                stdout: String::new(),
                stderr: format!("unexpected invocation: {spec}"),
            }),
        }
    }
}

#[derive(Default)]
struct HostState {
    releases: Vec<ReleaseInfo>,
    next_id: u64,
    uploads: usize,
}

/// Release host keeping everything in memory
#[derive(Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    /// All releases
    pub fn releases(&self) -> Vec<ReleaseInfo> {
        self.state.lock().expect("host lock").releases.clone()
    }

    /// Number of uploads performed
    pub fn uploads(&self) -> usize {
        self.state.lock().expect("host lock").uploads
    }
}

#[async_trait]
impl ReleaseHost for InMemoryHost {
    async fn find_release_by_tag(&self, tag: &str) -> Result<Option<ReleaseInfo>> {
        let state = self.state.lock().expect("host lock");
        Ok(state.releases.iter().find(|r| r.tag_name == tag).cloned())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseInfo> {
        let mut state = self.state.lock().expect("host lock");
        state.next_id += 1;
        let info = ReleaseInfo {
            id: state.next_id,
            tag_name: release.tag_name.clone(),
            html_url: format!("https://example.test/releases/{}", release.tag_name),
            draft: release.draft,
            prerelease: release.prerelease,
            assets: Vec::new(),
        };
        state.releases.push(info.clone());
        Ok(info)
    }

    async fn list_assets(&self, release_id: u64) -> Result<Vec<AssetInfo>> {
        let state = self.state.lock().expect("host lock");
        Ok(state
            .releases
            .iter()
            .find(|r| r.id == release_id)
            .map(|r| r.assets.clone())
            .unwrap_or_default())
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        let mut state = self.state.lock().expect("host lock");
        for release in &mut state.releases {
            release.assets.retain(|a| a.id != asset_id);
        }
        Ok(())
    }

    async fn upload_asset(&self, release_id: u64, name: &str, content: Bytes) -> Result<AssetInfo> {
        let mut state = self.state.lock().expect("host lock");
        state.next_id += 1;
        state.uploads += 1;
        let asset = AssetInfo {
            id: state.next_id,
            name: name.to_string(),
            size: content.len() as u64,
            browser_download_url: format!("https://example.test/download/{name}"),
        };
        if let Some(release) = state.releases.iter_mut().find(|r| r.id == release_id) {
            release.assets.push(asset.clone());
        }
        Ok(asset)
    }

    async fn rename_asset(&self, asset_id: u64, name: &str) -> Result<AssetInfo> {
        let mut state = self.state.lock().expect("host lock");
        let asset = state
            .releases
            .iter_mut()
            .flat_map(|r| r.assets.iter_mut())
            .find(|a| a.id == asset_id)
            .expect("renamed asset exists");
        asset.name = name.to_string();
        Ok(asset.clone())
    }
}
