//! Release host abstraction and the single-asset publish operation.

use crate::error::{PublishError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A release as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Release ID
    pub id: u64,
    /// Tag the release is keyed by
    pub tag_name: String,
    /// Release URL
    #[serde(default)]
    pub html_url: String,
    /// Whether this is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Attached assets
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
}

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

/// Parameters for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag to attach the release to
    pub tag_name: String,
    /// Display name
    pub name: String,
    /// Release notes
    pub body: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
}

/// Outcome of [`publish_asset`]
#[derive(Debug, Clone)]
pub struct PublishedAsset {
    /// Release the asset lives on
    pub release: ReleaseInfo,
    /// Uploaded asset
    pub asset: AssetInfo,
    /// Whether the release was created by this call
    pub created_release: bool,
    /// Whether an asset of the same name was replaced
    pub replaced_asset: bool,
}

/// Service hosting releases and their assets
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Look up the release for a tag; `None` if there is none
    async fn find_release_by_tag(&self, tag: &str) -> Result<Option<ReleaseInfo>>;

    /// Create a release
    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseInfo>;

    /// List the assets of a release
    async fn list_assets(&self, release_id: u64) -> Result<Vec<AssetInfo>>;

    /// Delete one asset
    async fn delete_asset(&self, asset_id: u64) -> Result<()>;

    /// Upload a file as an asset of a release
    async fn upload_asset(&self, release_id: u64, name: &str, content: Bytes) -> Result<AssetInfo>;

    /// Rename an asset
    async fn rename_asset(&self, asset_id: u64, name: &str) -> Result<AssetInfo>;
}

/// Release parameters derived from a tag.
///
/// Tags that parse as semver (after an optional leading `v`) with a
/// pre-release component are marked as prereleases.
pub fn release_for_tag(tag: &str) -> NewRelease {
    let prerelease = semver::Version::parse(tag.trim_start_matches('v'))
        .map(|v| !v.pre.is_empty())
        .unwrap_or(false);

    NewRelease {
        tag_name: tag.to_string(),
        name: format!("Release {tag}"),
        body: format!("Release {tag}"),
        draft: false,
        prerelease,
    }
}

/// Attach `artifact` to the release for `tag` as the only asset named `asset_name`.
///
/// The release is created when it does not exist. When an asset with the
/// same name is already attached, the new file is uploaded under a staging
/// name first, the old asset is deleted and the staged one renamed. A failed
/// upload therefore leaves the previous asset in place. A staging asset left
/// by an interrupted run is removed before uploading.
pub async fn publish_asset(
    host: &dyn ReleaseHost,
    tag: &str,
    artifact: &Path,
    asset_name: &str,
) -> Result<PublishedAsset> {
    if !artifact.is_file() {
        return Err(PublishError::ArtifactMissing {
            path: artifact.to_path_buf(),
        }
        .into());
    }

    let (release, created_release) = match host.find_release_by_tag(tag).await? {
        Some(release) => {
            log::info!("Using existing release {} for {}", release.id, tag);
            (release, false)
        }
        None => {
            log::info!("Creating release for {}", tag);
            (host.create_release(&release_for_tag(tag)).await?, true)
        }
    };

    let staging_name = staging_name(asset_name);
    let mut previous = Vec::new();
    for existing in host.list_assets(release.id).await? {
        if existing.name == staging_name {
            log::info!("Removing stale staging asset {} ({})", existing.name, existing.id);
            host.delete_asset(existing.id).await?;
        } else if existing.name == asset_name {
            previous.push(existing);
        }
    }

    let content = Bytes::from(tokio::fs::read(artifact).await?);
    let replaced_asset = !previous.is_empty();

    let asset = if replaced_asset {
        let staged = host
            .upload_asset(release.id, &staging_name, content)
            .await?;
        for old in &previous {
            log::info!("Replacing existing asset {} ({})", old.name, old.id);
            host.delete_asset(old.id).await?;
        }
        host.rename_asset(staged.id, asset_name).await?
    } else {
        host.upload_asset(release.id, asset_name, content).await?
    };
    log::info!("Uploaded {} ({} bytes)", asset.name, asset.size);

    Ok(PublishedAsset {
        release,
        asset,
        created_release,
        replaced_asset,
    })
}

/// Name a replacement asset is uploaded under before it takes over
fn staging_name(asset_name: &str) -> String {
    format!("{asset_name}.partial")
}
