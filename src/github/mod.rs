//! GitHub integration for release operations

mod host;
mod release_manager;

pub use host::{
    AssetInfo, NewRelease, PublishedAsset, ReleaseHost, ReleaseInfo, publish_asset,
    release_for_tag,
};
pub use release_manager::{GitHubReleaseConfig, GitHubReleaseHost};
