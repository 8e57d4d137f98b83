//! Publish: attach the artifact to the release for the triggering tag.

use crate::error::{PublishError, Result};
use crate::github::{GitHubReleaseConfig, GitHubReleaseHost, ReleaseHost, publish_asset};
use crate::pipeline::{Step, StepCompletion, StepContext, StepId};
use async_trait::async_trait;
use std::sync::Arc;

/// Uploads the artifact as the release's single asset
pub struct PublishStep {
    host: Option<Arc<dyn ReleaseHost>>,
    enabled: bool,
}

impl PublishStep {
    /// Publish to GitHub, building the client when the step runs
    pub fn github() -> Self {
        Self {
            host: None,
            enabled: true,
        }
    }

    /// Publish to a given host
    pub fn with_host(host: Arc<dyn ReleaseHost>) -> Self {
        Self {
            host: Some(host),
            enabled: true,
        }
    }

    /// Verify the artifact but upload nothing
    pub fn disabled() -> Self {
        Self {
            host: None,
            enabled: false,
        }
    }

    fn host_for(&self, ctx: &StepContext<'_>) -> Result<Arc<dyn ReleaseHost>> {
        if let Some(host) = &self.host {
            return Ok(Arc::clone(host));
        }
        let repository = ctx.repository().ok_or(PublishError::MissingRepository)?;
        let config = GitHubReleaseConfig::from_env(
            &repository,
            &ctx.config.api_url,
            &ctx.config.upload_url,
        )?;
        Ok(Arc::new(GitHubReleaseHost::new(config)?))
    }
}

#[async_trait]
impl Step for PublishStep {
    fn id(&self) -> StepId {
        StepId::Publish
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion> {
        let artifact = ctx.resolve(&ctx.config.artifact)?;
        if !artifact.is_file() {
            return Err(PublishError::ArtifactMissing {
                path: ctx.config.artifact.clone(),
            }
            .into());
        }
        let asset_name = ctx.config.asset_name();

        if !self.enabled {
            let target = ctx
                .release_tag()
                .map(|tag| format!("release {tag}"))
                .unwrap_or_else(|_| "a release".to_string());
            return Ok(StepCompletion::no_op(format!(
                "publishing disabled; {asset_name} would be attached to {target}"
            )));
        }

        let tag = ctx.release_tag()?;
        let host = self.host_for(ctx)?;
        let published = publish_asset(host.as_ref(), &tag, &artifact, &asset_name).await?;

        let mut details = Vec::new();
        if published.created_release {
            details.push(format!("Created release {tag}"));
        } else {
            details.push(format!("Updated release {tag}"));
        }
        if published.replaced_asset {
            details.push(format!("Replaced existing {asset_name}"));
        }
        details.push(format!(
            "Uploaded {} ({} bytes)",
            published.asset.name, published.asset.size
        ));
        if !published.release.html_url.is_empty() {
            details.push(published.release.html_url.clone());
            ctx.release_url = Some(published.release.html_url);
        }

        Ok(StepCompletion::with_details(details))
    }
}
