//! GitHub REST implementation of [`ReleaseHost`]

use super::host::{AssetInfo, NewRelease, ReleaseHost, ReleaseInfo};
use crate::error::{PublishError, ReleaseError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Response, StatusCode, header};
use serde::de::DeserializeOwned;

/// API version pinned in every request
const API_VERSION: &str = "2022-11-28";

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// GitHub token with contents:write
    pub token: String,
    /// REST API base URL
    pub api_url: String,
    /// Upload base URL
    pub upload_url: String,
}

impl GitHubReleaseConfig {
    /// Build a config for `owner/repo`, taking the token from the environment
    pub fn from_env(repository: &str, api_url: &str, upload_url: &str) -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or(PublishError::MissingToken)?;
        Self::new(repository, token, api_url, upload_url)
    }

    /// Build a config from explicit values
    pub fn new(repository: &str, token: String, api_url: &str, upload_url: &str) -> Result<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| PublishError::InvalidRepository {
                repo: repository.to_string(),
            })?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.trim_end_matches(".git").to_string(),
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Release host backed by the GitHub REST API
pub struct GitHubReleaseHost {
    /// HTTP client
    client: reqwest::Client,
    /// Configuration
    config: GitHubReleaseConfig,
}

impl GitHubReleaseHost {
    /// Create new GitHub release host
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        let client = client_builder()
            .build()
            .map_err(|e| api_error("github_client_init", e))?;

        Ok(Self { client, config })
    }

    /// Repository this host publishes to, as owner/repo
    pub fn repository(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url, self.config.owner, self.config.repo, path
        )
    }

    async fn send(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| api_error(operation, e))?;
        log::debug!("{} -> {}", operation, response.status());
        Ok(response)
    }
}

#[async_trait]
impl ReleaseHost for GitHubReleaseHost {
    async fn find_release_by_tag(&self, tag: &str) -> Result<Option<ReleaseInfo>> {
        let url = self.repo_url(&format!("releases/tags/{tag}"));
        let response = self.send("get_release_by_tag", self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode("get_release_by_tag", response).await.map(Some)
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseInfo> {
        let url = self.repo_url("releases");
        let response = self
            .send("create_release", self.client.post(url).json(release))
            .await?;
        decode("create_release", response).await
    }

    async fn list_assets(&self, release_id: u64) -> Result<Vec<AssetInfo>> {
        let url = self.repo_url(&format!("releases/{release_id}/assets"));
        let response = self
            .send(
                "list_release_assets",
                self.client.get(url).query(&[("per_page", "100")]),
            )
            .await?;
        decode("list_release_assets", response).await
    }

    async fn delete_asset(&self, asset_id: u64) -> Result<()> {
        let url = self.repo_url(&format!("releases/assets/{asset_id}"));
        let response = self.send("delete_release_asset", self.client.delete(url)).await?;
        check_status("delete_release_asset", response).await.map(|_| ())
    }

    async fn upload_asset(&self, release_id: u64, name: &str, content: Bytes) -> Result<AssetInfo> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.config.upload_url, self.config.owner, self.config.repo, release_id
        );
        let request = self
            .client
            .post(url)
            .query(&[("name", name)])
            .header(header::CONTENT_TYPE, content_type_for(name))
            .header(header::CONTENT_LENGTH, content.len())
            .body(content);
        let response = self.send("upload_release_asset", request).await?;
        decode("upload_release_asset", response).await
    }

    async fn rename_asset(&self, asset_id: u64, name: &str) -> Result<AssetInfo> {
        let url = self.repo_url(&format!("releases/assets/{asset_id}"));
        let body = serde_json::json!({ "name": name });
        let response = self
            .send("update_release_asset", self.client.patch(url).json(&body))
            .await?;
        decode("update_release_asset", response).await
    }
}

/// Client with the headers every GitHub API request carries
fn client_builder() -> reqwest::ClientBuilder {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        header::HeaderValue::from_static(API_VERSION),
    );

    reqwest::Client::builder()
        .user_agent(concat!("auto_release/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
}

/// MIME type for an uploaded asset
fn content_type_for(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("exe") => "application/x-msdownload",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

async fn check_status(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PublishError::AuthenticationFailed {
            status: status.as_u16(),
            reason: body,
        }
        .into());
    }
    Err(PublishError::ApiFailed {
        operation: operation.to_string(),
        reason: format!("{status}: {body}"),
    }
    .into())
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let response = check_status(operation, response).await?;
    response.json::<T>().await.map_err(|e| api_error(operation, e))
}

fn api_error(operation: &str, e: impl std::fmt::Display) -> ReleaseError {
    PublishError::ApiFailed {
        operation: operation.to_string(),
        reason: e.to_string(),
    }
    .into()
}
