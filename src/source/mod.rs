//! Repository source resolution (local paths, GitHub URLs, owner/repo notation)

use crate::error::{CheckoutError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Repository source: local path or GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySource {
    /// Directory that already holds a checkout
    Local(PathBuf),
    /// Repository hosted on GitHub
    GitHub {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
    },
}

impl RepositorySource {
    /// Parse input string into RepositorySource
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        // Try as local path first
        let path = PathBuf::from(input);
        if path.exists() {
            return path.canonicalize().map(Self::Local).map_err(|_| {
                CheckoutError::SourceNotFound {
                    path: path.clone(),
                }
                .into()
            });
        }

        // Try as GitHub URL: https://github.com/owner/repo
        static GITHUB_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^https://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$")
                .expect("GitHub URL regex is valid")
        });

        if let Some(caps) = GITHUB_URL_RE.captures(input) {
            return Ok(Self::GitHub {
                owner: caps["owner"].to_string(),
                repo: caps["repo"].to_string(),
            });
        }

        // Try as owner/repo notation
        if !input.contains("://")
            && let Some((owner, repo)) = input.split_once('/')
            && !owner.is_empty()
            && !repo.is_empty()
            && !repo.contains('/')
        {
            return Ok(Self::GitHub {
                owner: owner.to_string(),
                repo: repo.trim_end_matches(".git").to_string(),
            });
        }

        Err(CheckoutError::InvalidSource {
            source_spec: input.to_string(),
        }
        .into())
    }

    /// Clone URL for remote sources
    pub fn clone_url(&self) -> Option<String> {
        match self {
            Self::Local(_) => None,
            Self::GitHub { owner, repo } => Some(format!("https://github.com/{owner}/{repo}.git")),
        }
    }

    /// owner/repo for remote sources
    pub fn repository(&self) -> Option<String> {
        match self {
            Self::Local(_) => None,
            Self::GitHub { owner, repo } => Some(format!("{owner}/{repo}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_directory() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let source = RepositorySource::parse(&dir.path().display().to_string()).expect("local");
        assert!(matches!(source, RepositorySource::Local(_)));
        assert_eq!(source.clone_url(), None);
    }

    #[test]
    fn test_parse_github_url() {
        let source =
            RepositorySource::parse("https://github.com/octo/tool.git").expect("github url");
        assert_eq!(
            source,
            RepositorySource::GitHub {
                owner: "octo".to_string(),
                repo: "tool".to_string()
            }
        );
        assert_eq!(
            source.clone_url().as_deref(),
            Some("https://github.com/octo/tool.git")
        );
    }

    #[test]
    fn test_parse_owner_repo() {
        let source = RepositorySource::parse("octo/tool").expect("owner/repo");
        assert_eq!(source.repository().as_deref(), Some("octo/tool"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RepositorySource::parse("not a source").is_err());
        assert!(RepositorySource::parse("ftp://example.com/a/b").is_err());
    }
}
