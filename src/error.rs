//! Comprehensive error types for auto_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for auto_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all auto_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Trigger resolution errors
    #[error("Trigger error: {0}")]
    Trigger(#[from] TriggerError),

    /// Checkout errors
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Runtime provisioning errors
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Packaging errors
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// Publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Run report persistence errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI and command execution errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trigger resolution errors
#[derive(Error, Debug)]
pub enum TriggerError {
    /// Tag pattern is not a valid glob
    #[error("Invalid tag pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Reason for the error
        reason: String,
    },

    /// Required CI environment variable is absent
    #[error("Environment variable {name} is not set")]
    MissingEnvironment {
        /// Variable name
        name: String,
    },

    /// Publishing needs a tag but the trigger carries none
    #[error("No release tag available for event '{event}'. Pass --tag when dispatching manually.")]
    MissingTag {
        /// Event name
        event: String,
    },
}

/// Checkout errors
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Source string could not be interpreted
    #[error("Invalid source '{source_spec}': use a local path, GitHub URL, or owner/repo")]
    InvalidSource {
        /// Source as given
        source_spec: String,
    },

    /// Local source is not a directory
    #[error("Source directory not found: {path}")]
    SourceNotFound {
        /// Path that was expected
        path: PathBuf,
    },

    /// Clone failed
    #[error("Failed to clone {url}: {reason}")]
    CloneFailed {
        /// Remote URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Requested ref does not resolve to a commit
    #[error("Ref '{reference}' does not exist in {path}")]
    RefNotFound {
        /// Ref name
        reference: String,
        /// Repository path
        path: PathBuf,
    },

    /// Working tree is not at the commit the ref points to
    #[error("Checkout is at {head}, but '{reference}' is {expected}")]
    RefMismatch {
        /// Ref name
        reference: String,
        /// Commit the ref resolves to
        expected: String,
        /// Commit HEAD resolves to
        head: String,
    },
}

/// Runtime provisioning errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// No interpreter reports the pinned version
    #[error("Python {version} not found (tried: {candidates:?})")]
    VersionUnavailable {
        /// Pinned version
        version: String,
        /// Interpreter candidates that were tried
        candidates: Vec<String>,
    },

    /// Runtime was needed before the setup step produced one
    #[error("Python runtime not provisioned; the runtime setup step must run first")]
    NotProvisioned,
}

/// Packaging errors
#[derive(Error, Debug)]
pub enum PackagingError {
    /// Entry-point script is missing
    #[error("Entry-point script not found: {path}")]
    EntryScriptMissing {
        /// Expected script path
        path: PathBuf,
    },

    /// Packaging tool exited unsuccessfully
    #[error("Packaging tool failed: {reason}")]
    ToolFailed {
        /// Reason for the error
        reason: String,
    },

    /// Artifact is not where it must be
    #[error("Expected artifact not found at {path}")]
    ArtifactMissing {
        /// Expected artifact path
        path: PathBuf,
    },

    /// More than one executable was produced
    #[error("Unexpected executables in output directory: {extra:?}")]
    UnexpectedArtifacts {
        /// Extra executables found besides the expected one
        extra: Vec<PathBuf>,
    },
}

/// Publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Artifact to upload does not exist
    #[error("Artifact to publish not found: {path}")]
    ArtifactMissing {
        /// Expected artifact path
        path: PathBuf,
    },

    /// No GitHub token in the environment
    #[error("GitHub token not provided. Set GITHUB_TOKEN or GH_TOKEN.")]
    MissingToken,

    /// No owner/repo to publish to
    #[error("GitHub repository not configured. Use --repo owner/repo or set GITHUB_REPOSITORY.")]
    MissingRepository,

    /// Repository string malformed
    #[error("Invalid repository '{repo}': expected owner/repo")]
    InvalidRepository {
        /// Repository as given
        repo: String,
    },

    /// Token rejected or lacks contents:write
    #[error("GitHub authentication failed ({status}): {reason}")]
    AuthenticationFailed {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        reason: String,
    },

    /// Any other API failure
    #[error("GitHub API request '{operation}' failed: {reason}")]
    ApiFailed {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

/// Run report persistence errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// No report has been written yet
    #[error("No run report found at {path}")]
    NotFound {
        /// Report path
        path: PathBuf,
    },

    /// Report file is unreadable
    #[error("Run report corrupted: {reason}")]
    Corrupted {
        /// Reason for the error
        reason: String,
    },

    /// Writing the report failed
    #[error("Failed to save run report: {reason}")]
    SaveFailed {
        /// Reason for the error
        reason: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read or parsed
    #[error("Failed to load config {path}: {reason}")]
    LoadFailed {
        /// Config file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// A value failed validation
    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Runtime(RuntimeError::VersionUnavailable { version, .. }) => vec![
                format!("Install Python {version} and make sure it is on PATH"),
                "Point AUTO_RELEASE_PYTHON at a specific interpreter".to_string(),
            ],
            ReleaseError::Packaging(PackagingError::EntryScriptMissing { path }) => vec![format!(
                "Make sure {} is committed at the repository root",
                path.display()
            )],
            ReleaseError::Publish(PublishError::MissingToken) => vec![
                "Export GITHUB_TOKEN with a token that has contents:write".to_string(),
                "Use --skip-publish for a local dry run".to_string(),
            ],
            ReleaseError::Publish(PublishError::AuthenticationFailed { .. }) => vec![
                "Verify the token is valid and not expired".to_string(),
                "Grant the workflow `permissions: contents: write`".to_string(),
            ],
            ReleaseError::Publish(PublishError::MissingRepository) => vec![
                "Pass --repo owner/repo".to_string(),
                "Set `repository = \"owner/repo\"` in auto-release.toml".to_string(),
            ],
            ReleaseError::Trigger(TriggerError::MissingTag { .. }) => vec![
                "Push a tag matching v* to trigger a release".to_string(),
                "Pass --tag v1.2.3 to a manual run".to_string(),
            ],
            ReleaseError::Checkout(CheckoutError::RefNotFound { reference, .. }) => vec![
                format!("Fetch tags first: git fetch --tags (looking for {reference})"),
            ],
            ReleaseError::Checkout(CheckoutError::RefMismatch { reference, .. }) => vec![
                format!("Check out the release commit: git checkout {reference}"),
                "Or pass --source owner/repo to build from a fresh clone".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether running again can succeed without changing configuration,
    /// credentials or the repository
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Trigger(TriggerError::InvalidPattern { .. })
                | ReleaseError::Checkout(CheckoutError::RefMismatch { .. })
                | ReleaseError::Packaging(PackagingError::EntryScriptMissing { .. })
                | ReleaseError::Publish(PublishError::AuthenticationFailed { .. })
                | ReleaseError::Publish(PublishError::MissingToken)
        )
    }
}
