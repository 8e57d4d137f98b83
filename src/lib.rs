//! # Auto Release
//!
//! Tag-triggered release pipeline for a single-file Python desktop tool.
//!
//! A run checks out the repository, provisions a pinned Python interpreter,
//! installs PyInstaller and the project's requirements, packages `auto.py`
//! into a windowed one-file executable, publishes it as a GitHub release
//! asset and removes the build byproducts. Each step carries an error
//! policy: failures either abort the run or are recorded and ignored.
//!
//! ## Usage
//!
//! ```bash
//! auto_release run --ref refs/tags/v1.2.0   # as if v1.2.0 was pushed
//! auto_release run --tag v1.2.0 --skip-publish
//! auto_release check-trigger refs/tags/v1.2.0
//! auto_release workflow --output .github/workflows/Release.yml
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod process;
pub mod source;
pub mod state;
pub mod steps;
pub mod trigger;
pub mod workflow;

// Re-export main types for public API
pub use cli::Args;
pub use config::PipelineConfig;
pub use error::{ReleaseError, Result};
pub use github::{GitHubReleaseHost, ReleaseHost};
pub use pipeline::{ErrorPolicy, Pipeline, Step, StepContext, StepId};
pub use process::{CommandRunner, SystemCommandRunner};
pub use source::RepositorySource;
pub use state::{ReportStore, RunReport, RunStatus, StepOutcome};
pub use trigger::{TriggerEvent, TriggerFilter};
