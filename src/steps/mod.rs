//! The seven steps of the release pipeline.

mod checkout;
mod cleanup;
mod dependencies;
mod listing;
mod package;
mod publish;
mod runtime;

pub use checkout::CheckoutStep;
pub use cleanup::{CleanupStep, CleanupSummary, remove_targets};
pub use dependencies::InstallDependenciesStep;
pub use listing::{ListOutputStep, list_dir};
pub use package::{PackageStep, describe_artifact, verify_artifact};
pub use publish::PublishStep;
pub use runtime::{
    PythonRuntime, RuntimeSetupStep, interpreter_candidates, parse_version, version_matches,
};
