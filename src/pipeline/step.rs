//! Step identity, error policy and the step contract.

use super::context::StepContext;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The steps of the release pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Fetch the repository at the triggering ref
    Checkout,
    /// Provision the pinned interpreter
    RuntimeSetup,
    /// Install the packaging tool and optional manifest
    InstallDependencies,
    /// Bundle the entry script into the artifact
    Package,
    /// Enumerate the output directory
    ListOutput,
    /// Upload the artifact to the release
    Publish,
    /// Remove local build byproducts
    Cleanup,
}

impl StepId {
    /// All steps in pipeline order
    pub const ALL: [StepId; 7] = [
        StepId::Checkout,
        StepId::RuntimeSetup,
        StepId::InstallDependencies,
        StepId::Package,
        StepId::ListOutput,
        StepId::Publish,
        StepId::Cleanup,
    ];

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            StepId::Checkout => "checkout",
            StepId::RuntimeSetup => "runtime setup",
            StepId::InstallDependencies => "install dependencies",
            StepId::Package => "package",
            StepId::ListOutput => "list output",
            StepId::Publish => "publish",
            StepId::Cleanup => "cleanup",
        }
    }

    /// Error policy the step runs under unless overridden
    pub fn default_policy(self) -> ErrorPolicy {
        match self {
            StepId::ListOutput | StepId::Cleanup => ErrorPolicy::Ignore,
            _ => ErrorPolicy::Propagate,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a step failure does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Failure aborts the run; remaining steps are skipped
    Propagate,
    /// Failure is recorded and the run continues
    Ignore,
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Propagate => f.write_str("propagate"),
            ErrorPolicy::Ignore => f.write_str("ignore"),
        }
    }
}

/// How a step that did not fail finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCompletion {
    /// The step did its work
    Done {
        /// Lines worth showing to the operator
        details: Vec<String>,
    },
    /// Nothing to do, which is not an error
    NoOp {
        /// Why nothing was done
        reason: String,
    },
}

impl StepCompletion {
    /// Completed with no details
    pub fn done() -> Self {
        StepCompletion::Done {
            details: Vec::new(),
        }
    }

    /// Completed with details
    pub fn with_details(details: Vec<String>) -> Self {
        StepCompletion::Done { details }
    }

    /// Nothing to do
    pub fn no_op(reason: impl Into<String>) -> Self {
        StepCompletion::NoOp {
            reason: reason.into(),
        }
    }
}

/// One step of the pipeline
#[async_trait]
pub trait Step: Send + Sync {
    /// Which step this is
    fn id(&self) -> StepId;

    /// Error policy; defaults to the step's standard policy
    fn policy(&self) -> ErrorPolicy {
        self.id().default_policy()
    }

    /// Execute the step
    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepCompletion>;
}
