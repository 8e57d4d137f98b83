//! The release pipeline: step contract, run context and sequential runner.

mod context;
mod runner;
mod step;

pub use context::{StepContext, TempCheckout};
pub use runner::{Pipeline, StepObserver};
pub use step::{ErrorPolicy, Step, StepCompletion, StepId};
