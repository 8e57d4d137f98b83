//! Run reports and their persistence

mod report;
mod store;

pub use report::{
    ArtifactInfo, REPORT_FORMAT_VERSION, RunReport, RunStatus, StepOutcome, StepRecord,
};
pub use store::{REPORT_DIR, REPORT_FILE, ReportStore};
