use std::path::PathBuf;

use thiserror::Error;

/// Failure modes when locating or parsing a build report.
///
/// Neither variant is fatal to an evaluation: `Absent` is expected during
/// normal pipelines (the report has not been generated this cycle) and maps
/// to "not yet decidable"; `Unparseable` is logged and degrades to a
/// conservative verdict. No error crosses the engine boundary.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report not present at {0}")]
    Absent(PathBuf),

    #[error("report at {path} could not be parsed: {reason}")]
    Unparseable { path: PathBuf, reason: String },
}

impl ReportError {
    pub fn unparseable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Unparseable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the report was simply missing, as opposed to broken.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }
}

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
