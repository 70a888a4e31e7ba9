//! Evaluation context passed into every engine call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Outcome of the build whose reports are being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Build finished cleanly
    Success,
    /// Build finished with test failures or warnings promoted by the CI
    Unstable,
    /// Build failed
    Failure,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Unstable => "unstable",
            Self::Failure => "failure",
        }
    }
}

/// Immutable per-call context: which workspace and branch the current
/// build's reports live in.
///
/// The engine holds no state between calls; everything it needs to locate
/// reports and apply the branch-mismatch policy arrives through this bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalContext {
    /// Workspace root of the build under evaluation
    pub workspace: PathBuf,
    /// Branch the build ran on
    pub branch: String,
    /// Outcome of the build
    pub build_status: BuildStatus,
}

impl EvalContext {
    pub fn new(
        workspace: impl Into<PathBuf>,
        branch: impl Into<String>,
        build_status: BuildStatus,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            branch: branch.into(),
            build_status,
        }
    }
}
