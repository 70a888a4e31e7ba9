//! Source artifact identity.
//!
//! A [`SourceArtifactRef`] pins a challenge to one source file within a
//! branch. Report locations are never stored literally: they are derived
//! from the artifact plus a workspace root and the [`ReportsConfig`], so a
//! later build on a relocated workspace resolves to its own report files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::ReportsConfig;

/// Identifies a source file within a branch/workspace.
///
/// Immutable once a challenge captures it. All paths are stored relative to
/// the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArtifactRef {
    /// Workspace-relative path of the source file
    pub file_path: PathBuf,
    /// Package the file belongs to (dotted, as the coverage tool prints it)
    pub package: String,
    /// File name with extension, e.g. `Ledger.java`
    pub display_name: String,
    /// Branch the artifact was captured on
    pub branch: String,
}

impl SourceArtifactRef {
    pub fn new(
        file_path: impl Into<PathBuf>,
        package: impl Into<String>,
        display_name: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            package: package.into(),
            display_name: display_name.into(),
            branch: branch.into(),
        }
    }

    /// Display name without its extension, e.g. `Ledger` for `Ledger.java`.
    pub fn stem(&self) -> &str {
        self.display_name
            .rsplit_once('.')
            .map_or(self.display_name.as_str(), |(stem, _)| stem)
    }

    /// Absolute location of the source file under `workspace`.
    pub fn source_file(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.file_path)
    }

    /// Annotated source view of the coverage report:
    /// `<coverage_dir>/<package>/<display_name>.html`.
    pub fn coverage_source_report(&self, workspace: &Path, reports: &ReportsConfig) -> PathBuf {
        workspace
            .join(&reports.coverage_dir)
            .join(&self.package)
            .join(format!("{}.html", self.display_name))
    }

    /// Per-method summary view of the coverage report:
    /// `<coverage_dir>/<package>/<stem>.html`.
    pub fn coverage_method_report(&self, workspace: &Path, reports: &ReportsConfig) -> PathBuf {
        workspace
            .join(&reports.coverage_dir)
            .join(&self.package)
            .join(format!("{}.html", self.stem()))
    }

    /// Aggregate coverage CSV: `<coverage_dir>/<csv_name>`.
    pub fn coverage_csv(&self, workspace: &Path, reports: &ReportsConfig) -> PathBuf {
        workspace.join(&reports.coverage_dir).join(&reports.csv_name)
    }

    /// Style-check report for the whole project.
    pub fn style_report(&self, workspace: &Path, reports: &ReportsConfig) -> PathBuf {
        workspace.join(&reports.style_report)
    }
}
