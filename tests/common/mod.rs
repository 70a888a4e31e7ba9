//! Common test utilities for integration tests
//!
//! Builds on-disk report fixtures laid out the way the default
//! `ReportsConfig` expects them, so tests exercise the same path
//! derivation the engine uses in production.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use testquest::{BuildStatus, EvalContext, SourceArtifactRef};

pub const PACKAGE: &str = "com.example";
pub const FILE_PATH: &str = "src/main/java/com/example/Ledger.java";

/// Anchor name the style parser derives from [`FILE_PATH`] with the
/// default `src` root marker.
pub const STYLE_ANCHOR: &str = "src.2Fmain.2Fjava.2Fcom.2Fexample.2FLedger.java";

/// Create a temporary workspace for test isolation
pub fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

pub fn artifact() -> SourceArtifactRef {
    SourceArtifactRef::new(FILE_PATH, PACKAGE, "Ledger.java", "main")
}

pub fn ctx(workspace: &Path) -> EvalContext {
    EvalContext::new(workspace, "main", BuildStatus::Success)
}

pub fn ctx_on(workspace: &Path, branch: &str) -> EvalContext {
    EvalContext::new(workspace, branch, BuildStatus::Success)
}

/// Write the annotated coverage source view for the fixture class.
pub fn write_coverage_source(workspace: &Path, html: &str) {
    let dir = workspace.join("target/site/coverage").join(PACKAGE);
    fs::create_dir_all(&dir).expect("Failed to create coverage dir");
    fs::write(dir.join("Ledger.java.html"), html).expect("Failed to write source view");
}

/// Write the per-method coverage summary for the fixture class.
pub fn write_method_report(workspace: &Path, html: &str) {
    let dir = workspace.join("target/site/coverage").join(PACKAGE);
    fs::create_dir_all(&dir).expect("Failed to create coverage dir");
    fs::write(dir.join("Ledger.html"), html).expect("Failed to write method view");
}

/// Write the aggregate coverage CSV; `rows` are appended below the header.
pub fn write_coverage_csv(workspace: &Path, rows: &str) {
    let dir = workspace.join("target/site/coverage");
    fs::create_dir_all(&dir).expect("Failed to create coverage dir");
    fs::write(
        dir.join("coverage.csv"),
        format!("GROUP,PACKAGE,CLASS,INSTRUCTION_MISSED,INSTRUCTION_COVERED,BRANCH_MISSED\n{rows}"),
    )
    .expect("Failed to write coverage csv");
}

/// Write the whole-project style report with the given findings rows.
pub fn write_style_report(workspace: &Path, rows: &str) {
    let dir = workspace.join("target/site");
    fs::create_dir_all(&dir).expect("Failed to create report dir");
    fs::write(dir.join("style.html"), style_report_html(rows))
        .expect("Failed to write style report");
}

/// Write the live source file the style fingerprints resolve against.
pub fn write_source_file(workspace: &Path, content: &str) {
    let path = workspace.join(FILE_PATH);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create source dir");
    fs::write(path, content).expect("Failed to write source file");
}

/// A style report document with the summary link and details section the
/// parser expects (the anchor occurs twice; the table follows the second).
pub fn style_report_html(rows: &str) -> String {
    format!(
        r#"<html><body>
<ul><li><a name="{STYLE_ANCHOR}"><a href="#{STYLE_ANCHOR}">Ledger.java</a></a></li></ul>
<h3><a name="{STYLE_ANCHOR}">Ledger.java</a></h3>
<table border="0" class="bodyTable">
<tr class="a"><th>Severity</th><th>Category</th><th>Rule</th><th>Message</th><th>Line</th></tr>
{rows}</table>
</body></html>"#
    )
}

/// One findings-table row.
pub fn style_row(category: &str, rule: &str, message: &str, line: u32) -> String {
    format!(
        "<tr class=\"b\"><td>Error</td><td>{category}</td><td>{rule}</td><td>{message}</td><td>{line}</td></tr>\n"
    )
}

/// A method summary row with the last `ctr1`/`ctr2` pair carrying the
/// missed/total line counters.
pub fn method_row(name: &str, missed: u32, lines: u32) -> String {
    format!(
        "<tr><td id=\"a1\"><a href=\"#L1\">{name}</a></td><td class=\"bar\">x</td><td class=\"ctr1\">{missed}</td><td class=\"ctr2\">{lines}</td></tr>\n"
    )
}
