//! Style report parsing.
//!
//! The style checker emits one HTML report for the whole project, with a
//! per-file details section addressed by an anchor tag derived from the
//! file's path. Findings are filtered to a curated allow-list of rules
//! before they become challenge candidates.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::error::ReportError;
use crate::domain::models::facts::StyleFindingFact;

use super::coverage::{read_report, unescape_html};

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\s+name="(?P<name>[^"]*)""#).unwrap());

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<table[^>]*>(?P<body>.*?)</table>").unwrap());

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr[^>]*>(?P<row>.*?)</tr>").unwrap());

static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<td[^>]*>(?P<cell>.*?)</td>").unwrap());

/// Build the anchor name addressing `file_path`'s details section.
///
/// Path components are split on `/` (falling back to `\` for reports
/// produced on Windows workers), everything before the first component equal
/// to `root_marker` is discarded, and the remainder is joined with `.2F`.
/// Returns `None` when the marker does not occur in the path.
pub fn file_anchor(file_path: &Path, root_marker: &str) -> Option<String> {
    let raw = file_path.to_string_lossy();
    let mut components: Vec<&str> = raw.split('/').collect();
    if components.len() == 1 {
        components = raw.split('\\').collect();
    }
    let start = components.iter().position(|c| *c == root_marker)?;
    Some(components[start..].join(".2F"))
}

/// Extract the findings for one file from the whole-project report.
///
/// The anchor occurs twice: first in the summary listing, then at the
/// details section. The table following the second occurrence holds rows
/// `severity | category | rule | message | line`. Returns `None` ("no
/// data") when the details anchor cannot be located, the table is missing
/// or empty, or no finding survives the rule allow-list.
pub fn parse_file_findings(
    html: &str,
    anchor_name: &str,
    rules: &[String],
) -> Option<Vec<StyleFindingFact>> {
    let details = ANCHOR
        .captures_iter(html)
        .filter(|caps| &caps["name"] == anchor_name)
        .nth(1)?;
    let after = details.get(0)?.end();
    let table = TABLE.captures(&html[after..])?;

    let mut findings = Vec::new();
    for row in TABLE_ROW.captures_iter(&table["body"]) {
        let cells: Vec<String> = CELL
            .captures_iter(&row["row"])
            .map(|c| unescape_html(c["cell"].trim()))
            .collect();
        // header and spacer rows carry no <td> cells
        if cells.len() < 5 {
            continue;
        }
        let Ok(line) = cells[4].parse::<u32>() else {
            continue;
        };
        if line == 0 || !rules.iter().any(|r| r == &cells[2]) {
            continue;
        }
        findings.push(StyleFindingFact {
            category: cells[1].clone(),
            rule: cells[2].clone(),
            message: cells[3].clone(),
            line,
            fingerprint: None,
        });
    }

    if findings.is_empty() {
        return None;
    }
    Some(findings)
}

/// Read the whole-project style report at `path` and extract the findings
/// for `file_path`.
///
/// `Ok(None)` means the report was readable but carries no data for the
/// file (marker absent from the path, anchor not found, or nothing on the
/// allow-list).
pub fn parse_style_report(
    path: &Path,
    file_path: &Path,
    root_marker: &str,
    rules: &[String],
) -> Result<Option<Vec<StyleFindingFact>>, ReportError> {
    let html = read_report(path)?;
    let Some(anchor) = file_anchor(file_path, root_marker) else {
        debug!(
            file = %file_path.display(),
            marker = root_marker,
            "style root marker not in path"
        );
        return Ok(None);
    };
    let findings = parse_file_findings(&html, &anchor, rules);
    debug!(
        path = %path.display(),
        anchor = %anchor,
        findings = findings.as_ref().map_or(0, Vec::len),
        "parsed style report"
    );
    Ok(findings)
}
