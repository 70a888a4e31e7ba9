//! Coverage report parsing.
//!
//! Turns a build's coverage output into normalized facts: the annotated
//! source view (one classed `<span>` per line) into [`CoverageLineFact`]s,
//! the per-class method summary into [`CoverageMethodFact`]s, and the
//! aggregate CSV into a per-class coverage ratio. Pure transformation; no
//! challenge semantics live here.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::error::ReportError;
use crate::domain::models::facts::{CoverageLineFact, CoverageMethodFact, CoverageStatus};

/// One annotated source line:
/// `<span class="pc bpc" id="L7" title="1 of 2 branches missed.">...</span>`
static LINE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<span\s+class="(?P<class>[^"]*)"\s+id="L(?P<line>\d+)"(?:\s+title="(?P<title>[^"]*)")?\s*>(?P<content>.*?)</span>"#,
    )
    .unwrap()
});

/// One table row of the method summary view.
static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr[^>]*>(?P<row>.*?)</tr>").unwrap());

/// Anchor text of the first cell, which carries the method name.
static METHOD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<td[^>]*><a[^>]*>(?P<name>[^<]+)</a>").unwrap());

/// Counter cells; the report tool emits `ctr1` (missed) / `ctr2` (total)
/// pairs per metric, the last pair being the line counters.
static CTR1_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<td class="ctr1"[^>]*>(?P<n>[\d,]+)</td>"#).unwrap());
static CTR2_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<td class="ctr2"[^>]*>(?P<n>[\d,]+)</td>"#).unwrap());

/// Read a report file, distinguishing "not generated yet" from "broken".
pub fn read_report(path: &Path) -> Result<String, ReportError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ReportError::Absent(path.to_path_buf())
        } else {
            ReportError::unparseable(path, e.to_string())
        }
    })
}

/// Parse the annotated source view into an ordered sequence of line facts.
///
/// Spans whose class does not map to a coverage status (syntax highlighting
/// markup and the like) are skipped.
pub fn parse_source_lines(html: &str) -> Vec<CoverageLineFact> {
    LINE_SPAN
        .captures_iter(html)
        .filter_map(|caps| {
            let status = CoverageStatus::from_class_attr(&caps["class"])?;
            let line_number: u32 = caps["line"].parse().ok()?;
            let tooltip = caps.name("title").map_or("", |m| m.as_str());
            let content = unescape_html(&caps["content"]);
            Some(CoverageLineFact::from_report_attrs(
                line_number,
                &content,
                status,
                &unescape_html(tooltip),
            ))
        })
        .collect()
}

/// Read and parse the annotated source view at `path`.
pub fn parse_source_report(path: &Path) -> Result<Vec<CoverageLineFact>, ReportError> {
    let html = read_report(path)?;
    let lines = parse_source_lines(&html);
    debug!(path = %path.display(), lines = lines.len(), "parsed coverage source view");
    Ok(lines)
}

/// Parse the method summary view into method facts.
///
/// Rows without a name anchor or counter cells (header, footer totals) are
/// skipped, as are rows whose counters violate `missed <= total`.
pub fn parse_method_facts(html: &str) -> Vec<CoverageMethodFact> {
    TABLE_ROW
        .captures_iter(html)
        .filter_map(|caps| {
            let row = &caps["row"];
            let name = METHOD_NAME.captures(row)?;
            let missed = CTR1_CELL
                .captures_iter(row)
                .last()
                .and_then(|c| parse_counter(&c["n"]))?;
            let lines = CTR2_CELL
                .captures_iter(row)
                .last()
                .and_then(|c| parse_counter(&c["n"]))?;
            if missed > lines {
                return None;
            }
            Some(CoverageMethodFact {
                name: unescape_html(name["name"].trim()),
                lines,
                missed_lines: missed,
            })
        })
        .collect()
}

/// Read and parse the method summary view at `path`.
pub fn parse_method_report(path: &Path) -> Result<Vec<CoverageMethodFact>, ReportError> {
    let html = read_report(path)?;
    let methods = parse_method_facts(&html);
    debug!(path = %path.display(), methods = methods.len(), "parsed coverage method view");
    Ok(methods)
}

/// Look up a class's aggregate coverage ratio in the CSV summary.
///
/// Columns are positional as the report tool emits them:
/// `group,package,class,instructions_missed,instructions_covered,...`.
/// Returns `None` when the class has no row.
pub fn class_coverage(csv: &str, class_name: &str) -> Option<f64> {
    for record in csv.lines().skip(1) {
        let fields: Vec<&str> = record.split(',').collect();
        if fields.get(2) != Some(&class_name) {
            continue;
        }
        let missed: f64 = fields.get(3)?.trim().parse().ok()?;
        let covered: f64 = fields.get(4)?.trim().parse().ok()?;
        if missed + covered == 0.0 {
            return Some(0.0);
        }
        return Some(covered / (covered + missed));
    }
    None
}

/// Read the CSV at `path` and look up `class_name`.
pub fn parse_class_coverage(path: &Path, class_name: &str) -> Result<Option<f64>, ReportError> {
    let csv = read_report(path)?;
    Ok(class_coverage(&csv, class_name))
}

/// Count the lines of one classification.
pub fn count_by_status(lines: &[CoverageLineFact], status: CoverageStatus) -> u32 {
    u32::try_from(lines.iter().filter(|l| l.status == status).count()).unwrap_or(u32::MAX)
}

fn parse_counter(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse().ok()
}

/// Undo the entity escaping of report markup text.
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE_VIEW: &str = r#"<html><body><pre class="source">
<span class="fc" id="L1">public class Ledger {</span>
<span class="pc bpc" id="L2" title="1 of 2 branches missed.">    if (a &amp;&amp; b) {</span>
<span class="nc" id="L3">        apply();</span>
<span class="nc bnc" id="L4" title="All 4 branches missed.">    switch (kind) {</span>
<span class="keyword">ignored</span>
</pre></body></html>"#;

    #[test]
    fn test_parse_source_lines_in_document_order() {
        let lines = parse_source_lines(SOURCE_VIEW);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].status, CoverageStatus::FullyCovered);
        assert_eq!(lines[1].status, CoverageStatus::PartiallyCovered);
        assert_eq!(lines[1].content, "if (a && b) {");
        assert_eq!(lines[1].covered_branches, 1);
        assert_eq!(lines[1].max_branches, 2);
        assert_eq!(lines[2].covered_branches, 0);
        assert_eq!(lines[2].max_branches, 1);
        assert_eq!(lines[3].max_branches, 4);
    }

    #[test]
    fn test_parse_method_facts() {
        let html = r#"<table class="coverage">
<thead><tr><th>Element</th><th>Missed</th><th>Lines</th></tr></thead>
<tbody>
<tr><td id="a1"><a href="#L5">transfer(long, long)</a></td><td class="bar">x</td><td class="ctr1">3</td><td class="ctr2">10</td></tr>
<tr><td id="a2"><a href="#L20">audit()</a></td><td class="bar">x</td><td class="ctr1">0</td><td class="ctr2">4</td></tr>
<tr><td>Total</td><td class="ctr1">3</td><td class="ctr2">14</td></tr>
</tbody></table>"#;
        let methods = parse_method_facts(html);
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "transfer(long, long)");
        assert_eq!(methods[0].missed_lines, 3);
        assert_eq!(methods[0].lines, 10);
        assert!(methods[1].is_fully_covered());
    }

    #[test]
    fn test_method_counters_strip_thousands_separators() {
        let html = r#"<tr><td id="a1"><a href="#L5">bulk()</a></td><td class="ctr1">1,042</td><td class="ctr2">2,500</td></tr>"#;
        let methods = parse_method_facts(html);
        assert_eq!(methods[0].missed_lines, 1042);
        assert_eq!(methods[0].lines, 2500);
    }

    #[test]
    fn test_class_coverage_lookup() {
        let csv = "GROUP,PACKAGE,CLASS,INSTRUCTION_MISSED,INSTRUCTION_COVERED,BRANCH_MISSED\n\
                   demo,com.example,Ledger,8,92,4\n\
                   demo,com.example,Audit,50,50,0\n";
        let ratio = class_coverage(csv, "Ledger").unwrap();
        assert!((ratio - 0.92).abs() < 1e-9);
        assert!((class_coverage(csv, "Audit").unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(class_coverage(csv, "Missing"), None);
    }

    #[test]
    fn test_read_report_distinguishes_absent() {
        let err = read_report(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(err.is_absent());
    }

    #[test]
    fn test_count_by_status() {
        let lines = parse_source_lines(SOURCE_VIEW);
        assert_eq!(count_by_status(&lines, CoverageStatus::FullyCovered), 1);
        assert_eq!(count_by_status(&lines, CoverageStatus::NotCovered), 2);
    }
}
