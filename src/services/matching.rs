//! Re-identification of snapshot facts in a later build's reports.
//!
//! Source files drift between the build a challenge was created on and the
//! build it is evaluated against: lines move, violations shift, methods get
//! renamed. Matching therefore runs equality with a fallback to the nearest
//! candidate instead of a plain lookup. Tie-break order: exact id match >
//! unique text match > nearest-by-distance text match > no match. Distance
//! ties are broken by encounter order.

use crate::domain::models::facts::{CoverageLineFact, CoverageMethodFact, CoverageStatus, StyleFindingFact};

/// Locate the snapshot line in a re-parsed report.
///
/// An exact match (trimmed text and line number equal, searched among
/// fully and partially covered lines) wins immediately. Otherwise
/// candidates are matched by text alone across all classifications: a
/// single candidate is accepted as-is, several are narrowed to the one
/// nearest the snapshot's line number. A not-covered candidate is never
/// returned.
pub fn find_line_candidate<'a>(
    lines: &'a [CoverageLineFact],
    snapshot: &CoverageLineFact,
) -> Option<&'a CoverageLineFact> {
    if let Some(exact) = lines.iter().find(|l| {
        l.status != CoverageStatus::NotCovered
            && l.content == snapshot.content
            && l.line_number == snapshot.line_number
    }) {
        return Some(exact);
    }

    let candidates: Vec<&CoverageLineFact> =
        lines.iter().filter(|l| l.content == snapshot.content).collect();
    let candidate = if candidates.len() == 1 {
        candidates[0]
    } else {
        nearest_by_line(&candidates, snapshot.line_number)?
    };
    (candidate.status != CoverageStatus::NotCovered).then_some(candidate)
}

/// The candidate whose line number is numerically closest to `target`,
/// first-encountered on ties.
pub fn nearest_by_line<'a>(
    candidates: &[&'a CoverageLineFact],
    target: u32,
) -> Option<&'a CoverageLineFact> {
    candidates
        .iter()
        .min_by_key(|l| l.line_number.abs_diff(target))
        .copied()
}

/// Decide whether a matched line's fresh tooltip shows enough branch
/// progress to count as solved.
///
/// A first token of `"All"` or blank means the line is now fully
/// branch-covered. A fourth token `"missed."` marks a still-missed line
/// regardless of counters. Otherwise the first token is the remaining
/// missed count `m`; on a multi-branch line the new covered count
/// `max - m` must strictly exceed the branches covered at creation.
///
/// Returns the covered-branch count to record on the solved challenge, or
/// `None` when the line does not qualify (including an unparseable token).
pub fn branch_improvement(
    tooltip: &str,
    covered_at_creation: u32,
    max_branches: u32,
) -> Option<u32> {
    let tokens: Vec<&str> = tooltip.split(' ').collect();
    if tokens.get(3) == Some(&"missed.") {
        return None;
    }
    let first = tokens.first().copied().unwrap_or("");
    if first == "All" || first.is_empty() {
        return Some(max_branches);
    }
    let still_missed: u32 = first.parse().ok()?;
    let new_covered = max_branches.saturating_sub(still_missed);
    if max_branches > 1 && new_covered <= covered_at_creation {
        return None;
    }
    Some(new_covered)
}

/// Find a method by name. Names are assumed unique within a class; an
/// overloaded pair collapsing to the same printed name is a known
/// limitation of the report format.
pub fn find_method<'a>(
    methods: &'a [CoverageMethodFact],
    name: &str,
) -> Option<&'a CoverageMethodFact> {
    methods.iter().find(|m| m.name == name)
}

/// Outcome of re-identifying a style finding in a fresh report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleMatch {
    /// The originally flagged line is gone or the finding set changed
    /// shape: the violation counts as resolved.
    Resolved,
    /// The same unresolved instance survives at the given candidate index;
    /// the challenge should re-point its chosen finding there.
    SameInstance(usize),
}

/// Match the snapshot's chosen finding against the re-parsed same-rule
/// candidates.
///
/// An empty candidate list resolves the challenge outright. Otherwise a
/// candidate with the snapshot's fingerprint counts as the same unresolved
/// instance only while the candidate list still has the snapshot's
/// original size; the count-plus-fingerprint proxy guards against false
/// "solved" verdicts when unrelated findings of the same rule shift
/// around. The loop completing without a match resolves the challenge.
pub fn match_style_finding(
    fingerprint: Option<&str>,
    original_count: usize,
    candidates: &[StyleFindingFact],
) -> StyleMatch {
    if candidates.is_empty() {
        return StyleMatch::Resolved;
    }
    for (index, candidate) in candidates.iter().enumerate() {
        if fingerprint.is_some()
            && candidate.fingerprint.as_deref() == fingerprint
            && candidates.len() == original_count
        {
            return StyleMatch::SameInstance(index);
        }
    }
    StyleMatch::Resolved
}
