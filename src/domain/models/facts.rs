//! Normalized facts extracted from build reports.
//!
//! Facts are immutable records produced by the report parsers and consumed
//! by challenge generation and evaluation. A challenge snapshots the fact it
//! was generated from and later compares fresh facts against that snapshot.

use serde::{Deserialize, Serialize};

/// Coverage classification of a single annotated source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// All instructions and branches on the line were executed
    FullyCovered,
    /// Some but not all branches on the line were executed
    PartiallyCovered,
    /// The line was never executed
    NotCovered,
}

impl CoverageStatus {
    /// Parse the first token of a report markup `class` attribute
    /// (`"fc"`, `"pc bpc"`, `"nc"`, ...).
    pub fn from_class_attr(class: &str) -> Option<Self> {
        let first = class.split_whitespace().next()?;
        match first {
            "fc" => Some(Self::FullyCovered),
            "pc" => Some(Self::PartiallyCovered),
            "nc" => Some(Self::NotCovered),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullyCovered => "fc",
            Self::PartiallyCovered => "pc",
            Self::NotCovered => "nc",
        }
    }
}

/// One coverage-annotated source line.
///
/// The trimmed `content` doubles as a drift-tolerant fingerprint: when line
/// numbers shift between builds, matching falls back to text identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageLineFact {
    /// 1-based line number in the source file
    pub line_number: u32,
    /// Trimmed textual content of the line
    pub content: String,
    /// Coverage classification
    pub status: CoverageStatus,
    /// Branches currently covered on this line
    pub covered_branches: u32,
    /// Maximum possible branches on this line (>= 1)
    pub max_branches: u32,
    /// Raw tooltip text as emitted by the report tool
    pub tooltip: String,
}

impl CoverageLineFact {
    /// Build a fact from raw report attributes, deriving the branch
    /// counters from the tooltip.
    pub fn from_report_attrs(
        line_number: u32,
        content: &str,
        status: CoverageStatus,
        tooltip: &str,
    ) -> Self {
        let (covered_branches, max_branches) = parse_branch_counters(tooltip, status);
        Self {
            line_number,
            content: content.trim().to_string(),
            status,
            covered_branches,
            max_branches,
            tooltip: tooltip.to_string(),
        }
    }

    /// Ratio of covered to maximum branches at capture time.
    pub fn branch_ratio(&self) -> f64 {
        f64::from(self.covered_branches) / f64::from(self.max_branches)
    }
}

/// Derive `(covered, max)` branch counters from a tooltip.
///
/// The report tool encodes three distinct layouts depending on the line's
/// classification and whether the tooltip is present at all, so this is an
/// explicit three-way split rather than one generic parser:
///
/// 1. absent/blank tooltip: a binary line with no branch data yet
///    (`covered = 0`, `max = 1`);
/// 2. partially covered: tokens are `[missed, "of", total, ...]`, read
///    positionally as `covered = tok[2] - tok[0]`, `max = tok[2]`;
/// 3. otherwise: `covered = 0`, `max = tok[1]`
///    (e.g. `"All 4 branches missed."`).
///
/// A token that fails to parse degrades the line to the binary shape.
fn parse_branch_counters(tooltip: &str, status: CoverageStatus) -> (u32, u32) {
    let tokens: Vec<&str> = tooltip.split(' ').collect();
    if tooltip.trim().is_empty() {
        return (0, 1);
    }
    if status == CoverageStatus::PartiallyCovered {
        let missed = tokens.first().and_then(|t| t.parse::<u32>().ok());
        let total = tokens.get(2).and_then(|t| t.parse::<u32>().ok());
        return match (missed, total) {
            (Some(missed), Some(total)) if missed <= total && total >= 1 => {
                (total - missed, total)
            }
            _ => (0, 1),
        };
    }
    match tokens.get(1).and_then(|t| t.parse::<u32>().ok()) {
        Some(max) if max >= 1 => (0, max),
        _ => (0, 1),
    }
}

/// Aggregate coverage counters for one method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMethodFact {
    /// Method name as printed by the report, including signature
    /// disambiguation for overloads
    pub name: String,
    /// Total number of lines attributed to the method
    pub lines: u32,
    /// Number of lines not yet covered
    pub missed_lines: u32,
}

impl CoverageMethodFact {
    /// Whether the method still has uncovered lines.
    pub fn is_fully_covered(&self) -> bool {
        self.missed_lines == 0
    }

    /// Fraction of the method's lines already covered.
    pub fn covered_ratio(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        f64::from(self.lines - self.missed_lines) / f64::from(self.lines)
    }
}

/// One style-check finding for a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFindingFact {
    /// Category the rule belongs to (as printed by the report)
    pub category: String,
    /// Rule identifier
    pub rule: String,
    /// Human-readable message
    pub message: String,
    /// 1-based line number of the finding
    pub line: u32,
    /// Trimmed content of the offending source line, resolved once from the
    /// live source at capture time. `None` when the line was out of range.
    pub fingerprint: Option<String>,
}

impl StyleFindingFact {
    /// Resolve the fingerprint from the source text the finding points into.
    pub fn resolve_fingerprint(&mut self, source: &str) {
        self.fingerprint = line_content(source, self.line);
    }
}

/// Trimmed content of the 1-based line `number` of `source`.
pub fn line_content(source: &str, number: u32) -> Option<String> {
    if number == 0 {
        return None;
    }
    source
        .lines()
        .nth(number as usize - 1)
        .map(|l| l.trim().to_string())
}
