//! Challenge domain model.
//!
//! A challenge binds an immutable snapshot of a fact (taken at generation
//! time) to a mutable solved outcome. Variants form a closed tagged union;
//! dispatch happens by matching on [`Challenge`]. Solvability is never
//! stored — it is recomputed on demand by the evaluation service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::SourceArtifactRef;
use super::facts::{CoverageLineFact, CoverageMethodFact, CoverageStatus, StyleFindingFact};

/// Per-class line-status counts captured when a coverage challenge is
/// generated, together with the class's aggregate coverage ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    pub fully_covered_lines: u32,
    pub partially_covered_lines: u32,
    pub not_covered_lines: u32,
    /// Aggregate class coverage ratio in `[0, 1]` at creation
    pub coverage: f64,
}

/// Cover a specific line of a specific class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCoverageChallenge {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub solved: Option<DateTime<Utc>>,
    pub artifact: SourceArtifactRef,
    pub class_snapshot: CoverageSnapshot,
    /// The annotated line as it looked at generation time
    pub line: CoverageLineFact,
    /// Branches covered on the line once solved, 0 until then
    pub solved_covered_branches: u32,
    /// Class coverage ratio at solve time, 0 until solved
    pub solved_coverage: f64,
}

impl LineCoverageChallenge {
    pub fn score(&self) -> u32 {
        if self.class_snapshot.coverage >= 0.8
            || self.line.status == CoverageStatus::PartiallyCovered
        {
            3
        } else {
            2
        }
    }

    /// Record the solved outcome. The caller guarantees this runs at most
    /// once per challenge instance.
    pub fn mark_solved(&mut self, covered_branches: u32, coverage: f64, at: DateTime<Utc>) {
        self.solved = Some(at);
        self.solved_covered_branches = covered_branches;
        self.solved_coverage = coverage;
    }
}

/// Cover more lines of a specific method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCoverageChallenge {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub solved: Option<DateTime<Utc>>,
    pub artifact: SourceArtifactRef,
    pub class_snapshot: CoverageSnapshot,
    pub method: CoverageMethodFact,
    pub solved_coverage: f64,
}

impl MethodCoverageChallenge {
    pub fn score(&self) -> u32 {
        if self.method.covered_ratio() > 0.8 {
            3
        } else {
            2
        }
    }

    pub fn mark_solved(&mut self, coverage: f64, at: DateTime<Utc>) {
        self.solved = Some(at);
        self.solved_coverage = coverage;
    }
}

/// Raise the aggregate coverage of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCoverageChallenge {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub solved: Option<DateTime<Utc>>,
    pub artifact: SourceArtifactRef,
    pub class_snapshot: CoverageSnapshot,
    pub solved_coverage: f64,
}

impl ClassCoverageChallenge {
    pub fn score(&self) -> u32 {
        if self.class_snapshot.coverage > 0.8 {
            2
        } else {
            1
        }
    }

    pub fn mark_solved(&mut self, coverage: f64, at: DateTime<Utc>) {
        self.solved = Some(at);
        self.solved_coverage = coverage;
    }
}

/// Fix a specific style-check violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleViolationChallenge {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub solved: Option<DateTime<Utc>>,
    pub artifact: SourceArtifactRef,
    /// All findings of the chosen rule at creation time. The list size is
    /// part of the matching heuristic, so the whole list is snapshotted.
    pub findings: Vec<StyleFindingFact>,
    /// The finding the user is asked to fix. Re-pointed when matching
    /// identifies the same unresolved instance at a drifted location.
    pub chosen: StyleFindingFact,
}

impl StyleViolationChallenge {
    pub fn score(&self) -> u32 {
        1
    }

    /// Fingerprint of the offending line, captured at creation.
    pub fn fingerprint(&self) -> Option<&str> {
        self.chosen.fingerprint.as_deref()
    }

    /// Size of the same-rule findings list at creation.
    pub fn original_count(&self) -> usize {
        self.findings.len()
    }

    /// Re-point the chosen finding at a drifted candidate.
    pub fn update_chosen(&mut self, candidate: StyleFindingFact) {
        self.chosen = candidate;
    }

    pub fn mark_solved(&mut self, at: DateTime<Utc>) {
        self.solved = Some(at);
    }
}

/// Let the build run successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildChallenge {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub solved: Option<DateTime<Utc>>,
    pub branch: String,
}

impl BuildChallenge {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: Utc::now(),
            solved: None,
            branch: branch.into(),
        }
    }

    pub fn score(&self) -> u32 {
        1
    }

    pub fn mark_solved(&mut self, at: DateTime<Utc>) {
        self.solved = Some(at);
    }
}

/// A generated challenge, polymorphic over its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Challenge {
    LineCoverage(LineCoverageChallenge),
    MethodCoverage(MethodCoverageChallenge),
    ClassCoverage(ClassCoverageChallenge),
    StyleViolation(StyleViolationChallenge),
    Build(BuildChallenge),
}

impl Challenge {
    pub fn id(&self) -> Uuid {
        match self {
            Self::LineCoverage(c) => c.id,
            Self::MethodCoverage(c) => c.id,
            Self::ClassCoverage(c) => c.id,
            Self::StyleViolation(c) => c.id,
            Self::Build(c) => c.id,
        }
    }

    pub fn created(&self) -> DateTime<Utc> {
        match self {
            Self::LineCoverage(c) => c.created,
            Self::MethodCoverage(c) => c.created,
            Self::ClassCoverage(c) => c.created,
            Self::StyleViolation(c) => c.created,
            Self::Build(c) => c.created,
        }
    }

    pub fn solved(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::LineCoverage(c) => c.solved,
            Self::MethodCoverage(c) => c.solved,
            Self::ClassCoverage(c) => c.solved,
            Self::StyleViolation(c) => c.solved,
            Self::Build(c) => c.solved,
        }
    }

    pub fn is_solved_already(&self) -> bool {
        self.solved().is_some()
    }

    /// Branch the challenge was generated on.
    pub fn branch(&self) -> &str {
        match self {
            Self::LineCoverage(c) => &c.artifact.branch,
            Self::MethodCoverage(c) => &c.artifact.branch,
            Self::ClassCoverage(c) => &c.artifact.branch,
            Self::StyleViolation(c) => &c.artifact.branch,
            Self::Build(c) => &c.branch,
        }
    }

    /// The source artifact the challenge targets, if any.
    pub fn artifact(&self) -> Option<&SourceArtifactRef> {
        match self {
            Self::LineCoverage(c) => Some(&c.artifact),
            Self::MethodCoverage(c) => Some(&c.artifact),
            Self::ClassCoverage(c) => Some(&c.artifact),
            Self::StyleViolation(c) => Some(&c.artifact),
            Self::Build(_) => None,
        }
    }

    /// Reward score of the challenge.
    pub fn score(&self) -> u32 {
        match self {
            Self::LineCoverage(c) => c.score(),
            Self::MethodCoverage(c) => c.score(),
            Self::ClassCoverage(c) => c.score(),
            Self::StyleViolation(c) => c.score(),
            Self::Build(c) => c.score(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LineCoverage(_) => "Line Coverage",
            Self::MethodCoverage(_) => "Method Coverage",
            Self::ClassCoverage(_) => "Class Coverage",
            Self::StyleViolation(_) => "Style Violation",
            Self::Build(_) => "Build",
        }
    }

    /// Render the challenge as a single XML element for audit/export.
    ///
    /// `created`/`solved` are millisecond timestamps; an unsolved challenge
    /// prints `solved="0"`. A non-empty `reason` is appended as an
    /// attribute.
    pub fn to_xml(&self, reason: &str) -> String {
        let created = self.created().timestamp_millis();
        let solved = self.solved().map_or(0, |s| s.timestamp_millis());
        let mut out = match self {
            Self::LineCoverage(c) => format!(
                "<LineCoverageChallenge created=\"{created}\" solved=\"{solved}\" \
                 class=\"{}\" package=\"{}\" line=\"{}\" content=\"{}\"",
                c.artifact.display_name,
                c.artifact.package,
                c.line.line_number,
                xml_escape(&c.line.content),
            ),
            Self::MethodCoverage(c) => format!(
                "<MethodCoverageChallenge created=\"{created}\" solved=\"{solved}\" \
                 class=\"{}\" package=\"{}\" method=\"{}\"",
                c.artifact.display_name,
                c.artifact.package,
                xml_escape(&c.method.name),
            ),
            Self::ClassCoverage(c) => format!(
                "<ClassCoverageChallenge created=\"{created}\" solved=\"{solved}\" \
                 class=\"{}\" package=\"{}\"",
                c.artifact.display_name, c.artifact.package,
            ),
            Self::StyleViolation(c) => format!(
                "<StyleViolationChallenge created=\"{created}\" solved=\"{solved}\" \
                 class=\"{}\" category=\"{}\" rule=\"{}\" message=\"{}\" line=\"{}\"",
                c.artifact.display_name,
                xml_escape(&c.chosen.category),
                xml_escape(&c.chosen.rule),
                xml_escape(&c.chosen.message),
                c.chosen.line,
            ),
            Self::Build(_) => {
                format!("<BuildChallenge created=\"{created}\" solved=\"{solved}\"")
            }
        };
        if !reason.is_empty() {
            out.push_str(&format!(" reason=\"{}\"", xml_escape(reason)));
        }
        out.push_str("/>");
        out
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineCoverage(c) => {
                if c.line.max_branches > 1 {
                    write!(
                        f,
                        "Write a test to cover more branches (currently {} of {} covered) of \
                         line {} in class {} in package {} (created for branch {})",
                        c.line.covered_branches,
                        c.line.max_branches,
                        c.line.line_number,
                        c.artifact.display_name,
                        c.artifact.package,
                        c.artifact.branch,
                    )
                } else {
                    write!(
                        f,
                        "Write a test to fully cover line {} in class {} in package {} \
                         (created for branch {})",
                        c.line.line_number,
                        c.artifact.display_name,
                        c.artifact.package,
                        c.artifact.branch,
                    )
                }
            }
            Self::MethodCoverage(c) => write!(
                f,
                "Write a test to cover more lines of method {} in class {} in package {} \
                 (created for branch {})",
                c.method.name, c.artifact.display_name, c.artifact.package, c.artifact.branch,
            ),
            Self::ClassCoverage(c) => write!(
                f,
                "Write a test to cover more lines of class {} in package {} \
                 (created for branch {})",
                c.artifact.display_name, c.artifact.package, c.artifact.branch,
            ),
            Self::StyleViolation(c) => write!(
                f,
                "Adjust your code in class {} in package {}: the rule {} ({}) was violated \
                 at line {} with the message: {}",
                c.artifact.display_name,
                c.artifact.package,
                c.chosen.rule,
                c.chosen.category,
                c.chosen.line,
                c.chosen.message,
            ),
            Self::Build(_) => write!(f, "Let the build run successfully"),
        }
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
