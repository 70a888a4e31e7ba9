//! Challenge generation.
//!
//! Draws uniformly at random from the eligible fact pool of each variant.
//! An empty pool, an absent report, or an unparseable report all yield
//! `None`: "no challenge produced" is a normal outcome, the caller retries
//! with a different file or variant.

use std::fs;

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::challenge::{
    BuildChallenge, Challenge, ClassCoverageChallenge, CoverageSnapshot, LineCoverageChallenge,
    MethodCoverageChallenge, StyleViolationChallenge,
};
use crate::domain::models::config::Config;
use crate::domain::models::context::{BuildStatus, EvalContext};
use crate::domain::models::facts::{CoverageLineFact, CoverageStatus, StyleFindingFact};
use crate::domain::models::SourceArtifactRef;

use super::report::{coverage, style};

/// Stateless generator of challenges from one build's reports.
///
/// Holds only configuration; every call re-reads the reports it needs and
/// retains nothing.
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    config: Config,
}

impl ChallengeGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Challenge a random line that is not yet fully covered.
    pub fn generate_line_challenge(
        &self,
        artifact: &SourceArtifactRef,
        ctx: &EvalContext,
    ) -> Option<Challenge> {
        let report = artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        let lines = match coverage::parse_source_report(&report) {
            Ok(lines) => lines,
            Err(err) => {
                debug!(class = %artifact.display_name, %err, "no coverage data to generate from");
                return None;
            }
        };
        let pool: Vec<&CoverageLineFact> = lines
            .iter()
            .filter(|l| l.status != CoverageStatus::FullyCovered)
            .collect();
        let line = (*pool.choose(&mut rand::thread_rng())?).clone();
        let class_snapshot = self.class_snapshot(artifact, ctx, &lines);
        Some(Challenge::LineCoverage(LineCoverageChallenge {
            id: Uuid::new_v4(),
            created: Utc::now(),
            solved: None,
            artifact: artifact.clone(),
            class_snapshot,
            line,
            solved_covered_branches: 0,
            solved_coverage: 0.0,
        }))
    }

    /// Challenge a random method that still has missed lines.
    pub fn generate_method_challenge(
        &self,
        artifact: &SourceArtifactRef,
        ctx: &EvalContext,
    ) -> Option<Challenge> {
        let method_report = artifact.coverage_method_report(&ctx.workspace, &self.config.reports);
        let methods = match coverage::parse_method_report(&method_report) {
            Ok(methods) => methods,
            Err(err) => {
                debug!(class = %artifact.display_name, %err, "no method data to generate from");
                return None;
            }
        };
        let pool: Vec<_> = methods.iter().filter(|m| m.missed_lines > 0).collect();
        let method = (*pool.choose(&mut rand::thread_rng())?).clone();

        let source_report = artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        let lines = coverage::parse_source_report(&source_report).ok()?;
        let class_snapshot = self.class_snapshot(artifact, ctx, &lines);
        Some(Challenge::MethodCoverage(MethodCoverageChallenge {
            id: Uuid::new_v4(),
            created: Utc::now(),
            solved: None,
            artifact: artifact.clone(),
            class_snapshot,
            method,
            solved_coverage: 0.0,
        }))
    }

    /// Challenge the aggregate coverage of a class that is not fully
    /// covered yet.
    pub fn generate_class_challenge(
        &self,
        artifact: &SourceArtifactRef,
        ctx: &EvalContext,
    ) -> Option<Challenge> {
        let report = artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        let lines = coverage::parse_source_report(&report).ok()?;
        if !lines.iter().any(|l| l.status != CoverageStatus::FullyCovered) {
            return None;
        }
        let class_snapshot = self.class_snapshot(artifact, ctx, &lines);
        Some(Challenge::ClassCoverage(ClassCoverageChallenge {
            id: Uuid::new_v4(),
            created: Utc::now(),
            solved: None,
            artifact: artifact.clone(),
            class_snapshot,
            solved_coverage: 0.0,
        }))
    }

    /// Challenge a random style finding of the file, restricted to the
    /// curated rule set.
    ///
    /// The chosen finding's fingerprint is resolved from the live source
    /// once, here; the whole same-rule list is snapshotted because its size
    /// feeds the matching heuristic.
    pub fn generate_style_challenge(
        &self,
        artifact: &SourceArtifactRef,
        ctx: &EvalContext,
    ) -> Option<Challenge> {
        let report = artifact.style_report(&ctx.workspace, &self.config.reports);
        let mut findings = match style::parse_style_report(
            &report,
            &artifact.file_path,
            &self.config.reports.style_root_marker,
            &self.config.challenges.style_rules,
        ) {
            Ok(Some(findings)) => findings,
            Ok(None) => return None,
            Err(err) => {
                debug!(class = %artifact.display_name, %err, "no style data to generate from");
                return None;
            }
        };
        let source = fs::read_to_string(artifact.source_file(&ctx.workspace)).ok()?;
        for finding in &mut findings {
            finding.resolve_fingerprint(&source);
        }

        let pool: Vec<&StyleFindingFact> =
            findings.iter().filter(|f| f.fingerprint.is_some()).collect();
        let chosen = (*pool.choose(&mut rand::thread_rng())?).clone();
        let same_rule: Vec<StyleFindingFact> = findings
            .iter()
            .filter(|f| f.rule == chosen.rule)
            .cloned()
            .collect();
        Some(Challenge::StyleViolation(StyleViolationChallenge {
            id: Uuid::new_v4(),
            created: Utc::now(),
            solved: None,
            artifact: artifact.clone(),
            findings: same_rule,
            chosen,
        }))
    }

    /// Challenge the user to repair a failing build. Only generated while
    /// the build is not succeeding.
    pub fn generate_build_challenge(&self, ctx: &EvalContext) -> Option<Challenge> {
        if ctx.build_status == BuildStatus::Success {
            return None;
        }
        Some(Challenge::Build(BuildChallenge::new(ctx.branch.clone())))
    }

    /// Line-status counts plus the aggregate CSV coverage ratio at
    /// generation time.
    fn class_snapshot(
        &self,
        artifact: &SourceArtifactRef,
        ctx: &EvalContext,
        lines: &[CoverageLineFact],
    ) -> CoverageSnapshot {
        let csv = artifact.coverage_csv(&ctx.workspace, &self.config.reports);
        let coverage_ratio = coverage::parse_class_coverage(&csv, artifact.stem())
            .ok()
            .flatten()
            .unwrap_or(0.0);
        CoverageSnapshot {
            fully_covered_lines: coverage::count_by_status(lines, CoverageStatus::FullyCovered),
            partially_covered_lines: coverage::count_by_status(
                lines,
                CoverageStatus::PartiallyCovered,
            ),
            not_covered_lines: coverage::count_by_status(lines, CoverageStatus::NotCovered),
            coverage: coverage_ratio,
        }
    }
}
