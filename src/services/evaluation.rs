//! Challenge evaluation against a later build's reports.
//!
//! Two verdicts per challenge: `is_solvable` (does the target still
//! plausibly exist in the current branch state) and `is_solved` (do the
//! re-derived facts show the target condition satisfied). Both absorb every
//! recoverable failure into a conservative boolean; nothing propagates
//! across the engine boundary. The `&mut Challenge` receiver makes the
//! at-most-one-evaluator-per-challenge contract explicit; serializing
//! evaluations of one instance is the owning store's responsibility.

use std::fs;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::error::ReportError;
use crate::domain::models::challenge::{
    Challenge, ClassCoverageChallenge, LineCoverageChallenge, MethodCoverageChallenge,
    StyleViolationChallenge,
};
use crate::domain::models::config::Config;
use crate::domain::models::context::{BuildStatus, EvalContext};
use crate::domain::models::facts::{CoverageStatus, StyleFindingFact};
use crate::domain::models::SourceArtifactRef;

use super::matching::{self, StyleMatch};
use super::report::{coverage, style};

/// Stateless evaluator applying each variant's matching algorithm.
#[derive(Debug, Clone)]
pub struct ChallengeEvaluator {
    config: Config,
}

impl ChallengeEvaluator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Whether the challenge still makes sense in the current branch state.
    ///
    /// A challenge created on a different branch is always solvable: a
    /// branch switch is not evidence the target disappeared. Beyond that
    /// the policy is per variant; see the private checks below.
    pub fn is_solvable(&self, challenge: &mut Challenge, ctx: &EvalContext) -> bool {
        if challenge.branch() != ctx.branch {
            return true;
        }
        match challenge {
            Challenge::LineCoverage(c) => self.line_solvable(c, ctx),
            Challenge::MethodCoverage(c) => self.method_solvable(c, ctx),
            Challenge::ClassCoverage(c) => self.class_solvable(c, ctx),
            Challenge::StyleViolation(c) => self.style_solvable(c, ctx),
            Challenge::Build(_) => true,
        }
    }

    /// Whether the latest reports show the challenge satisfied.
    ///
    /// Idempotent once true: a challenge carrying a solved timestamp
    /// returns `true` without re-deriving anything, so the timestamp is
    /// never overwritten. A missing or unparseable report is "not solved",
    /// never an error.
    pub fn is_solved(&self, challenge: &mut Challenge, ctx: &EvalContext) -> bool {
        if challenge.is_solved_already() {
            return true;
        }
        match challenge {
            Challenge::LineCoverage(c) => self.line_solved(c, ctx),
            Challenge::MethodCoverage(c) => self.method_solved(c, ctx),
            Challenge::ClassCoverage(c) => self.class_solved(c, ctx),
            Challenge::StyleViolation(c) => self.style_solved(c, ctx),
            Challenge::Build(c) => {
                if ctx.build_status == BuildStatus::Success {
                    c.mark_solved(Utc::now());
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The line must still exist in the class with room to improve: some
    /// partially- or not-covered line carries the snapshot's text.
    fn line_solvable(&self, c: &LineCoverageChallenge, ctx: &EvalContext) -> bool {
        if !c.artifact.source_file(&ctx.workspace).exists() {
            return false;
        }
        let report = c.artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        match coverage::parse_source_report(&report) {
            Ok(lines) => lines.iter().any(|l| {
                l.status != CoverageStatus::FullyCovered && l.content == c.line.content
            }),
            Err(err) => absent_means_pending(&err, "line solvability"),
        }
    }

    fn line_solved(&self, c: &mut LineCoverageChallenge, ctx: &EvalContext) -> bool {
        let report = c.artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        let lines = match coverage::parse_source_report(&report) {
            Ok(lines) => lines,
            Err(err) => return not_solved(&err, "line coverage"),
        };
        let Some(candidate) = matching::find_line_candidate(&lines, &c.line) else {
            return false;
        };
        let Some(covered) = matching::branch_improvement(
            &candidate.tooltip,
            c.line.covered_branches,
            c.line.max_branches,
        ) else {
            debug!(
                class = %c.artifact.display_name,
                line = candidate.line_number,
                "matched line shows no branch progress"
            );
            return false;
        };
        let coverage_ratio = self.current_class_coverage(&c.artifact, ctx);
        c.mark_solved(covered, coverage_ratio, Utc::now());
        true
    }

    /// The named method must still have missed lines.
    fn method_solvable(&self, c: &MethodCoverageChallenge, ctx: &EvalContext) -> bool {
        let report = c.artifact.coverage_method_report(&ctx.workspace, &self.config.reports);
        match coverage::parse_method_report(&report) {
            Ok(methods) => matching::find_method(&methods, &c.method.name)
                .is_some_and(|m| m.missed_lines > 0),
            Err(err) => absent_means_pending(&err, "method solvability"),
        }
    }

    fn method_solved(&self, c: &mut MethodCoverageChallenge, ctx: &EvalContext) -> bool {
        let report = c.artifact.coverage_method_report(&ctx.workspace, &self.config.reports);
        let methods = match coverage::parse_method_report(&report) {
            Ok(methods) => methods,
            Err(err) => return not_solved(&err, "method coverage"),
        };
        let Some(method) = matching::find_method(&methods, &c.method.name) else {
            return false;
        };
        if method.missed_lines >= c.method.missed_lines {
            return false;
        }
        let coverage_ratio = self.current_class_coverage(&c.artifact, ctx);
        c.mark_solved(coverage_ratio, Utc::now());
        true
    }

    /// Not-fully-covered lines must remain in the class.
    fn class_solvable(&self, c: &ClassCoverageChallenge, ctx: &EvalContext) -> bool {
        if !c.artifact.source_file(&ctx.workspace).exists() {
            return false;
        }
        let report = c.artifact.coverage_source_report(&ctx.workspace, &self.config.reports);
        match coverage::parse_source_report(&report) {
            Ok(lines) => lines.iter().any(|l| l.status != CoverageStatus::FullyCovered),
            Err(err) => absent_means_pending(&err, "class solvability"),
        }
    }

    fn class_solved(&self, c: &mut ClassCoverageChallenge, ctx: &EvalContext) -> bool {
        let csv = c.artifact.coverage_csv(&ctx.workspace, &self.config.reports);
        let ratio = match coverage::parse_class_coverage(&csv, c.artifact.stem()) {
            Ok(Some(ratio)) => ratio,
            Ok(None) => return false,
            Err(err) => return not_solved(&err, "class coverage"),
        };
        if ratio <= c.class_snapshot.coverage {
            return false;
        }
        c.mark_solved(ratio, Utc::now());
        true
    }

    /// The source file itself must still exist; an absent style report
    /// only defers the decision. On a fingerprint match the chosen finding
    /// is re-pointed at the surviving candidate so later evaluations track
    /// the drifted location.
    fn style_solvable(&self, c: &mut StyleViolationChallenge, ctx: &EvalContext) -> bool {
        if !c.artifact.source_file(&ctx.workspace).exists() {
            return false;
        }
        let candidates = match self.style_candidates(c, ctx) {
            CandidateLookup::Found(candidates) => candidates,
            CandidateLookup::ReportPending => return true,
            CandidateLookup::NoVerdict => return false,
        };
        if let StyleMatch::SameInstance(index) =
            matching::match_style_finding(c.fingerprint(), c.original_count(), &candidates)
        {
            c.update_chosen(candidates[index].clone());
        }
        true
    }

    fn style_solved(&self, c: &mut StyleViolationChallenge, ctx: &EvalContext) -> bool {
        if !c.artifact.source_file(&ctx.workspace).exists() {
            return false;
        }
        let candidates = match self.style_candidates(c, ctx) {
            CandidateLookup::Found(candidates) => candidates,
            CandidateLookup::ReportPending | CandidateLookup::NoVerdict => return false,
        };
        match matching::match_style_finding(c.fingerprint(), c.original_count(), &candidates) {
            StyleMatch::SameInstance(index) => {
                c.update_chosen(candidates[index].clone());
                false
            }
            StyleMatch::Resolved => {
                c.mark_solved(Utc::now());
                true
            }
        }
    }

    /// Re-parse the style report and return the same-rule findings with
    /// fingerprints resolved from the current source.
    fn style_candidates(
        &self,
        c: &StyleViolationChallenge,
        ctx: &EvalContext,
    ) -> CandidateLookup {
        let report = c.artifact.style_report(&ctx.workspace, &self.config.reports);
        let findings = match style::parse_style_report(
            &report,
            &c.artifact.file_path,
            &self.config.reports.style_root_marker,
            &self.config.challenges.style_rules,
        ) {
            Ok(Some(findings)) => findings,
            Ok(None) => return CandidateLookup::NoVerdict,
            Err(err) if err.is_absent() => return CandidateLookup::ReportPending,
            Err(err) => {
                warn!(%err, "style report unreadable");
                return CandidateLookup::NoVerdict;
            }
        };
        let Ok(source) = fs::read_to_string(c.artifact.source_file(&ctx.workspace)) else {
            return CandidateLookup::NoVerdict;
        };
        let mut candidates: Vec<StyleFindingFact> = findings
            .into_iter()
            .filter(|f| f.rule == c.chosen.rule)
            .collect();
        for candidate in &mut candidates {
            candidate.resolve_fingerprint(&source);
        }
        CandidateLookup::Found(candidates)
    }

    fn current_class_coverage(&self, artifact: &SourceArtifactRef, ctx: &EvalContext) -> f64 {
        let csv = artifact.coverage_csv(&ctx.workspace, &self.config.reports);
        coverage::parse_class_coverage(&csv, artifact.stem())
            .ok()
            .flatten()
            .unwrap_or(0.0)
    }
}

enum CandidateLookup {
    Found(Vec<StyleFindingFact>),
    /// Report not generated this cycle; defer the decision.
    ReportPending,
    /// Report unreadable or carrying no data for the file.
    NoVerdict,
}

fn absent_means_pending(err: &ReportError, what: &str) -> bool {
    if err.is_absent() {
        debug!(%err, "{what}: report pending, deferring");
        true
    } else {
        warn!(%err, "{what}: report unreadable");
        false
    }
}

fn not_solved(err: &ReportError, what: &str) -> bool {
    if err.is_absent() {
        debug!(%err, "{what}: report pending, not solved yet");
    } else {
        warn!(%err, "{what}: report unreadable, not solved");
    }
    false
}
