//! Integration tests for coverage and build challenge evaluation.
//!
//! These tests run the full path: generate a challenge from one build's
//! on-disk reports, then evaluate it against a later build's reports in
//! the same workspace.

mod common;

use common::{
    artifact, ctx, ctx_on, method_row, temp_workspace, write_coverage_csv, write_coverage_source,
    write_method_report, write_source_file,
};
use testquest::{
    BuildStatus, Challenge, ChallengeEvaluator, ChallengeGenerator, Config, EvalContext,
};

fn engine() -> (ChallengeGenerator, ChallengeEvaluator) {
    (
        ChallengeGenerator::new(Config::default()),
        ChallengeEvaluator::new(Config::default()),
    )
}

/// Source view with exactly one eligible (not fully covered) line, so
/// generation is deterministic.
const ONE_UNCOVERED_LINE: &str = r#"<span class="fc" id="L1">public void apply() {</span>
<span class="fc" id="L2">    open();</span>
<span class="nc" id="L3">    settle();</span>
<span class="fc" id="L4">}</span>"#;

#[test]
fn test_line_challenge_solved_and_timestamp_idempotent() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    write_coverage_csv(ws.path(), "demo,com.example,Ledger,50,50,0\n");
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();
    assert!(!evaluator.is_solved(&mut challenge, &ctx), "not solved yet");

    // the next build covers the line
    write_coverage_source(
        ws.path(),
        r#"<span class="fc" id="L1">public void apply() {</span>
<span class="fc" id="L2">    open();</span>
<span class="fc" id="L3">    settle();</span>
<span class="fc" id="L4">}</span>"#,
    );
    write_coverage_csv(ws.path(), "demo,com.example,Ledger,25,75,0\n");

    assert!(evaluator.is_solved(&mut challenge, &ctx));
    let solved_at = challenge.solved().expect("solved timestamp set");
    let Challenge::LineCoverage(ref c) = challenge else {
        panic!("expected a line coverage challenge");
    };
    assert_eq!(c.solved_covered_branches, 1);
    assert!((c.solved_coverage - 0.75).abs() < 1e-9);

    // idempotent: re-evaluating must not move the timestamp
    assert!(evaluator.is_solved(&mut challenge, &ctx));
    assert_eq!(challenge.solved(), Some(solved_at));
}

#[test]
fn test_branch_mismatch_always_solvable() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let main_ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &main_ctx).unwrap();

    // evaluate on another branch, in a workspace with no reports and no
    // source file at all
    let other_ws = temp_workspace();
    let other = ctx_on(other_ws.path(), "feature/settlement");
    assert!(evaluator.is_solvable(&mut challenge, &other));
}

#[test]
fn test_line_solvable_report_absent_source_present() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    // a fresh workspace: source checked out, reports not generated yet
    let later = temp_workspace();
    write_source_file(later.path(), "public void apply() {\n    open();\n    settle();\n}\n");
    assert!(evaluator.is_solvable(&mut challenge, &ctx_on(later.path(), "main")));
    assert!(!evaluator.is_solved(&mut challenge, &ctx_on(later.path(), "main")));
}

#[test]
fn test_line_unsolvable_when_source_file_gone() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    let later = temp_workspace();
    assert!(!evaluator.is_solvable(&mut challenge, &ctx_on(later.path(), "main")));
}

#[test]
fn test_line_matching_tolerates_drift() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    // edits above pushed the line from 3 to 7; it is covered now
    write_coverage_source(
        ws.path(),
        r#"<span class="fc" id="L5">public void apply() {</span>
<span class="fc" id="L6">    open();</span>
<span class="fc" id="L7">    settle();</span>
<span class="fc" id="L8">}</span>"#,
    );
    assert!(evaluator.is_solved(&mut challenge, &ctx));
}

#[test]
fn test_line_nearest_candidate_rejected_when_not_covered() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    // two text matches: the nearer one (line 2) is still uncovered, the
    // farther one (line 9) is covered. Nearest wins, so not solved.
    write_coverage_source(
        ws.path(),
        r#"<span class="nc" id="L2">    settle();</span>
<span class="fc" id="L9">    settle();</span>"#,
    );
    assert!(!evaluator.is_solved(&mut challenge, &ctx));
    assert!(challenge.solved().is_none());
}

#[test]
fn test_partially_covered_line_requires_strict_branch_progress() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    // single eligible line: pc with 3 of 5 branches covered
    let snapshot_view = r#"<span class="fc" id="L1">public int route(int k) {</span>
<span class="pc bpc" id="L2" title="2 of 5 branches missed.">    switch (k) {</span>
<span class="fc" id="L3">}</span>"#;
    write_coverage_source(ws.path(), snapshot_view);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    // same remaining-missed count: no progress, not solved
    assert!(!evaluator.is_solved(&mut challenge, &ctx));

    // one more branch covered
    write_coverage_source(
        ws.path(),
        r#"<span class="fc" id="L1">public int route(int k) {</span>
<span class="pc bpc" id="L2" title="1 of 5 branches missed.">    switch (k) {</span>
<span class="fc" id="L3">}</span>"#,
    );
    assert!(evaluator.is_solved(&mut challenge, &ctx));
    let Challenge::LineCoverage(ref c) = challenge else {
        panic!("expected a line coverage challenge");
    };
    assert_eq!(c.solved_covered_branches, 4);
}

#[test]
fn test_method_challenge_solved_by_missed_line_decrease() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_method_report(ws.path(), &method_row("transfer(long, long)", 5, 10));
    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    write_coverage_csv(ws.path(), "demo,com.example,Ledger,60,40,0\n");
    let mut challenge = generator.generate_method_challenge(&artifact(), &ctx).unwrap();

    // unchanged missed count: not solved
    assert!(!evaluator.is_solved(&mut challenge, &ctx));

    // regression: more missed lines than at creation
    write_method_report(ws.path(), &method_row("transfer(long, long)", 6, 10));
    assert!(!evaluator.is_solved(&mut challenge, &ctx));

    // 5 -> 3 missed lines
    write_method_report(ws.path(), &method_row("transfer(long, long)", 3, 10));
    write_coverage_csv(ws.path(), "demo,com.example,Ledger,40,60,0\n");
    assert!(evaluator.is_solved(&mut challenge, &ctx));
    let Challenge::MethodCoverage(ref c) = challenge else {
        panic!("expected a method coverage challenge");
    };
    assert!((c.solved_coverage - 0.6).abs() < 1e-9);
}

#[test]
fn test_method_solvable_follows_missed_lines() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_method_report(ws.path(), &method_row("transfer(long, long)", 5, 10));
    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_method_challenge(&artifact(), &ctx).unwrap();
    assert!(evaluator.is_solvable(&mut challenge, &ctx));

    // fully covered now: nothing left to improve
    write_method_report(ws.path(), &method_row("transfer(long, long)", 0, 10));
    assert!(!evaluator.is_solvable(&mut challenge, &ctx));

    // renamed away: gone
    write_method_report(ws.path(), &method_row("transferAll()", 2, 10));
    assert!(!evaluator.is_solvable(&mut challenge, &ctx));

    // report not generated yet: defer, still solvable
    let later = temp_workspace();
    assert!(evaluator.is_solvable(&mut challenge, &ctx_on(later.path(), "main")));
}

#[test]
fn test_class_challenge_requires_rising_coverage() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    write_coverage_csv(ws.path(), "demo,com.example,Ledger,50,50,0\n");
    let mut challenge = generator.generate_class_challenge(&artifact(), &ctx).unwrap();

    // unchanged ratio: not solved
    assert!(!evaluator.is_solved(&mut challenge, &ctx));

    write_coverage_csv(ws.path(), "demo,com.example,Ledger,40,60,0\n");
    assert!(evaluator.is_solved(&mut challenge, &ctx));
    let Challenge::ClassCoverage(ref c) = challenge else {
        panic!("expected a class coverage challenge");
    };
    assert!((c.solved_coverage - 0.6).abs() < 1e-9);
}

#[test]
fn test_build_challenge_lifecycle() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();

    let red = EvalContext::new(ws.path(), "main", BuildStatus::Failure);
    let mut challenge = generator.generate_build_challenge(&red).unwrap();

    assert!(evaluator.is_solvable(&mut challenge, &red));
    assert!(!evaluator.is_solved(&mut challenge, &red));

    let unstable = EvalContext::new(ws.path(), "main", BuildStatus::Unstable);
    assert!(!evaluator.is_solved(&mut challenge, &unstable));

    let green = ctx(ws.path());
    assert!(evaluator.is_solved(&mut challenge, &green));
    assert!(challenge.solved().is_some());
}

#[test]
fn test_unparseable_report_degrades_to_not_solved() {
    let ws = temp_workspace();
    let (generator, evaluator) = engine();
    let ctx = ctx(ws.path());

    write_coverage_source(ws.path(), ONE_UNCOVERED_LINE);
    let mut challenge = generator.generate_line_challenge(&artifact(), &ctx).unwrap();

    // the report exists but carries no annotated lines at all
    write_coverage_source(ws.path(), "<html><body>report truncated");
    assert!(!evaluator.is_solved(&mut challenge, &ctx));
    assert!(challenge.solved().is_none());
}
