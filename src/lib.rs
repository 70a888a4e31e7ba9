//! Testquest - Challenge Evaluation Engine
//!
//! Testquest gamifies software testing inside a CI pipeline: it generates
//! small verifiable challenges ("cover this line", "cover this method",
//! "fix this style violation") from the static-analysis reports of one
//! build and re-evaluates them against later builds to decide whether a
//! challenge is still solvable or has been solved.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): facts, challenge variants, artifact
//!   identity, configuration model
//! - **Service Layer** (`services`): report parsers, matching algorithms,
//!   challenge generation and evaluation
//! - **Infrastructure Layer** (`infrastructure`): configuration loading and
//!   logging setup
//!
//! Persistence of challenges, CI scheduling, and presentation belong to the
//! surrounding system; the engine consumes reports and produces verdicts.
//!
//! # Example
//!
//! ```ignore
//! use testquest::domain::models::{BuildStatus, EvalContext, SourceArtifactRef};
//! use testquest::{ChallengeEvaluator, ChallengeGenerator, ConfigLoader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let generator = ChallengeGenerator::new(config.clone());
//!     let evaluator = ChallengeEvaluator::new(config);
//!
//!     let artifact = SourceArtifactRef::new(
//!         "src/main/java/com/example/Ledger.java",
//!         "com.example",
//!         "Ledger.java",
//!         "main",
//!     );
//!     let ctx = EvalContext::new("/var/ci/workspace/demo", "main", BuildStatus::Success);
//!
//!     if let Some(mut challenge) = generator.generate_line_challenge(&artifact, &ctx) {
//!         // later, against another build's context:
//!         let _ = evaluator.is_solved(&mut challenge, &ctx);
//!     }
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::error::{DomainError, ReportError};
pub use domain::models::{
    BuildChallenge, BuildStatus, Challenge, ChallengesConfig, ClassCoverageChallenge, Config,
    CoverageLineFact, CoverageMethodFact, CoverageSnapshot, CoverageStatus, EvalContext,
    LineCoverageChallenge, LoggingConfig, MethodCoverageChallenge, ReportsConfig,
    SourceArtifactRef, StyleFindingFact, StyleViolationChallenge,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ChallengeEvaluator, ChallengeGenerator};
