pub mod artifact;
pub mod challenge;
pub mod config;
pub mod context;
pub mod facts;

pub use artifact::SourceArtifactRef;
pub use challenge::{
    BuildChallenge, Challenge, ClassCoverageChallenge, CoverageSnapshot, LineCoverageChallenge,
    MethodCoverageChallenge, StyleViolationChallenge,
};
pub use config::{ChallengesConfig, Config, LoggingConfig, ReportsConfig};
pub use context::{BuildStatus, EvalContext};
pub use facts::{CoverageLineFact, CoverageMethodFact, CoverageStatus, StyleFindingFact};
