//! Report parsers turning build artifacts into normalized facts.
//!
//! Leaf components with no challenge semantics: coverage HTML/CSV on one
//! side, the style-check HTML report on the other. Both fail softly,
//! distinguishing an absent report from a broken one so callers can treat
//! "not yet produced" as "not yet decidable".

pub mod coverage;
pub mod style;
