//! Validation errors for scoring configuration.
//!
//! Every invalid-config condition has a named variant. These surface
//! at construction time; once a dictionary, curve, or table exists it
//! is guaranteed well-formed for the rest of the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("feature phrase is empty")]
    EmptyPhrase,

    #[error("feature phrase `{0}` is not lower-case")]
    PhraseNotLowerCase(String),

    #[error("duplicate feature phrase `{0}`")]
    DuplicatePhrase(String),

    #[error("feature rule `{tag}` has non-positive weight {weight}")]
    NonPositiveWeight { tag: String, weight: i64 },

    #[error("price curve has no bands")]
    EmptyCurve,

    #[error("price curve bands are not strictly increasing at bound {0}")]
    NonIncreasingBand(i64),

    #[error("price curve band scores increase at bound {0}")]
    IncreasingBandScore(i64),

    #[error("price curve must end in exactly one open band with score 0")]
    BadTerminalBand,

    #[error("tier/probability table has no entries")]
    EmptyTable,

    #[error("table thresholds are not strictly descending at {0}")]
    NonDescendingThreshold(i64),

    #[error("table has no catch-all entry at threshold 0")]
    NoCatchAll,
}
