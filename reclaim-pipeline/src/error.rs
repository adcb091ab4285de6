//! Engine error taxonomy.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//!
//! Severity is encoded by type: a `NormalizationError` drops one
//! record, a `SourceError` empties one source's contribution, and a
//! `ConfigError` is fatal at startup. Config is loaded once and never
//! revalidated mid-run.

use thiserror::Error;

use reclaim_scoring::ValidationError;

/// A single raw record could not become a canonical `Listing`.
///
/// The record is dropped and counted; the batch continues. An
/// unparsable price is deliberately NOT an error, it normalizes to
/// `price = None`.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` is present but empty")]
    EmptyField(&'static str),
}

/// A whole source failed to contribute. Other sources are unaffected;
/// the report flags the source and carries on.
///
/// The marketplace field is `name`, not `source`: thiserror reserves a
/// field called `source` for a chained `std::error::Error` cause.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source `{name}` timed out after {seconds}s")]
    Timeout { name: String, seconds: u64 },

    #[error("source `{name}` failed to fetch: {reason}")]
    Fetch { name: String, reason: String },
}

/// Invalid engine or per-source configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source `{name}`: {error}")]
    InvalidSource {
        name: String,
        #[source]
        error: ValidationError,
    },

    #[error("feature dictionary: {0}")]
    InvalidDictionary(#[from] ValidationError),

    #[error("duplicate source name `{0}`")]
    DuplicateSource(String),

    #[error("source `{name}`: similarity threshold {value} outside (0, 1]")]
    BadSimilarityThreshold { name: String, value: f64 },

    #[error("source `{0}`: timeout must be non-zero")]
    ZeroTimeout(String),

    #[error("top_k must be non-zero")]
    ZeroTopK,
}
