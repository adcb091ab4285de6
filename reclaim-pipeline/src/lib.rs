//! Candidate scoring and aggregation engine.
//!
//! Takes heterogeneous raw listing records from N marketplace sources,
//! normalizes them into one canonical `Listing` shape, scores each for
//! feature match and price suspicion, classifies an alert tier,
//! deduplicates across search terms and sellers, and merges everything
//! into one ranked `ConsolidatedReport`.
//!
//! Pipeline flow per source:
//!
//! 1. `RecordSource` supplies already-fetched raw record batches
//! 2. `normalizer` produces canonical `Listing`s (bad records dropped)
//! 3. feature + price scoring (`reclaim-scoring`)
//! 4. `classifier` admits and tiers candidates
//! 5. `dedup` collapses re-surfaced listings
//!
//! Sources run as independent workers and fan in only at the
//! `aggregator`; a failed or timed-out source contributes an empty,
//! flagged set and never blocks the others. The engine does no I/O of
//! its own: fetching belongs to the scraping collaborators,
//! persistence to whoever consumes the report.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod normalizer;
pub mod source;
pub mod types;

pub use aggregator::SourceOutcome;
pub use config::{EngineConfig, SourceConfig};
pub use engine::Engine;
pub use error::{ConfigError, NormalizationError, SourceError};
pub use source::{RecordBatch, RecordSource, StaticSource};
pub use types::{Candidate, ConsolidatedReport, Listing, RawRecord};
