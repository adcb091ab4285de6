//! Record sources.
//!
//! A `RecordSource` hands the engine the raw batches a scraping
//! collaborator already collected. The engine never fetches anything
//! itself; a source that wraps live HTTP belongs to the caller's crate
//! and only has to implement this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::RawRecord;

/// One sweep's worth of raw records for a single search term.
#[derive(Clone, Debug)]
pub struct RecordBatch {
    pub search_term: String,
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<RawRecord>,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Stable marketplace name. Must match a configured source; the
    /// engine keys per-source scoring rules on it.
    fn name(&self) -> &str;

    /// Decide if this source should run for the current sweep.
    fn enabled(&self) -> bool {
        true
    }

    /// Deliver the raw record batches for this sweep.
    async fn fetch(&self) -> Result<Vec<RecordBatch>, SourceError>;
}

/// A source backed by in-memory batches. Used for replaying captured
/// sweeps and throughout the test suite.
#[derive(Clone, Debug)]
pub struct StaticSource {
    name: String,
    batches: Vec<RecordBatch>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, batches: Vec<RecordBatch>) -> Self {
        Self {
            name: name.into(),
            batches,
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RecordBatch>, SourceError> {
        Ok(self.batches.clone())
    }
}
