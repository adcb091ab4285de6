use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use reclaim_scoring::AlertTier;

/// A raw listing record as delivered by a scraping collaborator:
/// an arbitrary key/value map whose schema differs by source.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Canonical listing
// ---------------------------------------------------------------------------

/// One marketplace listing in canonical shape, produced by the
/// normalizer from one raw record. Never mutated after creation;
/// scoring attaches its derived fields on `Candidate` instead.
#[derive(Clone, Debug, Serialize)]
pub struct Listing {
    pub source: String,
    pub title: String,
    /// Whole-currency amount; `None` when the price text was
    /// unparsable, zero, or negative ("price on request" listings).
    pub price: Option<i64>,
    pub raw_price_text: String,
    pub url: String,
    pub seller: Option<String>,
    pub location: Option<String>,
    /// The search term that surfaced this listing.
    pub search_term: String,
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A listing that passed the admission gate, enriched with scores.
///
/// Invariant: `total_score = feature_score + price_score >= 0`;
/// `alert_tier` and `probability_band` are deterministic functions of
/// `total_score` under the source's tables.
#[derive(Clone, Debug, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub listing: Listing,
    pub feature_score: i64,
    pub matched_tags: Vec<String>,
    pub price_score: i64,
    pub price_descriptor: String,
    pub total_score: i64,
    pub alert_tier: AlertTier,
    pub probability_band: String,
}

impl Candidate {
    /// Whether this candidate counts as an alert in summary statistics.
    /// The tier already reflects its own source's thresholds, so no
    /// global score cut is applied across sources.
    pub fn is_alert(&self) -> bool {
        self.alert_tier >= AlertTier::Critical
    }
}

// ---------------------------------------------------------------------------
// Consolidated report
// ---------------------------------------------------------------------------

/// The ranked, deduplicated cross-source view built by the aggregator.
///
/// Built fresh per run; the engine retains nothing across runs. Maps
/// are `BTreeMap` so repeated runs over identical input serialize
/// byte-for-byte identically.
#[derive(Clone, Debug, Serialize)]
pub struct ConsolidatedReport {
    pub generated_at: DateTime<Utc>,
    pub per_source_counts: BTreeMap<String, usize>,
    pub per_source_alert_counts: BTreeMap<String, usize>,
    /// Records dropped during normalization, per source.
    pub per_source_dropped: BTreeMap<String, usize>,
    /// Sources that errored or timed out, with the failure reason.
    /// They appear in the count maps with 0 so degradation is visible.
    pub source_errors: BTreeMap<String, String>,
    /// Global ranking, truncated to the configured K.
    pub top_candidates: Vec<Candidate>,
    pub all_candidates_by_source: BTreeMap<String, Vec<Candidate>>,
}

impl ConsolidatedReport {
    pub fn total_candidates(&self) -> usize {
        self.per_source_counts.values().sum()
    }

    pub fn total_alerts(&self) -> usize {
        self.per_source_alert_counts.values().sum()
    }
}
