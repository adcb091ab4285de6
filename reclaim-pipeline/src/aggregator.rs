//! Cross-source aggregation and ranking.
//!
//! Fan-in point of the pipeline: one `SourceOutcome` per configured
//! source, merged into a single `ConsolidatedReport`. Ranking is a
//! stable sort on total score descending, so equal-scoring candidates
//! keep their arrival order (sources in configured order, listings in
//! sweep order within a source) and repeated runs over the same input
//! produce identical reports.

use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::{Candidate, ConsolidatedReport};

/// Everything one source worker produced, failed or not.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub candidates: Vec<Candidate>,
    /// Raw records dropped during normalization.
    pub dropped: usize,
    pub error: Option<SourceError>,
}

impl SourceOutcome {
    /// A failed source still appears in the report, with zero
    /// candidates and the failure reason attached.
    pub fn failed(source: impl Into<String>, error: SourceError) -> Self {
        Self {
            source: source.into(),
            candidates: Vec::new(),
            dropped: 0,
            error: Some(error),
        }
    }
}

/// Merge per-source outcomes into the final report.
pub fn aggregate(
    outcomes: Vec<SourceOutcome>,
    top_k: usize,
    generated_at: DateTime<Utc>,
) -> ConsolidatedReport {
    let mut report = ConsolidatedReport {
        generated_at,
        per_source_counts: Default::default(),
        per_source_alert_counts: Default::default(),
        per_source_dropped: Default::default(),
        source_errors: Default::default(),
        top_candidates: Vec::new(),
        all_candidates_by_source: Default::default(),
    };

    let mut pool: Vec<Candidate> = Vec::new();
    for outcome in outcomes {
        let alerts = outcome.candidates.iter().filter(|c| c.is_alert()).count();
        report
            .per_source_counts
            .insert(outcome.source.clone(), outcome.candidates.len());
        report
            .per_source_alert_counts
            .insert(outcome.source.clone(), alerts);
        report
            .per_source_dropped
            .insert(outcome.source.clone(), outcome.dropped);
        if let Some(error) = outcome.error {
            report
                .source_errors
                .insert(outcome.source.clone(), error.to_string());
        }

        pool.extend(outcome.candidates.iter().cloned());

        let mut per_source = outcome.candidates;
        rank(&mut per_source);
        report
            .all_candidates_by_source
            .insert(outcome.source, per_source);
    }

    rank(&mut pool);
    pool.truncate(top_k);
    report.top_candidates = pool;
    report
}

/// Stable: ties keep arrival order.
fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.total_score.cmp(&a.total_score));
}
