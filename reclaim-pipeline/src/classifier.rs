//! Candidate classification.
//!
//! Combines the feature and price signals for one listing, applies the
//! source's admission gate, and stamps the surviving listing with its
//! alert tier and probability band. The gate is an OR: a listing gets
//! through on strong feature evidence alone (covers "price on request"
//! listings) or on a suspicious price alone (covers stripped-down
//! titles that a fence rewrote).

use reclaim_scoring::FeatureDictionary;

use crate::config::SourceConfig;
use crate::normalizer::Normalized;
use crate::types::Candidate;

/// Score one normalized listing and decide whether it is a candidate.
///
/// `None` means the listing fell below both admission thresholds.
/// Deterministic: same listing, dictionary, and config always yield
/// the same verdict.
pub fn classify(
    normalized: &Normalized,
    dictionary: &FeatureDictionary,
    config: &SourceConfig,
) -> Option<Candidate> {
    let features = dictionary.score_text(&normalized.scoring_text());
    let verdict = config.price_curve.evaluate(normalized.listing.price);

    if features.score < config.min_feature_score && verdict.score < config.min_price_score {
        return None;
    }

    let total_score = features.score + verdict.score;
    Some(Candidate {
        listing: normalized.listing.clone(),
        feature_score: features.score,
        matched_tags: features.tags,
        price_score: verdict.score,
        price_descriptor: verdict.descriptor,
        total_score,
        alert_tier: config.tier_table.assign(total_score),
        probability_band: config.probability_table.assign(total_score).to_string(),
    })
}
