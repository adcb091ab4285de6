//! Title similarity for deduplication.
//!
//! The same physical listing is re-surfaced by multiple search terms
//! and, on regional marketplaces, by multiple region endpoints, often
//! with trivially edited titles. A normalized token-overlap ratio is
//! enough to catch those; the exact metric is not load-bearing, only
//! the threshold applied by the deduplicator.

use std::collections::BTreeSet;

/// Jaccard overlap of the normalized token sets of two titles.
///
/// Tokens are lower-cased maximal runs of alphanumeric characters, so
/// punctuation and spacing differences do not affect the ratio.
/// Returns a value in `[0, 1]`; two empty titles compare as identical.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
