//! Candidate deduplication.
//!
//! Overlapping search terms surface the same listing several times per
//! sweep, and sellers relist with lightly edited titles. Two candidates
//! are the same listing only within one marketplace: same source and
//! url, or same source and seller with the titles' token overlap at or
//! above the similarity threshold. The first-seen candidate survives;
//! duplicates only contribute their matched tags.
//!
//! Quadratic over the kept set. Per-source sweeps are a few hundred
//! listings at most, so no index is warranted.

use reclaim_scoring::token_overlap;

use crate::types::Candidate;

pub struct Deduplicator {
    similarity_threshold: f64,
}

impl Deduplicator {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// Collapse duplicates in encounter order.
    pub fn collapse(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
        'next: for candidate in candidates {
            for existing in kept.iter_mut() {
                if self.same_listing(existing, &candidate) {
                    merge_tags(&mut existing.matched_tags, &candidate.matched_tags);
                    continue 'next;
                }
            }
            kept.push(candidate);
        }
        kept
    }

    fn same_listing(&self, a: &Candidate, b: &Candidate) -> bool {
        // Identity never crosses marketplaces: the same url or seller
        // string on two sources is two distinct listings.
        if a.listing.source != b.listing.source {
            return false;
        }
        if a.listing.url == b.listing.url {
            return true;
        }
        // Seller equality is literal string equality; listings with no
        // seller never collapse on similarity alone.
        match (&a.listing.seller, &b.listing.seller) {
            (Some(x), Some(y)) if x == y => {
                token_overlap(&a.listing.title, &b.listing.title) >= self.similarity_threshold
            }
            _ => false,
        }
    }
}

/// Union `extra` into `tags`, keeping first-seen order.
fn merge_tags(tags: &mut Vec<String>, extra: &[String]) {
    for tag in extra {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.clone());
        }
    }
}
