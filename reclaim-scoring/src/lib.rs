//! Scoring primitives for stolen-item listing detection.
//!
//! Everything in this crate is pure and deterministic: the same input
//! always yields the same score and tag set, so every decision the
//! engine makes can be reproduced exactly in tests.
//!
//! - `features`: the versioned signal-phrase dictionary and matcher
//! - `price`: per-source price suspicion curves
//! - `tiers`: alert tier and match-probability tables
//! - `similarity`: title similarity used for cross-term deduplication
//!
//! Calibration lives in data (curves, tables, dictionaries), never in
//! code, so marketplaces with different price floors or sensitivity
//! get different configs rather than copied logic.

pub mod error;
pub mod features;
pub mod price;
pub mod similarity;
pub mod tiers;

pub use error::ValidationError;
pub use features::{CompoundRule, FeatureDictionary, FeatureMatch, FeatureRule, FeatureTier};
pub use price::{PriceBand, PriceCurve, PriceVerdict};
pub use similarity::token_overlap;
pub use tiers::{AlertTier, ProbabilityTable, TierTable};
