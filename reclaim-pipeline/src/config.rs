//! Engine and per-source configuration.
//!
//! All scoring knobs live here: the shared feature dictionary plus one
//! `SourceConfig` per marketplace carrying its price curve, admission
//! thresholds, tier and probability tables, dedup similarity threshold
//! and fetch timeout. Everything is validated at construction and
//! immutable for the duration of a run.

use std::collections::BTreeMap;

use reclaim_scoring::{
    AlertTier, FeatureDictionary, PriceBand, PriceCurve, ProbabilityTable, TierTable,
    ValidationError,
};

use crate::error::ConfigError;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Scoring rules for one marketplace.
///
/// Curves and tables are deliberately NOT shared across sources: each
/// marketplace has its own second-hand price floor, so "suspiciously
/// cheap" is a per-source judgement.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub name: String,
    pub price_curve: PriceCurve,
    pub min_feature_score: i64,
    pub min_price_score: i64,
    pub tier_table: TierTable,
    pub probability_table: ProbabilityTable,
    /// Token-overlap ratio at or above which two same-seller titles
    /// are considered the same listing. Must be in (0, 1].
    pub similarity_threshold: f64,
    pub timeout_seconds: u64,
}

impl SourceConfig {
    pub fn new(
        name: impl Into<String>,
        price_curve: PriceCurve,
        min_feature_score: i64,
        min_price_score: i64,
        tier_table: TierTable,
        probability_table: ProbabilityTable,
    ) -> Self {
        Self {
            name: name.into(),
            price_curve,
            min_feature_score,
            min_price_score,
            tier_table,
            probability_table,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn with_similarity_threshold(mut self, value: f64) -> Result<Self, ConfigError> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigError::BadSimilarityThreshold {
                name: self.name,
                value,
            });
        }
        self.similarity_threshold = value;
        Ok(self)
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Result<Self, ConfigError> {
        if seconds == 0 {
            return Err(ConfigError::ZeroTimeout(self.name));
        }
        self.timeout_seconds = seconds;
        Ok(self)
    }
}

/// Top-level engine configuration: the dictionary, the source set, and
/// how many candidates the global ranking keeps.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub dictionary: FeatureDictionary,
    sources: BTreeMap<String, SourceConfig>,
    pub top_k: usize,
}

impl EngineConfig {
    pub fn new(
        dictionary: FeatureDictionary,
        sources: Vec<SourceConfig>,
        top_k: usize,
    ) -> Result<Self, ConfigError> {
        if top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        let mut by_name = BTreeMap::new();
        for source in sources {
            if by_name.contains_key(&source.name) {
                return Err(ConfigError::DuplicateSource(source.name));
            }
            by_name.insert(source.name.clone(), source);
        }
        Ok(Self {
            dictionary,
            sources: by_name,
            top_k,
        })
    }

    /// The stock setup: built-in dictionary, every marketplace preset,
    /// top-10 ranking.
    pub fn with_presets() -> Result<Self, ConfigError> {
        Self::new(
            FeatureDictionary::zephyrus_m16(),
            presets::all()?,
            DEFAULT_TOP_K,
        )
    }

    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.get(name)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.values()
    }
}

/// Built-in per-marketplace calibrations.
///
/// The curves and gates differ on purpose: Enjoei trades mostly-used
/// goods so its price floor sits far below eBay's import listings, and
/// Mercado Livre's API delivers structured prices so its gate leans on
/// the feature score. Treat these as starting points, not truths.
pub mod presets {
    use super::*;

    fn curve(source: &str, bands: Vec<PriceBand>) -> Result<PriceCurve, ConfigError> {
        PriceCurve::new(bands).map_err(|error| invalid(source, error))
    }

    fn tiers(source: &str, steps: Vec<(i64, AlertTier)>) -> Result<TierTable, ConfigError> {
        TierTable::new(steps).map_err(|error| invalid(source, error))
    }

    fn invalid(source: &str, error: ValidationError) -> ConfigError {
        ConfigError::InvalidSource {
            name: source.to_string(),
            error,
        }
    }

    /// Probability bands are calibrated per source, down to the band
    /// labels: a hit on eBay tops out at "90%+" because cross-border
    /// relisting of a Brazilian theft is rarer than a local flip.
    fn probability(source: &str, steps: Vec<(i64, &str)>) -> Result<ProbabilityTable, ConfigError> {
        let steps = steps
            .into_iter()
            .map(|(threshold, band)| (threshold, band.to_string()))
            .collect();
        ProbabilityTable::new(steps).map_err(|error| invalid(source, error))
    }

    pub fn mercado_livre() -> Result<SourceConfig, ConfigError> {
        let name = "mercadolivre";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(3000, "EXTREMELY_SUSPICIOUS", 10),
                    PriceBand::bounded(5000, "VERY_SUSPICIOUS", 8),
                    PriceBand::bounded(8000, "SUSPICIOUS", 5),
                    PriceBand::bounded(12000, "LOW_PRICE", 3),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            15,
            5,
            tiers(
                name,
                vec![
                    (40, AlertTier::Maximum),
                    (30, AlertTier::High),
                    (20, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            // No probability calibration of its own; runs on the OLX bands.
            probability(
                name,
                vec![
                    (55, "95%+"),
                    (45, "85-95%"),
                    (35, "70-85%"),
                    (25, "50-70%"),
                    (0, "< 50%"),
                ],
            )?,
        ))
    }

    pub fn olx() -> Result<SourceConfig, ConfigError> {
        let name = "olx";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(1500, "EXTREMELY_SUSPICIOUS", 15),
                    PriceBand::bounded(3000, "VERY_SUSPICIOUS", 12),
                    PriceBand::bounded(5500, "SUSPICIOUS", 8),
                    PriceBand::bounded(8000, "LOW_PRICE", 5),
                    PriceBand::bounded(12000, "SLIGHTLY_LOW", 2),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            10,
            8,
            tiers(
                name,
                vec![
                    (50, AlertTier::Maximum),
                    (40, AlertTier::Critical),
                    (30, AlertTier::High),
                    (20, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (55, "95%+"),
                    (45, "85-95%"),
                    (35, "70-85%"),
                    (25, "50-70%"),
                    (0, "< 50%"),
                ],
            )?,
        ))
    }

    pub fn enjoei() -> Result<SourceConfig, ConfigError> {
        let name = "enjoei";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(1000, "EXTREMELY_SUSPICIOUS", 15),
                    PriceBand::bounded(2500, "VERY_SUSPICIOUS", 12),
                    PriceBand::bounded(4500, "SUSPICIOUS", 8),
                    PriceBand::bounded(7000, "LOW_PRICE", 5),
                    PriceBand::bounded(9000, "SLIGHTLY_LOW", 2),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            10,
            8,
            tiers(
                name,
                vec![
                    (50, AlertTier::Maximum),
                    (40, AlertTier::Critical),
                    (30, AlertTier::High),
                    (20, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (55, "98%+"),
                    (45, "90-98%"),
                    (35, "75-90%"),
                    (25, "50-75%"),
                    (0, "< 50%"),
                ],
            )?,
        ))
    }

    pub fn ebay() -> Result<SourceConfig, ConfigError> {
        let name = "ebay";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(3000, "EXTREMELY_SUSPICIOUS", 15),
                    PriceBand::bounded(5000, "VERY_SUSPICIOUS", 12),
                    PriceBand::bounded(8000, "SUSPICIOUS", 8),
                    PriceBand::bounded(12000, "LOW_PRICE", 4),
                    PriceBand::bounded(20000, "SLIGHTLY_LOW", 2),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            10,
            8,
            tiers(
                name,
                vec![
                    (45, AlertTier::Maximum),
                    (35, AlertTier::High),
                    (25, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (50, "90%+"),
                    (40, "75-90%"),
                    (30, "50-75%"),
                    (20, "25-50%"),
                    (0, "< 25%"),
                ],
            )?,
        ))
    }

    pub fn magalu() -> Result<SourceConfig, ConfigError> {
        let name = "magalu";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(2000, "EXTREMELY_SUSPICIOUS", 12),
                    PriceBand::bounded(4000, "VERY_SUSPICIOUS", 10),
                    PriceBand::bounded(7000, "SUSPICIOUS", 7),
                    PriceBand::bounded(10000, "LOW_PRICE", 3),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            12,
            7,
            tiers(
                name,
                vec![
                    (45, AlertTier::Maximum),
                    (35, AlertTier::High),
                    (25, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (50, "95%+"),
                    (40, "80-95%"),
                    (30, "60-80%"),
                    (20, "40-60%"),
                    (0, "< 40%"),
                ],
            )?,
        ))
    }

    pub fn americanas() -> Result<SourceConfig, ConfigError> {
        let name = "americanas";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(2000, "EXTREMELY_SUSPICIOUS", 12),
                    PriceBand::bounded(4000, "VERY_SUSPICIOUS", 10),
                    PriceBand::bounded(7000, "SUSPICIOUS", 7),
                    PriceBand::bounded(10000, "LOW_PRICE", 4),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            12,
            7,
            tiers(
                name,
                vec![
                    (45, AlertTier::Maximum),
                    (35, AlertTier::High),
                    (25, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (50, "95%+"),
                    (40, "80-95%"),
                    (30, "60-80%"),
                    (20, "40-60%"),
                    (0, "< 40%"),
                ],
            )?,
        ))
    }

    pub fn shopee() -> Result<SourceConfig, ConfigError> {
        let name = "shopee";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(1500, "EXTREMELY_SUSPICIOUS", 12),
                    PriceBand::bounded(3500, "VERY_SUSPICIOUS", 10),
                    PriceBand::bounded(6500, "SUSPICIOUS", 7),
                    PriceBand::bounded(9000, "LOW_PRICE", 4),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            12,
            7,
            tiers(
                name,
                vec![
                    (45, AlertTier::Maximum),
                    (35, AlertTier::High),
                    (25, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (50, "95%+"),
                    (40, "80-95%"),
                    (30, "60-80%"),
                    (20, "40-60%"),
                    (0, "< 40%"),
                ],
            )?,
        ))
    }

    pub fn ponto_frio() -> Result<SourceConfig, ConfigError> {
        let name = "pontofrio";
        Ok(SourceConfig::new(
            name,
            curve(
                name,
                vec![
                    PriceBand::bounded(2000, "EXTREMELY_SUSPICIOUS", 12),
                    PriceBand::bounded(4000, "VERY_SUSPICIOUS", 10),
                    PriceBand::bounded(7000, "SUSPICIOUS", 7),
                    PriceBand::bounded(10000, "LOW_PRICE", 4),
                    PriceBand::open("NORMAL_PRICE"),
                ],
            )?,
            12,
            7,
            tiers(
                name,
                vec![
                    (45, AlertTier::Maximum),
                    (35, AlertTier::High),
                    (25, AlertTier::Medium),
                    (0, AlertTier::Monitor),
                ],
            )?,
            probability(
                name,
                vec![
                    (50, "95%+"),
                    (40, "80-95%"),
                    (30, "60-80%"),
                    (20, "40-60%"),
                    (0, "< 40%"),
                ],
            )?,
        ))
    }

    pub fn all() -> Result<Vec<SourceConfig>, ConfigError> {
        Ok(vec![
            mercado_livre()?,
            olx()?,
            enjoei()?,
            ebay()?,
            magalu()?,
            americanas()?,
            shopee()?,
            ponto_frio()?,
        ])
    }
}
