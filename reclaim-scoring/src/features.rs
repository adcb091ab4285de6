//! Signal-phrase dictionary and feature matcher.
//!
//! A dictionary is a versioned table of phrases that identify the
//! target item, each with a tier, a weight, and a display tag. Matching
//! is case-insensitive substring containment over the listing text.
//! All matching rules contribute independently and additively; there
//! is no early exit and no mutual exclusion, so a listing can hit a
//! unique phrase and the brand pair at the same time.

use serde::Serialize;

use crate::error::ValidationError;

/// How specific a phrase is to the target item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FeatureTier {
    /// Near-unique to the exact configuration (model code, rare option).
    Unique,
    /// Strongly narrowing (panel refresh rate, GPU, release year).
    Important,
    /// Common but still corroborating (RAM size, port names).
    Secondary,
}

/// One signal phrase with its score contribution.
#[derive(Clone, Debug, Serialize)]
pub struct FeatureRule {
    pub phrase: String,
    pub tier: FeatureTier,
    pub weight: i64,
    pub tag: String,
}

/// A bonus rule that fires only when both phrases are present.
///
/// Used for conditions like "brand AND sub-brand", which individually
/// are too generic to score but together identify the product line.
/// Contributes its weight exactly once.
#[derive(Clone, Debug, Serialize)]
pub struct CompoundRule {
    pub first: String,
    pub second: String,
    pub weight: i64,
    pub tag: String,
}

/// Result of matching a text against a dictionary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureMatch {
    pub score: i64,
    pub tags: Vec<String>,
}

/// A versioned, immutable table of signal phrases.
///
/// Invariants (enforced at construction): phrases are lower-cased,
/// non-empty, and unique within a version; weights are positive.
#[derive(Clone, Debug, Serialize)]
pub struct FeatureDictionary {
    version: String,
    rules: Vec<FeatureRule>,
    compound_rules: Vec<CompoundRule>,
}

impl FeatureDictionary {
    pub fn new(
        version: impl Into<String>,
        rules: Vec<FeatureRule>,
        compound_rules: Vec<CompoundRule>,
    ) -> Result<Self, ValidationError> {
        let mut seen: Vec<&str> = Vec::with_capacity(rules.len());
        for rule in &rules {
            validate_phrase(&rule.phrase)?;
            if rule.weight <= 0 {
                return Err(ValidationError::NonPositiveWeight {
                    tag: rule.tag.clone(),
                    weight: rule.weight,
                });
            }
            if seen.contains(&rule.phrase.as_str()) {
                return Err(ValidationError::DuplicatePhrase(rule.phrase.clone()));
            }
            seen.push(&rule.phrase);
        }
        for rule in &compound_rules {
            validate_phrase(&rule.first)?;
            validate_phrase(&rule.second)?;
            if rule.weight <= 0 {
                return Err(ValidationError::NonPositiveWeight {
                    tag: rule.tag.clone(),
                    weight: rule.weight,
                });
            }
        }
        Ok(Self {
            version: version.into(),
            rules,
            compound_rules,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Score a listing text against every rule in the dictionary.
    ///
    /// The text is lower-cased once; each simple rule contributes its
    /// weight if its phrase is a substring, and each compound rule
    /// contributes once if both of its phrases are substrings. Tags are
    /// collected in dictionary order, so identical text always yields
    /// an identical score and tag sequence.
    pub fn score_text(&self, text: &str) -> FeatureMatch {
        let haystack = text.to_lowercase();
        let mut score = 0;
        let mut tags = Vec::new();

        for rule in &self.rules {
            if haystack.contains(rule.phrase.as_str()) {
                score += rule.weight;
                tags.push(rule.tag.clone());
            }
        }
        for rule in &self.compound_rules {
            if haystack.contains(rule.first.as_str()) && haystack.contains(rule.second.as_str()) {
                score += rule.weight;
                tags.push(rule.tag.clone());
            }
        }

        FeatureMatch { score, tags }
    }

    /// The built-in dictionary for the target laptop: an ASUS ROG
    /// Zephyrus M16 (GU604, 2023) with AniMe Matrix lid and Mini LED
    /// panel. Weights reflect how uniquely each phrase identifies that
    /// exact configuration on a secondhand market.
    pub fn zephyrus_m16() -> Self {
        let unique = |phrase: &str, weight: i64, tag: &str| FeatureRule {
            phrase: phrase.into(),
            tier: FeatureTier::Unique,
            weight,
            tag: tag.into(),
        };
        let important = |phrase: &str, tag: &str| FeatureRule {
            phrase: phrase.into(),
            tier: FeatureTier::Important,
            weight: 8,
            tag: tag.into(),
        };
        let secondary = |phrase: &str, tag: &str| FeatureRule {
            phrase: phrase.into(),
            tier: FeatureTier::Secondary,
            weight: 3,
            tag: tag.into(),
        };

        let rules = vec![
            unique("anime matrix", 15, "AniMe Matrix"),
            unique("gu604", 15, "GU604"),
            unique("mini led", 12, "Mini LED"),
            unique("zephyrus m16", 12, "Zephyrus M16"),
            important("240hz", "240Hz"),
            important("2560x1600", "QHD 2560x1600"),
            important("2023", "2023"),
            important("nebula hdr", "Nebula HDR"),
            important("rtx 4070", "RTX 4070"),
            important("rtx 4080", "RTX 4080"),
            important("ryzen 9", "Ryzen 9"),
            secondary("ddr5", "DDR5"),
            secondary("32gb", "32GB RAM"),
            secondary("1tb ssd", "1TB SSD"),
            secondary("dolby vision", "Dolby Vision"),
            secondary("wifi 6e", "WiFi 6E"),
            secondary("thunderbolt 4", "Thunderbolt 4"),
            secondary("qhd", "QHD"),
            secondary("keystone ii", "Keystone II"),
            secondary("tampa animada", "Animated lid"),
            secondary("rog intelligent cooling", "ROG Intelligent Cooling"),
        ];
        let compound_rules = vec![CompoundRule {
            first: "asus".into(),
            second: "rog".into(),
            weight: 8,
            tag: "ASUS ROG".into(),
        }];

        Self::new("gu604-2023.1", rules, compound_rules)
            .expect("built-in dictionary satisfies its own invariants")
    }
}

fn validate_phrase(phrase: &str) -> Result<(), ValidationError> {
    if phrase.is_empty() {
        return Err(ValidationError::EmptyPhrase);
    }
    if phrase != phrase.to_lowercase() {
        return Err(ValidationError::PhraseNotLowerCase(phrase.to_string()));
    }
    Ok(())
}
