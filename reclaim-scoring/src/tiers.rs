//! Alert tiers and match-probability bands.
//!
//! Both are pure functions of the total score, resolved against a
//! descending threshold table: the first threshold the score meets or
//! exceeds wins, so ties favor the higher tier. Tables are total (a
//! catch-all entry at threshold 0), so classification never fails for
//! a non-negative score.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// How urgently a candidate should be reviewed.
///
/// Ordered: `Monitor < Medium < High < Critical < Maximum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AlertTier {
    Monitor,
    Medium,
    High,
    Critical,
    Maximum,
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTier::Monitor => write!(f, "Monitor"),
            AlertTier::Medium => write!(f, "Medium"),
            AlertTier::High => write!(f, "High"),
            AlertTier::Critical => write!(f, "Critical"),
            AlertTier::Maximum => write!(f, "Maximum"),
        }
    }
}

/// Descending `(threshold, tier)` table for one source.
#[derive(Clone, Debug, Serialize)]
pub struct TierTable {
    steps: Vec<(i64, AlertTier)>,
}

impl TierTable {
    pub fn new(steps: Vec<(i64, AlertTier)>) -> Result<Self, ValidationError> {
        validate_steps(steps.iter().map(|(t, _)| *t))?;
        Ok(Self { steps })
    }

    /// First threshold the score meets or exceeds wins.
    pub fn assign(&self, total_score: i64) -> AlertTier {
        self.steps
            .iter()
            .find(|(threshold, _)| total_score >= *threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(AlertTier::Monitor)
    }
}

/// Descending `(threshold, band label)` table for one source.
#[derive(Clone, Debug, Serialize)]
pub struct ProbabilityTable {
    steps: Vec<(i64, String)>,
}

impl ProbabilityTable {
    pub fn new(steps: Vec<(i64, String)>) -> Result<Self, ValidationError> {
        validate_steps(steps.iter().map(|(t, _)| *t))?;
        Ok(Self { steps })
    }

    pub fn assign(&self, total_score: i64) -> &str {
        self.steps
            .iter()
            .find(|(threshold, _)| total_score >= *threshold)
            .map(|(_, band)| band.as_str())
            .unwrap_or("")
    }
}

fn validate_steps(thresholds: impl Iterator<Item = i64>) -> Result<(), ValidationError> {
    let mut prev: Option<i64> = None;
    let mut last = None;
    let mut any = false;
    for threshold in thresholds {
        any = true;
        if prev.is_some_and(|p| threshold >= p) {
            return Err(ValidationError::NonDescendingThreshold(threshold));
        }
        prev = Some(threshold);
        last = Some(threshold);
    }
    if !any {
        return Err(ValidationError::EmptyTable);
    }
    if last != Some(0) {
        return Err(ValidationError::NoCatchAll);
    }
    Ok(())
}
