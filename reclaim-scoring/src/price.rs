//! Price suspicion curves.
//!
//! Each marketplace calibrates "suspiciously cheap" differently: a
//! used-goods site expects lower asking prices than an import
//! marketplace, so the same absolute price maps to different scores
//! per source. A curve is an ordered list of bands with exclusive
//! upper bounds, evaluated first-match; the terminal band is open and
//! scores 0, so a very high price is never penalized.

use serde::Serialize;

use crate::error::ValidationError;

/// Descriptor returned when a listing has no parseable price.
pub const UNKNOWN_DESCRIPTOR: &str = "unknown";

/// One curve band. `upper` is an exclusive bound; `None` means open.
#[derive(Clone, Debug, Serialize)]
pub struct PriceBand {
    pub upper: Option<i64>,
    pub descriptor: String,
    pub score: i64,
}

impl PriceBand {
    pub fn bounded(upper: i64, descriptor: &str, score: i64) -> Self {
        Self {
            upper: Some(upper),
            descriptor: descriptor.into(),
            score,
        }
    }

    pub fn open(descriptor: &str) -> Self {
        Self {
            upper: None,
            descriptor: descriptor.into(),
            score: 0,
        }
    }
}

/// What the curve said about one price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceVerdict {
    pub descriptor: String,
    pub score: i64,
}

/// An ordered sequence of price bands for one source.
///
/// Invariants (enforced at construction): bounds strictly increasing,
/// scores non-increasing, exactly one terminal open band with score 0.
#[derive(Clone, Debug, Serialize)]
pub struct PriceCurve {
    bands: Vec<PriceBand>,
}

impl PriceCurve {
    pub fn new(bands: Vec<PriceBand>) -> Result<Self, ValidationError> {
        let Some((last, bounded)) = bands.split_last() else {
            return Err(ValidationError::EmptyCurve);
        };
        if last.upper.is_some() || last.score != 0 {
            return Err(ValidationError::BadTerminalBand);
        }
        let mut prev_upper: Option<i64> = None;
        let mut prev_score: Option<i64> = None;
        for band in bounded {
            let Some(upper) = band.upper else {
                // An open band anywhere but last would shadow later bands.
                return Err(ValidationError::BadTerminalBand);
            };
            if prev_upper.is_some_and(|p| upper <= p) {
                return Err(ValidationError::NonIncreasingBand(upper));
            }
            if prev_score.is_some_and(|p| band.score > p) {
                return Err(ValidationError::IncreasingBandScore(upper));
            }
            prev_upper = Some(upper);
            prev_score = Some(band.score);
        }
        Ok(Self { bands })
    }

    /// Map a price to its suspicion descriptor and score.
    ///
    /// An unparsed price is `("unknown", 0)`: a missing price disables
    /// the price signal, it never aborts the listing. Bounds are
    /// exclusive, so a price exactly equal to a boundary falls into
    /// the next (less suspicious) band.
    pub fn evaluate(&self, price: Option<i64>) -> PriceVerdict {
        let Some(price) = price else {
            return PriceVerdict {
                descriptor: UNKNOWN_DESCRIPTOR.into(),
                score: 0,
            };
        };
        for band in &self.bands {
            let matched = match band.upper {
                Some(upper) => price < upper,
                None => true,
            };
            if matched {
                return PriceVerdict {
                    descriptor: band.descriptor.clone(),
                    score: band.score,
                };
            }
        }
        // Unreachable: construction guarantees a terminal open band.
        PriceVerdict {
            descriptor: UNKNOWN_DESCRIPTOR.into(),
            score: 0,
        }
    }
}
