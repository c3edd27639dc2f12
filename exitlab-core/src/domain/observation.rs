//! Percentile zones and per-day percentile observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Interpretive zone for a percentile rank.
///
/// Fixed ordered threshold table; boundaries are inclusive on the lower edge
/// of the next zone (a rank of exactly 5.0 is `Low`, exactly 95.0 is
/// `ExtremeHigh`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    ExtremeLow,
    Low,
    Pullback,
    Normal,
    High,
    VeryHigh,
    ExtremeHigh,
}

impl Zone {
    /// Classify a percentile rank (0–100) into its zone.
    pub fn classify(rank: f64) -> Zone {
        if rank < 5.0 {
            Zone::ExtremeLow
        } else if rank < 15.0 {
            Zone::Low
        } else if rank < 25.0 {
            Zone::Pullback
        } else if rank < 75.0 {
            Zone::Normal
        } else if rank < 85.0 {
            Zone::High
        } else if rank < 95.0 {
            Zone::VeryHigh
        } else {
            Zone::ExtremeHigh
        }
    }

    /// All zones in threshold order.
    pub fn all() -> [Zone; 7] {
        [
            Zone::ExtremeLow,
            Zone::Low,
            Zone::Pullback,
            Zone::Normal,
            Zone::High,
            Zone::VeryHigh,
            Zone::ExtremeHigh,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::ExtremeLow => "extreme_low",
            Zone::Low => "low",
            Zone::Pullback => "pullback",
            Zone::Normal => "normal",
            Zone::High => "high",
            Zone::VeryHigh => "very_high",
            Zone::ExtremeHigh => "extreme_high",
        }
    }
}

/// Percentile observation for one date.
///
/// Only produced for dates where the rolling window is fully populated;
/// dates without enough history get no observation at all, never a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentileObservation {
    pub date: NaiveDate,
    pub raw_value: f64,
    pub percentile_rank: f64,
    pub zone: Zone,
}
