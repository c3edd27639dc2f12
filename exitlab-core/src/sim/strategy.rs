//! Exit strategy variants and the expectancy lookup table.
//!
//! The five variants share one simulation loop; a strategy only supplies the
//! exit decision for each day. Serialized with tagged variants so strategy
//! sets round-trip through configs and reports.

use serde::{Deserialize, Serialize};

/// Exit strategy variant for the common simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitStrategy {
    /// Exit only at the horizon.
    BuyAndHold,
    /// Exit exactly at day N (or the horizon if N exceeds it).
    FixedDays { days: usize },
    /// Trailing stop at highest-close-since-entry minus multiplier × ATR.
    TrailingStopAtr { atr_period: usize, multiplier: f64 },
    /// Exit on the exposure policy's exit_all day.
    AdaptivePressure,
    /// Exit the first day forward expectancy given percentile turns non-positive.
    ConditionalExpectancy,
}

impl ExitStrategy {
    /// Stable identifier used as the report map key.
    pub fn name(&self) -> String {
        match self {
            ExitStrategy::BuyAndHold => "buy_and_hold".to_string(),
            ExitStrategy::FixedDays { days } => format!("fixed_days_{days}"),
            ExitStrategy::TrailingStopAtr { .. } => "trailing_stop_atr".to_string(),
            ExitStrategy::AdaptivePressure => "adaptive_exit_pressure".to_string(),
            ExitStrategy::ConditionalExpectancy => "conditional_expectancy".to_string(),
        }
    }

    /// The standard comparison set.
    pub fn default_set(fixed_days: usize) -> Vec<ExitStrategy> {
        vec![
            ExitStrategy::BuyAndHold,
            ExitStrategy::FixedDays { days: fixed_days },
            ExitStrategy::TrailingStopAtr {
                atr_period: 14,
                multiplier: 2.0,
            },
            ExitStrategy::AdaptivePressure,
            ExitStrategy::ConditionalExpectancy,
        ]
    }
}

/// Percentile-bin → expected forward return (%) lookup.
///
/// Built by the historical mapper over the entry-event population at a fixed
/// horizon. Bins are checked in order; the catch-all bin, if any, goes last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectancyTable {
    bins: Vec<ExpectancyBin>,
    pub horizon: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectancyBin {
    pub low: f64,
    pub high: f64,
    pub expected_return: f64,
}

impl ExpectancyTable {
    pub fn new(bins: Vec<ExpectancyBin>, horizon: usize) -> Self {
        Self { bins, horizon }
    }

    /// Expected forward return for a percentile rank; None when no bin
    /// matches or the rank is undefined.
    pub fn lookup(&self, rank: f64) -> Option<f64> {
        if rank.is_nan() {
            return None;
        }
        self.bins
            .iter()
            .find(|b| rank >= b.low && rank < b.high)
            .map(|b| b.expected_return)
            .filter(|r| !r.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_are_stable() {
        assert_eq!(ExitStrategy::BuyAndHold.name(), "buy_and_hold");
        assert_eq!(ExitStrategy::FixedDays { days: 7 }.name(), "fixed_days_7");
        assert_eq!(
            ExitStrategy::TrailingStopAtr {
                atr_period: 14,
                multiplier: 2.0
            }
            .name(),
            "trailing_stop_atr"
        );
    }

    #[test]
    fn strategy_serde_tagged() {
        let s = ExitStrategy::FixedDays { days: 10 };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"FIXED_DAYS\""));
        let back: ExitStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn expectancy_lookup_in_order() {
        let table = ExpectancyTable::new(
            vec![
                ExpectancyBin {
                    low: 0.0,
                    high: 20.0,
                    expected_return: 2.5,
                },
                ExpectancyBin {
                    low: 0.0,
                    high: 100.0,
                    expected_return: -0.5,
                },
            ],
            7,
        );
        assert_eq!(table.lookup(10.0), Some(2.5));
        assert_eq!(table.lookup(50.0), Some(-0.5));
        assert_eq!(table.lookup(f64::NAN), None);
    }

    #[test]
    fn expectancy_nan_bin_is_none() {
        let table = ExpectancyTable::new(
            vec![ExpectancyBin {
                low: 0.0,
                high: 100.0,
                expected_return: f64::NAN,
            }],
            7,
        );
        assert_eq!(table.lookup(50.0), None);
    }
}
