//! Domain types: bars, indicator series, percentile observations, entry events.

pub mod bar;
pub mod event;
pub mod observation;

pub use bar::Bar;
pub use event::EntryEvent;
pub use observation::{PercentileObservation, Zone};

use serde::{Deserialize, Serialize};

/// Momentum indicator series aligned 1:1 with a bar slice by index.
///
/// `rsi` is the primary daily oscillator; `rsi_ma` is its smoothed companion.
/// Warmup prefixes are NaN, matching the indicator convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub rsi: Vec<f64>,
    pub rsi_ma: Vec<f64>,
}

impl IndicatorSeries {
    /// Build the series from bars: Wilder RSI plus an SMA smoothing of it.
    pub fn from_bars(bars: &[Bar], rsi_period: usize, ma_period: usize) -> Self {
        use crate::indicators::{sma, Indicator, Rsi};

        let rsi = Rsi::new(rsi_period).compute(bars);
        let rsi_ma = sma(&rsi, ma_period);
        Self { rsi, rsi_ma }
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Select the ranking target series.
    pub fn target(&self, target: RankTarget) -> &[f64] {
        match target {
            RankTarget::Rsi => &self.rsi,
            RankTarget::RsiMa => &self.rsi_ma,
        }
    }
}

/// Which indicator field the percentile ranker operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankTarget {
    Rsi,
    RsiMa,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn from_bars_aligns_and_warms_up() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let bars = make_bars(&closes);
        let series = IndicatorSeries::from_bars(&bars, 5, 3);
        assert_eq!(series.len(), bars.len());
        assert!(series.rsi[4].is_nan());
        assert!(!series.rsi[5].is_nan());
        // The MA needs 3 defined RSI values: first at index 7.
        assert!(series.rsi_ma[6].is_nan());
        assert!(!series.rsi_ma[7].is_nan());
    }

    #[test]
    fn target_selects_series() {
        let series = IndicatorSeries {
            rsi: vec![1.0],
            rsi_ma: vec![2.0],
        };
        assert_eq!(series.target(RankTarget::Rsi)[0], 1.0);
        assert_eq!(series.target(RankTarget::RsiMa)[0], 2.0);
    }
}
