//! Entry-event scanner.
//!
//! Walks the ranked history and emits an immutable EntryEvent for every day
//! whose percentile rank is defined and at/below the threshold. Days with an
//! undefined rank are skipped, never defaulted. An optional momentum filter
//! additionally requires ADX at/above a configured level on the entry day.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, EntryEvent};
use crate::indicators::{Adx, Indicator};

/// Optional entry filter: require a trending regime at entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumFilter {
    pub require_momentum: bool,
    pub adx_period: usize,
    pub adx_threshold: f64,
}

impl Default for MomentumFilter {
    fn default() -> Self {
        Self {
            require_momentum: false,
            adx_period: 14,
            adx_threshold: 20.0,
        }
    }
}

/// Scan for entry events: rank defined and <= threshold, filter satisfied.
pub fn scan_entries(
    ticker: &str,
    bars: &[Bar],
    ranks: &[f64],
    threshold: f64,
    filter: &MomentumFilter,
) -> Vec<EntryEvent> {
    debug_assert_eq!(bars.len(), ranks.len());

    let adx = if filter.require_momentum {
        Some(Adx::new(filter.adx_period).compute(bars))
    } else {
        None
    };

    bars.iter()
        .enumerate()
        .filter(|(i, bar)| {
            let rank = ranks[*i];
            if rank.is_nan() || rank > threshold || bar.is_void() {
                return false;
            }
            match &adx {
                Some(series) => !series[*i].is_nan() && series[*i] >= filter.adx_threshold,
                None => true,
            }
        })
        .map(|(i, bar)| EntryEvent {
            ticker: ticker.to_string(),
            entry_date: bar.date,
            entry_index: i,
            entry_price: bar.close,
            entry_percentile: ranks[i],
            threshold,
        })
        .collect()
}
