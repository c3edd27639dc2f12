//! Historical mapper — percentile → forward-return statistics.
//!
//! Bins the entry-event population by fixed percentile ranges and by zone,
//! classifies all ranked days into discrete signal categories, and tabulates
//! sample count, mean forward return, and win rate per bin × horizon. Also
//! produces the finer bin-by-day performance matrix and the expectancy table
//! consumed by the conditional-expectancy exit strategy.
//!
//! Empty bins report count = 0 with NaN statistics — no data is reported as
//! no data, never as a false-neutral zero.

use serde::{Deserialize, Serialize};

use exitlab_core::domain::{Bar, EntryEvent, Zone};
use exitlab_core::sim::{ExpectancyBin, ExpectancyTable};

use crate::comparator::Confidence;
use crate::stats::{mean, quantile};

/// Forward-return horizons (trading days).
pub const HORIZONS: [usize; 4] = [3, 7, 14, 21];

/// Days covered by the bin-by-day matrix.
pub const MATRIX_DAYS: usize = 21;

/// Fixed percentile ranges; the catch-all bin goes last.
pub const PERCENTILE_BINS: [(f64, f64, &str); 5] = [
    (0.0, 20.0, "0-20"),
    (20.0, 35.0, "20-35"),
    (30.0, 45.0, "30-45"),
    (65.0, 100.0, "65-100"),
    (0.0, 100.0, "all"),
];

/// Signal categories over ranked days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalCategory {
    PullbackEntry,
    StrongMomentumEntry,
    ExitSignal,
}

impl SignalCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SignalCategory::PullbackEntry => "pullback_entry",
            SignalCategory::StrongMomentumEntry => "strong_momentum_entry",
            SignalCategory::ExitSignal => "exit_signal",
        }
    }

    pub fn matches(&self, rank: f64) -> bool {
        if rank.is_nan() {
            return false;
        }
        match self {
            SignalCategory::PullbackEntry => rank <= 25.0,
            SignalCategory::StrongMomentumEntry => rank >= 75.0,
            SignalCategory::ExitSignal => rank >= 95.0,
        }
    }

    pub fn all() -> [SignalCategory; 3] {
        [
            SignalCategory::PullbackEntry,
            SignalCategory::StrongMomentumEntry,
            SignalCategory::ExitSignal,
        ]
    }
}

/// Forward-return statistics for one bin at one horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinStats {
    pub label: String,
    pub horizon: usize,
    pub sample_size: usize,
    /// Mean forward return, percent; NaN when the bin is empty.
    pub mean_return: f64,
    /// Fraction of samples with a positive forward return; NaN when empty.
    pub win_rate: f64,
}

/// One cell of the percentile-bin × day matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMatrixCell {
    pub percentile_range: String,
    pub day: usize,
    pub expected_cumulative_return: f64,
    pub expected_success_rate: f64,
    pub sample_size: usize,
    pub confidence_level: Confidence,
    pub p25_return: f64,
    pub p75_return: f64,
}

/// Full mapper output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperReport {
    pub zone_stats: Vec<BinStats>,
    pub bin_stats: Vec<BinStats>,
    pub signal_stats: Vec<BinStats>,
    pub horizons: Vec<usize>,
    pub sample_size: usize,
    pub success: bool,
}

/// Forward percent return from `index` over `horizon` bars; NaN when the
/// target bar is missing or void.
pub fn forward_return(bars: &[Bar], index: usize, horizon: usize) -> f64 {
    let target = index + horizon;
    if index >= bars.len() || target >= bars.len() {
        return f64::NAN;
    }
    let entry = bars[index].close;
    let exit = bars[target].close;
    if entry.is_nan() || exit.is_nan() || entry <= 0.0 {
        return f64::NAN;
    }
    100.0 * (exit / entry - 1.0)
}

fn in_bin(rank: f64, low: f64, high: f64) -> bool {
    if rank.is_nan() {
        return false;
    }
    // The top edge of the scale is inclusive.
    rank >= low && (rank < high || (high >= 100.0 && rank <= 100.0))
}

fn stats_over(samples: &[f64], label: &str, horizon: usize) -> BinStats {
    let defined: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() {
        return BinStats {
            label: label.to_string(),
            horizon,
            sample_size: 0,
            mean_return: f64::NAN,
            win_rate: f64::NAN,
        };
    }
    let wins = defined.iter().filter(|v| **v > 0.0).count();
    BinStats {
        label: label.to_string(),
        horizon,
        sample_size: defined.len(),
        mean_return: mean(&defined),
        win_rate: wins as f64 / defined.len() as f64,
    }
}

/// Build the full mapper report over the entry-event population.
///
/// Zone and percentile-bin stats use entry events; signal stats classify
/// every ranked day, since momentum/exit signals cannot occur at
/// low-percentile entries.
pub fn map_history(bars: &[Bar], ranks: &[f64], events: &[EntryEvent]) -> MapperReport {
    let mut zone_stats = Vec::new();
    for zone in Zone::all() {
        for &h in &HORIZONS {
            let samples: Vec<f64> = events
                .iter()
                .filter(|e| Zone::classify(e.entry_percentile) == zone)
                .map(|e| forward_return(bars, e.entry_index, h))
                .collect();
            zone_stats.push(stats_over(&samples, zone.label(), h));
        }
    }

    let mut bin_stats = Vec::new();
    for &(low, high, label) in &PERCENTILE_BINS {
        for &h in &HORIZONS {
            let samples: Vec<f64> = events
                .iter()
                .filter(|e| in_bin(e.entry_percentile, low, high))
                .map(|e| forward_return(bars, e.entry_index, h))
                .collect();
            bin_stats.push(stats_over(&samples, label, h));
        }
    }

    let mut signal_stats = Vec::new();
    for category in SignalCategory::all() {
        for &h in &HORIZONS {
            let samples: Vec<f64> = ranks
                .iter()
                .enumerate()
                .filter(|(_, r)| category.matches(**r))
                .map(|(i, _)| forward_return(bars, i, h))
                .collect();
            signal_stats.push(stats_over(&samples, category.label(), h));
        }
    }

    MapperReport {
        zone_stats,
        bin_stats,
        signal_stats,
        horizons: HORIZONS.to_vec(),
        sample_size: events.len(),
        success: !events.is_empty(),
    }
}

/// Percentile-bin × day matrix for days 1..=MATRIX_DAYS.
pub fn performance_matrix(bars: &[Bar], events: &[EntryEvent]) -> Vec<PerformanceMatrixCell> {
    let mut cells = Vec::with_capacity(PERCENTILE_BINS.len() * MATRIX_DAYS);
    for &(low, high, label) in &PERCENTILE_BINS {
        let members: Vec<&EntryEvent> = events
            .iter()
            .filter(|e| in_bin(e.entry_percentile, low, high))
            .collect();
        for day in 1..=MATRIX_DAYS {
            let returns: Vec<f64> = members
                .iter()
                .map(|e| forward_return(bars, e.entry_index, day))
                .filter(|v| !v.is_nan())
                .collect();
            let n = returns.len();
            let (mean_ret, success, p25, p75) = if n == 0 {
                (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
            } else {
                let wins = returns.iter().filter(|v| **v > 0.0).count();
                (
                    mean(&returns),
                    wins as f64 / n as f64,
                    quantile(&returns, 0.25),
                    quantile(&returns, 0.75),
                )
            };
            cells.push(PerformanceMatrixCell {
                percentile_range: label.to_string(),
                day,
                expected_cumulative_return: mean_ret,
                expected_success_rate: success,
                sample_size: n,
                confidence_level: Confidence::from_sample_size(n),
                p25_return: p25,
                p75_return: p75,
            });
        }
    }
    cells
}

/// Expectancy table at one horizon, for the conditional-expectancy strategy.
///
/// Bins with no samples carry NaN and never trigger an exit.
pub fn expectancy_table(bars: &[Bar], events: &[EntryEvent], horizon: usize) -> ExpectancyTable {
    let bins = PERCENTILE_BINS
        .iter()
        .map(|&(low, high, _)| {
            let samples: Vec<f64> = events
                .iter()
                .filter(|e| in_bin(e.entry_percentile, low, high))
                .map(|e| forward_return(bars, e.entry_index, horizon))
                .filter(|v| !v.is_nan())
                .collect();
            ExpectancyBin {
                low,
                high,
                expected_return: mean(&samples),
            }
        })
        .collect();
    ExpectancyTable::new(bins, horizon)
}
