//! Rolling percentile ranker with zone classification.
//!
//! rank(t) = 100 * (strictly_less + 0.5 * equal) / window, counted over the
//! trailing `window` values including t (midpoint tie handling: a flat
//! window ranks exactly 50). Indices with fewer than `window` observations,
//! or any NaN inside the window, produce NaN and must be skipped by
//! consumers — never defaulted to a neutral 50.

use chrono::NaiveDate;

use crate::domain::{PercentileObservation, Zone};

/// Percentile rank of `values[index]` within the trailing `window` values
/// (inclusive of `index`). NaN when the window is short or contaminated.
pub fn percentile_rank_at(values: &[f64], index: usize, window: usize) -> f64 {
    if window == 0 || index + 1 < window || index >= values.len() {
        return f64::NAN;
    }
    let target = values[index];
    if target.is_nan() {
        return f64::NAN;
    }

    let slice = &values[index + 1 - window..=index];
    let mut less = 0usize;
    let mut equal = 0usize;
    for &v in slice {
        if v.is_nan() {
            return f64::NAN;
        }
        if v < target {
            less += 1;
        } else if v == target {
            equal += 1;
        }
    }
    100.0 * (less as f64 + 0.5 * equal as f64) / window as f64
}

/// Full-series percentile ranks; same length as `values`, NaN warmup prefix.
pub fn percentile_ranks(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| percentile_rank_at(values, i, window))
        .collect()
}

/// Build dated observations for every index with a defined rank.
///
/// Indices with NaN ranks are omitted entirely, so consumers can only see
/// well-defined observations.
pub fn observations(
    dates: &[NaiveDate],
    values: &[f64],
    window: usize,
) -> Vec<PercentileObservation> {
    debug_assert_eq!(dates.len(), values.len());
    let ranks = percentile_ranks(values, window);
    dates
        .iter()
        .zip(values.iter().zip(ranks.iter()))
        .filter(|(_, (_, rank))| !rank.is_nan())
        .map(|(&date, (&raw_value, &rank))| PercentileObservation {
            date,
            raw_value,
            percentile_rank: rank,
            zone: Zone::classify(rank),
        })
        .collect()
}
