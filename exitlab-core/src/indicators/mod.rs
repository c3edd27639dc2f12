//! Concrete indicator implementations.
//!
//! All indicators implement the `Indicator` trait: full bar series in,
//! same-length f64 series out, NaN for the warmup prefix. They are
//! precomputed once before any simulation loop runs.
//!
//! Look-ahead guard: no indicator value at bar t may depend on price data
//! from bar t+1 or later.

pub mod adx;
pub mod atr;
pub mod rsi;
pub mod sma;

pub use adx::Adx;
pub use atr::{true_range, wilder_smooth, Atr};
pub use rsi::Rsi;
pub use sma::sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Returns a `Vec<f64>` of the same length as `bars`; the first `lookback()`
/// values should be `f64::NAN`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}
