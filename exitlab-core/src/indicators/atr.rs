//! Average True Range (ATR), Wilder smoothing.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! TR[0] has no previous close and is excluded from the smoothed series.
//! Lookback: period (needs period+1 bars for a proper TR window).

use crate::domain::Bar;

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
///
/// TR[0] = high[0] - low[0] (no previous close).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];
    if n == 0 {
        return tr;
    }

    if !bars[0].high.is_nan() && !bars[0].low.is_nan() {
        tr[0] = bars[0].high - bars[0].low;
    }

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Wilder smoothing (alpha = 1/period), seeded with the mean of the first
/// window of `period` consecutive non-NaN values.
///
/// A NaN after the seed window terminates the smoothed series (the running
/// average is poisoned from that point on).
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    // First index from which `period` consecutive non-NaN values exist.
    let seed_start = (0..n).find(|&i| {
        i + period <= n && values[i..i + period].iter().all(|v| !v.is_nan())
    });
    let seed_start = match seed_start {
        Some(s) => s,
        None => return out,
    };
    let seed_end = seed_start + period;

    let seed = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return out;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }

    out
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut tr = true_range(bars);
        // TR[0] is just high-low, not a proper true range; skip it.
        if !tr.is_empty() {
            tr[0] = f64::NAN;
        }
        wilder_smooth(&tr, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn true_range_uses_gap() {
        let mut bars = make_bars(&[100.0, 100.0, 100.0]);
        // Gap down: previous close far above today's high.
        bars[2].high = 90.0;
        bars[2].low = 88.0;
        bars[2].close = 89.0;
        let tr = true_range(&bars);
        // |high - prev_close| = |90 - 100| = 10 dominates high-low = 2.
        assert_approx(tr[2], 10.0, 1e-12);
    }

    #[test]
    fn constant_range_atr() {
        // high - low = 2 on every synthetic bar with flat closes.
        let bars = make_bars(&[100.0; 10]);
        let out = Atr::new(3).compute(&bars);
        assert!(out[2].is_nan()); // seed needs TR[1..=3]
        assert_approx(out[3], 2.0, 1e-9);
        assert_approx(out[9], 2.0, 1e-9);
    }

    #[test]
    fn wilder_smooth_seed_position() {
        let vals = [f64::NAN, 1.0, 1.0, 1.0, 3.0];
        let out = wilder_smooth(&vals, 3);
        assert!(out[2].is_nan());
        assert_approx(out[3], 1.0, 1e-12);
        // alpha = 1/3: 3*(1/3) + 1*(2/3)
        assert_approx(out[4], 5.0 / 3.0, 1e-12);
    }

    #[test]
    fn wilder_smooth_all_nan() {
        let vals = [f64::NAN; 5];
        let out = wilder_smooth(&vals, 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
