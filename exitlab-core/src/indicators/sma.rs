//! Simple moving average over a plain value series.
//!
//! Works on any f64 series (closes, RSI, anything aligned with bars), which
//! is how the smoothed oscillator companion is built. First valid value at
//! index period-1; any NaN inside the window yields NaN for that index.

/// Rolling mean; same length as `values`, NaN-prefixed during warmup.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = window.iter().sum::<f64>() / period as f64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn sma_basic() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 2.0, 1e-12);
        assert_approx(out[4], 4.0, 1e-12);
    }

    #[test]
    fn sma_nan_window() {
        let out = sma(&[1.0, 2.0, f64::NAN, 4.0, 5.0], 3);
        assert!(out[2].is_nan());
        assert!(out[3].is_nan());
        assert!(out[4].is_nan());
    }

    #[test]
    fn sma_short_series_all_nan() {
        let out = sma(&[1.0, 2.0], 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
