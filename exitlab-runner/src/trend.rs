//! Trend significance — statistical diagnostics over a strategy's
//! mean-return-by-day curve.

use serde::{Deserialize, Serialize};

use crate::stats::{pearson, pearson_p_value, welch_t_test};

/// Diagnostics for one strategy's return-by-day curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// "Upward" when day/return correlation is positive, "Downward" when it
    /// is zero or negative, "Flat" when the correlation itself is undefined.
    pub trend_direction: String,
    pub trend_correlation: f64,
    pub trend_p_value: f64,
    /// Day (1-indexed) with the highest mean return.
    pub peak_day: usize,
    pub peak_return: f64,
    /// Label for the early-vs-late test: Very Strong / Strong / Moderate / Weak.
    pub early_vs_late_significance: String,
    pub early_vs_late_p_value: f64,
    /// |correlation|, 0..1.
    pub trend_strength: f64,
}

/// Analyze a mean-return curve indexed by holding day 1..=n.
///
/// NaN days (no population) are excluded from every statistic. A curve with
/// fewer than three defined days reports NaN statistics and a "Weak" label.
pub fn analyze_trend(curve: &[f64]) -> TrendAnalysis {
    let defined: Vec<(usize, f64)> = curve
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, &v)| (i + 1, v))
        .collect();

    let days: Vec<f64> = defined.iter().map(|(d, _)| *d as f64).collect();
    let returns: Vec<f64> = defined.iter().map(|(_, v)| *v).collect();

    let correlation = pearson(&days, &returns);
    let p_value = pearson_p_value(correlation, defined.len());

    let (peak_day, peak_return) = defined
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|&(d, v)| (d, v))
        .unwrap_or((0, f64::NAN));

    // Early vs late: first third of defined days against the last third.
    let third = defined.len() / 3;
    let (early_p, label) = if third >= 2 {
        let early: Vec<f64> = returns[..third].to_vec();
        let late: Vec<f64> = returns[returns.len() - third..].to_vec();
        let result = welch_t_test(&early, &late);
        (result.p_value, significance_label(result.p_value))
    } else {
        (f64::NAN, "Weak")
    };

    TrendAnalysis {
        trend_direction: if correlation.is_nan() {
            "Flat".to_string()
        } else if correlation > 0.0 {
            "Upward".to_string()
        } else {
            "Downward".to_string()
        },
        trend_correlation: correlation,
        trend_p_value: p_value,
        peak_day,
        peak_return,
        early_vs_late_significance: label.to_string(),
        early_vs_late_p_value: early_p,
        trend_strength: correlation.abs(),
    }
}

/// Categorical significance at the conventional thresholds.
pub fn significance_label(p: f64) -> &'static str {
    if p.is_nan() {
        "Weak"
    } else if p < 0.01 {
        "Very Strong"
    } else if p < 0.05 {
        "Strong"
    } else if p < 0.10 {
        "Moderate"
    } else {
        "Weak"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_curve_is_upward_and_significant() {
        let curve: Vec<f64> = (1..=21).map(|d| 0.3 * d as f64).collect();
        let analysis = analyze_trend(&curve);
        assert_eq!(analysis.trend_direction, "Upward");
        assert!(analysis.trend_correlation > 0.99);
        assert!(analysis.trend_p_value < 0.01);
        assert_eq!(analysis.peak_day, 21);
        assert!((analysis.trend_strength - analysis.trend_correlation.abs()).abs() < 1e-12);
        assert_eq!(analysis.early_vs_late_significance, "Very Strong");
    }

    #[test]
    fn falling_curve_is_downward() {
        let curve: Vec<f64> = (1..=21).map(|d| 5.0 - 0.2 * d as f64).collect();
        let analysis = analyze_trend(&curve);
        assert_eq!(analysis.trend_direction, "Downward");
        assert_eq!(analysis.peak_day, 1);
    }

    #[test]
    fn peak_in_middle_is_found() {
        let curve = vec![1.0, 2.0, 5.0, 3.0, 1.0, 0.5, 0.2, 0.1, 0.0];
        let analysis = analyze_trend(&curve);
        assert_eq!(analysis.peak_day, 3);
        assert!((analysis.peak_return - 5.0).abs() < 1e-12);
    }

    #[test]
    fn nan_days_are_excluded() {
        let mut curve: Vec<f64> = (1..=21).map(|d| 0.3 * d as f64).collect();
        curve[4] = f64::NAN;
        curve[10] = f64::NAN;
        let analysis = analyze_trend(&curve);
        assert!(analysis.trend_correlation > 0.99);
        assert_eq!(analysis.peak_day, 21);
    }

    #[test]
    fn short_curve_reports_weak() {
        let analysis = analyze_trend(&[1.0, 2.0]);
        assert_eq!(analysis.early_vs_late_significance, "Weak");
        assert!(analysis.early_vs_late_p_value.is_nan());
    }

    #[test]
    fn undefined_correlation_is_flat_not_downward() {
        // A single defined day has no correlation; an all-NaN curve has none
        // either. Neither should masquerade as a real downtrend.
        for curve in [vec![2.5], vec![f64::NAN; 5]] {
            let analysis = analyze_trend(&curve);
            assert!(analysis.trend_correlation.is_nan());
            assert_eq!(analysis.trend_direction, "Flat");
            assert!(analysis.trend_strength.is_nan());
        }
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(significance_label(0.005), "Very Strong");
        assert_eq!(significance_label(0.03), "Strong");
        assert_eq!(significance_label(0.07), "Moderate");
        assert_eq!(significance_label(0.5), "Weak");
        assert_eq!(significance_label(f64::NAN), "Weak");
    }
}
