//! Statistical primitives — implemented from first principles.
//!
//! - Lanczos approximation for ln(Gamma)
//! - Regularized incomplete beta function (Lentz continued fraction)
//! - Student's t-distribution CDF and two-tailed p-values
//! - Pearson correlation with significance
//! - Welch's two-sample t-test
//!
//! Statistical caveat: the curves these tests run over are means of
//! overlapping holding periods, so independence assumptions are shaky. The
//! p-values are ranking/diagnostic scores, not literal false-positive
//! probabilities.

/// Lanczos approximation for ln(Gamma(x)), g=7, n=9.
fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        // Reflection: Gamma(x) * Gamma(1-x) = pi / sin(pi*x)
        let sin_val = (std::f64::consts::PI * x).sin();
        if sin_val.abs() < 1e-300 {
            return f64::INFINITY;
        }
        return std::f64::consts::PI.ln() - sin_val.abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + G + 0.5;
    let log_sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt().ln();
    log_sqrt_2pi + (t.ln() * (x + 0.5)) - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b) via modified Lentz.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }
    // Symmetry for better convergence.
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(b, a, 1.0 - x);
    }

    let ln_prefix =
        a * x.ln() + b * (1.0 - x).ln() - ln_gamma(a) - ln_gamma(b) + ln_gamma(a + b) - a.ln();
    let prefix = ln_prefix.exp();

    let max_iter = 200;
    let epsilon = 1e-14;
    let tiny = 1e-30;

    let mut c = 1.0_f64;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < tiny {
        d = tiny;
    }
    d = 1.0 / d;
    let mut f = d;

    for m in 1..=max_iter {
        let m_f64 = m as f64;

        let num_even = m_f64 * (b - m_f64) * x / ((a + 2.0 * m_f64 - 1.0) * (a + 2.0 * m_f64));
        d = 1.0 + num_even * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + num_even / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        f *= c * d;

        let num_odd =
            -((a + m_f64) * (a + b + m_f64) * x) / ((a + 2.0 * m_f64) * (a + 2.0 * m_f64 + 1.0));
        d = 1.0 + num_odd * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + num_odd / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = c * d;
        f *= delta;

        if (delta - 1.0).abs() < epsilon {
            break;
        }
    }

    prefix * f
}

/// CDF of Student's t-distribution with `df` degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    if df <= 0.0 || t.is_nan() {
        return f64::NAN;
    }
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(df / 2.0, 0.5, x);
    if t >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Two-tailed p-value for a t statistic.
pub fn p_two_tailed(t: f64, df: f64) -> f64 {
    if t.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    (2.0 * (1.0 - t_cdf(t.abs(), df))).clamp(0.0, 1.0)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by n, not n-1).
///
/// Population form keeps single-observation sets defined (stdev 0 at n=1).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Sample variance (n-1 denominator); NaN below two observations.
fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

/// Pearson correlation of two equal-length series. NaN when either side has
/// zero variance or fewer than two points.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx < 1e-300 || vy < 1e-300 {
        return f64::NAN;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Two-tailed significance of a Pearson correlation over n points.
///
/// t = r * sqrt((n-2) / (1 - r^2)), df = n - 2. A perfect correlation
/// reports p = 0.
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if r.is_nan() || n < 3 {
        return f64::NAN;
    }
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r2)).sqrt();
    p_two_tailed(t, df)
}

/// Result of Welch's two-sample t-test.
#[derive(Debug, Clone, Copy)]
pub struct WelchResult {
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
}

/// Welch's unequal-variance t-test, two-tailed.
///
/// NaN result when either sample has fewer than two points or both variances
/// vanish.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> WelchResult {
    let nan = WelchResult {
        t_statistic: f64::NAN,
        degrees_of_freedom: f64::NAN,
        p_value: f64::NAN,
    };
    if a.len() < 2 || b.len() < 2 {
        return nan;
    }
    let na = a.len() as f64;
    let nb = b.len() as f64;
    let va = sample_variance(a) / na;
    let vb = sample_variance(b) / nb;
    let pooled = va + vb;
    if pooled < 1e-300 {
        return nan;
    }
    let t = (mean(a) - mean(b)) / pooled.sqrt();
    // Welch–Satterthwaite degrees of freedom.
    let df = pooled * pooled / (va * va / (na - 1.0) + vb * vb / (nb - 1.0));
    WelchResult {
        t_statistic: t,
        degrees_of_freedom: df,
        p_value: p_two_tailed(t, df),
    }
}

/// Interpolated quantile (q in [0,1]) of an unsorted sample; NaN when empty.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn ln_gamma_factorials() {
        // Gamma(n) = (n-1)!
        assert_close(ln_gamma(5.0), 24.0_f64.ln(), 1e-10);
        assert_close(ln_gamma(1.0), 0.0, 1e-10);
        assert_close(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), 1e-10);
    }

    #[test]
    fn t_cdf_symmetry_and_known_values() {
        assert_close(t_cdf(0.0, 10.0), 0.5, 1e-10);
        // Large df approaches the normal: P(T < 1.96) ≈ 0.975.
        assert_close(t_cdf(1.96, 1_000.0), 0.975, 1e-3);
        let p = t_cdf(1.5, 8.0);
        let q = t_cdf(-1.5, 8.0);
        assert_close(p + q, 1.0, 1e-10);
    }

    #[test]
    fn two_tailed_p_known_value() {
        // t = 2.228 at df = 10 is the 0.05 two-tailed critical value.
        assert_close(p_two_tailed(2.228, 10.0), 0.05, 1e-3);
    }

    #[test]
    fn pearson_perfect_and_flat() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert_close(pearson(&x, &y), 1.0, 1e-12);
        let inv: Vec<f64> = y.iter().map(|v| -v).collect();
        assert_close(pearson(&x, &inv), -1.0, 1e-12);
        let flat = [3.0, 3.0, 3.0, 3.0];
        assert!(pearson(&x, &flat).is_nan());
    }

    #[test]
    fn pearson_p_perfect_is_zero() {
        assert_close(pearson_p_value(1.0, 10), 0.0, 1e-12);
        let p = pearson_p_value(0.1, 10);
        assert!(p > 0.5, "weak correlation should be insignificant, got {p}");
    }

    #[test]
    fn welch_detects_separated_samples() {
        let a = [5.0, 5.1, 4.9, 5.2, 5.0, 4.8];
        let b = [1.0, 1.2, 0.9, 1.1, 1.0, 0.8];
        let result = welch_t_test(&a, &b);
        assert!(result.p_value < 0.001);
        let same = welch_t_test(&a, &a);
        assert!(same.p_value > 0.99);
    }

    #[test]
    fn welch_tiny_samples_undefined() {
        let result = welch_t_test(&[1.0], &[2.0, 3.0]);
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn population_std_single_value_is_zero() {
        assert_eq!(population_std_dev(&[4.2]), 0.0);
    }

    #[test]
    fn quantile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_close(quantile(&values, 0.0), 1.0, 1e-12);
        assert_close(quantile(&values, 1.0), 4.0, 1e-12);
        assert_close(quantile(&values, 0.5), 2.5, 1e-12);
        assert!(quantile(&[], 0.5).is_nan());
    }
}
