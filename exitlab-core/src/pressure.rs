//! Exit pressure — a composite 0–100 urgency score from four components.
//!
//! Components and caps:
//! - velocity (≤25): day-over-day percentile rank acceleration
//! - time decay (≤20): saturating function of days held
//! - divergence (≤25): price strength against a fading percentile (selling
//!   into strength)
//! - volatility (≤30): realized short-window volatility ranked against its
//!   own trailing distribution
//!
//! overall_pressure = clamp(sum, 0, 100). Contract: >70 strong exit signal,
//! 50–70 partial-exit consideration, <50 hold-compatible.
//!
//! Missing inputs (NaN ranks, short history) score a component at 0 — absent
//! evidence contributes no pressure.

use serde::{Deserialize, Serialize};

use crate::percentile::percentile_rank_at;

pub const VELOCITY_CAP: f64 = 25.0;
pub const TIME_DECAY_CAP: f64 = 20.0;
pub const DIVERGENCE_CAP: f64 = 25.0;
pub const VOLATILITY_CAP: f64 = 30.0;

/// Days-held constant for the saturating time-decay curve.
const TIME_DECAY_TAU: f64 = 10.0;
/// Rank change per day considered "normal"; above this, velocity climbs steeply.
const VELOCITY_KNEE: f64 = 5.0;
/// Short horizon (bars) for the divergence momentum proxy.
const DIVERGENCE_SPAN: usize = 3;
/// Realized-volatility window (daily returns).
pub const VOLATILITY_WINDOW: usize = 10;
/// Window the realized vol is ranked against.
pub const VOLATILITY_RANK_WINDOW: usize = 60;

/// Per-day pressure breakdown. Owned by the simulated day's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPressureBreakdown {
    pub velocity_component: f64,
    pub time_decay_component: f64,
    pub divergence_component: f64,
    pub volatility_component: f64,
    pub overall_pressure: f64,
}

impl ExitPressureBreakdown {
    /// Clamp each component to its cap and sum into overall pressure.
    pub fn from_components(velocity: f64, time_decay: f64, divergence: f64, volatility: f64) -> Self {
        let velocity = clamp_component(velocity, VELOCITY_CAP);
        let time_decay = clamp_component(time_decay, TIME_DECAY_CAP);
        let divergence = clamp_component(divergence, DIVERGENCE_CAP);
        let volatility = clamp_component(volatility, VOLATILITY_CAP);
        let overall = (velocity + time_decay + divergence + volatility).clamp(0.0, 100.0);
        Self {
            velocity_component: velocity,
            time_decay_component: time_decay,
            divergence_component: divergence,
            volatility_component: volatility,
            overall_pressure: overall,
        }
    }

    pub fn zero() -> Self {
        Self::from_components(0.0, 0.0, 0.0, 0.0)
    }
}

fn clamp_component(value: f64, cap: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, cap)
    }
}

/// Velocity: piecewise-linear in the one-day rank change.
///
/// Declines score 0; up to the knee the slope is gentle; past ~5 pts/day the
/// score climbs steeply toward the cap (exhaustion signal).
pub fn velocity_component(rank_today: f64, rank_prev: f64) -> f64 {
    if rank_today.is_nan() || rank_prev.is_nan() {
        return 0.0;
    }
    let delta = rank_today - rank_prev;
    if delta <= 0.0 {
        0.0
    } else if delta <= VELOCITY_KNEE {
        delta * 2.0
    } else {
        (VELOCITY_KNEE * 2.0 + (delta - VELOCITY_KNEE) * 3.0).min(VELOCITY_CAP)
    }
}

/// Time decay: 20 * (1 - exp(-days_held / tau)). Monotone, saturating.
pub fn time_decay_component(days_held: usize) -> f64 {
    TIME_DECAY_CAP * (1.0 - (-(days_held as f64) / TIME_DECAY_TAU).exp())
}

/// Divergence: positive short-horizon price momentum paired with a falling
/// percentile rank scores up to the cap; agreement scores 0.
pub fn divergence_component(closes: &[f64], ranks: &[f64], index: usize) -> f64 {
    if index < DIVERGENCE_SPAN || index >= closes.len() || index >= ranks.len() {
        return 0.0;
    }
    let base = closes[index - DIVERGENCE_SPAN];
    let rank_then = ranks[index - DIVERGENCE_SPAN];
    let rank_now = ranks[index];
    if base.is_nan() || base <= 0.0 || closes[index].is_nan() || rank_then.is_nan() || rank_now.is_nan()
    {
        return 0.0;
    }
    let price_mom = 100.0 * (closes[index] / base - 1.0);
    let rank_drop = rank_then - rank_now;
    if price_mom <= 0.0 || rank_drop <= 0.0 {
        return 0.0;
    }
    // Both axes normalized: 5% of price strength and 15 rank points saturate.
    let strength = (price_mom / 5.0).min(1.0);
    let fade = (rank_drop / 15.0).min(1.0);
    DIVERGENCE_CAP * strength * fade
}

/// Rolling population stdev of daily percent returns over `window` days.
///
/// NaN until `window` returns are available or when the window is
/// contaminated by a void close.
pub fn rolling_volatility(closes: &[f64], window: usize) -> Vec<f64> {
    let n = closes.len();
    let mut returns = vec![f64::NAN; n];
    for i in 1..n {
        if closes[i].is_nan() || closes[i - 1].is_nan() || closes[i - 1] <= 0.0 {
            continue;
        }
        returns[i] = 100.0 * (closes[i] / closes[i - 1] - 1.0);
    }

    let mut vol = vec![f64::NAN; n];
    if window == 0 {
        return vol;
    }
    for i in window..n {
        let slice = &returns[i + 1 - window..=i];
        if slice.iter().any(|r| r.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / window as f64;
        vol[i] = var.sqrt();
    }
    vol
}

/// Volatility component series: realized vol ranked against its trailing
/// distribution, mapped linearly onto 0–30. Zero where undefined.
pub fn volatility_scores(closes: &[f64]) -> Vec<f64> {
    let vol = rolling_volatility(closes, VOLATILITY_WINDOW);
    (0..closes.len())
        .map(|i| {
            let rank = percentile_rank_at(&vol, i, VOLATILITY_RANK_WINDOW);
            if rank.is_nan() {
                0.0
            } else {
                VOLATILITY_CAP * rank / 100.0
            }
        })
        .collect()
}

/// Score one held day. `vol_scores` comes from `volatility_scores` computed
/// once per series; `index` is the absolute bar index, `days_held` the
/// day_index within the holding period.
pub fn score_day(
    closes: &[f64],
    ranks: &[f64],
    vol_scores: &[f64],
    index: usize,
    days_held: usize,
) -> ExitPressureBreakdown {
    let velocity = if index >= 1 {
        velocity_component(ranks[index], ranks[index - 1])
    } else {
        0.0
    };
    let time_decay = time_decay_component(days_held);
    let divergence = divergence_component(closes, ranks, index);
    let volatility = vol_scores.get(index).copied().unwrap_or(0.0);
    ExitPressureBreakdown::from_components(velocity, time_decay, divergence, volatility)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_respect_caps() {
        let b = ExitPressureBreakdown::from_components(100.0, 100.0, 100.0, 100.0);
        assert_eq!(b.velocity_component, VELOCITY_CAP);
        assert_eq!(b.time_decay_component, TIME_DECAY_CAP);
        assert_eq!(b.divergence_component, DIVERGENCE_CAP);
        assert_eq!(b.volatility_component, VOLATILITY_CAP);
        assert_eq!(b.overall_pressure, 100.0);
    }

    #[test]
    fn nan_component_scores_zero() {
        let b = ExitPressureBreakdown::from_components(f64::NAN, 5.0, f64::NAN, 3.0);
        assert_eq!(b.velocity_component, 0.0);
        assert_eq!(b.divergence_component, 0.0);
        assert!((b.overall_pressure - 8.0).abs() < 1e-12);
    }

    #[test]
    fn velocity_declines_score_zero() {
        assert_eq!(velocity_component(40.0, 50.0), 0.0);
    }

    #[test]
    fn velocity_steepens_past_knee() {
        let below = velocity_component(54.0, 50.0); // 4 pts → gentle
        let above = velocity_component(58.0, 50.0); // 8 pts → steep
        assert!((below - 8.0).abs() < 1e-12);
        assert!((above - 19.0).abs() < 1e-12);
        assert_eq!(velocity_component(100.0, 0.0), VELOCITY_CAP);
    }

    #[test]
    fn time_decay_monotone_and_capped() {
        let mut prev = -1.0;
        for d in 0..200 {
            let v = time_decay_component(d);
            assert!(v >= prev);
            assert!(v <= TIME_DECAY_CAP);
            prev = v;
        }
        assert_eq!(time_decay_component(0), 0.0);
        assert!(time_decay_component(100) > 19.9);
    }

    #[test]
    fn divergence_flags_selling_into_strength() {
        let closes = vec![100.0, 101.0, 102.0, 104.0];
        // Price up ~4% while rank fades 20 points.
        let ranks = vec![80.0, 78.0, 72.0, 60.0];
        let d = divergence_component(&closes, &ranks, 3);
        assert!(d > 10.0, "expected meaningful divergence, got {d}");
        // Agreement (both rising) scores zero.
        let rising = vec![60.0, 65.0, 70.0, 80.0];
        assert_eq!(divergence_component(&closes, &rising, 3), 0.0);
    }

    #[test]
    fn rolling_volatility_flat_series_is_zero() {
        let closes = vec![100.0; 30];
        let vol = rolling_volatility(&closes, 10);
        assert!(vol[9].is_nan());
        assert!((vol[10]).abs() < 1e-12);
        assert!((vol[29]).abs() < 1e-12);
    }

    #[test]
    fn volatility_scores_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.31).sin() * 4.0)
            .collect();
        for v in volatility_scores(&closes) {
            assert!((0.0..=VOLATILITY_CAP).contains(&v));
        }
    }
}
