//! Trade lifecycle state machine.
//!
//! States form an ordered lifecycle — rebound → momentum → acceleration →
//! distribution → reversal — with backward transitions allowed, except that
//! reversal is terminal. The transition rule is a pure function of the
//! history up to the current day; states are never retroactively revised.
//! The machine classifies only; forcing an exit is the exposure policy's job.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a held position's current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeState {
    Rebound,
    Momentum,
    Acceleration,
    Distribution,
    Reversal,
}

impl TradeState {
    /// One step forward in the lifecycle, capped at Acceleration.
    ///
    /// Distribution and Reversal are never reached by simple advancement —
    /// they require their own trigger conditions.
    fn advance(self) -> TradeState {
        match self {
            TradeState::Rebound => TradeState::Momentum,
            TradeState::Momentum => TradeState::Acceleration,
            other => other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeState::Rebound => "rebound",
            TradeState::Momentum => "momentum",
            TradeState::Acceleration => "acceleration",
            TradeState::Distribution => "distribution",
            TradeState::Reversal => "reversal",
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, TradeState::Distribution | TradeState::Reversal)
    }
}

/// Everything the transition rule may look at: history up to and including
/// the current absolute bar `index`, never beyond.
#[derive(Debug, Clone, Copy)]
pub struct StateContext<'a> {
    /// Percentile rank series (absolute indexing, NaN where undefined).
    pub ranks: &'a [f64],
    /// Bar highs (absolute indexing), used for local-peak detection.
    pub highs: &'a [f64],
    /// Overall pressure per held day, indexed by day_index (0..=days_held).
    pub pressures: &'a [f64],
    pub entry_index: usize,
    /// Absolute bar index of the current day.
    pub index: usize,
    /// Day index within the holding period (>= 1 when transitioning).
    pub days_held: usize,
}

const DISTRIBUTION_PRESSURE: f64 = 60.0;
const DISTRIBUTION_PRESSURE_RISE: f64 = 15.0;
const ADVANCE_SLOPE_PER_DAY: f64 = 2.0;
const ADVANCE_PRESSURE_MAX: f64 = 50.0;
const BACKSTEP_PRESSURE_MAX: f64 = 40.0;
const SLOPE_SPAN: usize = 3;

/// Compute the state for the current day from the previous state and the
/// history so far. Day 0 is always Rebound (the caller seeds it).
pub fn next_state(current: TradeState, ctx: &StateContext) -> TradeState {
    // Terminal: once reversal is reached nothing moves the machine again.
    if current == TradeState::Reversal {
        return TradeState::Reversal;
    }

    if reversal_confirmed(ctx) {
        return TradeState::Reversal;
    }

    let pressure_now = ctx.pressures.last().copied().unwrap_or(0.0);
    let slope = rank_slope(ctx.ranks, ctx.index);

    if distribution_triggered(ctx, pressure_now) {
        return TradeState::Distribution;
    }

    // Backward transition: distribution cools off into acceleration.
    if current == TradeState::Distribution {
        if pressure_now < BACKSTEP_PRESSURE_MAX && slope.map_or(false, |s| s >= 0.0) {
            return TradeState::Acceleration;
        }
        return TradeState::Distribution;
    }

    // Sustained percentile rise with low pressure advances the lifecycle.
    if let Some(s) = slope {
        if s > ADVANCE_SLOPE_PER_DAY && pressure_now < ADVANCE_PRESSURE_MAX {
            return current.advance();
        }
    }

    current
}

/// Average rank change per day over the trailing span ending at `index`.
fn rank_slope(ranks: &[f64], index: usize) -> Option<f64> {
    if index < SLOPE_SPAN || index >= ranks.len() {
        return None;
    }
    let now = ranks[index];
    let then = ranks[index - SLOPE_SPAN];
    if now.is_nan() || then.is_nan() {
        return None;
    }
    Some((now - then) / SLOPE_SPAN as f64)
}

/// A realized local price high at least two days back, followed by two
/// consecutive percentile declines.
fn reversal_confirmed(ctx: &StateContext) -> bool {
    if ctx.days_held < 2 || ctx.index < 2 {
        return false;
    }
    let held = &ctx.highs[ctx.entry_index..=ctx.index];
    let peak_offset = held
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_nan())
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i);
    let peak_abs = match peak_offset {
        Some(off) => ctx.entry_index + off,
        None => return false,
    };
    if peak_abs + 2 > ctx.index {
        return false;
    }

    let r0 = ctx.ranks[ctx.index];
    let r1 = ctx.ranks[ctx.index - 1];
    let r2 = ctx.ranks[ctx.index - 2];
    if r0.is_nan() || r1.is_nan() || r2.is_nan() {
        return false;
    }
    r0 < r1 && r1 < r2
}

/// Pressure spike combined with percentile deceleration.
fn distribution_triggered(ctx: &StateContext, pressure_now: f64) -> bool {
    if pressure_now < DISTRIBUTION_PRESSURE || ctx.days_held < SLOPE_SPAN {
        return false;
    }
    let d = ctx.days_held;
    let rise = pressure_now - ctx.pressures[d - SLOPE_SPAN];
    if rise <= DISTRIBUTION_PRESSURE_RISE {
        return false;
    }

    let slope_now = rank_slope(ctx.ranks, ctx.index);
    let slope_prev = rank_slope(ctx.ranks, ctx.index.saturating_sub(1));
    match (slope_now, slope_prev) {
        (Some(now), Some(prev)) => now < prev,
        (Some(now), None) => now <= 0.0,
        _ => false,
    }
}
