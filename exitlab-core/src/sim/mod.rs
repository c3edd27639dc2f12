//! Strategy simulator — replays one entry event forward under one exit rule.
//!
//! One common loop walks the holding period day by day, feeding the pressure
//! scorer, the state machine, and the exposure policy, and maintaining the
//! trailing stop (ratcheting up only). The strategy variant supplies nothing
//! but the exit decision, so all five variants share identical day records.
//!
//! Gap handling: a void bar or the end of the series inside the horizon
//! forces an exit at the last available close — never an error.

pub mod strategy;

pub use strategy::{ExitStrategy, ExpectancyBin, ExpectancyTable};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, EntryEvent};
use crate::indicators::{Atr, Indicator};
use crate::policy::{decide, ExposureAction, ExposureDecision, PolicyConfig};
use crate::pressure::{score_day, volatility_scores, ExitPressureBreakdown};
use crate::state::{next_state, StateContext, TradeState};

/// Simulation parameters shared by all strategy variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub max_hold_days: usize,
    /// ATR period for the trailing stop level (always computed for reporting).
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub policy: PolicyConfig,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            max_hold_days: 21,
            atr_period: 14,
            atr_multiplier: 2.0,
            policy: PolicyConfig::default(),
        }
    }
}

/// Why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Horizon,
    FixedDay,
    TrailingStop,
    PressureSignal,
    NegativeExpectancy,
    DataGap,
}

/// One day of a simulated holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day_index: usize,
    pub date: NaiveDate,
    pub close: f64,
    /// Return since entry, percent.
    pub return_pct: f64,
    /// Percentile rank on this day (NaN where undefined).
    pub percentile_rank: f64,
    pub pressure: ExitPressureBreakdown,
    pub state: TradeState,
    pub decision: ExposureDecision,
    /// Trailing stop level (NaN until ATR is available).
    pub trailing_stop: f64,
    pub triggered_stop: bool,
    pub triggered_exit_signal: bool,
}

/// Complete result of simulating one entry event under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy_name: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_percentile: f64,
    pub total_days_held: usize,
    /// Realized return at exit, percent.
    pub final_return: f64,
    /// Worst close-to-peak drawdown during the hold, percent (<= 0).
    pub max_drawdown: f64,
    pub exit_reason: ExitReason,
    /// True when a data gap forced the exit.
    pub forced_exit: bool,
    pub daily_analysis: Vec<DayRecord>,
}

/// Replay one entry event forward under one strategy.
///
/// `ranks` is the full percentile-rank series aligned with `bars` (NaN where
/// undefined). `expectancy` is only consulted by ConditionalExpectancy; a
/// missing table means that strategy holds to the horizon.
pub fn simulate(
    bars: &[Bar],
    ranks: &[f64],
    event: &EntryEvent,
    strategy: &ExitStrategy,
    params: &SimulationParams,
    expectancy: Option<&ExpectancyTable>,
) -> SimulationResult {
    debug_assert_eq!(bars.len(), ranks.len());

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let vol_scores = volatility_scores(&closes);
    let atr = match strategy {
        ExitStrategy::TrailingStopAtr { atr_period, .. } => {
            Atr::new(*atr_period).compute(bars)
        }
        _ => Atr::new(params.atr_period).compute(bars),
    };
    let stop_multiplier = match strategy {
        ExitStrategy::TrailingStopAtr { multiplier, .. } => *multiplier,
        _ => params.atr_multiplier,
    };

    let entry = event.entry_index;
    let entry_price = event.entry_price;

    let mut daily = Vec::with_capacity(params.max_hold_days);
    let mut pressures: Vec<f64> = Vec::with_capacity(params.max_hold_days + 1);
    let mut state = TradeState::Rebound;

    // Day 0: pressure at the entry bar seeds the pressure trend window.
    pressures.push(score_day(&closes, ranks, &vol_scores, entry, 0).overall_pressure);

    let mut highest_close = entry_price;
    let mut trailing_stop = f64::NAN;
    let mut peak_close = entry_price;
    let mut max_drawdown = 0.0_f64;

    let mut exit_reason = ExitReason::Horizon;
    let mut forced_exit = false;
    let mut final_return = 0.0;
    let mut total_days_held = 0;

    for d in 1..=params.max_hold_days {
        let idx = entry + d;
        if idx >= bars.len() || bars[idx].is_void() {
            // Gap inside the horizon: forced exit at the last available close.
            exit_reason = ExitReason::DataGap;
            forced_exit = true;
            break;
        }

        let close = closes[idx];
        let return_pct = 100.0 * (close / entry_price - 1.0);

        if close > highest_close {
            highest_close = close;
        }
        let atr_now = atr[idx];
        if !atr_now.is_nan() {
            let raw_stop = highest_close - stop_multiplier * atr_now;
            // Ratchet: the stop may rise but never fall.
            trailing_stop = if trailing_stop.is_nan() {
                raw_stop
            } else {
                trailing_stop.max(raw_stop)
            };
        }
        let stop_hit = !trailing_stop.is_nan() && close < trailing_stop;

        let breakdown = score_day(&closes, ranks, &vol_scores, idx, d);
        pressures.push(breakdown.overall_pressure);

        let ctx = StateContext {
            ranks,
            highs: &highs,
            pressures: &pressures,
            entry_index: entry,
            index: idx,
            days_held: d,
        };
        state = next_state(state, &ctx);

        let decision = decide(d, breakdown.overall_pressure, state, stop_hit, &params.policy);

        if close > peak_close {
            peak_close = close;
        }
        let drawdown = 100.0 * (close / peak_close - 1.0);
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }

        daily.push(DayRecord {
            day_index: d,
            date: bars[idx].date,
            close,
            return_pct,
            percentile_rank: ranks[idx],
            pressure: breakdown,
            state,
            decision,
            trailing_stop,
            triggered_stop: decision.triggered_stop,
            triggered_exit_signal: decision.triggered_exit_signal,
        });

        final_return = return_pct;
        total_days_held = d;

        if let Some(reason) = exit_decision(strategy, d, params, stop_hit, &decision, ranks[idx], expectancy)
        {
            exit_reason = reason;
            break;
        }
        if d == params.max_hold_days {
            exit_reason = ExitReason::Horizon;
        }
    }

    if forced_exit {
        // Exit value is the last recorded close; zero days held means the
        // gap sat immediately after the entry bar.
        final_return = daily.last().map(|r| r.return_pct).unwrap_or(0.0);
        total_days_held = daily.last().map(|r| r.day_index).unwrap_or(0);
    }

    SimulationResult {
        strategy_name: strategy.name(),
        entry_date: event.entry_date,
        entry_price,
        entry_percentile: event.entry_percentile,
        total_days_held,
        final_return,
        max_drawdown,
        exit_reason,
        forced_exit,
        daily_analysis: daily,
    }
}

/// The strategy's exit rule for one day; None means keep holding.
fn exit_decision(
    strategy: &ExitStrategy,
    day: usize,
    params: &SimulationParams,
    stop_hit: bool,
    decision: &ExposureDecision,
    rank: f64,
    expectancy: Option<&ExpectancyTable>,
) -> Option<ExitReason> {
    match strategy {
        ExitStrategy::BuyAndHold => None,
        ExitStrategy::FixedDays { days } => {
            if day == (*days).min(params.max_hold_days) {
                Some(ExitReason::FixedDay)
            } else {
                None
            }
        }
        ExitStrategy::TrailingStopAtr { .. } => {
            if stop_hit {
                Some(ExitReason::TrailingStop)
            } else {
                None
            }
        }
        ExitStrategy::AdaptivePressure => {
            if decision.action == ExposureAction::ExitAll {
                if decision.triggered_stop {
                    Some(ExitReason::TrailingStop)
                } else {
                    Some(ExitReason::PressureSignal)
                }
            } else {
                None
            }
        }
        ExitStrategy::ConditionalExpectancy => match expectancy.and_then(|t| t.lookup(rank)) {
            Some(expected) if expected <= 0.0 => Some(ExitReason::NegativeExpectancy),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn event_at(bars: &[Bar], index: usize, percentile: f64) -> EntryEvent {
        EntryEvent {
            ticker: "TEST".into(),
            entry_date: bars[index].date,
            entry_index: index,
            entry_price: bars[index].close,
            entry_percentile: percentile,
            threshold: 5.0,
        }
    }

    #[test]
    fn buy_and_hold_runs_to_horizon() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let ranks = vec![50.0; bars.len()];
        let event = event_at(&bars, 10, 3.0);
        let params = SimulationParams {
            max_hold_days: 10,
            ..Default::default()
        };
        let result = simulate(&bars, &ranks, &event, &ExitStrategy::BuyAndHold, &params, None);
        assert_eq!(result.total_days_held, 10);
        assert_eq!(result.exit_reason, ExitReason::Horizon);
        assert_eq!(result.daily_analysis.len(), 10);
        assert!(!result.forced_exit);
    }

    #[test]
    fn data_gap_forces_exit_at_last_close() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let ranks = vec![50.0; bars.len()];
        let event = event_at(&bars, 10, 3.0);
        let params = SimulationParams {
            max_hold_days: 21,
            ..Default::default()
        };
        let result = simulate(&bars, &ranks, &event, &ExitStrategy::BuyAndHold, &params, None);
        // Bars end at index 14 → last held day is day 4.
        assert_eq!(result.total_days_held, 4);
        assert_eq!(result.exit_reason, ExitReason::DataGap);
        assert!(result.forced_exit);
        let expected = 100.0 * (closes[14] / closes[10] - 1.0);
        assert!((result.final_return - expected).abs() < 1e-9);
    }

    #[test]
    fn void_bar_inside_horizon_forces_exit() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let mut bars = make_bars(&closes);
        bars[13].close = f64::NAN;
        bars[13].open = f64::NAN;
        bars[13].high = f64::NAN;
        bars[13].low = f64::NAN;
        let ranks = vec![50.0; bars.len()];
        let event = event_at(&bars, 10, 3.0);
        let params = SimulationParams {
            max_hold_days: 21,
            ..Default::default()
        };
        let result = simulate(&bars, &ranks, &event, &ExitStrategy::BuyAndHold, &params, None);
        assert_eq!(result.total_days_held, 2);
        assert_eq!(result.exit_reason, ExitReason::DataGap);
    }

    #[test]
    fn conditional_expectancy_exits_on_non_positive() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        // Rank climbs into high territory from day 3 on.
        let mut ranks = vec![10.0; bars.len()];
        for r in ranks.iter_mut().skip(13) {
            *r = 80.0;
        }
        let event = event_at(&bars, 10, 3.0);
        let table = ExpectancyTable::new(
            vec![
                ExpectancyBin {
                    low: 0.0,
                    high: 50.0,
                    expected_return: 1.5,
                },
                ExpectancyBin {
                    low: 50.0,
                    high: 100.0,
                    expected_return: -0.2,
                },
            ],
            7,
        );
        let params = SimulationParams {
            max_hold_days: 21,
            ..Default::default()
        };
        let result = simulate(
            &bars,
            &ranks,
            &event,
            &ExitStrategy::ConditionalExpectancy,
            &params,
            Some(&table),
        );
        assert_eq!(result.exit_reason, ExitReason::NegativeExpectancy);
        assert_eq!(result.total_days_held, 3);
    }

    #[test]
    fn max_drawdown_tracks_worst_close() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        // Dip after a run-up: peak 115 at index 15, trough 103.5 at 16.
        closes[16] = 103.5;
        let bars = make_bars(&closes);
        let ranks = vec![50.0; bars.len()];
        let event = event_at(&bars, 10, 3.0);
        let params = SimulationParams {
            max_hold_days: 8,
            ..Default::default()
        };
        let result = simulate(&bars, &ranks, &event, &ExitStrategy::BuyAndHold, &params, None);
        let expected_dd = 100.0 * (103.5 / 115.0 - 1.0);
        assert!((result.max_drawdown - expected_dd).abs() < 1e-9);
    }
}
