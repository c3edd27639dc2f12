//! Exposure policy — maps (pressure, state, stop) to a discrete action.
//!
//! Pure ordered-rule evaluation, first match wins:
//! 1. trailing stop hit → exit everything
//! 2. pressure at/above the high threshold → full exit (optionally softened
//!    to a half reduction while the lifecycle has not reached
//!    distribution/reversal)
//! 3. pressure at/above the partial threshold in a late state → trim a quarter
//! 4. hold

use serde::{Deserialize, Serialize};

use crate::state::TradeState;

/// Discrete exposure action, ordered from benign to severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureAction {
    Hold,
    Reduce25,
    Reduce50,
    ExitAll,
}

impl ExposureAction {
    pub fn label(&self) -> &'static str {
        match self {
            ExposureAction::Hold => "hold",
            ExposureAction::Reduce25 => "reduce_25",
            ExposureAction::Reduce50 => "reduce_50",
            ExposureAction::ExitAll => "exit_all",
        }
    }
}

/// Per-day decision record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureDecision {
    pub day_index: usize,
    pub action: ExposureAction,
    pub triggered_stop: bool,
    pub triggered_exit_signal: bool,
}

/// Policy thresholds. Passed explicitly — no ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Pressure at/above which rule 2 fires.
    pub high_pressure_threshold: f64,
    /// Pressure at/above which rule 3 fires in late states.
    pub partial_pressure_threshold: f64,
    /// When set, rule 2 yields Reduce50 instead of ExitAll while the state
    /// has not yet reached distribution/reversal.
    pub soften_early_full_exit: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            high_pressure_threshold: 70.0,
            partial_pressure_threshold: 50.0,
            soften_early_full_exit: false,
        }
    }
}

/// Evaluate the policy for one day.
pub fn decide(
    day_index: usize,
    pressure: f64,
    state: TradeState,
    trailing_stop_hit: bool,
    config: &PolicyConfig,
) -> ExposureDecision {
    if trailing_stop_hit {
        return ExposureDecision {
            day_index,
            action: ExposureAction::ExitAll,
            triggered_stop: true,
            triggered_exit_signal: false,
        };
    }

    if pressure >= config.high_pressure_threshold {
        let action = if config.soften_early_full_exit && !state.is_late() {
            ExposureAction::Reduce50
        } else {
            ExposureAction::ExitAll
        };
        return ExposureDecision {
            day_index,
            action,
            triggered_stop: false,
            triggered_exit_signal: true,
        };
    }

    if pressure >= config.partial_pressure_threshold && state.is_late() {
        return ExposureDecision {
            day_index,
            action: ExposureAction::Reduce25,
            triggered_stop: false,
            triggered_exit_signal: false,
        };
    }

    ExposureDecision {
        day_index,
        action: ExposureAction::Hold,
        triggered_stop: false,
        triggered_exit_signal: false,
    }
}
