//! Strategy comparator — runs every exit strategy over every entry event
//! and aggregates population-level performance.
//!
//! Simulations are independent per (event, strategy) and fan out across
//! rayon workers; the only shared step is the final aggregation.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use exitlab_core::domain::{Bar, EntryEvent};
use exitlab_core::sim::{simulate, ExitStrategy, ExpectancyTable, SimulationParams, SimulationResult};

use crate::stats::{mean, population_std_dev, quantile};

/// Confidence tier for a sample size.
///
/// n≥20 VH, 10–19 H, 5–9 M, 3–4 L, otherwise VL. Empty populations also
/// report VL; emptiness is signaled by the sample count itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "VH")]
    VeryHigh,
    #[serde(rename = "H")]
    High,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "VL")]
    VeryLow,
}

impl Confidence {
    pub fn from_sample_size(n: usize) -> Confidence {
        match n {
            n if n >= 20 => Confidence::VeryHigh,
            10..=19 => Confidence::High,
            5..=9 => Confidence::Medium,
            3..=4 => Confidence::Low,
            _ => Confidence::VeryLow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::VeryHigh => "VH",
            Confidence::High => "H",
            Confidence::Medium => "M",
            Confidence::Low => "L",
            Confidence::VeryLow => "VL",
        }
    }
}

/// Aggregate performance of one strategy over the entry-event population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub strategy_name: String,
    pub total_trades: usize,
    /// Mean realized return, percent.
    pub avg_return: f64,
    pub median_return: f64,
    /// Fraction of trades with a positive return.
    pub win_rate: f64,
    pub avg_hold_days: f64,
    /// mean / population stdev of event returns; 0 by convention at n=1 or
    /// zero variance.
    pub sharpe_ratio: f64,
    /// Worst single-event drawdown across the population, percent.
    pub max_drawdown: f64,
    /// Gross profit / |gross loss|; +inf sentinel when there are no losers.
    pub profit_factor: f64,
    pub expectancy: f64,
}

/// Full comparison output: strategy_name → performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub strategies: BTreeMap<String, StrategyPerformance>,
    pub best_strategy: Option<String>,
    pub entry_events_count: usize,
    pub confidence: Confidence,
    pub success: bool,
}

/// Run every strategy over every event and aggregate.
pub fn run_comparison(
    bars: &[Bar],
    ranks: &[f64],
    events: &[EntryEvent],
    strategies: &[ExitStrategy],
    params: &SimulationParams,
    expectancy: Option<&ExpectancyTable>,
) -> ComparisonReport {
    let mut report = BTreeMap::new();
    for strategy in strategies {
        let sims = simulate_all(bars, ranks, events, strategy, params, expectancy);
        report.insert(strategy.name(), aggregate(&strategy.name(), &sims));
    }

    let best_strategy = select_best(&report);
    ComparisonReport {
        best_strategy,
        entry_events_count: events.len(),
        confidence: Confidence::from_sample_size(events.len()),
        success: !events.is_empty(),
        strategies: report,
    }
}

/// Simulate one strategy over all events in parallel.
pub fn simulate_all(
    bars: &[Bar],
    ranks: &[f64],
    events: &[EntryEvent],
    strategy: &ExitStrategy,
    params: &SimulationParams,
    expectancy: Option<&ExpectancyTable>,
) -> Vec<SimulationResult> {
    events
        .par_iter()
        .map(|event| simulate(bars, ranks, event, strategy, params, expectancy))
        .collect()
}

/// Aggregate one strategy's simulations into a performance record.
pub fn aggregate(strategy_name: &str, sims: &[SimulationResult]) -> StrategyPerformance {
    let n = sims.len();
    let returns: Vec<f64> = sims.iter().map(|s| s.final_return).collect();

    if n == 0 {
        return StrategyPerformance {
            strategy_name: strategy_name.to_string(),
            total_trades: 0,
            avg_return: f64::NAN,
            median_return: f64::NAN,
            win_rate: f64::NAN,
            avg_hold_days: f64::NAN,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            profit_factor: f64::NAN,
            expectancy: f64::NAN,
        };
    }

    let avg_return = mean(&returns);
    let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let win_rate = wins.len() as f64 / n as f64;

    let std = population_std_dev(&returns);
    // n=1 has zero population stdev by construction; both degenerate cases
    // report 0 rather than NaN or a division blowup.
    let sharpe_ratio = if n < 2 || std < 1e-15 {
        0.0
    } else {
        avg_return / std
    };

    let gross_profit: f64 = wins.iter().sum();
    let gross_loss: f64 = -losses.iter().sum::<f64>();
    let profit_factor = if gross_loss < 1e-15 {
        if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        gross_profit / gross_loss
    };

    let avg_win = if wins.is_empty() { 0.0 } else { mean(&wins) };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        -mean(&losses)
    };
    let expectancy = win_rate * avg_win - (1.0 - win_rate) * avg_loss;

    let max_drawdown = sims
        .iter()
        .map(|s| s.max_drawdown)
        .fold(0.0_f64, f64::min);

    StrategyPerformance {
        strategy_name: strategy_name.to_string(),
        total_trades: n,
        avg_return,
        median_return: quantile(&returns, 0.5),
        win_rate,
        avg_hold_days: mean(&sims.iter().map(|s| s.total_days_held as f64).collect::<Vec<_>>()),
        sharpe_ratio,
        max_drawdown,
        profit_factor,
        expectancy,
    }
}

/// Best strategy = argmax sharpe, ties broken by higher avg_return.
fn select_best(report: &BTreeMap<String, StrategyPerformance>) -> Option<String> {
    report
        .values()
        .filter(|p| p.total_trades > 0)
        .max_by(|a, b| {
            a.sharpe_ratio
                .partial_cmp(&b.sharpe_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.avg_return
                        .partial_cmp(&b.avg_return)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        })
        .map(|p| p.strategy_name.clone())
}

/// Mean return per holding day 1..=horizon across simulations.
///
/// After a simulation exits, its realized return is carried forward so every
/// day has the full population behind it. Empty populations produce NaN.
pub fn mean_return_curve(sims: &[SimulationResult], horizon: usize) -> Vec<f64> {
    (1..=horizon)
        .map(|d| {
            if sims.is_empty() {
                return f64::NAN;
            }
            let values: Vec<f64> = sims
                .iter()
                .map(|s| {
                    s.daily_analysis
                        .get(d - 1)
                        .map(|r| r.return_pct)
                        .unwrap_or(s.final_return)
                })
                .collect();
            mean(&values)
        })
        .collect()
}
