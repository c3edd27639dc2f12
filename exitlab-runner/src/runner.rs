//! End-to-end analysis pipeline.
//!
//! Wires the full chain: indicator series → percentile ranks → entry scan →
//! strategy comparison → trend diagnostics → historical mapping →
//! optimal-exit selection, producing one serializable report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use exitlab_core::domain::{Bar, IndicatorSeries};
use exitlab_core::percentile::percentile_ranks;
use exitlab_core::scan::{scan_entries, MomentumFilter};
use exitlab_core::sim::SimulationParams;

use crate::comparator::{mean_return_curve, run_comparison, simulate_all, ComparisonReport};
use crate::config::{AnalysisConfig, ConfigError, RunId};
use crate::mapper::{
    expectancy_table, map_history, performance_matrix, MapperReport, PerformanceMatrixCell,
};
use crate::optimal::{select_optimal_exit, OptimalExitReport};
use crate::trend::{analyze_trend, TrendAnalysis};

/// Horizon the expectancy table is built at.
pub const EXPECTANCY_HORIZON: usize = 7;

/// Complete output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: RunId,
    pub ticker: String,
    pub generated_at: DateTime<Utc>,
    pub comparison: ComparisonReport,
    /// Diagnostics over the best strategy's mean-return curve.
    pub trend: TrendAnalysis,
    pub mapper: MapperReport,
    pub matrix: Vec<PerformanceMatrixCell>,
    pub optimal: OptimalExitReport,
}

/// Run the whole pipeline over one bar history.
///
/// The trend and optimal-exit sections are computed over the curve of the
/// best strategy from the comparison; when no strategy traded, the first
/// configured one stands in (its curve is all-NaN and downstream sections
/// degrade to their undefined forms).
pub fn run_analysis(bars: &[Bar], config: &AnalysisConfig) -> Result<AnalysisReport, ConfigError> {
    config.validate()?;

    let series = IndicatorSeries::from_bars(bars, config.rsi_period, config.rsi_ma_period);
    let ranks = percentile_ranks(series.target(config.rank_target), config.lookback_days);

    let filter = MomentumFilter {
        require_momentum: config.require_momentum,
        adx_threshold: config.adx_threshold,
        ..MomentumFilter::default()
    };
    let events = scan_entries(
        &config.ticker,
        bars,
        &ranks,
        config.percentile_threshold,
        &filter,
    );

    let expectancy = expectancy_table(bars, &events, EXPECTANCY_HORIZON);
    let params = SimulationParams {
        max_hold_days: config.max_hold_days,
        policy: config.policy,
        ..SimulationParams::default()
    };

    let comparison = run_comparison(
        bars,
        &ranks,
        &events,
        &config.strategies,
        &params,
        Some(&expectancy),
    );

    // validate() guarantees at least one strategy.
    let curve_strategy = comparison
        .best_strategy
        .as_ref()
        .and_then(|name| config.strategies.iter().find(|s| &s.name() == name))
        .unwrap_or(&config.strategies[0]);
    let sims = simulate_all(bars, &ranks, &events, curve_strategy, &params, Some(&expectancy));
    let curve = mean_return_curve(&sims, config.max_hold_days);

    let matrix = performance_matrix(bars, &events);

    Ok(AnalysisReport {
        run_id: config.run_id(),
        ticker: config.ticker.clone(),
        generated_at: Utc::now(),
        trend: analyze_trend(&curve),
        mapper: map_history(bars, &ranks, &events),
        optimal: select_optimal_exit(&curve, &matrix),
        matrix,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use exitlab_core::domain::RankTarget;

    fn oscillating_bars(n: usize) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + 10.0 * (i as f64 / 5.0).sin() + 0.02 * i as f64;
                Bar {
                    symbol: "TEST".into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000,
                }
            })
            .collect()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            ticker: "TEST".into(),
            percentile_threshold: 50.0,
            lookback_days: 20,
            rank_target: RankTarget::Rsi,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn pipeline_produces_populated_report() {
        let bars = oscillating_bars(300);
        let report = run_analysis(&bars, &config()).unwrap();

        assert!(report.comparison.entry_events_count > 0);
        assert!(report.comparison.success);
        assert_eq!(report.run_id.len(), 64);
        assert_eq!(report.ticker, "TEST");
        assert_eq!(
            report.comparison.strategies.len(),
            config().strategies.len()
        );
        assert!(report.optimal.optimal_day >= 1);
        assert_eq!(report.matrix.len(), 5 * 21);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        let bars = oscillating_bars(50);
        let mut bad = config();
        bad.max_hold_days = 0;
        assert!(run_analysis(&bars, &bad).is_err());
    }

    #[test]
    fn no_entries_degrades_cleanly() {
        // Monotone rise keeps the rank pinned high; nothing at/below 1.
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars: Vec<Bar> = (0..120)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar {
                    symbol: "TEST".into(),
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000,
                }
            })
            .collect();
        let mut cfg = config();
        cfg.percentile_threshold = 1.0;
        let report = run_analysis(&bars, &cfg).unwrap();
        assert_eq!(report.comparison.entry_events_count, 0);
        assert!(!report.comparison.success);
        assert!(report.comparison.best_strategy.is_none());
        assert_eq!(report.optimal.optimal_day, 0);
    }
}
