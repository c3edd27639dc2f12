//! ExitLab Runner — analysis orchestration over `exitlab-core`.
//!
//! This crate builds on `exitlab-core` to provide:
//! - Strategy comparison over the full entry-event population
//! - Trend-significance diagnostics on mean-return curves
//! - Historical percentile → forward-return mapping
//! - Optimal-exit-day selection with percentile targets
//! - Serializable run configuration with content-addressed run IDs

pub mod comparator;
pub mod config;
pub mod mapper;
pub mod optimal;
pub mod runner;
pub mod stats;
pub mod trend;

pub use comparator::{
    mean_return_curve, run_comparison, simulate_all, ComparisonReport, Confidence,
    StrategyPerformance,
};
pub use config::{AnalysisConfig, ConfigError, RunId};
pub use mapper::{
    expectancy_table, forward_return, map_history, performance_matrix, BinStats, MapperReport,
    PerformanceMatrixCell, SignalCategory,
};
pub use optimal::{select_optimal_exit, EfficiencyEntry, ExitPercentileTarget, OptimalExitReport};
pub use runner::{run_analysis, AnalysisReport, EXPECTANCY_HORIZON};
pub use trend::{analyze_trend, significance_label, TrendAnalysis};
