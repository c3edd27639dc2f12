//! ExitLab CLI — exit-timing analysis commands.
//!
//! Commands:
//! - `analyze` — run the full pipeline (scan, compare, map, optimal exit)
//!   from a bars CSV and a TOML config, writing a JSON report
//! - `simulate` — run a single exit strategy over the scanned entries and
//!   print its aggregate performance

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use exitlab_core::domain::{Bar, IndicatorSeries};
use exitlab_core::percentile::percentile_ranks;
use exitlab_core::scan::{scan_entries, MomentumFilter};
use exitlab_core::sim::{ExitStrategy, SimulationParams};
use exitlab_runner::comparator::aggregate;
use exitlab_runner::{
    expectancy_table, run_analysis, simulate_all, AnalysisConfig, AnalysisReport,
    EXPECTANCY_HORIZON,
};

#[derive(Parser)]
#[command(name = "exitlab", about = "ExitLab CLI — momentum-percentile exit analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline and write a JSON report.
    Analyze {
        /// Path to a bars CSV (date,open,high,low,close,volume).
        #[arg(long)]
        bars: PathBuf,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: PathBuf,

        /// Output path for the JSON report. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Simulate one exit strategy over the scanned entry events.
    Simulate {
        /// Path to a bars CSV (date,open,high,low,close,volume).
        #[arg(long)]
        bars: PathBuf,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: PathBuf,

        /// Strategy name, e.g. buy_and_hold, fixed_days_7,
        /// trailing_stop_atr, adaptive_exit_pressure, conditional_expectancy.
        #[arg(long)]
        strategy: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { bars, config, out } => run_analyze(&bars, &config, out.as_deref()),
        Commands::Simulate {
            bars,
            config,
            strategy,
        } => run_simulate(&bars, &config, &strategy),
    }
}

/// One CSV row; the symbol comes from the config, not the file.
#[derive(Debug, Deserialize)]
struct BarRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

fn load_bars(path: &Path, symbol: &str) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open bars CSV: {}", path.display()))?;

    let mut bars = Vec::new();
    for (line, row) in reader.deserialize::<BarRow>().enumerate() {
        let row = row.with_context(|| format!("bad CSV record at data row {}", line + 1))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .with_context(|| format!("bad date '{}' at data row {}", row.date, line + 1))?;
        bars.push(Bar {
            symbol: symbol.to_string(),
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    if bars.is_empty() {
        bail!("bars CSV is empty: {}", path.display());
    }
    Ok(bars)
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: AnalysisConfig =
        toml::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(config)
}

fn run_analyze(bars_path: &Path, config_path: &Path, out: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let bars = load_bars(bars_path, &config.ticker)?;

    let report = run_analysis(&bars, &config)?;
    print_summary(&report);

    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            println!("Report saved to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_simulate(bars_path: &Path, config_path: &Path, strategy_name: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    let bars = load_bars(bars_path, &config.ticker)?;

    let Some(strategy) = config
        .strategies
        .iter()
        .find(|s| s.name() == strategy_name)
        .cloned()
        .or_else(|| builtin_strategy(strategy_name))
    else {
        bail!(
            "unknown strategy '{strategy_name}'. Valid: buy_and_hold, fixed_days_N, \
             trailing_stop_atr, adaptive_exit_pressure, conditional_expectancy"
        );
    };

    let series = IndicatorSeries::from_bars(&bars, config.rsi_period, config.rsi_ma_period);
    let ranks = percentile_ranks(series.target(config.rank_target), config.lookback_days);
    let filter = MomentumFilter {
        require_momentum: config.require_momentum,
        adx_threshold: config.adx_threshold,
        ..MomentumFilter::default()
    };
    let events = scan_entries(
        &config.ticker,
        &bars,
        &ranks,
        config.percentile_threshold,
        &filter,
    );
    if events.is_empty() {
        bail!(
            "no entry events at/below percentile {} for {}",
            config.percentile_threshold,
            config.ticker
        );
    }

    let expectancy = expectancy_table(&bars, &events, EXPECTANCY_HORIZON);
    let params = SimulationParams {
        max_hold_days: config.max_hold_days,
        policy: config.policy,
        ..SimulationParams::default()
    };
    let sims = simulate_all(&bars, &ranks, &events, &strategy, &params, Some(&expectancy));
    let perf = aggregate(&strategy.name(), &sims);

    println!();
    println!("=== Strategy Performance ===");
    println!("Strategy:       {}", perf.strategy_name);
    println!("Entries:        {}", perf.total_trades);
    println!("Avg Return:     {:+.2}%", perf.avg_return);
    println!("Median Return:  {:+.2}%", perf.median_return);
    println!("Win Rate:       {:.1}%", perf.win_rate * 100.0);
    println!("Avg Hold:       {:.1} days", perf.avg_hold_days);
    println!("Sharpe:         {:.3}", perf.sharpe_ratio);
    println!("Max Drawdown:   {:+.2}%", perf.max_drawdown);
    println!("Profit Factor:  {:.2}", perf.profit_factor);
    println!("Expectancy:     {:+.2}%", perf.expectancy);
    println!();
    Ok(())
}

/// Strategies addressable by name without appearing in the config roster.
fn builtin_strategy(name: &str) -> Option<ExitStrategy> {
    match name {
        "buy_and_hold" => Some(ExitStrategy::BuyAndHold),
        "trailing_stop_atr" => Some(ExitStrategy::TrailingStopAtr {
            atr_period: 14,
            multiplier: 2.0,
        }),
        "adaptive_exit_pressure" => Some(ExitStrategy::AdaptivePressure),
        "conditional_expectancy" => Some(ExitStrategy::ConditionalExpectancy),
        _ => name
            .strip_prefix("fixed_days_")
            .and_then(|d| d.parse::<usize>().ok())
            .map(|days| ExitStrategy::FixedDays { days }),
    }
}

fn print_summary(report: &AnalysisReport) {
    println!();
    println!("=== Exit Analysis ===");
    println!("Ticker:         {}", report.ticker);
    println!("Run ID:         {}", report.run_id);
    println!(
        "Entry Events:   {} (confidence {})",
        report.comparison.entry_events_count,
        report.comparison.confidence.label()
    );
    println!();
    println!("--- Strategies ---");
    for perf in report.comparison.strategies.values() {
        println!(
            "{:<26} avg {:+6.2}%  win {:5.1}%  sharpe {:6.3}  hold {:4.1}d",
            perf.strategy_name,
            perf.avg_return,
            perf.win_rate * 100.0,
            perf.sharpe_ratio,
            perf.avg_hold_days
        );
    }
    if let Some(best) = &report.comparison.best_strategy {
        println!();
        println!("Best:           {best}");
    }
    println!();
    println!("--- Optimal Exit ---");
    println!("Optimal Day:    {}", report.optimal.optimal_day);
    println!("Efficiency:     {:+.3} %/day", report.optimal.optimal_efficiency);
    println!("Target Return:  {:+.2}%", report.optimal.target_return);
    if let Some(target) = &report.optimal.exit_percentile_target {
        println!(
            "Exit Range:     {} ({:+.2}%, {:.0}% success, n={}, {})",
            target.percentile_range,
            target.actual_return,
            target.success_rate * 100.0,
            target.sample_size,
            target.confidence.label()
        );
    }
    println!();
    println!("--- Trend ---");
    println!(
        "Direction:      {} (r = {:+.3}, p = {:.4})",
        report.trend.trend_direction, report.trend.trend_correlation, report.trend.trend_p_value
    );
    println!(
        "Peak:           day {} at {:+.2}%",
        report.trend.peak_day, report.trend.peak_return
    );
    println!(
        "Early vs Late:  {}",
        report.trend.early_vs_late_significance
    );
    println!();
}
