//! Optimal-exit selection — picks the holding day with the best
//! return-per-day efficiency and, where the performance matrix supports it,
//! the percentile range that historically exits best on that day.

use serde::{Deserialize, Serialize};

use crate::comparator::Confidence;
use crate::mapper::PerformanceMatrixCell;

/// One day's efficiency entry, ordered best-first in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyEntry {
    pub day: usize,
    /// Mean cumulative return divided by days held.
    pub efficiency: f64,
    pub total_return: f64,
}

/// Percentile range whose historical exits on the optimal day performed best.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitPercentileTarget {
    pub percentile_range: String,
    pub actual_return: f64,
    pub success_rate: f64,
    pub sample_size: usize,
    pub confidence: Confidence,
}

/// Optimal-exit recommendation over a mean-return curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalExitReport {
    /// 1-indexed holding day with the highest return-per-day; 0 when the
    /// curve has no defined days.
    pub optimal_day: usize,
    /// Return-per-day at the optimal day, in %/day; NaN when undefined.
    pub optimal_efficiency: f64,
    pub target_return: f64,
    pub efficiency_rankings: Vec<EfficiencyEntry>,
    pub exit_percentile_target: Option<ExitPercentileTarget>,
}

/// Build the recommendation from a curve indexed by day 1..=n and the
/// bin-by-day matrix.
///
/// NaN curve days are skipped both for the optimum and the rankings. The
/// percentile target requires at least three samples in a cell; thinner
/// cells are ignored rather than recommended.
pub fn select_optimal_exit(
    curve: &[f64],
    matrix: &[PerformanceMatrixCell],
) -> OptimalExitReport {
    let mut rankings: Vec<EfficiencyEntry> = curve
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, &total)| {
            let day = i + 1;
            EfficiencyEntry {
                day,
                efficiency: total / day as f64,
                total_return: total,
            }
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let (optimal_day, optimal_efficiency, target_return) = rankings
        .first()
        .map(|e| (e.day, e.efficiency, e.total_return))
        .unwrap_or((0, f64::NAN, f64::NAN));

    let exit_percentile_target = best_cell_for_day(matrix, optimal_day);

    OptimalExitReport {
        optimal_day,
        optimal_efficiency,
        target_return,
        efficiency_rankings: rankings,
        exit_percentile_target,
    }
}

fn best_cell_for_day(
    matrix: &[PerformanceMatrixCell],
    day: usize,
) -> Option<ExitPercentileTarget> {
    matrix
        .iter()
        .filter(|c| c.day == day && c.sample_size >= 3)
        .filter(|c| !c.expected_cumulative_return.is_nan())
        .max_by(|a, b| {
            a.expected_cumulative_return
                .partial_cmp(&b.expected_cumulative_return)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| ExitPercentileTarget {
            percentile_range: c.percentile_range.clone(),
            actual_return: c.expected_cumulative_return,
            success_rate: c.expected_success_rate,
            sample_size: c.sample_size,
            confidence: c.confidence_level,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(range: &str, day: usize, ret: f64, n: usize) -> PerformanceMatrixCell {
        PerformanceMatrixCell {
            percentile_range: range.to_string(),
            day,
            expected_cumulative_return: ret,
            expected_success_rate: 0.8,
            sample_size: n,
            confidence_level: Confidence::from_sample_size(n),
            p25_return: ret - 1.0,
            p75_return: ret + 1.0,
        }
    }

    #[test]
    fn front_loaded_curve_picks_early_day() {
        // Day 2 carries 3.0 → 1.5/day, the best rate.
        let curve = vec![1.0, 3.0, 3.3, 3.6, 4.0];
        let report = select_optimal_exit(&curve, &[]);
        assert_eq!(report.optimal_day, 2);
        assert!((report.optimal_efficiency - 1.5).abs() < 1e-12);
        assert!((report.target_return - 3.0).abs() < 1e-12);
        assert_eq!(report.efficiency_rankings[0].day, 2);
        assert!((report.efficiency_rankings[0].efficiency - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rankings_are_descending() {
        let curve = vec![0.5, 2.0, 2.1, 6.0, 5.0];
        let report = select_optimal_exit(&curve, &[]);
        for pair in report.efficiency_rankings.windows(2) {
            assert!(pair[0].efficiency >= pair[1].efficiency);
        }
    }

    #[test]
    fn nan_days_are_skipped() {
        let curve = vec![f64::NAN, 2.0, f64::NAN, 1.0];
        let report = select_optimal_exit(&curve, &[]);
        assert_eq!(report.optimal_day, 2);
        assert_eq!(report.efficiency_rankings.len(), 2);
    }

    #[test]
    fn empty_curve_has_no_optimum() {
        let report = select_optimal_exit(&[], &[]);
        assert_eq!(report.optimal_day, 0);
        assert!(report.optimal_efficiency.is_nan());
        assert!(report.target_return.is_nan());
        assert!(report.exit_percentile_target.is_none());
    }

    #[test]
    fn percentile_target_requires_three_samples() {
        let curve = vec![1.0, 4.0];
        let matrix = vec![
            cell("0-20", 2, 9.0, 2),  // too thin to recommend
            cell("20-35", 2, 5.0, 6),
            cell("30-45", 2, 7.0, 4),
            cell("0-20", 1, 20.0, 10), // wrong day
        ];
        let report = select_optimal_exit(&curve, &matrix);
        assert_eq!(report.optimal_day, 2);
        let target = report.exit_percentile_target.unwrap();
        assert_eq!(target.percentile_range, "30-45");
        assert!((target.actual_return - 7.0).abs() < 1e-12);
        assert_eq!(target.sample_size, 4);
    }
}
