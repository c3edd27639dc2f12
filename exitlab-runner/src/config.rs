//! Serializable analysis configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use exitlab_core::domain::RankTarget;
use exitlab_core::policy::PolicyConfig;
use exitlab_core::sim::ExitStrategy;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Validation failures for an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("percentile threshold {0} outside (0, 50]")]
    ThresholdOutOfRange(f64),

    #[error("lookback window {0} outside [20, 2000] days")]
    LookbackOutOfRange(usize),

    #[error("max hold days {0} outside [1, 252]")]
    MaxHoldOutOfRange(usize),

    #[error("at least one exit strategy is required")]
    NoStrategies,
}

/// Full configuration for one analysis run.
///
/// Captures everything needed to reproduce a run: the entry definition, the
/// ranking window, the indicator parameters, and the strategy roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Symbol under analysis.
    pub ticker: String,

    /// Entry trigger: percentile rank at or below this value.
    pub percentile_threshold: f64,

    /// Trailing window for percentile ranking, in trading days.
    pub lookback_days: usize,

    /// Simulation horizon per entry.
    pub max_hold_days: usize,

    /// Series the percentile rank is computed over.
    pub rank_target: RankTarget,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_rsi_ma_period")]
    pub rsi_ma_period: usize,

    /// Require a trending regime (ADX gate) at entry.
    #[serde(default)]
    pub require_momentum: bool,

    #[serde(default = "default_adx_threshold")]
    pub adx_threshold: f64,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Exit strategies to compare.
    pub strategies: Vec<ExitStrategy>,
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_ma_period() -> usize {
    5
}

fn default_adx_threshold() -> f64 {
    20.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            percentile_threshold: 5.0,
            lookback_days: 252,
            max_hold_days: 21,
            rank_target: RankTarget::RsiMa,
            rsi_period: default_rsi_period(),
            rsi_ma_period: default_rsi_ma_period(),
            require_momentum: false,
            adx_threshold: default_adx_threshold(),
            policy: PolicyConfig::default(),
            strategies: ExitStrategy::default_set(7),
        }
    }
}

impl AnalysisConfig {
    /// Checks every parameter range; returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::EmptyTicker);
        }
        if !(self.percentile_threshold > 0.0 && self.percentile_threshold <= 50.0) {
            return Err(ConfigError::ThresholdOutOfRange(self.percentile_threshold));
        }
        if !(20..=2000).contains(&self.lookback_days) {
            return Err(ConfigError::LookbackOutOfRange(self.lookback_days));
        }
        if !(1..=252).contains(&self.max_hold_days) {
            return Err(ConfigError::MaxHoldOutOfRange(self.max_hold_days));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        Ok(())
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Identical configs hash to the same RunId, so reports from repeated
    /// runs can be matched up.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("AnalysisConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
