//! Annealing schedule configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Temperature below which a run is considered converged.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-3;

/// Caller-supplied settings for one optimization run.
///
/// ```
/// use grid_route_planner::config::AnnealingConfig;
///
/// let config = AnnealingConfig::default()
///     .with_initial_temperature(100.0)
///     .with_cooling_rate(0.995)
///     .with_tick_interval_ms(0)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.expected_ticks(), 2297);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Starting temperature. Higher values accept more uphill moves early.
    pub initial_temperature: f64,

    /// Geometric cooling factor in (0, 1), applied once per tick.
    pub cooling_rate: f64,

    /// Delay between scheduled ticks.
    pub tick_interval_ms: u64,

    pub convergence_threshold: f64,

    /// Random seed for reproducible runs. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            tick_interval_ms: 10,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    pub fn with_convergence_threshold(mut self, t: f64) -> Self {
        self.convergence_threshold = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t0 = self.initial_temperature;
        if !(t0.is_finite() && t0 > 0.0) {
            return Err(ConfigError::NonPositiveTemperature(t0));
        }
        let rate = self.cooling_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(ConfigError::CoolingRateOutOfRange(rate));
        }
        let threshold = self.convergence_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ConfigError::NonPositiveThreshold(threshold));
        }
        Ok(())
    }

    /// Number of cooling ticks a run takes before it reports convergence:
    /// the smallest `k` with `T0 * rate^k < threshold`, using the same
    /// repeated multiplication as the annealer. Zero for an invalid
    /// configuration.
    pub fn expected_ticks(&self) -> u64 {
        if self.validate().is_err() {
            return 0;
        }
        let mut temperature = self.initial_temperature;
        let mut ticks = 0;
        while temperature >= self.convergence_threshold {
            temperature *= self.cooling_rate;
            ticks += 1;
        }
        ticks
    }
}
