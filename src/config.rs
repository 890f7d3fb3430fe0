//! Pipeline configuration.

use crate::error::{ForecastError, Result};
use crate::evaluation::{Metric, ZeroActualPolicy};
use serde::{Deserialize, Serialize};

pub use crate::models::arima::{ArimaSearchConfig, InformationCriterion};

/// Options of one holdout comparison run.
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```
/// use forecast_holdout::config::PipelineConfig;
///
/// let config = PipelineConfig::from_toml_str(r#"
///     horizon = 6
///     [arima]
///     max_p = 1
/// "#).unwrap();
///
/// assert_eq!(config.horizon, 6);
/// assert_eq!(config.seasonal_period, 12);
/// assert_eq!(config.arima.max_p, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Held-out observations at the end of the series.
    pub horizon: usize,
    /// Observations per seasonal cycle.
    pub seasonal_period: usize,
    /// Upper bound on seasonal plus regular differences.
    pub max_differencing_order: usize,
    pub accuracy_metrics: Vec<Metric>,
    /// Nominal coverage of prediction intervals.
    pub interval_level: f64,
    pub zero_actual_policy: ZeroActualPolicy,
    /// Ljung-Box lags, `min(2s, n/5)` when unset.
    pub ljung_box_lags: Option<usize>,
    pub arima: ArimaSearchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            seasonal_period: 12,
            max_differencing_order: 2,
            accuracy_metrics: Metric::ALL.to_vec(),
            interval_level: 0.95,
            zero_actual_policy: ZeroActualPolicy::Exclude,
            ljung_box_lags: None,
            arima: ArimaSearchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForecastError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::Config("horizon must be positive".into()));
        }
        if self.seasonal_period == 0 {
            return Err(ForecastError::Config("seasonal_period must be positive".into()));
        }
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(ForecastError::Config(format!(
                "interval_level {} must lie in (0, 1)",
                self.interval_level
            )));
        }
        if self.accuracy_metrics.is_empty() {
            return Err(ForecastError::Config("accuracy_metrics is empty".into()));
        }
        if !(self.arima.significance > 0.0 && self.arima.significance < 1.0) {
            return Err(ForecastError::Config(format!(
                "arima.significance {} must lie in (0, 1)",
                self.arima.significance
            )));
        }
        Ok(())
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_max_differencing_order(mut self, order: usize) -> Self {
        self.max_differencing_order = order;
        self
    }

    pub fn with_metrics(mut self, metrics: &[Metric]) -> Self {
        self.accuracy_metrics = metrics.to_vec();
        self
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }

    pub fn with_zero_actual_policy(mut self, policy: ZeroActualPolicy) -> Self {
        self.zero_actual_policy = policy;
        self
    }

    pub fn with_ljung_box_lags(mut self, lags: usize) -> Self {
        self.ljung_box_lags = Some(lags);
        self
    }

    pub fn with_arima(mut self, arima: ArimaSearchConfig) -> Self {
        self.arima = arima;
        self
    }
}
