//! Comparison report and the data handed to plotting front ends.

use crate::analysis::{classical_decompose, Correlogram, Decomposition, DecompositionKind};
use crate::config::PipelineConfig;
use crate::core::{Split, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::evaluation::Metric;
use crate::pipeline::{StrategyOutcome, StrategyResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Outcomes of one holdout comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub dataset: Option<String>,
    pub train_len: usize,
    pub test_len: usize,
    pub config: PipelineConfig,
    outcomes: Vec<StrategyOutcome>,
    #[serde(skip)]
    series: TimeSeries,
    #[serde(skip)]
    split: Split,
}

impl ComparisonReport {
    pub fn new(
        series: TimeSeries,
        split: Split,
        config: PipelineConfig,
        outcomes: Vec<StrategyOutcome>,
    ) -> Self {
        Self {
            dataset: series.name().map(str::to_string),
            train_len: split.train.len(),
            test_len: split.test.len(),
            config,
            outcomes,
            series,
            split,
        }
    }

    /// Outcomes in strategy registration order.
    pub fn outcomes(&self) -> &[StrategyOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, name: &str) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| o.name() == name)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &StrategyResult> {
        self.outcomes.iter().filter_map(StrategyOutcome::result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StrategyOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    /// Successful strategies ordered by ascending test `metric`.
    ///
    /// Strategies without a finite value are left out; ties keep
    /// registration order.
    pub fn ranking_by(&self, metric: Metric) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .outcomes
            .iter()
            .filter_map(|o| Some((o.name(), o.test_metric(metric)?)))
            .filter(|(_, v)| v.is_finite())
            .collect();
        ranking.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranking
    }

    /// Name of the strategy with the lowest test `metric`.
    pub fn best_by(&self, metric: Metric) -> Option<&str> {
        self.ranking_by(metric).first().map(|(name, _)| *name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ForecastError::Serialization(e.to_string()))
    }

    /// Series, decomposition, correlogram and forecast-versus-actual data.
    pub fn plot_data(&self) -> PlotData {
        let values = self.series.values();
        let period = self.config.seasonal_period;
        let max_lag = (2 * period).min(values.len().saturating_sub(1));

        let forecasts = self
            .succeeded()
            .map(|result| ForecastTrace {
                strategy: result.name.clone(),
                timestamps: self.split.test.timestamps().to_vec(),
                actual: self.split.test.values().to_vec(),
                forecast: result.forecast.point().to_vec(),
                lower: result.forecast.lower().map(<[f64]>::to_vec),
                upper: result.forecast.upper().map(<[f64]>::to_vec),
            })
            .collect();

        PlotData {
            timestamps: self.series.timestamps().to_vec(),
            values: values.to_vec(),
            train_len: self.train_len,
            decomposition: classical_decompose(values, period, DecompositionKind::Additive).ok(),
            correlogram: Correlogram::compute(values, max_lag),
            forecasts,
        }
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Holdout comparison: {} (train {}, test {})",
            self.dataset.as_deref().unwrap_or("unnamed series"),
            self.train_len,
            self.test_len
        )?;

        let metrics = &self.config.accuracy_metrics;
        write!(f, "{:<14}", "Strategy")?;
        for metric in metrics {
            write!(f, "{:>14}", metric.to_string())?;
        }
        writeln!(f, "{:>12}", "LB p-value")?;

        for outcome in &self.outcomes {
            write!(f, "{:<14}", outcome.name())?;
            match outcome {
                StrategyOutcome::Succeeded(result) => {
                    for &metric in metrics {
                        match result.test_accuracy.get(metric) {
                            Some(v) => write!(f, "{:>14.4}", v)?,
                            None => write!(f, "{:>14}", "-")?,
                        }
                    }
                    match &result.diagnostics {
                        Some(d) if d.ljung_box.p_value.is_finite() => {
                            writeln!(f, "{:>12.4}", d.ljung_box.p_value)?
                        }
                        _ => writeln!(f, "{:>12}", "-")?,
                    }
                }
                StrategyOutcome::Failed { stage, error, .. } => {
                    writeln!(f, "  failed at {}: {}", stage, error)?;
                }
            }
        }

        for result in self.succeeded() {
            if let Some(parameters) = &result.parameters {
                writeln!(f, "{}: {}", result.name, parameters.summary())?;
            }
        }
        Ok(())
    }
}

/// Forecast of one strategy next to the held-out actuals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTrace {
    pub strategy: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub actual: Vec<f64>,
    pub forecast: Vec<f64>,
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
}

/// Inputs for the time series, decomposition, ACF/PACF and
/// forecast-versus-actual plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
    /// Observations before the holdout.
    pub train_len: usize,
    /// `None` when the series is shorter than two cycles.
    pub decomposition: Option<Decomposition>,
    pub correlogram: Correlogram,
    pub forecasts: Vec<ForecastTrace>,
}
