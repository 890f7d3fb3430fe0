//! Accuracy metrics comparing forecasts with held-out actuals.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Accuracy metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    /// Mean squared error.
    Mse,
    /// Mean absolute error.
    Mae,
    /// Root mean squared error.
    Rmse,
    /// Mean absolute percentage error, as a fraction.
    Mape,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mse, Metric::Mae, Metric::Rmse, Metric::Mape];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Mse => "MSE",
            Metric::Mae => "MAE",
            Metric::Rmse => "RMSE",
            Metric::Mape => "MAPE",
        };
        f.write_str(name)
    }
}

/// What MAPE does with an actual value of exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroActualPolicy {
    /// Average over the non-zero actuals; fail only if all are zero.
    #[default]
    Exclude,
    /// Fail on the first zero actual.
    Error,
}

/// Metric values for one forecast/actual pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AccuracyReport {
    /// Number of compared points.
    pub n: usize,
    pub metrics: BTreeMap<Metric, f64>,
}

impl AccuracyReport {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    pub fn mse(&self) -> Option<f64> {
        self.get(Metric::Mse)
    }

    pub fn mae(&self) -> Option<f64> {
        self.get(Metric::Mae)
    }

    pub fn rmse(&self) -> Option<f64> {
        self.get(Metric::Rmse)
    }

    pub fn mape(&self) -> Option<f64> {
        self.get(Metric::Mape)
    }
}

/// Computes a configured set of metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    metrics: Vec<Metric>,
    zero_actual_policy: ZeroActualPolicy,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            zero_actual_policy: ZeroActualPolicy::default(),
        }
    }
}

impl Evaluator {
    pub fn new(metrics: &[Metric], zero_actual_policy: ZeroActualPolicy) -> Self {
        Self {
            metrics: metrics.to_vec(),
            zero_actual_policy,
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Compare equal-length `forecast` and `actual`.
    pub fn evaluate(&self, forecast: &[f64], actual: &[f64]) -> Result<AccuracyReport> {
        if forecast.len() != actual.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: actual.len(),
                got: forecast.len(),
            });
        }
        if actual.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let n = actual.len() as f64;
        let mse = actual
            .iter()
            .zip(forecast)
            .map(|(a, f)| (a - f) * (a - f))
            .sum::<f64>()
            / n;

        let mut metrics = BTreeMap::new();
        for &metric in &self.metrics {
            let value = match metric {
                Metric::Mse => mse,
                Metric::Rmse => mse.sqrt(),
                Metric::Mae => {
                    actual
                        .iter()
                        .zip(forecast)
                        .map(|(a, f)| (a - f).abs())
                        .sum::<f64>()
                        / n
                }
                Metric::Mape => mape(forecast, actual, self.zero_actual_policy)?,
            };
            metrics.insert(metric, value);
        }

        Ok(AccuracyReport {
            n: actual.len(),
            metrics,
        })
    }

    /// Compare in-sample fitted values, skipping points where the fit is
    /// undefined (`NaN`).
    pub fn evaluate_in_sample(&self, fitted: &[f64], actual: &[f64]) -> Result<AccuracyReport> {
        if fitted.len() != actual.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: actual.len(),
                got: fitted.len(),
            });
        }

        let (fitted, actual): (Vec<f64>, Vec<f64>) = fitted
            .iter()
            .zip(actual)
            .filter(|(f, _)| !f.is_nan())
            .map(|(&f, &a)| (f, a))
            .unzip();

        self.evaluate(&fitted, &actual)
    }
}

/// All four metrics with zero actuals excluded from MAPE.
///
/// # Example
/// ```
/// use forecast_holdout::evaluation::{evaluate, Metric};
///
/// let report = evaluate(&[2.0, 4.0], &[1.0, 5.0]).unwrap();
/// assert_eq!(report.get(Metric::Mse), Some(1.0));
/// assert_eq!(report.get(Metric::Mape), Some(0.6));
/// ```
pub fn evaluate(forecast: &[f64], actual: &[f64]) -> Result<AccuracyReport> {
    Evaluator::default().evaluate(forecast, actual)
}

fn mape(forecast: &[f64], actual: &[f64], policy: ZeroActualPolicy) -> Result<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (index, (a, f)) in actual.iter().zip(forecast).enumerate() {
        if *a == 0.0 {
            match policy {
                ZeroActualPolicy::Error => return Err(ForecastError::DivisionByZero { index }),
                ZeroActualPolicy::Exclude => continue,
            }
        }
        sum += ((a - f) / a).abs();
        count += 1;
    }

    if count == 0 {
        return Err(ForecastError::DivisionByZero { index: 0 });
    }
    Ok(sum / count as f64)
}
