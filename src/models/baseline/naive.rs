//! Naive forecasting model.
//!
//! The naive method carries a single scalar from the training data forward
//! for every future period: either the training mean or the last value.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, ModelParameters};
use crate::utils::quantile_normal;
use serde::Serialize;
use tracing::debug;

/// Which scalar the naive forecaster repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NaiveMethod {
    /// Average of all training observations.
    #[default]
    Mean,
    /// Last training observation.
    Last,
}

/// Naive forecaster that repeats one value.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    method: NaiveMethod,
    value: Option<f64>,
    n: usize,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    sigma: Option<f64>,
}

impl Naive {
    /// Naive forecaster repeating the training mean.
    pub fn new() -> Self {
        Self::default()
    }

    /// Naive forecaster repeating the last training value.
    pub fn last_value() -> Self {
        Self::with_method(NaiveMethod::Last)
    }

    pub fn with_method(method: NaiveMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn method(&self) -> NaiveMethod {
        self.method
    }

    /// Standard error of the h-step forecast.
    fn standard_error(&self, sigma: f64, h: usize) -> f64 {
        match self.method {
            NaiveMethod::Mean => sigma * (1.0 + 1.0 / self.n as f64).sqrt(),
            NaiveMethod::Last => sigma * (h as f64).sqrt(),
        }
    }
}

impl Forecaster for Naive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let last = match values.last() {
            Some(&last) => last,
            None => {
                return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
            }
        };

        let n = values.len();
        let (value, fitted) = match self.method {
            NaiveMethod::Mean => {
                // Centered on the first value so constant input is reproduced exactly.
                let mean = values[0]
                    + values.iter().map(|v| v - values[0]).sum::<f64>() / n as f64;
                (mean, vec![mean; n])
            }
            NaiveMethod::Last => {
                // Fitted values are shifted history (y_hat[t] = y[t-1])
                let mut fitted = Vec::with_capacity(n);
                fitted.push(f64::NAN);
                fitted.extend_from_slice(&values[..n - 1]);
                (last, fitted)
            }
        };

        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();

        let valid: Vec<f64> = residuals.iter().copied().filter(|r| !r.is_nan()).collect();
        let sigma = match (self.method, valid.len()) {
            (_, 0) => None,
            (NaiveMethod::Mean, m) if m > 1 => {
                Some((valid.iter().map(|r| r * r).sum::<f64>() / (m - 1) as f64).sqrt())
            }
            (NaiveMethod::Mean, _) => None,
            (NaiveMethod::Last, m) => {
                Some((valid.iter().map(|r| r * r).sum::<f64>() / m as f64).sqrt())
            }
        };

        debug!(method = ?self.method, value, n, "naive fitted");

        self.value = Some(value);
        self.n = n;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.sigma = sigma;

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let value = self.value.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        Ok(Forecast::from_values(vec![value; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let value = self.value.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let sigma = match self.sigma {
            Some(sigma) => sigma,
            None => return self.predict(horizon),
        };

        let z = quantile_normal((1.0 + level) / 2.0);

        let (lower, upper): (Vec<f64>, Vec<f64>) = (1..=horizon)
            .map(|h| {
                let se = self.standard_error(sigma, h);
                (value - z * se, value + z * se)
            })
            .unzip();

        Ok(Forecast::from_values_with_intervals(
            vec![value; horizon],
            lower,
            upper,
            level,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn parameters(&self) -> Option<ModelParameters> {
        self.value.map(|value| ModelParameters::Naive {
            method: self.method,
            value,
            sigma: self.sigma.unwrap_or(f64::NAN),
        })
    }

    fn name(&self) -> &str {
        "Naive"
    }
}
