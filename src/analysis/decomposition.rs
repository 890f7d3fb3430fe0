//! Classical moving-average decomposition.
//!
//! Splits a series into trend, seasonal and remainder components:
//! - Trend: centered moving average of one full period (2x12 MA for monthly data)
//! - Seasonal: per-position average of the detrended series, normalized
//! - Remainder: what is left after removing trend and seasonal
//!
//! Trend and remainder are undefined (`NaN`) for the first and last half
//! period where the centered average has no full window.

use crate::error::{ForecastError, Result};
use crate::utils::stats::variance;
use serde::Serialize;

/// How the seasonal component combines with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionKind {
    /// y = trend + seasonal + remainder
    #[default]
    Additive,
    /// y = trend * seasonal * remainder
    Multiplicative,
}

/// Result of a classical decomposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub kind: DecompositionKind,
    pub period: usize,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub remainder: Vec<f64>,
}

impl Decomposition {
    /// Seasonal strength in `[0, 1]`, `max(0, 1 - Var(R) / Var(S + R))`.
    ///
    /// Only positions where the remainder is defined take part.
    pub fn seasonal_strength(&self) -> f64 {
        strength(&self.seasonal, &self.remainder, self.kind)
    }

    /// Trend strength in `[0, 1]`, `max(0, 1 - Var(R) / Var(T + R))`.
    pub fn trend_strength(&self) -> f64 {
        strength(&self.trend, &self.remainder, self.kind)
    }

    /// One full cycle of seasonal indices, starting at the first observation.
    pub fn seasonal_indices(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

fn strength(component: &[f64], remainder: &[f64], kind: DecompositionKind) -> f64 {
    let (combined, rem): (Vec<f64>, Vec<f64>) = component
        .iter()
        .zip(remainder)
        .filter(|(c, r)| c.is_finite() && r.is_finite())
        .map(|(&c, &r)| match kind {
            DecompositionKind::Additive => (c + r, r),
            DecompositionKind::Multiplicative => (c * r, r),
        })
        .unzip();

    if rem.len() < 2 {
        return 0.0;
    }

    let var_combined = variance(&combined);
    if var_combined < 1e-10 {
        return 0.0;
    }

    (1.0 - variance(&rem) / var_combined).max(0.0)
}

/// Classical decomposition with a centered moving average trend.
///
/// Requires at least two full periods. Multiplicative decomposition
/// requires strictly positive data.
pub fn classical_decompose(
    series: &[f64],
    period: usize,
    kind: DecompositionKind,
) -> Result<Decomposition> {
    if period < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "decomposition period must be at least 2, got {}",
            period
        )));
    }
    if series.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: series.len(),
        });
    }
    if kind == DecompositionKind::Multiplicative && series.iter().any(|&y| y <= 0.0) {
        return Err(ForecastError::InvalidParameter(
            "multiplicative decomposition requires positive data".to_string(),
        ));
    }

    let n = series.len();
    let trend = centered_moving_average(series, period);

    let detrended: Vec<f64> = series
        .iter()
        .zip(&trend)
        .map(|(&y, &t)| {
            if t.is_nan() {
                f64::NAN
            } else {
                match kind {
                    DecompositionKind::Additive => y - t,
                    DecompositionKind::Multiplicative => y / t,
                }
            }
        })
        .collect();

    let mut indices = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, &d) in detrended.iter().enumerate() {
        if !d.is_nan() {
            indices[i % period] += d;
            counts[i % period] += 1;
        }
    }
    for (index, &count) in indices.iter_mut().zip(&counts) {
        if count > 0 {
            *index /= count as f64;
        }
    }

    let center = indices.iter().sum::<f64>() / period as f64;
    match kind {
        DecompositionKind::Additive => indices.iter_mut().for_each(|s| *s -= center),
        DecompositionKind::Multiplicative => {
            if center.abs() > 1e-10 {
                indices.iter_mut().for_each(|s| *s /= center);
            }
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| indices[i % period]).collect();
    let remainder: Vec<f64> = (0..n)
        .map(|i| {
            if trend[i].is_nan() {
                return f64::NAN;
            }
            match kind {
                DecompositionKind::Additive => series[i] - trend[i] - seasonal[i],
                DecompositionKind::Multiplicative => series[i] / (trend[i] * seasonal[i]),
            }
        })
        .collect();

    Ok(Decomposition {
        kind,
        period,
        trend,
        seasonal,
        remainder,
    })
}

/// Centered moving average over one period; `NaN` where the window is incomplete.
fn centered_moving_average(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        *slot = if period % 2 == 0 {
            let mut s = 0.5 * series[i - half] + 0.5 * series[i + half];
            for &val in &series[(i - half + 1)..(i + half)] {
                s += val;
            }
            s / period as f64
        } else {
            series[(i - half)..=(i + half)].iter().sum::<f64>() / period as f64
        };
    }

    trend
}
