//! Sample autocorrelation and partial autocorrelation.

use crate::utils::stats::{mean, quantile_normal};
use serde::Serialize;

/// Autocorrelation at a specific lag.
///
/// A series with (numerically) zero variance has no correlation structure
/// and reports 0 at every positive lag.
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }

    let m = mean(series);

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &x) in series.iter().enumerate() {
        denominator += (x - m).powi(2);
        if i >= lag {
            numerator += (x - m) * (series[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return if lag == 0 { 1.0 } else { 0.0 };
    }

    numerator / denominator
}

/// Autocorrelations for lags `0..=max_lag` (shorter if the series is).
pub fn acf(series: &[f64], max_lag: usize) -> Vec<f64> {
    if series.is_empty() {
        return vec![];
    }
    let max_lag = max_lag.min(series.len() - 1);
    (0..=max_lag).map(|k| autocorrelation(series, k)).collect()
}

/// Partial autocorrelations for lags `1..=max_lag` via Durbin-Levinson.
pub fn pacf(series: &[f64], max_lag: usize) -> Vec<f64> {
    let r = acf(series, max_lag);
    if r.len() < 2 {
        return vec![];
    }
    let max_lag = r.len() - 1;

    let mut out = Vec::with_capacity(max_lag);
    let mut phi = vec![0.0; max_lag + 1];
    let mut prev = vec![0.0; max_lag + 1];

    phi[1] = r[1];
    out.push(r[1]);

    for k in 2..=max_lag {
        prev[..k].copy_from_slice(&phi[..k]);

        let mut num = r[k];
        let mut denom = 1.0;
        for j in 1..k {
            num -= prev[j] * r[k - j];
            denom -= prev[j] * r[j];
        }

        if denom.abs() < 1e-10 {
            out.extend(std::iter::repeat(f64::NAN).take(max_lag - k + 1));
            break;
        }

        phi[k] = num / denom;
        for j in 1..k {
            phi[j] = prev[j] - phi[k] * prev[k - j];
        }
        out.push(phi[k]);
    }

    out
}

/// Test whether the autocorrelation at the seasonal lag is significant.
///
/// The lag-`period` autocorrelation is compared against its Bartlett
/// standard error built from the lower lags, one-sided at `significance`.
/// Series shorter than two full cycles never test as seasonal.
pub fn seasonal_acf_test(series: &[f64], period: usize, significance: f64) -> bool {
    if period < 2 || series.len() < 2 * period {
        return false;
    }

    let r = acf(series, period);
    let r_sq_sum: f64 = r[1..period].iter().map(|&x| x * x).sum();
    let stat = ((1.0 + 2.0 * r_sq_sum) / series.len() as f64).sqrt();
    let r_m = r[period];

    r_m.abs() / stat > quantile_normal(1.0 - significance)
}

/// ACF/PACF values with the approximate 95% white-noise band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlogram {
    /// Autocorrelations for lags 1..=max_lag.
    pub acf: Vec<f64>,
    /// Partial autocorrelations for lags 1..=max_lag.
    pub pacf: Vec<f64>,
    /// Half-width of the band, `1.96 / sqrt(n)`.
    pub bound: f64,
}

impl Correlogram {
    pub fn compute(series: &[f64], max_lag: usize) -> Self {
        let acf_values = acf(series, max_lag);
        Self {
            acf: acf_values.into_iter().skip(1).collect(),
            pacf: pacf(series, max_lag),
            bound: 1.96 / (series.len() as f64).sqrt(),
        }
    }

    /// Lags (1-based) whose autocorrelation falls outside the band.
    pub fn significant_acf_lags(&self) -> Vec<usize> {
        self.acf
            .iter()
            .enumerate()
            .filter(|(_, r)| r.abs() > self.bound)
            .map(|(i, _)| i + 1)
            .collect()
    }
}
