//! Differencing utilities for ARIMA models.

use super::polynomial::{multiply, seasonal_factor};

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Seasonal differencing order
/// * `period` - Seasonal period
///
/// # Returns
/// The seasonally differenced series, empty if the series is too short.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Coefficients of `(1 - B)^d (1 - B^s)^D`, indexed by power of `B`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    for _ in 0..seasonal_d {
        poly = multiply(&poly, &seasonal_factor(&[-1.0], period));
    }
    poly
}

/// Seasonal then regular differencing, `(1 - B)^d (1 - B^s)^D y`.
pub fn difference_full(series: &[f64], d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    difference(&seasonal_difference(series, seasonal_d, period), d)
}

/// Invert differencing for values that continue `history`.
///
/// `differenced` holds future values of `(1 - B)^d (1 - B^s)^D y`; the
/// result holds the matching future values of `y`.
pub fn integrate(
    differenced: &[f64],
    history: &[f64],
    d: usize,
    seasonal_d: usize,
    period: usize,
) -> Vec<f64> {
    let poly = differencing_polynomial(d, seasonal_d, period);
    let order = poly.len() - 1;
    if order == 0 {
        return differenced.to_vec();
    }

    let mut extended = history.to_vec();
    let start = extended.len();
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(j, _)| j <= t)
            .map(|(j, &c)| c * extended[t - j])
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(start)
}
