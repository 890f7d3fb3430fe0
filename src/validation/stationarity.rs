//! Stationarity tests.
//!
//! KPSS takes level stationarity as its null; ADF takes a unit root as
//! its null. They reject in opposite directions, so callers should ask
//! [`StationarityResult::is_stationary`] rather than read `rejects_null`.

use crate::utils::regression::least_squares;
use crate::utils::stats::mean;
use serde::Serialize;

/// Which test produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StationarityTest {
    Kpss,
    Adf,
}

/// Critical values at the tabulated significance levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CriticalValues {
    pub cv_1pct: f64,
    pub cv_5pct: f64,
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// Critical value for the tabulated level nearest at or below `significance`.
    pub fn at(&self, significance: f64) -> f64 {
        if significance <= 0.01 {
            self.cv_1pct
        } else if significance <= 0.05 {
            self.cv_5pct
        } else {
            self.cv_10pct
        }
    }
}

/// Result of a stationarity test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityResult {
    pub test: StationarityTest,
    pub statistic: f64,
    /// Interpolated from the critical value table, clamped to `[0.01, 0.10]`
    /// for KPSS and `[0.001, 0.99]` for ADF.
    pub p_value: f64,
    /// Bandwidth (KPSS) or augmentation lags (ADF).
    pub lags: usize,
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undefined(test: StationarityTest, lags: usize) -> Self {
        Self {
            test,
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            critical_values: CriticalValues::default(),
        }
    }

    /// Whether the test's null hypothesis is rejected at `significance`.
    pub fn rejects_null(&self, significance: f64) -> bool {
        if self.statistic.is_nan() {
            return false;
        }
        let cv = self.critical_values.at(significance);
        match self.test {
            StationarityTest::Kpss => self.statistic > cv,
            StationarityTest::Adf => self.statistic < cv,
        }
    }

    /// Whether the series looks stationary at `significance`.
    pub fn is_stationary(&self, significance: f64) -> bool {
        match self.test {
            StationarityTest::Kpss => !self.rejects_null(significance),
            StationarityTest::Adf => self.rejects_null(significance),
        }
    }
}

const KPSS_LEVEL_TABLE: [(f64, f64); 4] = [(0.347, 0.10), (0.463, 0.05), (0.574, 0.025), (0.739, 0.01)];

/// KPSS test for level stationarity.
///
/// `lags` is the Bartlett bandwidth for the long-run variance; the
/// default is `floor(4 * (n / 100)^0.25)`. A constant series is
/// stationary (statistic 0).
pub fn kpss_test(series: &[f64], lags: Option<usize>) -> StationarityResult {
    let n = series.len();

    if n < 4 {
        return StationarityResult::undefined(StationarityTest::Kpss, 0);
    }

    let lags = lags.unwrap_or_else(|| (4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize);
    let lags = lags.min(n / 2).max(1);

    let m = mean(series);
    let residuals: Vec<f64> = series.iter().map(|&x| x - m).collect();

    let mut partial = 0.0;
    let eta: f64 = residuals
        .iter()
        .map(|&r| {
            partial += r;
            partial * partial
        })
        .sum::<f64>()
        / (n * n) as f64;

    let mut long_run = residuals.iter().map(|&r| r * r).sum::<f64>() / n as f64;
    for j in 1..=lags {
        let weight = 1.0 - j as f64 / (lags + 1) as f64;
        let autocovariance: f64 = residuals
            .iter()
            .skip(j)
            .zip(residuals.iter())
            .map(|(&a, &b)| a * b)
            .sum::<f64>()
            / n as f64;
        long_run += 2.0 * weight * autocovariance;
    }

    let critical_values = CriticalValues {
        cv_1pct: 0.739,
        cv_5pct: 0.463,
        cv_10pct: 0.347,
    };

    if long_run <= 1e-12 {
        return StationarityResult {
            test: StationarityTest::Kpss,
            statistic: 0.0,
            p_value: 0.10,
            lags,
            critical_values,
        };
    }

    let statistic = eta / long_run;

    StationarityResult {
        test: StationarityTest::Kpss,
        statistic,
        p_value: kpss_p_value(statistic),
        lags,
        critical_values,
    }
}

fn kpss_p_value(statistic: f64) -> f64 {
    let (first_stat, first_p) = KPSS_LEVEL_TABLE[0];
    if statistic <= first_stat {
        return first_p;
    }
    for pair in KPSS_LEVEL_TABLE.windows(2) {
        let (s0, p0) = pair[0];
        let (s1, p1) = pair[1];
        if statistic <= s1 {
            return p0 + (p1 - p0) * (statistic - s0) / (s1 - s0);
        }
    }
    0.01
}

/// Augmented Dickey-Fuller test with a constant.
///
/// Fits `dy_t = a + b*y_{t-1} + sum_i g_i*dy_{t-i} + e_t` and reports the
/// t-ratio of `b`. The augmentation order is chosen by AIC up to
/// `max_lags` (default `floor((n-1)^(1/3))`) on a common sample.
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> StationarityResult {
    let n = series.len();

    if n < 6 {
        return StationarityResult::undefined(StationarityTest::Adf, 0);
    }

    let max_lags = max_lags.unwrap_or_else(|| ((n - 1) as f64).powf(1.0 / 3.0).floor() as usize);
    let max_lags = max_lags.min((n - 4) / 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(usize, f64, f64)> = None;
    for lag in 0..=max_lags {
        let (rows, target) = adf_design(series, &diff, lag, max_lags);
        let fit = match least_squares(&rows, &target) {
            Some(fit) => fit,
            None => continue,
        };
        if fit.rss <= 0.0 {
            continue;
        }
        let m = target.len() as f64;
        let aic = m * (fit.rss / m).ln() + 2.0 * fit.coefficients.len() as f64;
        let t_ratio = fit.coefficients[1] / fit.std_errors[1];
        if best.map_or(true, |(_, best_aic, _)| aic < best_aic) {
            best = Some((lag, aic, t_ratio));
        }
    }

    let (lag, _, statistic) = match best {
        Some(found) if found.2.is_finite() => found,
        _ => return StationarityResult::undefined(StationarityTest::Adf, 0),
    };

    let critical_values = adf_critical_values(n);

    StationarityResult {
        test: StationarityTest::Adf,
        statistic,
        p_value: adf_p_value(statistic, &critical_values),
        lags: lag,
        critical_values,
    }
}

fn adf_design(series: &[f64], diff: &[f64], lag: usize, start: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rows = Vec::with_capacity(diff.len() - start);
    let mut target = Vec::with_capacity(diff.len() - start);
    for t in start..diff.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(series[t]);
        for i in 1..=lag {
            row.push(diff[t - i]);
        }
        rows.push(row);
        target.push(diff[t]);
    }
    (rows, target)
}

/// MacKinnon (2010) response-surface critical values, constant only.
fn adf_critical_values(n: usize) -> CriticalValues {
    let t = n as f64;
    let surface = |tau: f64, c1: f64, c2: f64| tau + c1 / t + c2 / (t * t);
    CriticalValues {
        cv_1pct: surface(-3.43035, -6.5393, -16.786),
        cv_5pct: surface(-2.86154, -2.8903, -4.234),
        cv_10pct: surface(-2.56677, -1.5384, -2.809),
    }
}

fn adf_p_value(statistic: f64, cv: &CriticalValues) -> f64 {
    let table = [(cv.cv_1pct, 0.01), (cv.cv_5pct, 0.05), (cv.cv_10pct, 0.10)];
    if statistic <= table[0].0 {
        // Below the 1% value the tail shrinks quickly.
        return (0.01 * (statistic - table[0].0).exp()).max(0.001);
    }
    for pair in table.windows(2) {
        let (s0, p0) = pair[0];
        let (s1, p1) = pair[1];
        if statistic <= s1 {
            return p0 + (p1 - p0) * (statistic - s0) / (s1 - s0);
        }
    }
    // Above the 10% value: approach 1 as the statistic turns positive.
    let excess = statistic - table[2].0;
    (0.10 + 0.89 * (1.0 - (-excess / 1.5).exp())).min(0.99)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    fn random_walk(n: usize, seed: u64) -> Vec<f64> {
        let mut level = 0.0;
        white_noise(n, seed)
            .into_iter()
            .map(|shock| {
                level += shock;
                level
            })
            .collect()
    }

    // ==================== kpss_test ====================

    #[test]
    fn kpss_white_noise_is_stationary() {
        let result = kpss_test(&white_noise(200, 1), None);

        assert!(result.statistic > 0.0);
        assert!(result.is_stationary(0.05));
        assert!(!result.rejects_null(0.05));
    }

    #[test]
    fn kpss_trend_rejects() {
        let series: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
        let result = kpss_test(&series, Some(10));

        assert!(result.rejects_null(0.05));
        assert!(!result.is_stationary(0.05));
        assert_eq!(result.p_value, 0.01);
    }

    #[test]
    fn kpss_constant_series_is_stationary() {
        let result = kpss_test(&[4.0; 50], None);
        assert_eq!(result.statistic, 0.0);
        assert!(result.is_stationary(0.05));
    }

    #[test]
    fn kpss_short_series_is_undefined() {
        let result = kpss_test(&[1.0, 2.0, 3.0], None);
        assert!(result.statistic.is_nan());
        assert!(!result.rejects_null(0.05));
    }

    #[test]
    fn kpss_p_value_interpolates() {
        assert_eq!(kpss_p_value(0.1), 0.10);
        assert!((kpss_p_value(0.405) - 0.075).abs() < 1e-3);
        assert_eq!(kpss_p_value(2.0), 0.01);
    }

    // ==================== adf_test ====================

    #[test]
    fn adf_white_noise_rejects_unit_root() {
        let result = adf_test(&white_noise(200, 2), None);

        assert!(result.statistic < result.critical_values.cv_1pct);
        assert!(result.is_stationary(0.05));
        assert!(result.p_value <= 0.01);
    }

    #[test]
    fn adf_random_walk_keeps_unit_root() {
        let result = adf_test(&random_walk(200, 3), None);

        assert!(!result.statistic.is_nan());
        assert!(!result.is_stationary(0.01));
        assert!(result.p_value > 0.01 && result.p_value <= 0.99);
    }

    #[test]
    fn adf_critical_values_are_ordered() {
        let cv = adf_critical_values(100);
        assert!(cv.cv_1pct < cv.cv_5pct);
        assert!(cv.cv_5pct < cv.cv_10pct);
        assert!((cv.cv_5pct - (-2.8906)).abs() < 1e-3);
    }

    #[test]
    fn adf_short_series_is_undefined() {
        let result = adf_test(&[1.0, 2.0, 3.0], None);
        assert!(result.statistic.is_nan());
        assert!(!result.is_stationary(0.05));
    }

    #[test]
    fn critical_value_lookup() {
        let cv = CriticalValues {
            cv_1pct: 1.0,
            cv_5pct: 5.0,
            cv_10pct: 10.0,
        };
        assert_eq!(cv.at(0.01), 1.0);
        assert_eq!(cv.at(0.05), 5.0);
        assert_eq!(cv.at(0.1), 10.0);
    }
}
