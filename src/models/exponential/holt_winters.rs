//! Holt-Winters forecasting model.
//!
//! Also known as triple exponential smoothing, this model handles
//! data with both trend and seasonality.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, ModelParameters};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;
use serde::Serialize;
use tracing::debug;

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalType {
    /// Additive seasonality: y_t = l_t + b_t + s_t + e_t
    #[default]
    Additive,
    /// Multiplicative seasonality: y_t = (l_t + b_t) * s_t + e_t
    Multiplicative,
}

/// Whether the model carries a trend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    /// Trend weight estimated with the other coefficients.
    #[default]
    Fitted,
    /// Trend weight fixed at 0 with a zero initial trend.
    None,
}

/// Fitted Holt-Winters coefficients and final state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoltWintersParameters {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub seasonal_type: SeasonalType,
    pub trend_mode: TrendMode,
    pub period: usize,
    pub level: f64,
    pub trend: f64,
    /// Seasonal indices, position `i` applies to observations `t` with `t % period == i`.
    pub seasonals: Vec<f64>,
    /// One-step sum of squared errors after the first season.
    pub sse: f64,
}

/// Holt-Winters forecaster.
///
/// The model equations for additive seasonality:
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
///
/// For multiplicative seasonality:
/// - Level: `l_t = α(y_t / s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t / l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = (l_t + h*b_t) * s_{t+h-m}`
///
/// Coefficients lie in `[0, 1]` and are chosen by minimizing the one-step
/// squared error over the training window unless fixed up front.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    /// Seasonal period; `None` uses the period declared on the series.
    period: Option<usize>,
    seasonal_type: SeasonalType,
    trend_mode: TrendMode,
    /// Coefficients supplied by the caller instead of optimized.
    fixed: Option<(f64, f64, f64)>,
    max_iter: usize,
    params: Option<HoltWintersParameters>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    n: usize,
}

impl HoltWinters {
    /// Additive model using the series' seasonal period.
    pub fn new() -> Self {
        Self {
            period: None,
            seasonal_type: SeasonalType::Additive,
            trend_mode: TrendMode::Fitted,
            fixed: None,
            max_iter: 5000,
            params: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            n: 0,
        }
    }

    /// Additive model with an explicit period.
    pub fn additive(period: usize) -> Self {
        Self::new().with_period(period)
    }

    /// Multiplicative model with an explicit period.
    pub fn multiplicative(period: usize) -> Self {
        Self::new()
            .with_period(period)
            .with_seasonal_type(SeasonalType::Multiplicative)
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_seasonal_type(mut self, seasonal_type: SeasonalType) -> Self {
        self.seasonal_type = seasonal_type;
        self
    }

    pub fn with_trend(mut self, trend_mode: TrendMode) -> Self {
        self.trend_mode = trend_mode;
        self
    }

    /// Use fixed coefficients instead of optimizing them.
    pub fn with_coefficients(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.fixed = Some((
            alpha.clamp(0.0, 1.0),
            beta.clamp(0.0, 1.0),
            gamma.clamp(0.0, 1.0),
        ));
        self
    }

    /// Iteration budget for the coefficient search.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn seasonal_type(&self) -> SeasonalType {
        self.seasonal_type
    }

    pub fn trend_mode(&self) -> TrendMode {
        self.trend_mode
    }

    pub fn alpha(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.alpha)
    }

    pub fn beta(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.beta)
    }

    pub fn gamma(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.gamma)
    }

    /// Get the seasonal indices.
    pub fn seasonals(&self) -> Option<&[f64]> {
        self.params.as_ref().map(|p| p.seasonals.as_slice())
    }

    /// Initialize state from the first complete season(s).
    fn initialize_state(
        values: &[f64],
        period: usize,
        seasonal_type: SeasonalType,
        trend_mode: TrendMode,
    ) -> (f64, f64, Vec<f64>) {
        let first_season = &values[..period];
        let level = first_season.iter().sum::<f64>() / period as f64;

        // Average per-step change between the first two seasons
        let trend = match trend_mode {
            TrendMode::None => 0.0,
            TrendMode::Fitted if values.len() >= 2 * period => {
                (0..period)
                    .map(|i| (values[period + i] - values[i]) / period as f64)
                    .sum::<f64>()
                    / period as f64
            }
            TrendMode::Fitted => 0.0,
        };

        let mut seasonals: Vec<f64> = match seasonal_type {
            SeasonalType::Additive => first_season.iter().map(|y| y - level).collect(),
            SeasonalType::Multiplicative => first_season
                .iter()
                .map(|y| if level.abs() > 1e-10 { y / level } else { 1.0 })
                .collect(),
        };

        Self::normalize_seasonals(&mut seasonals, seasonal_type);

        (level, trend, seasonals)
    }

    /// Additive seasonals sum to 0; multiplicative seasonals average to 1.
    fn normalize_seasonals(seasonals: &mut [f64], seasonal_type: SeasonalType) {
        let period = seasonals.len();
        if period == 0 {
            return;
        }

        match seasonal_type {
            SeasonalType::Additive => {
                let adjustment = seasonals.iter().sum::<f64>() / period as f64;
                for s in seasonals.iter_mut() {
                    *s -= adjustment;
                }
            }
            SeasonalType::Multiplicative => {
                let mean: f64 = seasonals.iter().sum::<f64>() / period as f64;
                if mean.abs() > 1e-10 {
                    for s in seasonals.iter_mut() {
                        *s /= mean;
                    }
                }
            }
        }
    }

    /// Run the recursion, returning final state, one-step predictions and SSE.
    ///
    /// The first season only seeds the state, so its predictions are `NaN`.
    fn run_recursion(
        values: &[f64],
        alpha: f64,
        beta: f64,
        gamma: f64,
        period: usize,
        seasonal_type: SeasonalType,
        trend_mode: TrendMode,
    ) -> (f64, f64, Vec<f64>, Vec<f64>, f64) {
        let (mut level, mut trend, mut seasonals) =
            Self::initialize_state(values, period, seasonal_type, trend_mode);

        let mut fitted = vec![f64::NAN; period.min(values.len())];
        fitted.reserve(values.len().saturating_sub(period));
        let mut sse = 0.0;

        for (t, &y) in values.iter().enumerate().skip(period) {
            let season_idx = t % period;
            let s = seasonals[season_idx];

            let forecast = match seasonal_type {
                SeasonalType::Additive => level + trend + s,
                SeasonalType::Multiplicative => (level + trend) * s,
            };
            fitted.push(forecast);

            let error = y - forecast;
            sse += error * error;

            let level_prev = level;

            match seasonal_type {
                SeasonalType::Additive => {
                    level = alpha * (y - s) + (1.0 - alpha) * (level_prev + trend);
                    trend = beta * (level - level_prev) + (1.0 - beta) * trend;
                    seasonals[season_idx] = gamma * (y - level) + (1.0 - gamma) * s;
                }
                SeasonalType::Multiplicative => {
                    let y_deseasonalized = if s.abs() > 1e-10 { y / s } else { y };
                    level = alpha * y_deseasonalized + (1.0 - alpha) * (level_prev + trend);
                    trend = beta * (level - level_prev) + (1.0 - beta) * trend;
                    if level.abs() > 1e-10 {
                        seasonals[season_idx] = gamma * (y / level) + (1.0 - gamma) * s;
                    }
                }
            }
        }

        (level, trend, seasonals, fitted, sse)
    }

    /// Minimize one-step SSE over the coefficients with Nelder-Mead.
    fn optimize_params(&self, values: &[f64], period: usize) -> Result<(f64, f64, f64)> {
        let config = NelderMeadConfig {
            max_iter: self.max_iter,
            tolerance: 1e-8,
            ..Default::default()
        };
        let seasonal_type = self.seasonal_type;
        let trend_mode = self.trend_mode;

        let sse = |alpha: f64, beta: f64, gamma: f64| {
            let (.., sse) = Self::run_recursion(
                values,
                alpha,
                beta,
                gamma,
                period,
                seasonal_type,
                trend_mode,
            );
            if sse.is_finite() {
                sse
            } else {
                f64::MAX
            }
        };

        let result = match trend_mode {
            TrendMode::Fitted => nelder_mead(
                |p| sse(p[0], p[1], p[2]),
                &[0.3, 0.1, 0.1],
                Some(&[(0.0, 1.0), (0.0, 1.0), (0.0, 1.0)]),
                config,
            ),
            TrendMode::None => nelder_mead(
                |p| sse(p[0], 0.0, p[1]),
                &[0.3, 0.1],
                Some(&[(0.0, 1.0), (0.0, 1.0)]),
                config,
            ),
        };

        if !result.converged {
            return Err(ForecastError::NonConvergence {
                iterations: result.iterations,
            });
        }

        let p = &result.optimal_point;
        Ok(match trend_mode {
            TrendMode::Fitted => (
                p[0].clamp(0.0, 1.0),
                p[1].clamp(0.0, 1.0),
                p[2].clamp(0.0, 1.0),
            ),
            TrendMode::None => (p[0].clamp(0.0, 1.0), 0.0, p[1].clamp(0.0, 1.0)),
        })
    }

    fn point_forecast(params: &HoltWintersParameters, n: usize, h: usize) -> f64 {
        let s = params.seasonals[(n + h - 1) % params.period];
        match params.seasonal_type {
            SeasonalType::Additive => params.level + h as f64 * params.trend + s,
            SeasonalType::Multiplicative => (params.level + h as f64 * params.trend) * s,
        }
    }

    /// Variance multiplier of the h-step error in error-correction form:
    /// `1 + Σ_{j<h} (α + αβ·j + (1-α)γ·[j mod m = 0])²`.
    fn variance_multiplier(params: &HoltWintersParameters, h: usize) -> f64 {
        let a = params.alpha;
        let b = params.alpha * params.beta;
        let g = (1.0 - params.alpha) * params.gamma;
        1.0 + (1..h)
            .map(|j| {
                let seasonal = if j % params.period == 0 { g } else { 0.0 };
                (a + b * j as f64 + seasonal).powi(2)
            })
            .sum::<f64>()
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.params = None;
        self.fitted = None;
        self.residuals = None;
        self.residual_variance = None;
        self.n = 0;

        let values = series.values();
        let period = self.period.unwrap_or_else(|| series.seasonal_period());
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Holt-Winters needs a seasonal period of at least 2, got {}",
                period
            )));
        }
        if values.len() < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: values.len(),
            });
        }
        if self.seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&y| y <= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonality requires positive data".to_string(),
            ));
        }

        let (alpha, beta, gamma) = match self.fixed {
            Some((alpha, beta, gamma)) => match self.trend_mode {
                TrendMode::Fitted => (alpha, beta, gamma),
                TrendMode::None => (alpha, 0.0, gamma),
            },
            None => self.optimize_params(values, period)?,
        };

        let (level, trend, seasonals, fitted, sse) = Self::run_recursion(
            values,
            alpha,
            beta,
            gamma,
            period,
            self.seasonal_type,
            self.trend_mode,
        );

        if !sse.is_finite() {
            return Err(ForecastError::FitDivergence(
                "Holt-Winters recursion produced non-finite errors".to_string(),
            ));
        }

        let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let effective = values.len() - period;

        debug!(alpha, beta, gamma, level, trend, sse, "holt-winters fitted");

        self.n = values.len();
        self.residual_variance = Some(sse / effective as f64);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.params = Some(HoltWintersParameters {
            alpha,
            beta,
            gamma,
            seasonal_type: self.seasonal_type,
            trend_mode: self.trend_mode,
            period,
            level,
            trend,
            seasonals,
            sse,
        });

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let params = self.params.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let predictions = (1..=horizon)
            .map(|h| Self::point_forecast(params, self.n, h))
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let params = self.params.as_ref().ok_or(ForecastError::FitRequired)?;
        let variance = self.residual_variance.unwrap_or(0.0);

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let z = quantile_normal((1.0 + level) / 2.0);

        let mut predictions = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for h in 1..=horizon {
            let pred = Self::point_forecast(params, self.n, h);
            let mut se = (variance * Self::variance_multiplier(params, h)).sqrt();
            if params.seasonal_type == SeasonalType::Multiplicative {
                // Residual variance is on the data scale; rescale by the seasonal index.
                se *= params.seasonals[(self.n + h - 1) % params.period];
            }

            predictions.push(pred);
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            predictions,
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
        self.params.clone().map(ModelParameters::HoltWinters)
    }

    fn name(&self) -> &str {
        "HoltWinters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_seasonal_data(n: usize, period: usize, trend: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let seasonal = amplitude * (2.0 * std::f64::consts::PI * t / period as f64).sin();
                10.0 + trend * t + seasonal
            })
            .collect()
    }

    fn monthly(values: Vec<f64>, period: usize) -> TimeSeries {
        TimeSeries::monthly(2015, 1, values, period).unwrap()
    }

    #[test]
    fn hw_fixed_coefficients_additive() {
        let ts = monthly(make_seasonal_data(32, 8, 0.1, 5.0), 8);

        let mut model = HoltWinters::additive(8).with_coefficients(0.3, 0.1, 0.1);
        model.fit(&ts).unwrap();

        assert_eq!(model.alpha(), Some(0.3));
        let forecast = model.predict(8).unwrap();
        assert_eq!(forecast.horizon(), 8);
    }

    #[test]
    fn hw_multiplicative_tracks_growth() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                let base = 100.0 + 0.5 * i as f64;
                let seasonal = 1.0 + 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                base * seasonal
            })
            .collect();
        let ts = monthly(values, 12);

        let mut model = HoltWinters::multiplicative(12);
        model.fit(&ts).unwrap();

        let forecast = model.predict(12).unwrap();
        for (h, &pred) in forecast.point().iter().enumerate() {
            let i = 48 + h;
            let expected = (100.0 + 0.5 * i as f64)
                * (1.0 + 0.2 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin());
            assert!((pred - expected).abs() / expected < 0.05, "h={} {} vs {}", h, pred, expected);
        }
    }

    #[test]
    fn hw_optimized_coefficients_in_unit_interval() {
        let ts = monthly(make_seasonal_data(48, 12, 0.1, 3.0), 12);

        let mut model = HoltWinters::new();
        model.fit(&ts).unwrap();

        for coef in [model.alpha(), model.beta(), model.gamma()] {
            let c = coef.unwrap();
            assert!((0.0..=1.0).contains(&c), "coefficient {} out of range", c);
        }
        assert_eq!(model.seasonals().unwrap().len(), 12);
    }

    #[test]
    fn hw_uses_series_period_by_default() {
        let ts = monthly(make_seasonal_data(24, 4, 0.0, 2.0), 4);
        let mut model = HoltWinters::new();
        model.fit(&ts).unwrap();
        assert_eq!(model.seasonals().unwrap().len(), 4);
    }

    #[test]
    fn hw_captures_seasonality() {
        let values: Vec<f64> = (0..32).map(|i| if i % 4 < 2 { 20.0 } else { 10.0 }).collect();
        let ts = monthly(values, 4);

        let mut model = HoltWinters::additive(4).with_coefficients(0.5, 0.1, 0.5);
        model.fit(&ts).unwrap();

        let preds = model.predict(4).unwrap();
        let preds = preds.point();
        assert!(preds[0] > preds[2] && preds[1] > preds[3]);
    }

    #[test]
    fn hw_without_trend_has_no_drift_across_cycles() {
        let ts = monthly(make_seasonal_data(48, 12, 0.3, 4.0), 12);

        let mut model = HoltWinters::new().with_trend(TrendMode::None);
        model.fit(&ts).unwrap();

        assert_eq!(model.beta(), Some(0.0));
        match model.parameters() {
            Some(ModelParameters::HoltWinters(p)) => assert_eq!(p.trend, 0.0),
            other => panic!("unexpected parameters {:?}", other),
        }

        let preds = model.predict(36).unwrap();
        let preds = preds.point();
        for h in 0..12 {
            assert_relative_eq!(preds[h], preds[h + 12], epsilon = 1e-9);
            assert_relative_eq!(preds[h], preds[h + 24], epsilon = 1e-9);
        }
    }

    #[test]
    fn hw_confidence_intervals_widen() {
        let ts = monthly(make_seasonal_data(48, 12, 0.1, 3.0), 12);
        let noisy: Vec<f64> = ts
            .values()
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 3 == 0 { 0.4 } else { -0.2 })
            .collect();
        let ts = monthly(noisy, 12);

        let mut model = HoltWinters::additive(12).with_coefficients(0.3, 0.1, 0.1);
        model.fit(&ts).unwrap();

        let forecast = model.predict_with_intervals(12, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let preds = forecast.point();

        for i in 0..12 {
            assert!(lower[i] < preds[i] && preds[i] < upper[i]);
        }
        assert!(upper[11] - lower[11] > upper[0] - lower[0]);
    }

    #[test]
    fn hw_non_convergence_is_reported() {
        let ts = monthly(make_seasonal_data(48, 12, 0.1, 3.0), 12);
        let mut model = HoltWinters::new().with_max_iter(2);

        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::NonConvergence { iterations: 2 })
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn hw_failed_refit_clears_previous_fit() {
        let mut model = HoltWinters::additive(4).with_coefficients(0.3, 0.1, 0.1);
        model
            .fit(&monthly(make_seasonal_data(24, 4, 0.1, 2.0), 4))
            .unwrap();
        assert!(model.is_fitted());

        let short = monthly((0..6).map(|i| i as f64).collect(), 4);
        assert!(model.fit(&short).is_err());
        assert!(!model.is_fitted());
        assert!(model.fitted_values().is_none());
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn hw_insufficient_data() {
        let ts = monthly((0..10).map(|i| i as f64).collect(), 8);

        let mut model = HoltWinters::additive(8);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: 16, got: 10 })
        ));
    }

    #[test]
    fn hw_multiplicative_rejects_non_positive() {
        let mut values = make_seasonal_data(24, 4, 0.0, 2.0);
        values[5] = 0.0;
        let mut model = HoltWinters::multiplicative(4);
        assert!(matches!(
            model.fit(&monthly(values, 4)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn hw_requires_fit_before_predict() {
        let model = HoltWinters::additive(4);
        assert!(matches!(model.predict(4), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn hw_fitted_and_residuals() {
        let values = make_seasonal_data(24, 6, 0.1, 2.0);
        let ts = monthly(values.clone(), 6);

        let mut model = HoltWinters::additive(6).with_coefficients(0.3, 0.1, 0.1);
        model.fit(&ts).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();

        assert_eq!(fitted.len(), 24);
        assert!(fitted[..6].iter().all(|f| f.is_nan()));
        for i in 6..24 {
            assert_relative_eq!(residuals[i], values[i] - fitted[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn hw_zero_horizon() {
        let ts = monthly((0..16).map(|i| 10.0 + (i % 4) as f64).collect(), 4);
        let mut model = HoltWinters::additive(4).with_coefficients(0.3, 0.1, 0.1);
        model.fit(&ts).unwrap();

        assert_eq!(model.predict(0).unwrap().horizon(), 0);
    }
}
