//! Seasonal ARIMA model with a fixed order.
//!
//! The model is `φ(B)Φ(B^s)(1-B)^d(1-B^s)^D (y_t - μ_t) = θ(B)Θ(B^s) e_t`,
//! fitted by conditional maximum likelihood on the differenced series.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference_full, differencing_polynomial, integrate};
use crate::models::arima::polynomial::{
    ar_operator, is_invertible, is_stationary, ma_operator, multiply, seasonal_factor,
    transform_ar, transform_ma,
};
use crate::models::{Forecaster, ModelParameters};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Bound on the unconstrained coefficients; `tanh(8)` keeps partial
/// autocorrelations strictly inside the unit interval.
const RAW_BOUND: f64 = 8.0;

/// SARIMA order `(p,d,q)(P,D,Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaOrder {
    /// Non-seasonal ARIMA(p,d,q).
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 1,
        }
    }

    /// Seasonal ARIMA(p,d,q)(P,D,Q)[s].
    pub fn seasonal(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q): (usize, usize, usize),
        period: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    /// Number of AR and MA coefficients to estimate.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Highest lag of the expanded AR polynomial.
    pub fn ar_lag(&self) -> usize {
        self.p + self.period * self.seasonal_p
    }

    /// Highest lag of the expanded MA polynomial.
    pub fn ma_lag(&self) -> usize {
        self.q + self.period * self.seasonal_q
    }

    /// Observations consumed by differencing.
    pub fn differencing_lag(&self) -> usize {
        self.d + self.period * self.seasonal_d
    }

    pub fn has_seasonal_terms(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }
}

impl fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_seasonal_terms() {
            write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                self.p, self.d, self.q, self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
            )
        } else {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        }
    }
}

/// Information criterion used to rank candidate orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    /// Small-sample corrected AIC.
    #[default]
    Aicc,
    Bic,
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aic => write!(f, "AIC"),
            Self::Aicc => write!(f, "AICc"),
            Self::Bic => write!(f, "BIC"),
        }
    }
}

/// Fitted SARIMA coefficients and fit statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaParameters {
    pub order: SarimaOrder,
    /// Non-seasonal AR coefficients φ.
    pub ar: Vec<f64>,
    /// Non-seasonal MA coefficients θ.
    pub ma: Vec<f64>,
    /// Seasonal AR coefficients Φ.
    pub seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients Θ.
    pub seasonal_ma: Vec<f64>,
    /// Mean of the differenced series (drift when `d + D = 1`), 0 when excluded.
    pub constant: f64,
    pub include_mean: bool,
    /// Innovation variance.
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    /// Observations entering the conditional likelihood.
    pub n_used: usize,
}

impl ArimaParameters {
    pub fn criterion(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }

    /// Estimated coefficients including the mean.
    pub fn num_estimated(&self) -> usize {
        self.order.num_coefficients() + usize::from(self.include_mean)
    }
}

/// Seasonal ARIMA forecaster with a fixed order.
#[derive(Debug, Clone)]
pub struct Sarima {
    order: SarimaOrder,
    /// `None` includes the mean when `d + D <= 1`.
    include_mean: Option<bool>,
    max_iter: usize,
    /// Differenced observations held back before the likelihood sum.
    conditioning_lag: usize,
    params: Option<ArimaParameters>,
    /// Expanded AR coefficients, index `i` is lag `i + 1`.
    ar_full: Vec<f64>,
    /// Expanded MA coefficients, index `j` is lag `j + 1`.
    ma_full: Vec<f64>,
    history: Vec<f64>,
    /// Demeaned differenced series.
    centered: Vec<f64>,
    innovations: Vec<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Sarima {
    pub fn new(order: SarimaOrder) -> Self {
        Self {
            order,
            include_mean: None,
            max_iter: 5000,
            conditioning_lag: 0,
            params: None,
            ar_full: Vec::new(),
            ma_full: Vec::new(),
            history: Vec::new(),
            centered: Vec::new(),
            innovations: Vec::new(),
            fitted: None,
            residuals: None,
        }
    }

    /// Force the mean term on or off.
    pub fn with_mean(mut self, include: bool) -> Self {
        self.include_mean = Some(include);
        self
    }

    /// Iteration budget for the likelihood search.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Condition the likelihood on at least `lag` differenced observations.
    ///
    /// Orders with different AR lags only have comparable information
    /// criteria when they are scored on the same observations, so an order
    /// search passes the largest AR lag of its grid to every candidate.
    pub fn with_conditioning_lag(mut self, lag: usize) -> Self {
        self.conditioning_lag = lag;
        self
    }

    /// First differenced observation entering the likelihood.
    fn likelihood_start(&self) -> usize {
        self.order.ar_lag().max(self.conditioning_lag)
    }

    pub fn order(&self) -> SarimaOrder {
        self.order
    }

    pub fn fitted_parameters(&self) -> Option<&ArimaParameters> {
        self.params.as_ref()
    }

    pub fn aic(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.aic)
    }

    pub fn aicc(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.aicc)
    }

    pub fn bic(&self) -> Option<f64> {
        self.params.as_ref().map(|p| p.bic)
    }

    /// Split an unconstrained parameter vector into stable factor coefficients.
    fn decode(order: &SarimaOrder, raw: &[f64]) -> [Vec<f64>; 4] {
        let (phi, rest) = raw.split_at(order.p);
        let (theta, rest) = rest.split_at(order.q);
        let (seasonal_phi, seasonal_theta) = rest.split_at(order.seasonal_p);
        [
            transform_ar(phi),
            transform_ma(theta),
            transform_ar(seasonal_phi),
            transform_ma(seasonal_theta),
        ]
    }

    /// Expand factor coefficients into full-lag AR and MA coefficients.
    fn expand(order: &SarimaOrder, factors: &[Vec<f64>; 4]) -> (Vec<f64>, Vec<f64>) {
        let [phi, theta, seasonal_phi, seasonal_theta] = factors;
        let negated: Vec<f64> = seasonal_phi.iter().map(|c| -c).collect();
        let ar_poly = multiply(&ar_operator(phi), &seasonal_factor(&negated, order.period));
        let ma_poly = multiply(&ma_operator(theta), &seasonal_factor(seasonal_theta, order.period));

        let ar = ar_poly[1..].iter().map(|c| -c).collect();
        let ma = ma_poly[1..].to_vec();
        (ar, ma)
    }

    /// Conditional sum of squares from `start`, treating pre-sample
    /// innovations as zero.
    fn css(centered: &[f64], ar: &[f64], ma: &[f64], start: usize) -> (f64, Vec<f64>) {
        let n = centered.len();
        let mut errors = vec![0.0; n];
        let mut css = 0.0;

        for t in ar.len()..n {
            let mut pred = 0.0;
            for (i, &a) in ar.iter().enumerate() {
                pred += a * centered[t - 1 - i];
            }
            for (j, &m) in ma.iter().enumerate().take(t) {
                pred += m * errors[t - 1 - j];
            }
            let error = centered[t] - pred;
            errors[t] = error;
            if t >= start {
                css += error * error;
            }
        }

        (css, errors)
    }

    fn concentrated_nll(css: f64, n_eff: usize) -> f64 {
        let n = n_eff as f64;
        0.5 * n * (css / n).max(f64::MIN_POSITIVE).ln()
    }

    /// Psi weights of the full model on the original scale.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let ar_poly: Vec<f64> = std::iter::once(1.0)
            .chain(self.ar_full.iter().map(|c| -c))
            .collect();
        let pi = multiply(
            &ar_poly,
            &differencing_polynomial(self.order.d, self.order.seasonal_d, self.order.period),
        );

        let mut psi = Vec::with_capacity(horizon);
        psi.push(1.0);
        for j in 1..horizon {
            let mut value = self.ma_full.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(pi.len() - 1) {
                value -= pi[i] * psi[j - i];
            }
            psi.push(value);
        }
        psi
    }

    fn point_forecasts(&self, horizon: usize) -> Result<Vec<f64>> {
        let params = self.params.as_ref().ok_or(ForecastError::FitRequired)?;

        let mut z = self.centered.clone();
        let mut e = self.innovations.clone();
        for _ in 0..horizon {
            let t = z.len();
            let mut pred = 0.0;
            for (i, &a) in self.ar_full.iter().enumerate() {
                if i < t {
                    pred += a * z[t - 1 - i];
                }
            }
            for (j, &m) in self.ma_full.iter().enumerate() {
                if j < t {
                    pred += m * e[t - 1 - j];
                }
            }
            z.push(pred);
            e.push(0.0);
        }

        let future: Vec<f64> = z[self.centered.len()..]
            .iter()
            .map(|v| v + params.constant)
            .collect();

        Ok(integrate(
            &future,
            &self.history,
            self.order.d,
            self.order.seasonal_d,
            self.order.period,
        ))
    }
}

impl Forecaster for Sarima {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.params = None;
        self.fitted = None;
        self.residuals = None;

        let order = self.order;
        let start = self.likelihood_start();
        if order.period == 0 || (order.period == 1 && order.has_seasonal_terms()) {
            return Err(ForecastError::InvalidParameter(format!(
                "{} needs a seasonal period above 1",
                order
            )));
        }

        let values = series.values();
        let include_mean = self
            .include_mean
            .unwrap_or(order.d + order.seasonal_d <= 1);
        let n_coef = order.num_coefficients() + usize::from(include_mean);
        // One more free parameter for the innovation variance.
        let k = n_coef + 1;

        let needed = order.differencing_lag() + start + k + 2;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let w = difference_full(values, order.d, order.seasonal_d, order.period);
        let constant = if include_mean { mean(&w) } else { 0.0 };
        let centered: Vec<f64> = w.iter().map(|v| v - constant).collect();
        let n_eff = centered.len() - start;

        let factors = if order.num_coefficients() == 0 {
            [Vec::new(), Vec::new(), Vec::new(), Vec::new()]
        } else {
            let config = NelderMeadConfig {
                max_iter: self.max_iter,
                tolerance: 1e-8,
                initial_step: 0.1,
                ..Default::default()
            };
            let bounds = vec![(-RAW_BOUND, RAW_BOUND); order.num_coefficients()];

            let result = nelder_mead(
                |raw| {
                    let factors = Self::decode(&order, raw);
                    let (ar, ma) = Self::expand(&order, &factors);
                    let (css, _) = Self::css(&centered, &ar, &ma, start);
                    Self::concentrated_nll(css, n_eff)
                },
                &vec![0.0; order.num_coefficients()],
                Some(&bounds),
                config,
            );

            if !result.converged {
                return Err(ForecastError::FitDivergence(format!(
                    "{} likelihood search did not converge after {} iterations",
                    order, result.iterations
                )));
            }
            Self::decode(&order, &result.optimal_point)
        };

        let [phi, theta, seasonal_phi, seasonal_theta] = &factors;
        if !(is_stationary(phi)
            && is_stationary(seasonal_phi)
            && is_invertible(theta)
            && is_invertible(seasonal_theta))
        {
            return Err(ForecastError::FitDivergence(format!(
                "{} coefficients violate stationarity or invertibility",
                order
            )));
        }

        let (ar_full, ma_full) = Self::expand(&order, &factors);
        let (css, innovations) = Self::css(&centered, &ar_full, &ma_full, start);
        if !css.is_finite() {
            return Err(ForecastError::FitDivergence(format!(
                "{} produced non-finite residuals",
                order
            )));
        }

        let n = n_eff as f64;
        let sigma2 = (css / n).max(f64::MIN_POSITIVE);
        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let kf = k as f64;
        let aic = -2.0 * log_likelihood + 2.0 * kf;
        let aicc = if n - kf - 1.0 > 0.0 {
            aic + 2.0 * kf * (kf + 1.0) / (n - kf - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = -2.0 * log_likelihood + kf * n.ln();

        // Original-scale one-step predictions differ from y by the innovation.
        let offset = order.differencing_lag();
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![f64::NAN; values.len()];
        for (i, &e) in innovations.iter().enumerate().skip(order.ar_lag()) {
            let t = i + offset;
            fitted[t] = values[t] - e;
            residuals[t] = e;
        }

        let [phi, theta, seasonal_phi, seasonal_theta] = factors;
        debug!(
            order = %order,
            ?phi,
            ?theta,
            ?seasonal_phi,
            ?seasonal_theta,
            sigma2,
            aicc,
            "sarima fitted"
        );

        self.params = Some(ArimaParameters {
            order,
            ar: phi,
            ma: theta,
            seasonal_ar: seasonal_phi,
            seasonal_ma: seasonal_theta,
            constant,
            include_mean,
            sigma2,
            log_likelihood,
            aic,
            aicc,
            bic,
            n_used: n_eff,
        });
        self.ar_full = ar_full;
        self.ma_full = ma_full;
        self.history = values.to_vec();
        self.centered = centered;
        self.innovations = innovations;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        if self.params.is_none() {
            return Err(ForecastError::FitRequired);
        }
        if horizon == 0 {
            return Ok(Forecast::new());
        }
        Ok(Forecast::from_values(self.point_forecasts(horizon)?))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let params = self.params.as_ref().ok_or(ForecastError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let predictions = self.point_forecasts(horizon)?;
        let psi = self.psi_weights(horizon);

        // Widen for coefficient estimation error.
        let n = params.n_used as f64;
        let estimated = params.num_estimated() as f64;
        let inflation = if n > estimated { n / (n - estimated) } else { 1.0 };

        let z = quantile_normal((1.0 + level) / 2.0);
        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, pred) in predictions.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let se = (params.sigma2 * inflation * cumulative).sqrt();
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
        self.params.clone().map(ModelParameters::Arima)
    }

    fn name(&self) -> &str {
        "SARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn monthly(values: Vec<f64>, period: usize) -> TimeSeries {
        TimeSeries::monthly(2000, 1, values, period).unwrap()
    }

    fn shocks(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    fn order_display_and_lags() {
        let order = SarimaOrder::seasonal((1, 1, 1), (0, 1, 1), 12);
        assert_eq!(order.to_string(), "SARIMA(1,1,1)(0,1,1)[12]");
        assert_eq!(order.ar_lag(), 1);
        assert_eq!(order.ma_lag(), 13);
        assert_eq!(order.differencing_lag(), 13);
        assert_eq!(order.num_coefficients(), 3);

        assert_eq!(SarimaOrder::new(2, 1, 0).to_string(), "ARIMA(2,1,0)");
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let e = shocks(400, 11);
        let mut y = vec![0.0; 400];
        for t in 1..400 {
            y[t] = 0.6 * y[t - 1] + e[t];
        }

        let mut model = Sarima::new(SarimaOrder::new(1, 0, 0));
        model.fit(&monthly(y, 12)).unwrap();

        let params = model.fitted_parameters().unwrap();
        assert!((params.ar[0] - 0.6).abs() < 0.1, "ar = {:?}", params.ar);
        assert!(params.include_mean);
        assert!(is_stationary(&params.ar));
    }

    #[test]
    fn recovers_ma1_coefficient() {
        let e = shocks(400, 12);
        let y: Vec<f64> = (0..400)
            .map(|t| e[t] + if t > 0 { 0.5 * e[t - 1] } else { 0.0 })
            .collect();

        let mut model = Sarima::new(SarimaOrder::new(0, 0, 1));
        model.fit(&monthly(y, 12)).unwrap();

        let params = model.fitted_parameters().unwrap();
        assert!((params.ma[0] - 0.5).abs() < 0.15, "ma = {:?}", params.ma);
        assert!(is_invertible(&params.ma));
    }

    #[test]
    fn random_walk_without_drift_repeats_last_value() {
        let mut level = 10.0;
        let y: Vec<f64> = shocks(60, 3)
            .into_iter()
            .map(|s| {
                level += s;
                level
            })
            .collect();
        let last = *y.last().unwrap();

        let mut model = Sarima::new(SarimaOrder::new(0, 1, 0)).with_mean(false);
        model.fit(&monthly(y, 12)).unwrap();

        let forecast = model.predict(5).unwrap();
        for &v in forecast.point() {
            assert_relative_eq!(v, last, epsilon = 1e-9);
        }
    }

    #[test]
    fn seasonal_differencing_continues_deterministic_pattern() {
        let pattern = [3.0, -1.0, 4.0, -6.0];
        let full: Vec<f64> = (0..40).map(|i| 50.0 + 0.7 * i as f64 + pattern[i % 4]).collect();
        let train = full[..32].to_vec();

        let order = SarimaOrder::seasonal((0, 1, 0), (0, 1, 0), 4);
        let mut model = Sarima::new(order);
        model.fit(&monthly(train, 4)).unwrap();
        assert!(!model.fitted_parameters().unwrap().include_mean);

        let forecast = model.predict(8).unwrap();
        for (a, b) in forecast.point().iter().zip(&full[32..]) {
            assert_relative_eq!(a, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn intervals_widen_and_contain_point() {
        let e = shocks(120, 5);
        let mut y = vec![100.0; 120];
        for t in 1..120 {
            y[t] = y[t - 1] + 0.3 * (y[t - 1] - if t > 1 { y[t - 2] } else { 100.0 }) + e[t];
        }

        let mut model = Sarima::new(SarimaOrder::new(1, 1, 0));
        model.fit(&monthly(y, 12)).unwrap();

        let forecast = model.predict_with_intervals(12, 0.95).unwrap();
        let (lower, upper) = (forecast.lower().unwrap(), forecast.upper().unwrap());
        for h in 0..12 {
            assert!(lower[h] < forecast.point()[h] && forecast.point()[h] < upper[h]);
            if h > 0 {
                assert!(upper[h] - lower[h] > upper[h - 1] - lower[h - 1]);
            }
        }
    }

    #[test]
    fn first_interval_matches_inflated_sigma() {
        let y: Vec<f64> = shocks(80, 21).into_iter().map(|v| v + 5.0).collect();
        let mut model = Sarima::new(SarimaOrder::new(0, 0, 0));
        model.fit(&monthly(y, 12)).unwrap();

        let params = model.fitted_parameters().unwrap().clone();
        let forecast = model.predict_with_intervals(1, 0.95).unwrap();
        let half_width = forecast.upper().unwrap()[0] - forecast.point()[0];
        let expected = quantile_normal(0.975) * (params.sigma2 * 80.0 / 79.0).sqrt();
        assert_relative_eq!(half_width, expected, epsilon = 1e-9);
        assert_relative_eq!(forecast.point()[0], params.constant, epsilon = 1e-12);
    }

    #[test]
    fn information_criteria_are_consistent() {
        let y: Vec<f64> = shocks(100, 8);
        let mut model = Sarima::new(SarimaOrder::new(1, 0, 1));
        model.fit(&monthly(y, 12)).unwrap();

        let p = model.fitted_parameters().unwrap();
        let k = 4.0; // φ, θ, mean, σ²
        let n = p.n_used as f64;
        assert_relative_eq!(p.bic - p.aic, k * (n.ln() - 2.0), epsilon = 1e-9);
        assert_relative_eq!(p.aicc - p.aic, 2.0 * k * (k + 1.0) / (n - k - 1.0), epsilon = 1e-9);
        assert_eq!(p.criterion(InformationCriterion::Bic), p.bic);
    }

    #[test]
    fn fitted_plus_residual_is_actual() {
        let y: Vec<f64> = shocks(60, 9).into_iter().map(|v| 20.0 + v).collect();
        let mut model = Sarima::new(SarimaOrder::new(1, 0, 0));
        model.fit(&monthly(y.clone(), 12)).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert!(fitted[0].is_nan());
        for t in 1..60 {
            assert_relative_eq!(fitted[t] + residuals[t], y[t], epsilon = 1e-9);
        }
    }

    #[test]
    fn tiny_iteration_budget_is_fit_divergence() {
        let y: Vec<f64> = shocks(100, 4);
        let mut model = Sarima::new(SarimaOrder::new(1, 0, 1)).with_max_iter(1);
        assert!(matches!(
            model.fit(&monthly(y, 12)),
            Err(ForecastError::FitDivergence(_))
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn seasonal_terms_need_a_period() {
        let order = SarimaOrder::seasonal((0, 0, 0), (1, 0, 0), 1);
        let mut model = Sarima::new(order);
        assert!(matches!(
            model.fit(&monthly(vec![1.0; 40], 1)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn conditioning_lag_aligns_likelihood_samples() {
        let y: Vec<f64> = shocks(120, 14).into_iter().map(|v| 30.0 + v).collect();
        let ts = monthly(y, 12);

        let mut plain = Sarima::new(SarimaOrder::new(1, 0, 0)).with_conditioning_lag(12);
        let mut seasonal =
            Sarima::new(SarimaOrder::seasonal((0, 0, 0), (1, 0, 0), 12)).with_conditioning_lag(12);
        plain.fit(&ts).unwrap();
        seasonal.fit(&ts).unwrap();

        let plain = plain.fitted_parameters().unwrap();
        assert_eq!(plain.n_used, 108);
        assert_eq!(seasonal.fitted_parameters().unwrap().n_used, 108);

        // A lag below the order's own AR lag changes nothing.
        let mut own = Sarima::new(SarimaOrder::new(1, 0, 0)).with_conditioning_lag(0);
        own.fit(&ts).unwrap();
        assert_eq!(own.fitted_parameters().unwrap().n_used, 119);
    }

    #[test]
    fn failed_refit_clears_previous_fit() {
        let mut model = Sarima::new(SarimaOrder::new(1, 0, 0));
        model.fit(&monthly(shocks(60, 15), 12)).unwrap();
        assert!(model.is_fitted());

        assert!(model.fit(&monthly(vec![1.0, 2.0, 3.0], 12)).is_err());
        assert!(!model.is_fitted());
        assert!(model.fitted_parameters().is_none());
        assert!(matches!(model.predict(2), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn short_series_is_insufficient() {
        let order = SarimaOrder::seasonal((1, 0, 0), (0, 1, 1), 12);
        let mut model = Sarima::new(order);
        assert!(matches!(
            model.fit(&monthly(vec![1.0; 15], 12)),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn requires_fit() {
        let model = Sarima::new(SarimaOrder::new(1, 0, 0));
        assert!(matches!(model.predict(3), Err(ForecastError::FitRequired)));
    }
}
