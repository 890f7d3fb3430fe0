//! Automatic SARIMA order selection.
//!
//! Differencing orders come from unit-root style tests; AR and MA orders
//! from an exhaustive grid scored by an information criterion.

use crate::analysis::seasonal_acf_test;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, seasonal_difference};
use crate::models::arima::model::{InformationCriterion, Sarima, SarimaOrder};
use crate::models::{Forecaster, ModelParameters};
use crate::validation::kpss_test;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Bounds of the order grid and the selection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaSearchConfig {
    /// Maximum non-seasonal AR order.
    pub max_p: usize,
    /// Maximum non-seasonal MA order.
    pub max_q: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    pub criterion: InformationCriterion,
    /// Significance level of the differencing tests.
    pub significance: f64,
}

impl Default for ArimaSearchConfig {
    fn default() -> Self {
        Self {
            max_p: 2,
            max_q: 2,
            max_cap_p: 1,
            max_cap_q: 1,
            criterion: InformationCriterion::Aicc,
            significance: 0.05,
        }
    }
}

impl ArimaSearchConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_cap_p: usize, max_cap_q: usize) -> Self {
        self.max_cap_p = max_cap_p;
        self.max_cap_q = max_cap_q;
        self
    }

    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Candidate orders in search order: `p`, then `q`, then `P`, then `Q`.
    pub fn grid(&self, d: usize, seasonal_d: usize, period: usize) -> Vec<SarimaOrder> {
        let (max_cap_p, max_cap_q) = if period > 1 {
            (self.max_cap_p, self.max_cap_q)
        } else {
            (0, 0)
        };

        let mut orders = Vec::new();
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                for cap_p in 0..=max_cap_p {
                    for cap_q in 0..=max_cap_q {
                        orders.push(SarimaOrder::seasonal(
                            (p, d, q),
                            (cap_p, seasonal_d, cap_q),
                            period.max(1),
                        ));
                    }
                }
            }
        }
        orders
    }
}

/// Differencing orders chosen before the order search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifferencingDecision {
    pub d: usize,
    pub seasonal_d: usize,
    /// Whether the seasonal-lag autocorrelation was significant.
    pub seasonal_acf: bool,
    /// KPSS statistic of the final differenced series.
    pub kpss_statistic: f64,
}

/// Pick seasonal and regular differencing orders.
///
/// One seasonal difference is taken when the period allows it and either
/// the seasonal-lag autocorrelation is significant or KPSS rejects level
/// stationarity. Regular differences follow while KPSS still rejects.
/// The total may not exceed `max_order`.
pub fn select_differencing(
    values: &[f64],
    period: usize,
    max_order: usize,
    significance: f64,
) -> Result<DifferencingDecision> {
    let mut seasonal_d = 0;
    let mut seasonal_acf = false;
    if period > 1 && max_order > 0 && values.len() > 2 * period {
        seasonal_acf = seasonal_acf_test(values, period, significance);
        if seasonal_acf || kpss_test(values, None).rejects_null(significance) {
            seasonal_d = 1;
        }
    }

    let mut current = seasonal_difference(values, seasonal_d, period);
    let mut d = 0;
    loop {
        let kpss = kpss_test(&current, None);
        if !kpss.rejects_null(significance) {
            debug!(d, seasonal_d, seasonal_acf, kpss = kpss.statistic, "differencing selected");
            return Ok(DifferencingDecision {
                d,
                seasonal_d,
                seasonal_acf,
                kpss_statistic: kpss.statistic,
            });
        }
        if d + seasonal_d >= max_order {
            return Err(ForecastError::NonStationary { max_order });
        }
        current = difference(&current, 1);
        d += 1;
    }
}

/// Score of one candidate order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub order: SarimaOrder,
    /// Criterion value, `None` when the fit failed.
    pub score: Option<f64>,
    pub aic: Option<f64>,
    pub aicc: Option<f64>,
    pub bic: Option<f64>,
    pub failure: Option<String>,
}

/// SARIMA with differencing and orders chosen from the data.
#[derive(Debug, Clone)]
pub struct AutoArima {
    config: ArimaSearchConfig,
    max_differencing_order: usize,
    period: Option<usize>,
    differencing: Option<DifferencingDecision>,
    candidates: Vec<CandidateScore>,
    selected: Option<Sarima>,
}

impl Default for AutoArima {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoArima {
    pub fn new() -> Self {
        Self::with_config(ArimaSearchConfig::default())
    }

    pub fn with_config(config: ArimaSearchConfig) -> Self {
        Self {
            config,
            max_differencing_order: 2,
            period: None,
            differencing: None,
            candidates: Vec::new(),
            selected: None,
        }
    }

    /// Upper bound on `d + D`.
    pub fn with_max_differencing_order(mut self, max_order: usize) -> Self {
        self.max_differencing_order = max_order;
        self
    }

    /// Override the seasonal period declared on the series.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    pub fn config(&self) -> &ArimaSearchConfig {
        &self.config
    }

    pub fn selected_order(&self) -> Option<SarimaOrder> {
        self.selected.as_ref().map(Sarima::order)
    }

    pub fn differencing(&self) -> Option<DifferencingDecision> {
        self.differencing
    }

    /// Every scored candidate, in search order.
    pub fn candidates(&self) -> &[CandidateScore] {
        &self.candidates
    }

    pub fn model(&self) -> Option<&Sarima> {
        self.selected.as_ref()
    }
}

impl Forecaster for AutoArima {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.selected = None;
        self.candidates.clear();

        let values = series.values();
        let period = self.period.unwrap_or_else(|| series.seasonal_period());
        let significance = self.config.significance;

        let decision = select_differencing(
            values,
            period,
            self.max_differencing_order,
            significance,
        )?;
        info!(
            d = decision.d,
            seasonal_d = decision.seasonal_d,
            period,
            "arima differencing"
        );
        self.differencing = Some(decision);

        let grid = self.config.grid(decision.d, decision.seasonal_d, period);
        let criterion = self.config.criterion;
        // Every candidate is scored on the same observations.
        let conditioning_lag = grid.iter().map(SarimaOrder::ar_lag).max().unwrap_or(0);

        let fits: Vec<(SarimaOrder, Result<Sarima>)> = grid
            .par_iter()
            .map(|&order| {
                let mut model = Sarima::new(order).with_conditioning_lag(conditioning_lag);
                let outcome = model.fit(series).map(|_| model);
                (order, outcome)
            })
            .collect();

        let mut best: Option<(f64, Sarima)> = None;
        for (order, outcome) in fits {
            let candidate = match outcome.as_ref().map(Sarima::fitted_parameters) {
                Ok(Some(params)) => {
                    let score = params.criterion(criterion);
                    debug!(order = %order, score, "arima candidate");
                    CandidateScore {
                        order,
                        score: Some(score),
                        aic: Some(params.aic),
                        aicc: Some(params.aicc),
                        bic: Some(params.bic),
                        failure: None,
                    }
                }
                Ok(None) => continue,
                Err(err) => {
                    debug!(order = %order, error = %err, "arima candidate rejected");
                    CandidateScore {
                        order,
                        score: None,
                        aic: None,
                        aicc: None,
                        bic: None,
                        failure: Some(err.to_string()),
                    }
                }
            };

            if let (Some(score), Ok(model)) = (candidate.score, outcome) {
                if score.is_finite() && best.as_ref().map_or(true, |(b, _)| score < *b) {
                    best = Some((score, model));
                }
            }
            self.candidates.push(candidate);
        }

        match best {
            Some((score, model)) => {
                info!(order = %model.order(), %criterion, score, "arima order selected");
                self.selected = Some(model);
                Ok(())
            }
            None => Err(ForecastError::OrderSearchExhausted {
                candidates: self.candidates.len(),
            }),
        }
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.residuals()
    }

    fn parameters(&self) -> Option<ModelParameters> {
        self.selected.as_ref()?.parameters()
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}
