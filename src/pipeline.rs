//! Holdout comparison of independent strategies.
//!
//! Every strategy is fitted on the same training prefix, forecasts the
//! held-out suffix and is scored against it. Strategies run in parallel
//! and a failing strategy never stops the others.

use crate::config::PipelineConfig;
use crate::core::{split, Forecast, Split, TimeSeries};
use crate::data::DatasetRegistry;
use crate::error::{ForecastError, Result};
use crate::evaluation::{AccuracyReport, Evaluator, Metric};
use crate::models::arima::AutoArima;
use crate::models::baseline::Naive;
use crate::models::exponential::HoltWinters;
use crate::models::{ModelParameters, StrategySpec};
use crate::report::ComparisonReport;
use crate::validation::{default_ljung_box_lags, ResidualDiagnostics};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{info, warn};

/// Step of a strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fit,
    Forecast,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fit => write!(f, "fit"),
            Stage::Forecast => write!(f, "forecast"),
            Stage::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Everything a successful strategy produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    pub name: String,
    /// Name reported by the forecaster itself.
    pub model: String,
    pub parameters: Option<ModelParameters>,
    /// Holdout forecast aligned with the test timestamps.
    pub forecast: Forecast,
    /// In-sample one-step predictions, `NaN` where undefined.
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// `None` when the in-sample fit could not be scored.
    pub train_accuracy: Option<AccuracyReport>,
    pub test_accuracy: AccuracyReport,
    pub diagnostics: Option<ResidualDiagnostics>,
}

/// Result of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StrategyOutcome {
    Succeeded(StrategyResult),
    Failed {
        name: String,
        stage: Stage,
        #[serde(serialize_with = "display")]
        error: ForecastError,
    },
}

fn display<S: Serializer>(
    error: &ForecastError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl StrategyOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Succeeded(result) => &result.name,
            Self::Failed { name, .. } => name,
        }
    }

    pub fn result(&self) -> Option<&StrategyResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Test-set value of `metric`, if the strategy succeeded and computed it.
    pub fn test_metric(&self, metric: Metric) -> Option<f64> {
        self.result()?.test_accuracy.get(metric)
    }
}

/// Runs registered strategies against one holdout split.
///
/// # Example
/// ```no_run
/// use forecast_holdout::config::PipelineConfig;
/// use forecast_holdout::data::{load_dataset, AIR_PASSENGERS};
/// use forecast_holdout::pipeline::Pipeline;
///
/// let series = load_dataset(AIR_PASSENGERS).unwrap();
/// let report = Pipeline::new(PipelineConfig::default()).run(&series).unwrap();
/// println!("{}", report);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    strategies: Vec<StrategySpec>,
}

impl Pipeline {
    /// Pipeline with the naive, Holt-Winters and ARIMA strategies.
    pub fn new(config: PipelineConfig) -> Self {
        let period = config.seasonal_period;
        let arima_config = config.arima.clone();
        let max_order = config.max_differencing_order;

        Self::empty(config)
            .with_strategy(StrategySpec::new("Naive", || Box::new(Naive::new())))
            .with_strategy(StrategySpec::new("HoltWinters", move || {
                Box::new(HoltWinters::additive(period))
            }))
            .with_strategy(StrategySpec::new("ARIMA", move || {
                Box::new(
                    AutoArima::with_config(arima_config.clone())
                        .with_max_differencing_order(max_order)
                        .with_period(period),
                )
            }))
    }

    /// Pipeline without strategies.
    pub fn empty(config: PipelineConfig) -> Self {
        Self {
            config,
            strategies: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, spec: StrategySpec) -> Self {
        self.strategies.push(spec);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn strategies(&self) -> &[StrategySpec] {
        &self.strategies
    }

    /// Load `name` from `registry` and run.
    pub fn run_dataset(&self, registry: &DatasetRegistry, name: &str) -> Result<ComparisonReport> {
        let series = registry.load(name)?;
        self.run(&series)
    }

    /// Split `series`, run every strategy and collect the outcomes in
    /// registration order.
    pub fn run(&self, series: &TimeSeries) -> Result<ComparisonReport> {
        self.config.validate()?;
        let parts = split(series, self.config.horizon)?;
        info!(
            dataset = series.name().unwrap_or("unnamed"),
            train = parts.train.len(),
            test = parts.test.len(),
            strategies = self.strategies.len(),
            "holdout split"
        );

        let evaluator = Evaluator::new(
            &self.config.accuracy_metrics,
            self.config.zero_actual_policy,
        );

        let outcomes: Vec<StrategyOutcome> = self
            .strategies
            .par_iter()
            .map(|spec| self.run_strategy(spec, &parts, &evaluator))
            .collect();

        Ok(ComparisonReport::new(
            series.clone(),
            parts,
            self.config.clone(),
            outcomes,
        ))
    }

    fn run_strategy(
        &self,
        spec: &StrategySpec,
        parts: &Split,
        evaluator: &Evaluator,
    ) -> StrategyOutcome {
        let name = spec.name();
        let failed = |stage: Stage, error: ForecastError| {
            warn!(strategy = name, %stage, %error, "strategy failed");
            StrategyOutcome::Failed {
                name: name.to_string(),
                stage,
                error,
            }
        };

        let mut model = spec.create();
        if let Err(error) = model.fit(&parts.train) {
            return failed(Stage::Fit, error);
        }

        let level = self.config.interval_level;
        let forecast = match model.predict_with_intervals(parts.horizon(), level) {
            Ok(forecast) => forecast.with_timestamps(parts.test.timestamps().to_vec()),
            Err(error) => return failed(Stage::Forecast, error),
        };

        let test_accuracy = match evaluator.evaluate(forecast.point(), parts.test.values()) {
            Ok(report) => report,
            Err(error) => return failed(Stage::Evaluate, error),
        };

        let fitted = model.fitted_values().map(<[f64]>::to_vec).unwrap_or_default();
        let residuals = model.residuals().map(<[f64]>::to_vec).unwrap_or_default();
        let train_accuracy = match evaluator.evaluate_in_sample(&fitted, parts.train.values()) {
            Ok(report) => Some(report),
            Err(error) => {
                warn!(strategy = name, %error, "in-sample accuracy unavailable");
                None
            }
        };

        let parameters = model.parameters();
        let diagnostics = (!residuals.is_empty()).then(|| {
            let lags = self.config.ljung_box_lags.unwrap_or_else(|| {
                default_ljung_box_lags(parts.train.len(), self.config.seasonal_period)
            });
            let fitted_params = parameters
                .as_ref()
                .map_or(0, ModelParameters::fitted_coefficients);
            ResidualDiagnostics::compute(&residuals, lags, fitted_params)
        });

        let summary = parameters
            .as_ref()
            .map(ModelParameters::summary)
            .unwrap_or_default();
        info!(
            strategy = name,
            parameters = %summary,
            rmse = test_accuracy.rmse().unwrap_or(f64::NAN),
            "strategy evaluated"
        );

        StrategyOutcome::Succeeded(StrategyResult {
            name: name.to_string(),
            model: model.name().to_string(),
            parameters,
            forecast,
            fitted,
            residuals,
            train_accuracy,
            test_accuracy,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Forecaster;
    use std::f64::consts::PI;

    /// Fails at a chosen stage.
    struct Broken(Stage);

    impl Forecaster for Broken {
        fn fit(&mut self, _series: &TimeSeries) -> Result<()> {
            match self.0 {
                Stage::Fit => Err(ForecastError::NonConvergence { iterations: 7 }),
                _ => Ok(()),
            }
        }

        fn predict(&self, horizon: usize) -> Result<Forecast> {
            match self.0 {
                Stage::Forecast => Err(ForecastError::FitDivergence("boom".into())),
                _ => Ok(Forecast::from_values(vec![0.0; horizon + 1])),
            }
        }

        fn fitted_values(&self) -> Option<&[f64]> {
            None
        }

        fn residuals(&self) -> Option<&[f64]> {
            None
        }

        fn parameters(&self) -> Option<ModelParameters> {
            None
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    fn seasonal_series() -> TimeSeries {
        let values: Vec<f64> = (0..48)
            .map(|t| 50.0 + 8.0 * (2.0 * PI * t as f64 / 12.0).sin() + 0.3 * t as f64)
            .collect();
        TimeSeries::monthly(2018, 1, values, 12).unwrap()
    }

    #[test]
    fn failures_are_isolated_per_stage() {
        let pipeline = Pipeline::empty(PipelineConfig::default())
            .with_strategy(StrategySpec::new("fit", || Box::new(Broken(Stage::Fit))))
            .with_strategy(StrategySpec::new("Naive", || Box::new(Naive::new())))
            .with_strategy(StrategySpec::new("forecast", || Box::new(Broken(Stage::Forecast))))
            .with_strategy(StrategySpec::new("evaluate", || Box::new(Broken(Stage::Evaluate))));

        let report = pipeline.run(&seasonal_series()).unwrap();
        let outcomes = report.outcomes();
        let names: Vec<&str> = outcomes.iter().map(StrategyOutcome::name).collect();
        assert_eq!(names, ["fit", "Naive", "forecast", "evaluate"]);

        assert_eq!(
            outcomes[0],
            StrategyOutcome::Failed {
                name: "fit".into(),
                stage: Stage::Fit,
                error: ForecastError::NonConvergence { iterations: 7 },
            }
        );
        assert!(outcomes[1].is_success());
        assert!(matches!(outcomes[2], StrategyOutcome::Failed { stage: Stage::Forecast, .. }));
        assert!(matches!(
            outcomes[3],
            StrategyOutcome::Failed {
                stage: Stage::Evaluate,
                error: ForecastError::DimensionMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn forecast_carries_test_timestamps() {
        let series = seasonal_series();
        let report = Pipeline::empty(PipelineConfig::default())
            .with_strategy(StrategySpec::new("Naive", || Box::new(Naive::new())))
            .run(&series)
            .unwrap();

        let result = report.outcomes()[0].result().unwrap();
        assert_eq!(result.forecast.timestamps(), &series.timestamps()[36..]);
        assert!(result.forecast.has_intervals());
        assert_eq!(result.test_accuracy.n, 12);
        assert!(result.diagnostics.is_some());
    }

    #[test]
    fn invalid_horizon_aborts_run() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_horizon(48));
        assert!(matches!(
            pipeline.run(&seasonal_series()),
            Err(ForecastError::InvalidHorizon { horizon: 48, len: 48 })
        ));
    }

    #[test]
    fn default_pipeline_registers_three_strategies() {
        let pipeline = Pipeline::new(PipelineConfig::default());
        let names: Vec<&str> = pipeline.strategies().iter().map(StrategySpec::name).collect();
        assert_eq!(names, ["Naive", "HoltWinters", "ARIMA"]);
    }

    #[test]
    fn failed_outcome_serializes_error_text() {
        let outcome = StrategyOutcome::Failed {
            name: "ARIMA".into(),
            stage: Stage::Fit,
            error: ForecastError::NonStationary { max_order: 2 },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "fit");
        assert_eq!(json["error"], "series is still non-stationary after 2 differences");
    }
}
