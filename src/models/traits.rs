//! Forecaster trait defining the common interface for all strategies.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;
use crate::models::ModelParameters;

/// Common interface for all forecasting strategies.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the training series.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with intervals at nominal coverage `level`.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// In-sample one-step predictions, `NaN` where undefined.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Coefficients estimated by the last successful fit.
    fn parameters(&self) -> Option<ModelParameters>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects that can cross threads.
///
/// # Example
///
/// ```
/// use forecast_holdout::models::{BoxedForecaster, Forecaster};
/// use forecast_holdout::models::baseline::Naive;
///
/// let model: BoxedForecaster = Box::new(Naive::new());
/// assert_eq!(model.name(), "Naive");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send>;

/// A named factory for fresh strategy instances.
///
/// Each pipeline run builds its own instances, so specs can be shared
/// across threads and runs.
///
/// # Example
///
/// ```
/// use forecast_holdout::models::StrategySpec;
/// use forecast_holdout::models::baseline::Naive;
///
/// let spec = StrategySpec::new("Naive", || Box::new(Naive::new()));
/// let model = spec.create();
/// assert!(!model.is_fitted());
/// ```
pub struct StrategySpec {
    name: String,
    factory: Box<dyn Fn() -> BoxedForecaster + Send + Sync>,
}

impl StrategySpec {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxedForecaster + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// Display name of the strategy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a new unfitted instance.
    pub fn create(&self) -> BoxedForecaster {
        (self.factory)()
    }
}

impl std::fmt::Debug for StrategySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategySpec").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::baseline::Naive;
    use crate::models::exponential::HoltWinters;

    fn make_test_series(n: usize) -> TimeSeries {
        let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        TimeSeries::monthly(2020, 1, values, 12).unwrap()
    }

    #[test]
    fn boxed_forecaster_fit_predict() {
        let mut model: BoxedForecaster = Box::new(Naive::new());
        let ts = make_test_series(20);

        assert!(!model.is_fitted());
        assert!(model.parameters().is_none());
        model.fit(&ts).unwrap();
        assert!(model.is_fitted());
        assert!(model.parameters().is_some());

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.horizon(), 5);
    }

    #[test]
    fn boxed_forecaster_with_intervals() {
        let mut model: BoxedForecaster = Box::new(Naive::new());
        model.fit(&make_test_series(20)).unwrap();

        let forecast = model.predict_with_intervals(5, 0.95).unwrap();
        assert_eq!(forecast.horizon(), 5);
        assert!(forecast.has_intervals());
        assert_eq!(forecast.level(), Some(0.95));
    }

    #[test]
    fn spec_creates_independent_instances() {
        let spec = StrategySpec::new("Naive", || Box::new(Naive::new()));
        let ts = make_test_series(20);

        let mut model1 = spec.create();
        let model2 = spec.create();
        model1.fit(&ts).unwrap();

        assert!(model1.is_fitted());
        assert!(!model2.is_fitted());
        assert_eq!(spec.name(), "Naive");
    }

    #[test]
    fn heterogeneous_strategies_behind_one_interface() {
        let specs = vec![
            StrategySpec::new("Naive", || Box::new(Naive::new())),
            StrategySpec::new("HoltWinters", || Box::new(HoltWinters::additive(12))),
        ];
        let names: Vec<String> = specs.iter().map(|s| s.create().name().to_string()).collect();
        assert_eq!(names, vec!["Naive", "HoltWinters"]);
    }
}
