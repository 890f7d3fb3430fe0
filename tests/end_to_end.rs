//! End-to-end holdout comparisons through the public pipeline.

use forecast_holdout::config::PipelineConfig;
use forecast_holdout::core::{Frequency, TimeSeries};
use forecast_holdout::data::{DatasetRegistry, AIR_PASSENGERS};
use forecast_holdout::evaluation::Metric;
use forecast_holdout::models::arima::polynomial::{is_invertible, is_stationary};
use forecast_holdout::models::baseline::Naive;
use forecast_holdout::models::{Forecaster, ModelParameters, StrategySpec};
use forecast_holdout::pipeline::{Pipeline, Stage, StrategyOutcome};
use forecast_holdout::ForecastError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// `y[t] = 100 + 10 sin(2πt/12) + 0.5t + noise` over five years.
fn synthetic_series(seed: u64) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..60)
        .map(|t| {
            let t = t as f64;
            100.0 + 10.0 * (2.0 * PI * t / 12.0).sin() + 0.5 * t + rng.gen_range(-2.0..2.0)
        })
        .collect();
    TimeSeries::monthly(2015, 1, values, 12)
        .unwrap()
        .with_name("synthetic")
}

fn rmse(outcome: &StrategyOutcome) -> f64 {
    outcome
        .test_metric(Metric::Rmse)
        .unwrap_or_else(|| panic!("{} has no RMSE: {:?}", outcome.name(), outcome))
}

fn assert_stable(parameters: Option<ModelParameters>) {
    match parameters {
        Some(ModelParameters::Arima(p)) => {
            assert!(is_stationary(&p.ar), "ar {:?}", p.ar);
            assert!(is_stationary(&p.seasonal_ar), "sar {:?}", p.seasonal_ar);
            assert!(is_invertible(&p.ma), "ma {:?}", p.ma);
            assert!(is_invertible(&p.seasonal_ma), "sma {:?}", p.seasonal_ma);
        }
        other => panic!("expected ARIMA parameters, got {:?}", other),
    }
}

#[test]
fn synthetic_seasonal_trend_scenario() {
    let series = synthetic_series(42);
    let report = Pipeline::new(PipelineConfig::default()).run(&series).unwrap();

    assert_eq!(report.train_len, 48);
    assert_eq!(report.test_len, 12);

    for outcome in report.outcomes() {
        let value = rmse(outcome);
        assert!(value.is_finite() && value >= 0.0, "{} rmse {}", outcome.name(), value);
    }

    let naive = rmse(report.outcome("Naive").unwrap());
    let holt_winters = rmse(report.outcome("HoltWinters").unwrap());
    assert!(holt_winters < naive, "hw {} naive {}", holt_winters, naive);

    let arima = report.outcome("ARIMA").unwrap().result().unwrap();
    assert_stable(arima.parameters.clone());
    assert!(arima.forecast.has_intervals());
    assert!(arima.diagnostics.is_some());
}

#[test]
fn air_passengers_comparison() {
    let registry = DatasetRegistry::with_builtins();
    let report = Pipeline::new(PipelineConfig::default())
        .run_dataset(&registry, AIR_PASSENGERS)
        .unwrap();

    assert_eq!(report.dataset.as_deref(), Some(AIR_PASSENGERS));
    assert_eq!(report.failures().count(), 0, "{}", report);

    let ranking = report.ranking_by(Metric::Rmse);
    assert_eq!(ranking.len(), 3);
    // Repeating the training mean is the worst option on a trending series.
    assert_eq!(ranking[2].0, "Naive");

    for result in report.succeeded() {
        let train = result.train_accuracy.as_ref().unwrap();
        assert!(train.mape().unwrap().is_finite());
        assert_eq!(result.forecast.horizon(), 12);
    }

    let text = report.to_string();
    for name in ["Naive", "HoltWinters", "ARIMA"] {
        assert!(text.contains(name));
    }
}

#[test]
fn failing_strategy_does_not_stop_the_others() {
    // A trending series that may not be differenced, too short for two cycles.
    let short = TimeSeries::monthly(2020, 1, (0..20).map(|i| (i * i) as f64).collect(), 12)
        .unwrap();
    let config = PipelineConfig::default()
        .with_horizon(4)
        .with_max_differencing_order(0);
    let report = Pipeline::new(config).run(&short).unwrap();

    assert!(report.outcome("Naive").unwrap().is_success());
    match report.outcome("ARIMA").unwrap() {
        StrategyOutcome::Failed { stage, error, .. } => {
            assert_eq!(*stage, Stage::Fit);
            assert_eq!(*error, ForecastError::NonStationary { max_order: 0 });
        }
        StrategyOutcome::Succeeded(_) => panic!("ARIMA may not difference"),
    }
    match report.outcome("HoltWinters").unwrap() {
        StrategyOutcome::Failed { stage, error, .. } => {
            assert_eq!(*stage, Stage::Fit);
            assert!(matches!(error, ForecastError::InsufficientData { .. }));
        }
        StrategyOutcome::Succeeded(_) => panic!("Holt-Winters needs two full cycles"),
    }
}

#[test]
fn user_dataset_through_registry() {
    let mut text = String::from("date,consumption\n");
    for (i, year) in (2010..2014).flat_map(|y| std::iter::repeat(y).take(12)).enumerate() {
        let month = i % 12 + 1;
        let value = 400.0 + 150.0 * (2.0 * PI * month as f64 / 12.0).cos() + i as f64;
        text.push_str(&format!("{}-{:02},{:.1}\n", year, month, value));
    }

    let mut registry = DatasetRegistry::with_builtins();
    registry
        .register_csv("gas", text, Frequency::Monthly, 12)
        .unwrap();

    let pipeline = Pipeline::empty(PipelineConfig::default())
        .with_strategy(StrategySpec::new("Naive", || Box::new(Naive::new())));
    let report = pipeline.run_dataset(&registry, "gas").unwrap();
    assert_eq!(report.train_len, 36);

    assert_eq!(
        pipeline.run_dataset(&registry, "missing").unwrap_err(),
        ForecastError::DataNotFound("missing".into())
    );
}

#[test]
fn invalid_horizon_is_reported() {
    let series = synthetic_series(1);
    let pipeline = Pipeline::new(PipelineConfig::default().with_horizon(60));
    assert_eq!(
        pipeline.run(&series).unwrap_err(),
        ForecastError::InvalidHorizon { horizon: 60, len: 60 }
    );
}

#[test]
fn report_json_and_plot_data() {
    let report = Pipeline::new(PipelineConfig::default())
        .run(&synthetic_series(7))
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 3);
    assert_eq!(json["config"]["horizon"], 12);

    let plot = report.plot_data();
    assert_eq!(plot.values.len(), 60);
    assert!(plot.decomposition.is_some());
    assert_eq!(plot.correlogram.pacf.len(), 24);
    for trace in &plot.forecasts {
        assert_eq!(trace.forecast.len(), trace.actual.len());
    }
}

#[test]
fn fitted_models_stay_usable_outside_the_pipeline() {
    let series = synthetic_series(3);
    let mut model = Naive::new();
    model.fit(&series).unwrap();
    assert!(model.is_fitted());
    assert_eq!(model.predict(3).unwrap().horizon(), 3);
}
