//! # forecast-holdout
//!
//! Holdout comparison of forecasting strategies on monthly series.
//!
//! A series is loaded by name, split into a training prefix and a
//! fixed-size holdout, and every strategy (naive, Holt-Winters, seasonal
//! ARIMA with automatic order selection) is fitted on the prefix and
//! scored on the holdout with MSE, MAE, RMSE and MAPE.
//!
//! ```no_run
//! use forecast_holdout::prelude::*;
//!
//! let series = load_dataset(AIR_PASSENGERS)?;
//! let report = Pipeline::new(PipelineConfig::default()).run(&series)?;
//! println!("{}", report);
//! # Ok::<(), ForecastError>(())
//! ```

#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{split, Forecast, Split, TimeSeries};
    pub use crate::data::{load_dataset, DatasetRegistry, AIR_PASSENGERS};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluation::{evaluate, AccuracyReport, Metric, ZeroActualPolicy};
    pub use crate::models::arima::{AutoArima, Sarima, SarimaOrder};
    pub use crate::models::baseline::Naive;
    pub use crate::models::exponential::HoltWinters;
    pub use crate::models::{Forecaster, ModelParameters, StrategySpec};
    pub use crate::pipeline::{Pipeline, StrategyOutcome};
    pub use crate::report::ComparisonReport;
}
