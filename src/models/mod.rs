//! Forecasting strategies.

mod params;
mod traits;

pub mod arima;
pub mod baseline;
pub mod exponential;

pub use params::ModelParameters;
pub use traits::{BoxedForecaster, Forecaster, StrategySpec};
