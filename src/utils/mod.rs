//! Utility functions shared by the forecasting strategies.

pub mod optimization;
pub mod regression;
pub mod stats;

pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use regression::{least_squares, LeastSquares};
pub use stats::quantile_normal;
