//! Core data structures for holdout forecasting.

mod forecast;
mod split;
mod time_series;

pub use forecast::Forecast;
pub use split::{split, Split};
pub use time_series::{Frequency, TimeSeries};
