//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks for more complex models.

mod naive;

pub use naive::{Naive, NaiveMethod};
