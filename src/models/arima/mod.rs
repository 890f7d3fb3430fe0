//! Seasonal ARIMA models.
//!
//! This module provides:
//! - [`Sarima`] with a fixed `(p,d,q)(P,D,Q)[s]` order
//! - [`AutoArima`] choosing differencing and orders from the data
//! - Differencing and lag polynomial helpers

mod auto_arima;
mod diff;
mod model;
pub mod polynomial;

pub use auto_arima::{
    select_differencing, ArimaSearchConfig, AutoArima, CandidateScore, DifferencingDecision,
};
pub use diff::{difference, difference_full, integrate, seasonal_difference};
pub use model::{ArimaParameters, InformationCriterion, Sarima, SarimaOrder};
