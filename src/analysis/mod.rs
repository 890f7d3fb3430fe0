//! Exploratory analysis of a series: correlation structure and decomposition.

mod correlation;
mod decomposition;

pub use correlation::{acf, autocorrelation, pacf, seasonal_acf_test, Correlogram};
pub use decomposition::{classical_decompose, Decomposition, DecompositionKind};
