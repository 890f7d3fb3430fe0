//! Error types for the forecast-holdout library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, splitting, fitting or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// No bundled or registered dataset carries the requested name.
    #[error("dataset not found: {0}")]
    DataNotFound(String),

    /// The holdout horizon does not leave a training prefix.
    #[error("invalid horizon: {horizon} must be positive and smaller than series length {len}")]
    InvalidHorizon { horizon: usize, len: usize },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Smoothing coefficient optimization stopped before converging.
    #[error("optimization did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    /// Differencing up to the allowed order did not yield a stationary series.
    #[error("series is still non-stationary after {max_order} differences")]
    NonStationary { max_order: usize },

    /// Every candidate order failed to fit or violated stability constraints.
    #[error("order search exhausted: none of {candidates} candidates is stable")]
    OrderSearchExhausted { candidates: usize },

    /// Likelihood maximization failed.
    #[error("fit diverged: {0}")]
    FitDivergence(String),

    /// A percentage metric met an actual value of exactly zero.
    #[error("division by zero: actual value at index {index} is zero")]
    DivisionByZero { index: usize },

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Dataset text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration is malformed or out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// A report could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}
