//! Train/test partitioning with a fixed-size holdout suffix.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// A series partitioned into a training prefix and a holdout suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: TimeSeries,
    pub test: TimeSeries,
}

impl Split {
    /// Number of held-out observations.
    pub fn horizon(&self) -> usize {
        self.test.len()
    }
}

/// Partition `series` into everything but the last `horizon` points and the
/// last `horizon` points.
///
/// # Example
/// ```
/// use forecast_holdout::core::{split, TimeSeries};
///
/// let series = TimeSeries::monthly(2020, 1, (0..36).map(f64::from).collect(), 12).unwrap();
/// let parts = split(&series, 12).unwrap();
/// assert_eq!(parts.train.len(), 24);
/// assert_eq!(parts.test.values()[0], 24.0);
/// ```
pub fn split(series: &TimeSeries, horizon: usize) -> Result<Split> {
    if horizon == 0 || horizon >= series.len() {
        return Err(ForecastError::InvalidHorizon {
            horizon,
            len: series.len(),
        });
    }

    let cut = series.len() - horizon;
    Ok(Split {
        train: series.slice(0, cut)?,
        test: series.slice(cut, series.len())?,
    })
}
