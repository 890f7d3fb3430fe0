//! TimeSeries data structure for regularly spaced univariate observations.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// The timestamp `steps` periods after `start`.
    ///
    /// Calendar frequencies step in whole months, so a series starting on
    /// the 31st stays anchored to month ends.
    pub fn advance(&self, start: DateTime<Utc>, steps: usize) -> Option<DateTime<Utc>> {
        let steps_i64 = i64::try_from(steps).ok()?;
        match self {
            Frequency::Hourly => start.checked_add_signed(Duration::hours(steps_i64)),
            Frequency::Daily => start.checked_add_signed(Duration::days(steps_i64)),
            Frequency::Weekly => start.checked_add_signed(Duration::weeks(steps_i64)),
            Frequency::Monthly => {
                start.checked_add_months(Months::new(u32::try_from(steps).ok()?))
            }
            Frequency::Quarterly => {
                start.checked_add_months(Months::new(u32::try_from(steps.checked_mul(3)?).ok()?))
            }
        }
    }

    /// Conventional seasonal period for annual cycles.
    pub fn default_seasonal_period(&self) -> usize {
        match self {
            Frequency::Hourly => 24,
            Frequency::Daily => 7,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }
}

/// An ordered, evenly spaced univariate series with a declared seasonal period.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    frequency: Frequency,
    seasonal_period: usize,
    name: Option<String>,
}

impl TimeSeries {
    /// Create a series, validating spacing and lengths.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        frequency: Frequency,
        seasonal_period: usize,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if seasonal_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }

        if let Some(&first) = timestamps.first() {
            for (i, ts) in timestamps.iter().enumerate().skip(1) {
                if *ts <= timestamps[i - 1] {
                    return Err(ForecastError::TimestampError(
                        "timestamps must be strictly increasing".to_string(),
                    ));
                }
                let expected = frequency.advance(first, i).ok_or_else(|| {
                    ForecastError::TimestampError("timestamp out of range".to_string())
                })?;
                if *ts != expected {
                    return Err(ForecastError::TimestampError(format!(
                        "gap or irregular spacing at index {}: expected {}, got {}",
                        i, expected, ts
                    )));
                }
            }
        }

        Ok(Self {
            timestamps,
            values,
            frequency,
            seasonal_period,
            name: None,
        })
    }

    /// Build a monthly series starting on the first day of `year`-`month`.
    pub fn monthly(year: i32, month: u32, values: Vec<f64>, seasonal_period: usize) -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                ForecastError::TimestampError(format!("invalid start month {}-{}", year, month))
            })?;
        let timestamps = (0..values.len())
            .map(|i| {
                Frequency::Monthly.advance(start, i).ok_or_else(|| {
                    ForecastError::TimestampError("timestamp out of range".to_string())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(timestamps, values, Frequency::Monthly, seasonal_period)
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Extract the observations in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "slice end {} beyond series length {}",
                end,
                self.len()
            )));
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            frequency: self.frequency,
            seasonal_period: self.seasonal_period,
            name: self.name.clone(),
        })
    }

    /// Timestamps of the `horizon` periods following the last observation.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let first = match self.timestamps.first() {
            Some(&t) => t,
            None => return Err(ForecastError::EmptyData),
        };
        let n = self.len();
        (n..n + horizon)
            .map(|i| {
                self.frequency.advance(first, i).ok_or_else(|| {
                    ForecastError::TimestampError("timestamp out of range".to_string())
                })
            })
            .collect()
    }
}
