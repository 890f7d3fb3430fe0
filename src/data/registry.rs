//! Named dataset lookup.

use crate::core::{Frequency, TimeSeries};
use crate::data::csv::parse_csv;
use crate::error::{ForecastError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Monthly international airline passengers (thousands), 1949-01 to 1960-12.
pub const AIR_PASSENGERS: &str = "air_passengers";

const AIR_PASSENGERS_CSV: &str = include_str!("../../data/air_passengers.csv");

#[derive(Debug, Clone)]
struct DatasetSource {
    text: String,
    frequency: Frequency,
    seasonal_period: usize,
}

/// Registry of datasets addressable by name.
///
/// # Example
/// ```
/// use forecast_holdout::data::{DatasetRegistry, AIR_PASSENGERS};
///
/// let registry = DatasetRegistry::with_builtins();
/// let series = registry.load(AIR_PASSENGERS).unwrap();
/// assert_eq!(series.len(), 144);
/// assert!(registry.load("unknown").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    sources: BTreeMap<String, DatasetSource>,
}

impl DatasetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the bundled datasets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.sources.insert(
            AIR_PASSENGERS.to_string(),
            DatasetSource {
                text: AIR_PASSENGERS_CSV.to_string(),
                frequency: Frequency::Monthly,
                seasonal_period: 12,
            },
        );
        registry
    }

    /// Register a `date,value` table under `name`.
    ///
    /// The text is validated eagerly so that `load` only fails for unknown names.
    pub fn register_csv(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        frequency: Frequency,
        seasonal_period: usize,
    ) -> Result<()> {
        let text = text.into();
        parse_csv(&text, frequency, seasonal_period)?;
        self.sources.insert(
            name.into(),
            DatasetSource {
                text,
                frequency,
                seasonal_period,
            },
        );
        Ok(())
    }

    /// Load the dataset called `name`.
    pub fn load(&self, name: &str) -> Result<TimeSeries> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| ForecastError::DataNotFound(name.to_string()))?;
        let series =
            parse_csv(&source.text, source.frequency, source.seasonal_period)?.with_name(name);
        debug!(dataset = name, len = series.len(), "loaded dataset");
        Ok(series)
    }

    /// Names of all registered datasets, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }
}

/// Load a bundled dataset by name.
pub fn load_dataset(name: &str) -> Result<TimeSeries> {
    DatasetRegistry::with_builtins().load(name)
}
