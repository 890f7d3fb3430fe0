//! Plain-text dataset parsing.

use crate::core::{Frequency, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, Trim};

/// Parse a two-column `date,value` table with a header line.
///
/// Dates may be `YYYY-MM`, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or a month
/// name with a year (`Jan 2020`, `"Jan, 2020"`). Quoted values may carry
/// thousands separators. Blank lines are skipped; a row with other than two
/// columns, or with an unreadable field, is an error.
pub fn parse_csv(text: &str, frequency: Frequency, seasonal_period: usize) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut timestamps = Vec::new();
    let mut values = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| ForecastError::Parse(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != 2 {
            return Err(ForecastError::Parse(format!(
                "line {}: expected 2 columns `date,value`, got {}",
                line,
                record.len()
            )));
        }

        let naive = parse_timestamp(&record[0]).ok_or_else(|| {
            ForecastError::Parse(format!("line {}: unrecognised date `{}`", line, &record[0]))
        })?;
        timestamps.push(Utc.from_utc_datetime(&naive));

        let value: f64 = record[1].replace(',', "").parse().map_err(|_| {
            ForecastError::Parse(format!("line {}: invalid value `{}`", line, &record[1]))
        })?;
        values.push(value);
    }

    if values.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    TimeSeries::new(timestamps, values, frequency, seasonal_period)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {}", raw), "%d %b, %Y"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {}", raw), "%d %b %Y"))
        .ok()?;
    date.and_hms_opt(0, 0, 0)
}
