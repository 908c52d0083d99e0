//! Reduces each series to its latest observation.

use crate::core::error::SeriesError;
use crate::core::series::{DATE_FORMAT, SeriesCollection};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct LatestValue {
    pub series: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// One row per series, in collection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MostRecentTable {
    pub rows: Vec<LatestValue>,
}

/// Makes no assumption about the stored order of each series.
///
/// A series without observations fails with [`SeriesError::MissingData`].
pub fn most_recent(collection: &SeriesCollection) -> Result<MostRecentTable, SeriesError> {
    let mut rows = Vec::with_capacity(collection.len());

    for (name, record) in collection.iter() {
        let mut latest: Option<(NaiveDate, f64)> = None;
        for (date_str, value) in record.dates.iter().zip(&record.values) {
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                SeriesError::parse("store", format!("series '{name}' has invalid date '{date_str}': {e}"))
            })?;
            if latest.is_none_or(|(current, _)| date > current) {
                latest = Some((date, *value));
            }
        }

        let (date, value) = latest.ok_or_else(|| SeriesError::MissingData {
            series: name.to_string(),
        })?;
        rows.push(LatestValue {
            series: name.to_string(),
            date,
            value,
        });
    }

    Ok(MostRecentTable { rows })
}
