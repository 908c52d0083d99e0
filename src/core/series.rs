//! Series abstractions and core types

use crate::core::error::SeriesError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Time-indexed values for one variable, newest first, one entry per date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Sorts descending by date. Later duplicates of a date are dropped.
    pub fn from_unsorted(mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| b.date.cmp(&a.date));
        observations.dedup_by_key(|o| o.date);
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn to_record(&self) -> SeriesRecord {
        SeriesRecord {
            values: self.observations.iter().map(|o| o.value).collect(),
            dates: self
                .observations
                .iter()
                .map(|o| o.date.format(DATE_FORMAT).to_string())
                .collect(),
        }
    }
}

/// Interchange shape of a series: `values[i]` was observed on `dates[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub values: Vec<f64>,
    pub dates: Vec<String>,
}

/// Series keyed by name, in insertion (registry) order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesCollection {
    entries: Vec<(String, SeriesRecord)>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a series, replacing any existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, record: SeriesRecord) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((name, record)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SeriesRecord> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, record)| record)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SeriesRecord)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SeriesCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SeriesCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CollectionVisitor;

        impl<'de> Visitor<'de> for CollectionVisitor {
            type Value = SeriesCollection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of series name to {values, dates}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut collection = SeriesCollection::new();
                while let Some((name, record)) = access.next_entry::<String, SeriesRecord>()? {
                    collection.insert(name, record);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_map(CollectionVisitor)
    }
}

/// What to fetch, resolved from a registry entry's adapter and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesQuery {
    Fred {
        id: String,
        start_date: NaiveDate,
        /// Defaults to the run's `as_of` date.
        end_date: Option<NaiveDate>,
    },
    AlbertaHub,
    VictoriaHub,
}

#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch_series(
        &self,
        query: &SeriesQuery,
        as_of: NaiveDate,
    ) -> Result<Series, SeriesError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_from_unsorted_orders_newest_first_and_drops_duplicate_dates() {
        let series = Series::from_unsorted(vec![
            Observation::new(date("2024-01-01"), 1.0),
            Observation::new(date("2024-03-01"), 3.0),
            Observation::new(date("2024-02-01"), 2.0),
            Observation::new(date("2024-03-01"), 99.0),
        ]);

        let dates: Vec<_> = series.observations().iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-03-01"), date("2024-02-01"), date("2024-01-01")]
        );
        assert_eq!(series.observations()[0].value, 3.0);
    }

    #[test]
    fn test_to_record_keeps_order_and_formats_dates() {
        let series = Series::from_unsorted(vec![
            Observation::new(date("2023-12-31"), 4.5),
            Observation::new(date("2024-01-31"), 5.25),
        ]);
        let record = series.to_record();

        assert_eq!(record.values, vec![5.25, 4.5]);
        assert_eq!(record.dates, vec!["2024-01-31", "2023-12-31"]);
        assert_eq!(record.values.len(), record.dates.len());
    }

    #[test]
    fn test_collection_preserves_insertion_order_in_json() {
        let mut collection = SeriesCollection::new();
        collection.insert("Zeta", SeriesRecord::default());
        collection.insert("Alpha", SeriesRecord::default());

        let json = serde_json::to_string(&collection).unwrap();
        assert!(json.find("Zeta").unwrap() < json.find("Alpha").unwrap());

        let parsed: SeriesCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.names().collect::<Vec<_>>(), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_collection_insert_replaces_existing_name() {
        let mut collection = SeriesCollection::new();
        collection.insert("A", SeriesRecord::default());
        collection.insert(
            "A",
            SeriesRecord {
                values: vec![1.0],
                dates: vec!["2024-01-01".to_string()],
            },
        );

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("A").unwrap().values, vec![1.0]);
    }
}
