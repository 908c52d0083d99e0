//! Drives the registry through the adapters and assembles the series collection.

use crate::core::config::FailurePolicy;
use crate::core::registry::Registry;
use crate::core::series::{SeriesCollection, SeriesSource};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectFailure {
    pub series: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct Collection {
    pub series: SeriesCollection,
    /// Only populated under [`FailurePolicy::Skip`].
    pub failures: Vec<CollectFailure>,
}

/// Fetches every registry entry in order, one at a time.
///
/// Fails when nothing was collected, even under [`FailurePolicy::Skip`].
pub async fn collect(
    registry: &Registry,
    source: &dyn SeriesSource,
    as_of: NaiveDate,
    policy: FailurePolicy,
    on_progress: &dyn Fn(),
) -> Result<Collection> {
    let mut collection = Collection::default();

    for entry in registry.entries() {
        debug!(series = %entry.name, adapter = %entry.adapter, "Collecting series");
        let result = source
            .fetch_series(&entry.query, as_of)
            .await
            .with_context(|| {
                format!(
                    "Failed to collect series '{}' via {}",
                    entry.name, entry.adapter
                )
            });
        on_progress();

        match (result, policy) {
            (Ok(series), _) => {
                debug!(series = %entry.name, points = series.len(), "Collected series");
                collection.series.insert(entry.name.clone(), series.to_record());
            }
            (Err(e), FailurePolicy::Abort) => return Err(e),
            (Err(e), FailurePolicy::Skip) => {
                let error = format!("{e:#}");
                warn!(series = %entry.name, %error, "Skipping series");
                collection.failures.push(CollectFailure {
                    series: entry.name.clone(),
                    error,
                });
            }
        }
    }

    if collection.series.is_empty() {
        bail!(
            "All {} series failed to collect, leaving existing outputs untouched",
            collection.failures.len()
        );
    }

    info!(
        collected = collection.series.len(),
        failed = collection.failures.len(),
        "Collection finished"
    );
    Ok(collection)
}
