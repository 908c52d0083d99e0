use crate::core::error::SeriesError;
use crate::core::series::SeriesCollection;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flat JSON document mapping series name to `{values, dates}`.
///
/// Every save overwrites the whole file. Writes are not atomic.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refuses to write `NaN` or infinite values, which JSON would store as `null`.
    pub fn save(&self, collection: &SeriesCollection) -> Result<()> {
        for (name, record) in collection.iter() {
            if let Some(value) = record.values.iter().find(|v| !v.is_finite()) {
                return Err(SeriesError::parse(
                    "store",
                    format!("series '{name}' holds non-finite value {value}"),
                ))
                .with_context(|| format!("Refusing to write store: {}", self.path.display()));
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_vec(collection).context("Failed to serialize series")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store: {}", self.path.display()))?;
        info!(
            "Saved {} series to {}",
            collection.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<SeriesCollection> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store: {}", self.path.display()))?;
        let collection: SeriesCollection = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store: {}", self.path.display()))?;

        for (name, record) in collection.iter() {
            if record.values.len() != record.dates.len() {
                return Err(SeriesError::parse(
                    "store",
                    format!(
                        "series '{name}' has {} values but {} dates",
                        record.values.len(),
                        record.dates.len()
                    ),
                ))
                .with_context(|| format!("Invalid store: {}", self.path.display()));
            }
        }
        debug!("Loaded {} series from {}", collection.len(), self.path.display());
        Ok(collection)
    }
}
