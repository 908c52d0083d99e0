//! Error taxonomy shared by adapters, the summarizer and the report updater.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    /// Remote call failed or returned a non-success status.
    #[error("Request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Payload does not match the shape the adapter expects.
    #[error("Failed to parse {adapter} response: {reason}")]
    Parse { adapter: String, reason: String },

    /// A series required for the summary has no entries.
    #[error("Series '{series}' has no data points")]
    MissingData { series: String },

    /// The report splitter marker is missing or duplicated.
    #[error("Report marker '{marker}' must appear exactly once, found {found} occurrences")]
    Format { marker: String, found: usize },
}

impl SeriesError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        SeriesError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(adapter: impl Into<String>, reason: impl ToString) -> Self {
        SeriesError::Parse {
            adapter: adapter.into(),
            reason: reason.to_string(),
        }
    }
}
