//! Core business logic abstractions

pub mod collector;
pub mod config;
pub mod error;
pub mod log;
pub mod registry;
pub mod report;
pub mod series;
pub mod summary;

// Re-export main types for cleaner imports
pub use error::SeriesError;
pub use series::{Observation, Series, SeriesCollection, SeriesQuery, SeriesRecord, SeriesSource};
