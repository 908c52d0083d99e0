//! Splices the latest-value table into the report document after its marker.

use crate::core::error::SeriesError;
use crate::core::series::DATE_FORMAT;
use crate::core::summary::MostRecentTable;
use anyhow::{Context, Result};
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use std::fs;
use std::path::Path;
use tracing::info;

/// Renders the table as Markdown with columns Variable, Date and Value.
pub fn render_markdown(table: &MostRecentTable) -> String {
    let mut markdown = Table::new();
    markdown
        .load_preset(ASCII_MARKDOWN)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["Variable", "Date", "Value"]);

    for row in &table.rows {
        markdown.add_row(vec![
            row.series.clone(),
            row.date.format(DATE_FORMAT).to_string(),
            row.value.to_string(),
        ]);
    }
    if let Some(column) = markdown.column_mut(2) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    markdown.to_string()
}

/// Keeps everything up to and including `marker`, replacing the rest with `rendered`.
pub fn splice(document: &str, marker: &str, rendered: &str) -> Result<String, SeriesError> {
    let found = if marker.is_empty() {
        0
    } else {
        document.matches(marker).count()
    };
    let Some((before, _)) = document.split_once(marker).filter(|_| found == 1) else {
        return Err(SeriesError::Format {
            marker: marker.to_string(),
            found,
        });
    };

    Ok(format!("{before}{marker}\n\n{rendered}"))
}

pub fn update_report(path: &Path, marker: &str, table: &MostRecentTable) -> Result<()> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;

    let updated = splice(&document, marker, &render_markdown(table))
        .with_context(|| format!("Failed to update report: {}", path.display()))?;

    fs::write(path, updated)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    info!("Updated report at {}", path.display());
    Ok(())
}
