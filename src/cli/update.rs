use super::ui;
use crate::core::collector::collect;
use crate::core::config::AppConfig;
use crate::core::registry::Registry;
use crate::core::report::update_report;
use crate::core::summary::most_recent;
use crate::providers::Providers;
use crate::store::JsonStore;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

/// Collects every registered series, persists them and refreshes the report.
pub async fn run(config: &AppConfig, as_of: NaiveDate) -> Result<()> {
    let registry = Registry::from_definitions(&config.series)?;
    let providers = Providers::from_config(config)?;
    info!(series = registry.len(), %as_of, "Starting update");

    let pb = ui::new_progress_bar(registry.len() as u64, true);
    pb.set_message("Fetching series...");
    let collection = collect(&registry, &providers, as_of, config.on_error, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    let collection = collection?;

    JsonStore::new(&config.output.store_path).save(&collection.series)?;

    let table = most_recent(&collection.series)?;
    update_report(&config.output.report_path, &config.output.splitter, &table)?;

    println!("{}", table.display_as_table());
    for failure in &collection.failures {
        println!(
            "{}",
            ui::style_text(
                &format!("Skipped {}: {}", failure.series, failure.error),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
