use super::ui;
use crate::core::config::AppConfig;
use crate::core::series::DATE_FORMAT;
use crate::core::summary::{MostRecentTable, most_recent};
use crate::store::JsonStore;
use anyhow::Result;
use comfy_table::Cell;

impl MostRecentTable {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Variable"),
            ui::header_cell("Date"),
            ui::header_cell("Value"),
        ]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.series),
                Cell::new(row.date.format(DATE_FORMAT)),
                ui::value_cell(row.value),
            ]);
        }

        format!(
            "{}\n\n{}",
            ui::style_text("Latest values", ui::StyleType::Title),
            table
        )
    }
}

/// Prints the latest values from the store without fetching anything.
pub fn run(config: &AppConfig) -> Result<()> {
    let store = JsonStore::new(&config.output.store_path);
    let collection = store.load()?;
    let table = most_recent(&collection)?;

    println!("{}", table.display_as_table());
    println!(
        "\n{}",
        ui::style_text(
            &format!("Source: {}", store.path().display()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
