pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::debug;

pub enum AppCommand {
    Update,
    Show,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Update => {
            let as_of = chrono::Local::now().date_naive();
            cli::update::run(&config, as_of).await
        }
        AppCommand::Show => cli::show::run(&config),
    }
}
