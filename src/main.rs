use anyhow::Result;
use clap::{Parser, Subcommand};
use macrofeed::core::log::{Verbosity, init_logging};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for macrofeed::AppCommand {
    fn from(cmd: Commands) -> macrofeed::AppCommand {
        match cmd {
            Commands::Update => macrofeed::AppCommand::Update,
            Commands::Show => macrofeed::AppCommand::Show,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch all series, save them and update the report (default)
    Update,
    /// Display the latest saved value of each series
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    let result = match cli.command.unwrap_or(Commands::Update) {
        Commands::Setup => match cli.config_path.as_deref() {
            Some(path) => macrofeed::cli::setup::setup_at_path(path),
            None => macrofeed::cli::setup::setup(),
        },
        cmd => macrofeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = ?e, "Application failed");
    }
    result
}
