//! Chestledger CLI - Merge captured chest text into the clan ledger.

use chestledger_cli::commands;
use chestledger_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> chestledger_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    if let Some(database) = cli.database {
        config.database = database;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
        Command::Process(args) => {
            commands::execute_process(args, &config, &formatter).await?;
        }
        Command::Build(args) => {
            commands::execute_build(args, &config, &formatter).await?;
        }
        Command::Ledger(args) => {
            commands::execute_ledger(args, &config, &formatter)?;
        }
        Command::Roster(args) => {
            commands::execute_roster(args, &config, &formatter)?;
        }
        Command::Rewards => {
            commands::execute_rewards(&config, &formatter)?;
        }
    }

    Ok(())
}
