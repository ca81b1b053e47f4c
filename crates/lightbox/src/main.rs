mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ModuleCommands, SettingsCommands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    fusion_runtime::init_logging();

    // Parse CLI args
    let cli = Cli::parse();

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    // Load config
    let config = config::load_config(cli.config.as_deref())?;

    // Dispatch to command
    match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Run => {
            commands::run::execute(&config).await?;
        }
        Commands::Modules { action } => match action {
            ModuleCommands::List => {
                commands::modules::execute(&config)?;
            }
        },
        Commands::Settings { action } => match action {
            SettingsCommands::Get { key } => {
                commands::settings::get(&config, &key)?;
            }
            SettingsCommands::Set { key, value } => {
                commands::settings::set(&config, &key, &value)?;
            }
        },
    }

    Ok(())
}
