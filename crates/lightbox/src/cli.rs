use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lightbox")]
#[command(about = "Fusion Studio - modular image workstation host", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "lightbox.toml")]
        path: PathBuf,
    },
    /// Launch the studio: load modules and attach their tabs
    Run,
    /// Inspect discoverable modules
    Modules {
        #[command(subcommand)]
        action: ModuleCommands,
    },
    /// Read or write persisted UI settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum ModuleCommands {
    /// List discoverable modules in presentation order
    List,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print a setting value
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting value (parsed as JSON, else stored as a string)
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}
