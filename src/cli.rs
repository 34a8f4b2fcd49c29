use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "refresharr")]
#[command(author, version, about = "Searches Sonarr and Radarr for missing and upgradable media")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run hunt cycles until interrupted
    Run,

    /// Run a single hunt cycle and exit
    Once,

    /// Show processed-store sizes and time until the next reset
    Status,

    /// Clear the processed stores
    Reset {
        /// Only clear this media kind (series or movies)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
