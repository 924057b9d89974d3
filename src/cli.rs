use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "farmops", version, about = "Farm operations TUI with spray window planning")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    /// Fetch the forecast and print spray windows without the TUI
    Analyze {
        /// Spray type to plan for (herbicide, fungicide, insecticide)
        #[arg(short, long, default_value = "herbicide")]
        spray_type: String,

        /// Emit the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
}
