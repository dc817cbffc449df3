use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for the action router binary.
#[derive(Parser)]
#[command(name = "actiongate")]
#[command(about = "Coroutine-powered HTTP action router", long_about = None)]
pub struct Cli {
    /// Settings file (YAML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listening port; overrides the settings file.
    #[arg(short, long)]
    pub port: Option<u16>,
}
