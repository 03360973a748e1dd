//! campana CLI - record a reference sound and monitor the microphone for it.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "campana")]
#[command(author, version, about = "Acoustic chime detector CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new reference sound pattern
    Record(commands::record::RecordArgs),

    /// Monitor the microphone for the recorded pattern
    Monitor(commands::monitor::MonitorArgs),

    /// Show the stored reference pattern
    Show(commands::show::ShowArgs),

    /// List available audio input devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record(args) => commands::record::run(args),
        Commands::Monitor(args) => commands::monitor::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
