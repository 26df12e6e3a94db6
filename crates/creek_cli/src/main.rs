//! Creek CLI
//!
//! Command-line tools for size-rotating log files.
//!
//! # Commands
//!
//! - `pipe` - Copy standard input into a rotating log file
//! - `compress` - Compress backups left uncompressed by an earlier process
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Creek rotating log tools.
#[derive(Parser)]
#[command(name = "creek")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the active log file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy standard input into a rotating log file, one line per write
    Pipe {
        /// Maximum size of the log file in megabytes before rotation
        #[arg(short, long, default_value = "10")]
        max_size: u64,

        /// Compress leftover backups before starting
        #[arg(short, long)]
        recover: bool,
    },

    /// Compress backups that were rotated but never compressed
    Compress,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pipe { max_size, recover } => {
            let path = cli.path.ok_or("Log file path required for pipe")?;
            commands::pipe::run(&path, max_size, recover)?;
        }
        Commands::Compress => {
            let path = cli.path.ok_or("Log file path required for compress")?;
            commands::compress::run(&path)?;
        }
        Commands::Version => {
            println!("Creek CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Creek v{}", creek::VERSION);
        }
    }

    Ok(())
}
