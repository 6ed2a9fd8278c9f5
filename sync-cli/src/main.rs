//! # callsync
//!
//! Command-line runner for the call-log sync pipeline.
//!
//! ## Commands
//!
//! - `init`: Write a default configuration file
//! - `run`: Capture, diff, deliver and reconcile once
//! - `status`: Show snapshot and mirror state
//!
//! ## Example
//!
//! ```bash
//! # Create callsync.toml in the current directory
//! callsync init
//!
//! # Run the pipeline (exits non-zero if the run ends in error)
//! callsync run
//!
//! # Inspect what is on disk
//! callsync --config /etc/callsync.toml status
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod commands;
mod config;
mod logging;
mod webhook;

use commands::{init, run, status};
use config::{AppConfig, LoggingConfig};

/// Command-line runner for the call-log sync pipeline.
#[derive(Parser, Debug)]
#[command(name = "callsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "callsync.toml")]
    config: PathBuf,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the sync pipeline once
    Run,

    /// Show snapshot and mirror state
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            logging::init(cli.verbose, &LoggingConfig::default().filter);
            init::run(&cli.config, force).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run => {
            let config = load_config(&cli.config)?;
            logging::init(cli.verbose, &config.logging.filter);
            run::run(&config).await
        }
        Commands::Status => {
            let config = load_config(&cli.config)?;
            logging::init(cli.verbose, &config.logging.filter);
            status::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::from_file(path)
        .with_context(|| format!("Failed to load config. Run 'callsync init' to create {}.", path.display()))
}
