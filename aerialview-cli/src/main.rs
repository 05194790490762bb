//! AerialView CLI - Command-line interface
//!
//! Renders simulated aerial camera frames from slippy-map tiles.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use aerialview::logging::{init_logging, LoggingConfig};
use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::fly::FlyArgs;
use commands::render::RenderArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "aerialview", version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/aerialview/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log debug output from the library
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a single camera frame to an image file
    Render(RenderArgs),
    /// Render a sequence of frames along a straight flight path
    Fly(FlyArgs),
    /// Inspect the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// List the built-in tile providers
    Providers,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "aerialview=debug"
    } else {
        "aerialview=info"
    };
    let logging = LoggingConfig::default()
        .with_filter(filter)
        .with_log_file(cli.log_file.clone());

    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => commands::render::run(config, args).await,
        Commands::Fly(args) => commands::fly::run(config, args).await,
        Commands::Cache { action } => commands::cache::run(config, action),
        Commands::Providers => {
            commands::common::print_providers();
            Ok(())
        }
    }
}
