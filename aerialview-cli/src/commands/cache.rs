//! Cache inspection CLI commands.

use std::path::{Path, PathBuf};

use aerialview::cache::{disk_cache_stats, format_size};
use aerialview::service::ServiceConfig;
use clap::Subcommand;

use super::common::load_config_file;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show disk cache statistics
    Stats {
        /// Tile cache directory (default: from config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

/// Run a cache subcommand.
pub fn run(config_path: Option<&Path>, action: CacheAction) -> Result<(), CliError> {
    match action {
        CacheAction::Stats { cache_dir } => {
            let cache_dir = match cache_dir {
                Some(dir) => dir,
                None => {
                    let file = load_config_file(config_path)?;
                    file.apply(ServiceConfig::default()).cache_dir
                }
            };

            println!("Disk cache: {}", cache_dir.display());

            match disk_cache_stats(&cache_dir) {
                Ok(stats) => {
                    println!("  Files: {}", stats.files);
                    println!("  Size:  {}", format_size(stats.bytes));
                    if let Some(average) = stats.average_tile_bytes() {
                        println!("  Avg:   {} per tile", format_size(average));
                    }
                    Ok(())
                }
                Err(e) => Err(CliError::CacheStats(e.to_string())),
            }
        }
    }
}
