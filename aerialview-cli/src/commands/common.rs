//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aerialview::config::ConfigFile;
use aerialview::provider::ProviderPreset;
use aerialview::service::ServiceConfig;
use clap::{Args, ValueEnum};

use crate::error::CliError;

/// Tile provider selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProviderArg {
    /// OpenStreetMap standard map tiles
    Osm,
    /// Esri World Imagery
    Esri,
    /// USGS National Map imagery (United States only)
    Usgs,
    /// Google satellite tiles
    Google,
}

impl From<ProviderArg> for ProviderPreset {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Osm => ProviderPreset::OpenStreetMap,
            ProviderArg::Esri => ProviderPreset::EsriWorldImagery,
            ProviderArg::Usgs => ProviderPreset::UsgsImagery,
            ProviderArg::Google => ProviderPreset::GoogleSatellite,
        }
    }
}

/// Service options shared by rendering commands. Override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ServiceArgs {
    /// Built-in tile provider
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Tile URL template with {x}, {y} and {z} (overrides --provider)
    #[arg(long)]
    pub url_template: Option<String>,

    /// Tile zoom level
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Tile cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum tile downloads in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Total attempts per tile
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Give up on pending tiles after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl ServiceArgs {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(provider) = self.provider {
            config = config.with_preset(provider.into());
        }
        if let Some(template) = &self.url_template {
            config = config.with_url_template(template.clone());
        }
        if let Some(zoom) = self.zoom {
            config = config.with_zoom(zoom);
        }
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_http_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.deadline_secs {
            config = config.with_request_deadline(Some(Duration::from_secs(secs)));
        }
        config
    }
}

/// Load the config file: the given path, else the default location if it
/// exists, else nothing.
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let file = match path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    Ok(file)
}

/// Resolve service settings: defaults, then config file, then CLI flags.
pub fn resolve_service_config(
    config_path: Option<&Path>,
    args: &ServiceArgs,
) -> Result<ServiceConfig, CliError> {
    let file = load_config_file(config_path)?;
    let config = args.apply(file.apply(ServiceConfig::default()));
    config.validate()?;
    Ok(config)
}

/// Print the built-in providers.
pub fn print_providers() {
    println!("{:<8} {:<24} {:>8}", "ID", "NAME", "MAX ZOOM");
    for preset in ProviderPreset::ALL {
        println!(
            "{:<8} {:<24} {:>8}",
            preset.id(),
            preset.name(),
            preset.max_zoom()
        );
    }
}
