//! INI configuration file support.
//!
//! ```ini
//! [provider]
//! ; either a preset (osm, esri, usgs, google) or an explicit template
//! preset = esri
//! url_template = https://tiles.example.com/{z}/{x}/{y}.png
//!
//! [cache]
//! directory = ~/.cache/aerialview
//! key_scheme = alphanumeric
//!
//! [fetch]
//! max_retries = 3
//! timeout_secs = 60
//! concurrency = 5
//! request_deadline_secs = 30
//!
//! [tiles]
//! zoom = 18
//! tile_size = 256
//! ```
//!
//! Every key is optional. Missing keys keep the [`ServiceConfig`] default.
//! When both `preset` and `url_template` are given, the template wins.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use crate::cache::CacheKeyScheme;
use crate::provider::ProviderPreset;
use crate::service::ServiceConfig;

pub use crate::service::ConfigError;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default config file location: `<platform config dir>/aerialview/config.ini`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aerialview").join(CONFIG_FILE_NAME))
}

/// Settings read from an INI file, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub preset: Option<ProviderPreset>,
    pub url_template: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub cache_key_scheme: Option<CacheKeyScheme>,
    pub max_retries: Option<u32>,
    pub timeout: Option<Duration>,
    pub concurrency: Option<usize>,
    pub request_deadline: Option<Duration>,
    pub zoom: Option<u8>,
    pub tile_size: Option<u32>,
}

impl ConfigFile {
    /// Read a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::parse(&text)
    }

    /// Read the default config file if it exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let preset = match get(&ini, "provider", "preset") {
            Some(id) => Some(
                ProviderPreset::from_id(id).ok_or_else(|| ConfigError::UnknownPreset(id.into()))?,
            ),
            None => None,
        };

        let cache_key_scheme = match get(&ini, "cache", "key_scheme") {
            Some(value) => Some(CacheKeyScheme::from_id(value).ok_or_else(|| {
                invalid_value("cache", "key_scheme", value, "expected alphanumeric or sha256")
            })?),
            None => None,
        };

        Ok(Self {
            preset,
            url_template: get(&ini, "provider", "url_template").map(str::to_string),
            cache_dir: get(&ini, "cache", "directory").map(expand_home),
            cache_key_scheme,
            max_retries: parse_num(&ini, "fetch", "max_retries")?,
            timeout: parse_num(&ini, "fetch", "timeout_secs")?.map(Duration::from_secs),
            concurrency: parse_num(&ini, "fetch", "concurrency")?,
            request_deadline: parse_num(&ini, "fetch", "request_deadline_secs")?
                .map(Duration::from_secs),
            zoom: parse_num(&ini, "tiles", "zoom")?,
            tile_size: parse_num(&ini, "tiles", "tile_size")?,
        })
    }

    /// Apply the file's settings on top of `base`.
    pub fn apply(&self, mut base: ServiceConfig) -> ServiceConfig {
        if let Some(preset) = self.preset {
            base = base.with_preset(preset);
        }
        if let Some(template) = &self.url_template {
            base = base.with_url_template(template.clone());
        }
        if let Some(dir) = &self.cache_dir {
            base = base.with_cache_dir(dir.clone());
        }
        if let Some(scheme) = self.cache_key_scheme {
            base = base.with_cache_key_scheme(scheme);
        }
        if let Some(max_retries) = self.max_retries {
            base = base.with_max_retries(max_retries);
        }
        if let Some(timeout) = self.timeout {
            base = base.with_http_timeout(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            base = base.with_concurrency(concurrency);
        }
        if self.request_deadline.is_some() {
            base = base.with_request_deadline(self.request_deadline);
        }
        if let Some(zoom) = self.zoom {
            base = base.with_zoom(zoom);
        }
        if let Some(tile_size) = self.tile_size {
            base = base.with_tile_size(tile_size);
        }
        base
    }

    /// Build a validated [`ServiceConfig`] from the defaults and this file.
    pub fn to_service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let config = self.apply(ServiceConfig::default());
        config.validate()?;
        Ok(config)
    }
}

fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_num<T>(ini: &Ini, section: &str, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(ini, section, key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| invalid_value(section, key, value, e.to_string())),
        None => Ok(None),
    }
}

fn invalid_value(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
