//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheKeyScheme;
use crate::coord::MAX_ZOOM;
use crate::grid::DEFAULT_CONCURRENCY;
use crate::provider::{
    ProviderPreset, RetryPolicy, UrlTemplate, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

use super::error::ConfigError;

/// Default total attempts per tile.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default tile zoom level.
pub const DEFAULT_ZOOM: u8 = 18;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Default cap on tiles fetched for one request.
pub const DEFAULT_MAX_TILES_PER_REQUEST: usize = 1024;

/// Name of the cache subdirectory under the platform cache dir.
pub const CACHE_DIR_NAME: &str = "aerialview";

/// Default cache directory: `<platform cache dir>/aerialview`.
///
/// Falls back to a relative `.aerialview-cache` when the platform has no
/// cache directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".aerialview-cache"))
}

/// Configuration for [`AerialViewService`](super::AerialViewService).
///
/// Built with [`Default`] and adjusted with the `with_*` methods.
///
/// # Example
///
/// ```
/// use aerialview::service::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::default()
///     .with_zoom(17)
///     .with_concurrency(8)
///     .with_request_deadline(Some(Duration::from_secs(20)));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding cached tiles.
    pub cache_dir: PathBuf,
    /// Total attempts per tile for transport failures (at least 1).
    pub max_retries: u32,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_backoff: Duration,
    /// Tile zoom level.
    pub zoom: u8,
    /// Nominal tile edge in pixels.
    pub tile_size: u32,
    /// Tile URL template with `{x}`, `{y}`, `{z}`.
    pub url_template: String,
    /// Maximum tile fetches in flight.
    pub concurrency: usize,
    /// Overall deadline for the fetch phase of one request.
    pub request_deadline: Option<Duration>,
    /// How tile URLs map to cache file names.
    pub cache_key_scheme: CacheKeyScheme,
    /// Let cached tiles skip the concurrency limit.
    pub cache_hits_bypass_limiter: bool,
    /// Reject requests whose bounding box exceeds this many tiles.
    pub max_tiles_per_request: usize,
    /// User-Agent sent to the tile server.
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_retries: DEFAULT_MAX_RETRIES,
            http_timeout: DEFAULT_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            zoom: DEFAULT_ZOOM,
            tile_size: DEFAULT_TILE_SIZE,
            url_template: ProviderPreset::default().url_template().to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            request_deadline: None,
            cache_key_scheme: CacheKeyScheme::default(),
            cache_hits_bypass_limiter: true,
            max_tiles_per_request: DEFAULT_MAX_TILES_PER_REQUEST,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Use a built-in provider's template.
    pub fn with_preset(mut self, preset: ProviderPreset) -> Self {
        self.url_template = preset.url_template().to_string();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_request_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.request_deadline = deadline;
        self
    }

    pub fn with_cache_key_scheme(mut self, scheme: CacheKeyScheme) -> Self {
        self.cache_key_scheme = scheme;
        self
    }

    pub fn with_cache_hits_bypass_limiter(mut self, bypass: bool) -> Self {
        self.cache_hits_bypass_limiter = bypass;
        self
    }

    pub fn with_max_tiles_per_request(mut self, max: usize) -> Self {
        self.max_tiles_per_request = max;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse the URL template.
    pub fn template(&self) -> Result<UrlTemplate, ConfigError> {
        UrlTemplate::new(self.url_template.as_str()).map_err(ConfigError::Template)
    }

    /// Retry policy implied by `max_retries` and `retry_backoff`.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.max_retries <= 1 {
            RetryPolicy::None
        } else if self.retry_backoff.is_zero() {
            RetryPolicy::fixed(self.max_retries, Duration::ZERO)
        } else {
            RetryPolicy::exponential(self.max_retries, self.retry_backoff)
        }
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.template()?;

        if self.zoom > MAX_ZOOM {
            return Err(ConfigError::invalid(
                "zoom",
                format!("{} exceeds {}", self.zoom, MAX_ZOOM),
            ));
        }
        if self.tile_size == 0 {
            return Err(ConfigError::invalid("tile_size", "must be positive"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency", "must be positive"));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid("max_retries", "must be at least 1"));
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::invalid("http_timeout", "must be positive"));
        }
        if self.max_tiles_per_request == 0 {
            return Err(ConfigError::invalid(
                "max_tiles_per_request",
                "must be positive",
            ));
        }
        Ok(())
    }
}
