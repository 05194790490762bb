//! Tile server access.
//!
//! This module provides the HTTP client seam used to download tiles, URL
//! templates that turn a [`TileCoord`](crate::coord::TileCoord) into a
//! request URL, a handful of built-in provider presets, and the retry policy
//! applied to transient failures.
//!
//! ```ignore
//! use aerialview::provider::{ProviderPreset, ReqwestClient, UrlTemplate};
//!
//! let client = ReqwestClient::new()?;
//! let template = UrlTemplate::new(ProviderPreset::EsriWorldImagery.url_template())?;
//! let body = client.get(&template.url(&tile)).await?;
//! ```

mod http;
mod presets;
mod retry;
mod template;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use presets::ProviderPreset;
pub use retry::{RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_DELAY};
pub use template::UrlTemplate;
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockHttpClient;
