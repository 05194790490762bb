//! Tile URL templates.
//!
//! A template is a URL containing `{x}`, `{y}` and `{z}` placeholders, for
//! example `https://tile.openstreetmap.org/{z}/{x}/{y}.png`.

use std::fmt;

use crate::coord::TileCoord;

use super::types::ProviderError;

const PLACEHOLDERS: [&str; 3] = ["{x}", "{y}", "{z}"];

/// Validated tile URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Parse a template, requiring all three placeholders.
    pub fn new(template: impl Into<String>) -> Result<Self, ProviderError> {
        let template = template.into();

        if !(template.starts_with("http://") || template.starts_with("https://")) {
            return Err(ProviderError::InvalidTemplate {
                template,
                reason: "must be an http:// or https:// URL".to_string(),
            });
        }

        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !template.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(ProviderError::InvalidTemplate {
                reason: format!("missing placeholder(s) {}", missing.join(", ")),
                template,
            });
        }

        Ok(Self { template })
    }

    /// Builds the URL for a tile.
    pub fn url(&self, tile: &TileCoord) -> String {
        self.template
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &tile.zoom.to_string())
    }

    /// The raw template string.
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let template = UrlTemplate::new("https://tile.openstreetmap.org/{z}/{x}/{y}.png").unwrap();
        let url = template.url(&TileCoord::new(19295, 24640, 16));
        assert_eq!(url, "https://tile.openstreetmap.org/16/19295/24640.png");
    }

    #[test]
    fn test_url_construction_query_style() {
        let template = UrlTemplate::new("https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}").unwrap();
        let url = template.url(&TileCoord::new(1, 2, 3));
        assert_eq!(url, "https://mt1.google.com/vt/lyrs=s&x=1&y=2&z=3");
    }

    #[test]
    fn test_negative_indices_render_verbatim() {
        let template = UrlTemplate::new("https://t.example/{z}/{x}/{y}").unwrap();
        assert_eq!(template.url(&TileCoord::new(-1, 0, 2)), "https://t.example/2/-1/0");
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let result = UrlTemplate::new("https://t.example/{z}/{x}.png");
        match result {
            Err(ProviderError::InvalidTemplate { reason, .. }) => assert!(reason.contains("{y}")),
            other => panic!("Expected InvalidTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_non_http_rejected() {
        assert!(UrlTemplate::new("file:///tiles/{z}/{x}/{y}.png").is_err());
    }
}
