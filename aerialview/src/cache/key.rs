//! Cache key derivation.
//!
//! Tiles are keyed purely by their URL. The default scheme strips every
//! character that is not an ASCII letter or digit, producing a readable,
//! filesystem-safe name. It is lossy: two URLs that differ only in
//! punctuation (`/1/23/4` and `/12/3/4`) map to the same key. The
//! [`CacheKeyScheme::Sha256`] scheme avoids collisions at the cost of
//! readability and of invalidating caches built with the default scheme.

use std::fmt;

use sha2::{Digest, Sha256};

/// How a tile URL becomes a cache file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKeyScheme {
    /// Keep only the ASCII letters and digits of the URL.
    Alphanumeric,
    /// Lowercase hex SHA-256 of the full URL.
    Sha256,
}

impl Default for CacheKeyScheme {
    fn default() -> Self {
        Self::Alphanumeric
    }
}

impl CacheKeyScheme {
    /// Derive the cache key for a URL.
    pub fn key_for(&self, url: &str) -> String {
        match self {
            Self::Alphanumeric => alphanumeric_key(url),
            Self::Sha256 => format!("{:x}", Sha256::digest(url.as_bytes())),
        }
    }

    /// Parse from a config identifier (case-insensitive).
    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "alphanumeric" => Some(Self::Alphanumeric),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alphanumeric => f.write_str("alphanumeric"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

/// Strip a URL down to its ASCII letters and digits.
pub fn alphanumeric_key(url: &str) -> String {
    url.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_key() {
        let key = alphanumeric_key("https://tile.openstreetmap.org/16/19295/24640.png");
        assert_eq!(key, "httpstileopenstreetmaporg161929524640png");
    }

    #[test]
    fn test_alphanumeric_key_drops_non_ascii() {
        assert_eq!(
            alphanumeric_key("https://kacheln.example/zürich/17/5/6.png"),
            "httpskachelnexamplezrich1756png"
        );
        assert_eq!(alphanumeric_key("https://t.example/١٢/٣"), "httpstexample");
    }

    #[test]
    fn test_alphanumeric_key_collides_on_punctuation() {
        assert_eq!(
            alphanumeric_key("https://t.example/1/23/4"),
            alphanumeric_key("https://t.example/12/3/4")
        );
    }

    #[test]
    fn test_sha256_key_distinguishes_punctuation() {
        let scheme = CacheKeyScheme::Sha256;
        let a = scheme.key_for("https://t.example/1/23/4");
        let b = scheme.key_for("https://t.example/12/3/4");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_default_scheme_is_alphanumeric() {
        assert_eq!(CacheKeyScheme::default(), CacheKeyScheme::Alphanumeric);
        assert_eq!(CacheKeyScheme::default().key_for("a/b-c"), "abc");
    }

    #[test]
    fn test_from_id() {
        assert_eq!(CacheKeyScheme::from_id("SHA256"), Some(CacheKeyScheme::Sha256));
        assert_eq!(
            CacheKeyScheme::from_id("alphanumeric"),
            Some(CacheKeyScheme::Alphanumeric)
        );
        assert_eq!(CacheKeyScheme::from_id("md5"), None);
    }
}
