//! Built-in tile server presets.
//!
//! Each preset is a well-known public XYZ tile endpoint. Check the provider's
//! terms of use before fetching from it; no licensing checks are made here.
//!
//! # Coordinate System
//!
//! All presets use standard Web Mercator XYZ tile coordinates:
//! - X: Column (0 to 2^zoom - 1, west to east)
//! - Y: Row (0 to 2^zoom - 1, north to south)

use std::fmt;

/// A named tile server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderPreset {
    /// OpenStreetMap standard map tiles (not imagery).
    OpenStreetMap,
    /// Esri World Imagery, global satellite/aerial coverage.
    EsriWorldImagery,
    /// USGS National Map orthoimagery, United States only.
    UsgsImagery,
    /// Google satellite layer via the public tile servers.
    GoogleSatellite,
}

impl ProviderPreset {
    /// All presets, in display order.
    pub const ALL: [ProviderPreset; 4] = [
        ProviderPreset::EsriWorldImagery,
        ProviderPreset::UsgsImagery,
        ProviderPreset::GoogleSatellite,
        ProviderPreset::OpenStreetMap,
    ];

    /// URL template with `{x}`, `{y}`, `{z}` placeholders.
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::EsriWorldImagery => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            Self::UsgsImagery => {
                "https://basemap.nationalmap.gov/arcgis/rest/services/USGSImageryOnly/MapServer/tile/{z}/{y}/{x}"
            }
            Self::GoogleSatellite => "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
        }
    }

    /// Short identifier used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "osm",
            Self::EsriWorldImagery => "esri",
            Self::UsgsImagery => "usgs",
            Self::GoogleSatellite => "google",
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::EsriWorldImagery => "Esri World Imagery",
            Self::UsgsImagery => "USGS Imagery",
            Self::GoogleSatellite => "Google Satellite",
        }
    }

    /// Highest zoom level the provider serves.
    pub fn max_zoom(&self) -> u8 {
        match self {
            Self::OpenStreetMap => 19,
            Self::EsriWorldImagery => 19,
            Self::UsgsImagery => 16,
            Self::GoogleSatellite => 22,
        }
    }

    /// Parse from an identifier (case-insensitive).
    pub fn from_id(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.id() == s)
    }
}

impl Default for ProviderPreset {
    fn default() -> Self {
        Self::EsriWorldImagery
    }
}

impl fmt::Display for ProviderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
