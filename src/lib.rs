//! # Beredskapskart
//!
//! A small interactive map viewer for civil preparedness data, built on a
//! minimal Rust-native map engine.
//!
//! Two optional GeoJSON overlays — civil defense districts (polygons) and
//! public emergency shelters (points) — can be toggled onto an OpenStreetMap
//! base layer. Clicking a visible overlay opens a popup with the feature's
//! attributes; shelter points additionally switch to a highlighted style
//! while selected.

pub mod controllers;
pub mod core;
pub mod data;
pub mod layers;
pub mod tiles;
pub mod ui;

pub mod prelude;

// Re-export public API
pub use crate::core::{
    events::MapEvent,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{MapHost, MapOptions},
    viewport::Viewport,
};

pub use crate::layers::{
    base::LayerTrait, district::DistrictLayer, shelter::ShelterLayer, tile::TileLayer,
};

pub use crate::controllers::{DistrictController, ShelterController, ToggleState};

pub use crate::data::{geojson::GeoJson, source::FeatureSource};

pub use crate::ui::{popup::Popup, widget::MapSurfaceExt};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
