//! Prelude module for common beredskapskart types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use beredskapskart::prelude::*;`

pub use crate::core::{
    events::{EventQueue, MapEvent},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{MapHost, MapOptions},
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerTrait, LayerType},
    district::{DistrictLayer, DistrictProperties},
    manager::LayerManager,
    shelter::{ShelterLayer, ShelterProperties},
    tile::TileLayer,
};

pub use crate::controllers::{DistrictController, ShelterController, ToggleState};

pub use crate::data::{
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    source::FeatureSource,
};

pub use crate::ui::{
    popup::{Popup, PopupManager, PopupStyle},
    widget::{MapResponse, MapSurfaceExt},
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
