use crate::core::geo::LatLng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl GeoJsonGeometry {
    /// Gets the position of a point geometry.
    ///
    /// GeoJSON positions are `[longitude, latitude]`.
    pub fn point(&self) -> Option<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => {
                Some(LatLng::new(coordinates[1], coordinates[0]))
            }
            _ => None,
        }
    }

    /// Gets the polygon rings of an areal geometry, one entry per polygon.
    ///
    /// Each polygon is a list of rings (exterior first, then holes), each
    /// ring a closed list of coordinates. Non-areal geometries yield an
    /// empty list.
    pub fn polygons(&self) -> Vec<Vec<Vec<LatLng>>> {
        match self {
            GeoJsonGeometry::Polygon { coordinates } => {
                vec![Self::rings_to_lat_lng(coordinates)]
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .map(|rings| Self::rings_to_lat_lng(rings))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn rings_to_lat_lng(rings: &[Vec<[f64; 2]>]) -> Vec<Vec<LatLng>> {
        rings
            .iter()
            .map(|ring| ring.iter().map(|c| LatLng::new(c[1], c[0])).collect())
            .collect()
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    /// Deserializes this feature's property record into a typed schema.
    ///
    /// Layers call this once at load time so that attribute access after
    /// loading is plain field access, not dynamic casting.
    pub fn typed_properties<T: DeserializeOwned>(&self) -> crate::Result<T> {
        let object = self
            .properties
            .clone()
            .map(|props| serde_json::Value::Object(props.into_iter().collect()))
            .unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(object)?)
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    /// Parses a GeoJSON document from a raw JSON string
    pub fn from_str(geojson_str: &str) -> crate::Result<Self> {
        let data: GeoJson = serde_json::from_str(geojson_str)
            .map_err(|e| crate::Error::ParseError(format!("Invalid GeoJSON: {}", e)))?;
        Ok(data)
    }

    /// Consumes the document and returns its features
    pub fn into_features(self) -> Vec<GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
        }
    }
}
