use crate::{
    core::{
        geo::{LatLng, LatLngBounds},
        viewport::Viewport,
    },
    data::geojson::GeoJson,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    Result,
};
use serde::Deserialize;

/// Attribute record of a civil defense district, validated at load time
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistrictProperties {
    pub navn: String,
}

/// A single civil defense district: one or more polygons plus attributes
#[derive(Debug, Clone)]
pub struct DistrictFeature {
    pub id: String,
    /// Polygons making up the district; each polygon is a list of rings,
    /// exterior ring first, holes after
    pub polygons: Vec<Vec<Vec<LatLng>>>,
    pub properties: DistrictProperties,
}

impl DistrictFeature {
    /// Checks whether the district covers the given coordinate
    pub fn contains(&self, coord: &LatLng) -> bool {
        self.polygons.iter().any(|rings| {
            let Some(exterior) = rings.first() else {
                return false;
            };
            ring_contains(exterior, coord) && !rings[1..].iter().any(|hole| ring_contains(hole, coord))
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let mut bounds: Option<LatLngBounds> = None;
        for rings in &self.polygons {
            if let Some(ring_bounds) = rings.first().and_then(|r| LatLngBounds::from_points(r)) {
                bounds = Some(match bounds {
                    Some(b) => b.union(&ring_bounds),
                    None => ring_bounds,
                });
            }
        }
        bounds
    }
}

/// Visual style for district polygons
#[derive(Debug, Clone)]
pub struct DistrictStyle {
    pub fill: egui::Color32,
    pub stroke: egui::Color32,
    pub stroke_width: f32,
}

impl Default for DistrictStyle {
    fn default() -> Self {
        Self {
            fill: egui::Color32::from_rgba_unmultiplied(0xF8, 0xE4, 0x73, 0x40),
            stroke: egui::Color32::from_rgb(0x7F, 0x00, 0xFF),
            stroke_width: 2.0,
        }
    }
}

/// Overlay layer showing civil defense district polygons
pub struct DistrictLayer {
    properties: LayerProperties,
    features: Vec<DistrictFeature>,
    style: DistrictStyle,
}

impl DistrictLayer {
    /// Creates an empty layer; features arrive when the dataset does
    pub fn new(id: String, name: String) -> Self {
        let properties = LayerProperties::new(id, name, LayerType::District).with_z_index(10);
        Self {
            properties,
            features: Vec::new(),
            style: DistrictStyle::default(),
        }
    }

    /// Replaces the layer's features with the contents of a GeoJSON
    /// document.
    ///
    /// Attribute records are schema-validated here, once; features with
    /// malformed properties or non-areal geometry are skipped with a
    /// warning.
    pub fn load_geojson(&mut self, data: GeoJson) {
        self.features.clear();

        for (index, feature) in data.into_features().into_iter().enumerate() {
            let properties: DistrictProperties = match feature.typed_properties() {
                Ok(props) => props,
                Err(e) => {
                    log::warn!("district feature {} has invalid properties: {}", index, e);
                    continue;
                }
            };

            let polygons = feature
                .geometry
                .as_ref()
                .map(|g| g.polygons())
                .unwrap_or_default();
            if polygons.is_empty() {
                log::warn!("district feature {} has no polygon geometry", index);
                continue;
            }

            self.features.push(DistrictFeature {
                id: format!("{}-{}", self.properties.id, index),
                polygons,
                properties,
            });
        }

        log::debug!(
            "district layer '{}' loaded {} features",
            self.properties.id,
            self.features.len()
        );
    }

    pub fn features(&self) -> &[DistrictFeature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Finds all districts covering the given coordinate
    pub fn features_at(&self, coord: &LatLng) -> Vec<&DistrictFeature> {
        self.features.iter().filter(|f| f.contains(coord)).collect()
    }

    pub fn style(&self) -> &DistrictStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: DistrictStyle) {
        self.style = style;
    }
}

/// Ray-casting point-in-ring test
fn ring_contains(ring: &[LatLng], point: &LatLng) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);

        if ((yi > point.lat) != (yj > point.lat))
            && (point.lng < (xj - xi) * (point.lat - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

impl LayerTrait for DistrictLayer {
    crate::impl_layer_trait!(DistrictLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        let mut bounds: Option<LatLngBounds> = None;
        for feature in &self.features {
            if let Some(feature_bounds) = feature.bounds() {
                bounds = Some(match bounds {
                    Some(b) => b.union(&feature_bounds),
                    None => feature_bounds,
                });
            }
        }
        bounds
    }

    fn render(&mut self, painter: &egui::Painter, viewport: &Viewport) -> Result<()> {
        let origin = painter.clip_rect().min;
        let view_bounds = viewport.bounds();
        let stroke = egui::Stroke::new(self.style.stroke_width, self.style.stroke);

        for feature in &self.features {
            if !feature
                .bounds()
                .map(|b| b.intersects(&view_bounds))
                .unwrap_or(false)
            {
                continue;
            }

            for rings in &feature.polygons {
                let Some(exterior) = rings.first() else {
                    continue;
                };

                let screen: Vec<egui::Pos2> = exterior
                    .iter()
                    .map(|coord| {
                        let px = viewport.lat_lng_to_pixel(coord);
                        egui::pos2(origin.x + px.x as f32, origin.y + px.y as f32)
                    })
                    .collect();

                if screen.len() < 3 {
                    continue;
                }

                painter.add(egui::Shape::convex_polygon(
                    screen.clone(),
                    self.style.fill,
                    egui::Stroke::NONE,
                ));
                painter.add(egui::Shape::closed_line(screen, stroke));

                // Holes are outlined only
                for hole in &rings[1..] {
                    let screen: Vec<egui::Pos2> = hole
                        .iter()
                        .map(|coord| {
                            let px = viewport.lat_lng_to_pixel(coord);
                            egui::pos2(origin.x + px.x as f32, origin.y + px.y as f32)
                        })
                        .collect();
                    if screen.len() >= 3 {
                        painter.add(egui::Shape::closed_line(screen, stroke));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_district(name: &str, south: f64, west: f64, north: f64, east: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "properties": {"navn": name},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [west, south], [east, south], [east, north], [west, north], [west, south]
                ]]
            }
        })
    }

    fn layer_with(features: Vec<serde_json::Value>) -> DistrictLayer {
        let doc = serde_json::json!({"type": "FeatureCollection", "features": features});
        let data: GeoJson = serde_json::from_value(doc).unwrap();
        let mut layer = DistrictLayer::new("civil-defense".to_string(), "Civil Defense".to_string());
        layer.load_geojson(data);
        layer
    }

    #[test]
    fn test_load_and_hit_test() {
        let layer = layer_with(vec![square_district("Oslo og Akershus", 58.0, 9.0, 60.0, 11.0)]);
        assert_eq!(layer.feature_count(), 1);

        let hits = layer.features_at(&LatLng::new(59.0, 10.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].properties.navn, "Oslo og Akershus");

        assert!(layer.features_at(&LatLng::new(61.0, 10.0)).is_empty());
    }

    #[test]
    fn test_overlapping_districts_both_hit() {
        let layer = layer_with(vec![
            square_district("A", 58.0, 9.0, 60.0, 11.0),
            square_district("B", 58.5, 9.5, 60.5, 11.5),
        ]);

        let hits = layer.features_at(&LatLng::new(59.0, 10.0));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_invalid_properties_are_skipped() {
        let bad = serde_json::json!({
            "type": "Feature",
            "properties": {"name_in_wrong_field": "X"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[9.0, 58.0], [11.0, 58.0], [11.0, 60.0], [9.0, 58.0]]]
            }
        });
        let layer = layer_with(vec![
            bad,
            square_district("Valid", 58.0, 9.0, 60.0, 11.0),
        ]);
        assert_eq!(layer.feature_count(), 1);
        assert_eq!(layer.features()[0].properties.navn, "Valid");
    }

    #[test]
    fn test_point_geometry_is_not_a_district() {
        let point = serde_json::json!({
            "type": "Feature",
            "properties": {"navn": "Point"},
            "geometry": {"type": "Point", "coordinates": [10.0, 59.0]}
        });
        let layer = layer_with(vec![point]);
        assert_eq!(layer.feature_count(), 0);
    }

    #[test]
    fn test_hole_is_outside_the_district() {
        let with_hole = serde_json::json!({
            "type": "Feature",
            "properties": {"navn": "Ring"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[9.0, 58.0], [11.0, 58.0], [11.0, 60.0], [9.0, 60.0], [9.0, 58.0]],
                    [[9.8, 58.8], [10.2, 58.8], [10.2, 59.2], [9.8, 59.2], [9.8, 58.8]]
                ]
            }
        });
        let layer = layer_with(vec![with_hole]);

        assert_eq!(layer.features_at(&LatLng::new(58.5, 9.5)).len(), 1);
        assert!(layer.features_at(&LatLng::new(59.0, 10.0)).is_empty());
    }

    #[test]
    fn test_bounds_cover_all_features() {
        let layer = layer_with(vec![
            square_district("A", 58.0, 9.0, 59.0, 10.0),
            square_district("B", 60.0, 11.0, 61.0, 12.0),
        ]);

        let bounds = LayerTrait::bounds(&layer).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(58.0, 9.0));
        assert_eq!(bounds.north_east, LatLng::new(61.0, 12.0));
    }
}
