use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::geojson::GeoJson,
    layers::base::{LayerProperties, LayerTrait, LayerType},
    Result,
};
use serde::Deserialize;

/// Shelters at or below this capacity get the low-capacity fill color
pub const CAPACITY_COLOR_THRESHOLD: i64 = 1000;

const LOW_CAPACITY_FILL: egui::Color32 = egui::Color32::from_rgb(0xEF, 0x82, 0x0D);
const HIGH_CAPACITY_FILL: egui::Color32 = egui::Color32::from_rgb(0xFF, 0xC3, 0x0B);
const MARKER_STROKE: egui::Color32 = egui::Color32::from_rgb(0x7F, 0x00, 0xFF);
const SELECTED_FILL: egui::Color32 = egui::Color32::from_rgb(0x7F, 0x00, 0xFF);
const SELECTED_STROKE: egui::Color32 = egui::Color32::from_rgb(0xEF, 0x82, 0x0D);

/// Attribute record of a public emergency shelter, validated at load time
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShelterProperties {
    pub romnr: i64,
    pub plasser: i64,
    pub adresse: String,
}

/// A single emergency shelter point
#[derive(Debug, Clone)]
pub struct ShelterFeature {
    pub id: String,
    pub position: LatLng,
    pub properties: ShelterProperties,
    pub selected: bool,
}

impl ShelterFeature {
    /// Text shown in the popup and next to a selected marker
    pub fn label(&self) -> String {
        format!(
            "{}: {} plasser: Romnummer: {}",
            self.properties.adresse, self.properties.plasser, self.properties.romnr
        )
    }

    /// Default marker radius, scaled by shelter capacity
    pub fn radius(&self) -> f32 {
        10.0 + self.properties.plasser as f32 / 100.0
    }

    /// Marker radius while selected
    pub fn selected_radius(&self) -> f32 {
        10.0 + self.properties.plasser as f32 / 500.0
    }

    /// Default fill color, banded at the capacity threshold
    pub fn fill_color(&self) -> egui::Color32 {
        if self.properties.plasser <= CAPACITY_COLOR_THRESHOLD {
            LOW_CAPACITY_FILL
        } else {
            HIGH_CAPACITY_FILL
        }
    }

    /// Radius used for pixel hit-testing in the current state
    fn hit_radius(&self) -> f32 {
        if self.selected {
            self.selected_radius()
        } else {
            self.radius()
        }
    }
}

/// Overlay layer showing emergency shelter points.
///
/// At most one shelter can be selected at a time; a selected shelter is
/// drawn with a distinct shape and a text label.
pub struct ShelterLayer {
    properties: LayerProperties,
    features: Vec<ShelterFeature>,
    selected: Option<String>,
}

impl ShelterLayer {
    /// Creates an empty layer; features arrive when the dataset does
    pub fn new(id: String, name: String) -> Self {
        let properties = LayerProperties::new(id, name, LayerType::Shelter).with_z_index(20);
        Self {
            properties,
            features: Vec::new(),
            selected: None,
        }
    }

    /// Replaces the layer's features with the contents of a GeoJSON
    /// document, validating attribute records once at load time
    pub fn load_geojson(&mut self, data: GeoJson) {
        self.features.clear();
        self.selected = None;

        for (index, feature) in data.into_features().into_iter().enumerate() {
            let properties: ShelterProperties = match feature.typed_properties() {
                Ok(props) => props,
                Err(e) => {
                    log::warn!("shelter feature {} has invalid properties: {}", index, e);
                    continue;
                }
            };

            let Some(position) = feature.geometry.as_ref().and_then(|g| g.point()) else {
                log::warn!("shelter feature {} has no point geometry", index);
                continue;
            };

            self.features.push(ShelterFeature {
                id: format!("{}-{}", self.properties.id, index),
                position,
                properties,
                selected: false,
            });
        }

        log::debug!(
            "shelter layer '{}' loaded {} features",
            self.properties.id,
            self.features.len()
        );
    }

    pub fn features(&self) -> &[ShelterFeature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, id: &str) -> Option<&ShelterFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Finds the closest shelter whose marker covers the given container
    /// pixel
    pub fn feature_at_pixel(&self, pixel: &Point, viewport: &Viewport) -> Option<&ShelterFeature> {
        self.features
            .iter()
            .filter_map(|feature| {
                let marker = viewport.lat_lng_to_pixel(&feature.position);
                let distance = marker.distance_to(pixel);
                (distance <= feature.hit_radius() as f64).then_some((feature, distance))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(feature, _)| feature)
    }

    /// Selects a shelter by ID, deselecting any previous selection.
    /// Returns false if the ID is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.features.iter().any(|f| f.id == id) {
            return false;
        }

        for feature in &mut self.features {
            feature.selected = feature.id == id;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Clears the selection, reverting the feature to its default style
    pub fn clear_selection(&mut self) {
        for feature in &mut self.features {
            feature.selected = false;
        }
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}

impl LayerTrait for ShelterLayer {
    crate::impl_layer_trait!(ShelterLayer, properties);

    fn bounds(&self) -> Option<LatLngBounds> {
        let positions: Vec<LatLng> = self.features.iter().map(|f| f.position).collect();
        LatLngBounds::from_points(&positions)
    }

    fn render(&mut self, painter: &egui::Painter, viewport: &Viewport) -> Result<()> {
        let origin = painter.clip_rect().min;
        let view_bounds = viewport.bounds();

        for feature in &self.features {
            if !view_bounds.contains(&feature.position) && !feature.selected {
                continue;
            }

            let px = viewport.lat_lng_to_pixel(&feature.position);
            let center = egui::pos2(origin.x + px.x as f32, origin.y + px.y as f32);

            if feature.selected {
                let radius = feature.selected_radius();
                let points: Vec<egui::Pos2> = (0..6)
                    .map(|k| {
                        let angle = -std::f32::consts::FRAC_PI_2
                            + k as f32 * std::f32::consts::PI / 3.0;
                        egui::pos2(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        )
                    })
                    .collect();

                painter.add(egui::Shape::convex_polygon(
                    points,
                    SELECTED_FILL,
                    egui::Stroke::new(1.0, SELECTED_STROKE),
                ));

                draw_label(painter, center, &feature.label());
            } else {
                painter.circle_filled(center, feature.radius(), feature.fill_color());
                painter.circle_stroke(
                    center,
                    feature.radius(),
                    egui::Stroke::new(2.0, MARKER_STROKE),
                );
            }
        }

        Ok(())
    }
}

/// Draws the marker label above the point with a white halo
fn draw_label(painter: &egui::Painter, center: egui::Pos2, text: &str) {
    let anchor = egui::pos2(center.x, center.y - 10.0);
    let font = egui::FontId::proportional(16.0);

    for offset in [(-2.0, 0.0), (2.0, 0.0), (0.0, -2.0), (0.0, 2.0)] {
        painter.text(
            egui::pos2(anchor.x + offset.0, anchor.y + offset.1),
            egui::Align2::CENTER_BOTTOM,
            text,
            font.clone(),
            egui::Color32::WHITE,
        );
    }
    painter.text(
        anchor,
        egui::Align2::CENTER_BOTTOM,
        text,
        font,
        egui::Color32::BLACK,
    );
}
