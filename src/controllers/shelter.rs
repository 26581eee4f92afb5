use crate::{
    controllers::ToggleState,
    core::{geo::LatLng, map::MapHost},
    data::source::FeatureSource,
    layers::shelter::ShelterLayer,
    Result,
};

/// Layer (and popup) ID used by the emergency shelter controller
pub const SHELTER_LAYER_ID: &str = "emergency-shelter";

/// What a map click did to the shelter selection
enum ClickOutcome {
    /// A shelter was selected; open its popup at the marker position
    Selected { position: LatLng, label: String },
    /// Selection was cleared (toggled off, or empty space clicked)
    Cleared,
}

/// Controller for the emergency shelter overlay.
///
/// Click-toggle interaction: clicking a shelter selects it (switching the
/// marker to the highlighted style and opening its popup), clicking it
/// again or clicking empty space deselects it. Selecting another shelter
/// first deselects the previous one, so at most one shelter is ever
/// highlighted.
pub struct ShelterController {
    state: ToggleState,
    source: FeatureSource,
    /// The layer is owned here while hidden and by the map host while visible
    layer: Option<ShelterLayer>,
}

impl ShelterController {
    /// Creates the controller and starts fetching the dataset
    pub fn new(url: impl Into<String>) -> Self {
        let mut source = FeatureSource::new(url);
        source.start();
        Self::with_source(source)
    }

    /// Creates the controller over an existing source (e.g. a preloaded one)
    pub fn with_source(mut source: FeatureSource) -> Self {
        source.start();
        Self {
            state: ToggleState::Hidden,
            source,
            layer: Some(ShelterLayer::new(
                SHELTER_LAYER_ID.to_string(),
                "Emergency Shelters".to_string(),
            )),
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ToggleState::Visible
    }

    /// Picks up the dataset once the background fetch delivers it
    pub fn poll_source(&mut self, host: &mut MapHost) {
        let Some(document) = self.source.try_take() else {
            return;
        };

        match self.state {
            ToggleState::Visible => {
                host.with_layer_mut(SHELTER_LAYER_ID, |layer| {
                    if let Some(layer) = layer.as_any_mut().downcast_mut::<ShelterLayer>() {
                        layer.load_geojson(document);
                    }
                });
            }
            ToggleState::Hidden => {
                if let Some(layer) = self.layer.as_mut() {
                    layer.load_geojson(document);
                }
            }
        }
    }

    /// Applies a checkbox change. Re-applying the current state is a no-op.
    ///
    /// On hide, any active selection is cleared and the marker style reset
    /// before the layer leaves the host, so a later re-show starts from a
    /// clean slate.
    pub fn set_checked(&mut self, checked: bool, host: &mut MapHost) -> Result<()> {
        match (self.state, checked) {
            (ToggleState::Hidden, true) => {
                let layer = self.layer.take().ok_or_else(|| {
                    crate::MapError::Layer(format!("layer '{}' is unavailable", SHELTER_LAYER_ID))
                })?;
                host.add_layer(Box::new(layer))?;
                self.state = ToggleState::Visible;
                log::debug!("shelter layer shown");
            }
            (ToggleState::Visible, false) => {
                host.popups_mut().hide(SHELTER_LAYER_ID);

                let removed = host.remove_layer(SHELTER_LAYER_ID)?.ok_or_else(|| {
                    crate::MapError::Layer(format!(
                        "layer '{}' missing from the active list",
                        SHELTER_LAYER_ID
                    ))
                })?;
                let mut layer =
                    removed
                        .into_any()
                        .downcast::<ShelterLayer>()
                        .map_err(|_| {
                            crate::MapError::Layer(format!(
                                "unexpected layer type for '{}'",
                                SHELTER_LAYER_ID
                            ))
                        })?;
                layer.clear_selection();
                self.layer = Some(*layer);
                self.state = ToggleState::Hidden;
                log::debug!("shelter layer hidden");
            }
            _ => {}
        }
        Ok(())
    }

    /// Handles a map click. Clicks are only delivered while visible; the
    /// hidden state has no listener.
    pub fn on_map_click(&mut self, coord: LatLng, host: &mut MapHost) {
        if self.state != ToggleState::Visible {
            return;
        }

        let viewport = host.viewport().clone();
        let pixel = viewport.lat_lng_to_pixel(&coord);

        let outcome = host
            .with_layer_mut(SHELTER_LAYER_ID, |layer| {
                let Some(layer) = layer.as_any_mut().downcast_mut::<ShelterLayer>() else {
                    return ClickOutcome::Cleared;
                };

                let hit = layer
                    .feature_at_pixel(&pixel, &viewport)
                    .map(|f| (f.id.clone(), f.position, f.label()));

                match hit {
                    Some((id, _, _)) if layer.is_selected(&id) => {
                        layer.clear_selection();
                        ClickOutcome::Cleared
                    }
                    Some((id, position, label)) => {
                        layer.select(&id);
                        ClickOutcome::Selected { position, label }
                    }
                    None => {
                        layer.clear_selection();
                        ClickOutcome::Cleared
                    }
                }
            })
            .unwrap_or(ClickOutcome::Cleared);

        match outcome {
            ClickOutcome::Selected { position, label } => {
                host.popups_mut().show_text(SHELTER_LAYER_ID, position, label);
            }
            ClickOutcome::Cleared => {
                host.popups_mut().hide(SHELTER_LAYER_ID);
            }
        }
    }
}
