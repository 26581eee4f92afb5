use crate::{
    controllers::ToggleState,
    core::{geo::LatLng, map::MapHost},
    data::source::FeatureSource,
    layers::district::DistrictLayer,
    Result,
};

/// Layer (and popup) ID used by the civil defense controller
pub const DISTRICT_LAYER_ID: &str = "civil-defense";

/// Controller for the civil defense district overlay.
///
/// While `Visible`, a map click that lands in exactly one district opens a
/// popup with the district name at the clicked coordinate. A click hitting
/// zero or several districts clears the selection instead; an ambiguous
/// hit is treated as no selection by policy.
pub struct DistrictController {
    state: ToggleState,
    source: FeatureSource,
    /// The layer is owned here while hidden and by the map host while visible
    layer: Option<DistrictLayer>,
    selected: Option<String>,
}

impl DistrictController {
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
            layer: Some(DistrictLayer::new(
                DISTRICT_LAYER_ID.to_string(),
                "Civil Defense Districts".to_string(),
            )),
            selected: None,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ToggleState::Visible
    }

    /// ID of the district currently shown in the popup, if any
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Picks up the dataset once the background fetch delivers it
    pub fn poll_source(&mut self, host: &mut MapHost) {
        let Some(document) = self.source.try_take() else {
            return;
        };

        match self.state {
            ToggleState::Visible => {
                host.with_layer_mut(DISTRICT_LAYER_ID, |layer| {
                    if let Some(layer) = layer.as_any_mut().downcast_mut::<DistrictLayer>() {
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

    /// Applies a checkbox change. Re-applying the current state is a no-op,
    /// so repeated checks or unchecks cannot duplicate or lose the layer.
    pub fn set_checked(&mut self, checked: bool, host: &mut MapHost) -> Result<()> {
        match (self.state, checked) {
            (ToggleState::Hidden, true) => {
                let layer = self.layer.take().ok_or_else(|| {
                    crate::MapError::Layer(format!("layer '{}' is unavailable", DISTRICT_LAYER_ID))
                })?;
                host.add_layer(Box::new(layer))?;
                self.state = ToggleState::Visible;
                log::debug!("district layer shown");
            }
            (ToggleState::Visible, false) => {
                self.selected = None;
                host.popups_mut().hide(DISTRICT_LAYER_ID);

                let removed = host.remove_layer(DISTRICT_LAYER_ID)?.ok_or_else(|| {
                    crate::MapError::Layer(format!(
                        "layer '{}' missing from the active list",
                        DISTRICT_LAYER_ID
                    ))
                })?;
                let layer = removed
                    .into_any()
                    .downcast::<DistrictLayer>()
                    .map_err(|_| {
                        crate::MapError::Layer(format!(
                            "unexpected layer type for '{}'",
                            DISTRICT_LAYER_ID
                        ))
                    })?;
                self.layer = Some(*layer);
                self.state = ToggleState::Hidden;
                log::debug!("district layer hidden");
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

        let hit = host
            .layer(DISTRICT_LAYER_ID)
            .and_then(|layer| layer.as_any().downcast_ref::<DistrictLayer>())
            .and_then(|layer| {
                let hits = layer.features_at(&coord);
                if hits.len() == 1 {
                    Some((hits[0].id.clone(), hits[0].properties.navn.clone()))
                } else {
                    None
                }
            });

        match hit {
            Some((id, navn)) => {
                self.selected = Some(id);
                host.popups_mut().show_text(DISTRICT_LAYER_ID, coord, navn);
            }
            None => {
                self.selected = None;
                host.popups_mut().hide(DISTRICT_LAYER_ID);
            }
        }
    }
}
