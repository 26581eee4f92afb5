use crate::{
    core::{
        events::{EventQueue, MapEvent},
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    layers::{base::LayerTrait, manager::LayerManager, tile::TileLayer},
    ui::popup::PopupManager,
    Result,
};

/// Interaction options for the map host
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub dragging: bool,
    pub scroll_wheel_zoom: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub attribution_control: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dragging: true,
            scroll_wheel_zoom: true,
            min_zoom: 0.0,
            max_zoom: 19.0,
            attribution_control: true,
        }
    }
}

/// Owns the shared map state: viewport, the composited layer list, popup
/// overlays and the map event queue.
///
/// The host is passed by mutable reference to layer controllers and to the
/// map widget; there is no global map instance.
pub struct MapHost {
    viewport: Viewport,
    layers: LayerManager,
    popups: PopupManager,
    events: EventQueue,
    options: MapOptions,
    attached: bool,
}

impl MapHost {
    /// Creates a new host with an empty layer list. The viewport size stays
    /// zero until a render surface is attached.
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self::with_options(center, zoom, MapOptions::default())
    }

    pub fn with_options(center: LatLng, zoom: f64, options: MapOptions) -> Self {
        let mut viewport = Viewport::new(center, zoom, Point::new(0.0, 0.0));
        viewport.set_zoom_limits(options.min_zoom, options.max_zoom);

        Self {
            viewport,
            layers: LayerManager::new(),
            popups: PopupManager::new(),
            events: EventQueue::new(),
            options,
            attached: false,
        }
    }

    /// Attaches the host to a render surface of the given pixel size.
    /// Fails if the surface is empty.
    pub fn attach(&mut self, size: Point) -> Result<()> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(crate::MapError::Render(format!(
                "cannot attach to render surface of size {}x{}",
                size.x, size.y
            ))
            .into());
        }
        self.viewport.set_size(size);
        self.attached = true;
        Ok(())
    }

    /// Detaches the host from its render surface
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Moves the view to a new center and zoom, clamped to the zoom limits
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.events.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
    }

    /// Replaces the full composited layer list
    pub fn set_layers(&mut self, layers: Vec<Box<dyn LayerTrait>>) {
        self.layers.set_layers(layers);
    }

    /// Adds a layer to the active layer list
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layers.add_layer(layer)?;
        self.events.emit(MapEvent::LayerAdded { layer_id });
        Ok(())
    }

    /// Removes a layer from the active layer list, returning it so the
    /// caller can reclaim ownership
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        let removed = self.layers.remove_layer(layer_id)?;
        if removed.is_some() {
            self.events.emit(MapEvent::LayerRemoved {
                layer_id: layer_id.to_string(),
            });
        }
        Ok(removed)
    }

    /// Gets a reference to a layer by ID
    pub fn layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get_layer(layer_id)
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.with_layer_mut(layer_id, f)
    }

    /// Checks whether a layer is present in the active layer list
    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.get_layer(layer_id).is_some()
    }

    /// Lists active layer IDs in render order
    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.layer_ids()
    }

    /// Emits a click event for the given surface position
    pub fn emit_click(&mut self, lat_lng: LatLng, pixel: Point) {
        self.events.emit(MapEvent::Click { lat_lng, pixel });
    }

    /// Drains all pending map events
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.drain()
    }

    /// Gets the attribution text of the base tile layer, if any
    pub fn attribution(&self) -> Option<String> {
        self.layers.layers().into_iter().find_map(|layer| {
            layer
                .as_any()
                .downcast_ref::<TileLayer>()
                .map(|tile| tile.attribution().to_string())
        })
    }

    /// Renders all visible layers in z-order, then popup overlays.
    ///
    /// The painter must be clipped to the map surface; its clip rect origin
    /// is treated as container pixel (0, 0).
    pub fn render(&mut self, painter: &egui::Painter) -> Result<()> {
        if !self.attached {
            return Err(crate::MapError::Render(
                "map host is not attached to a render surface".to_string(),
            )
            .into());
        }

        let viewport = self.viewport.clone();
        self.layers.render(painter, &viewport);
        self.popups.render(painter, &viewport);
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    pub fn popups_mut(&mut self) -> &mut PopupManager {
        &mut self.popups
    }
}
