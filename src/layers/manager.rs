use crate::{core::viewport::Viewport, layers::base::LayerTrait, Result};

use crate::prelude::HashMap;

/// Manages the composited layer list of the map host, handling ordering
/// and rendering
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for rendering (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        let z_index = layer.z_index();

        if self.layers.contains_key(&layer_id) {
            return Err(crate::MapError::Layer(format!(
                "layer '{}' is already in the active list",
                layer_id
            ))
            .into());
        }

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager, returning it to the caller
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn LayerTrait>>> {
        self.render_order.retain(|id| id != layer_id);
        Ok(self.layers.remove(layer_id))
    }

    /// Replaces the entire layer list
    pub fn set_layers(&mut self, layers: Vec<Box<dyn LayerTrait>>) {
        self.layers.clear();
        self.render_order.clear();
        for layer in layers {
            // IDs were just cleared, so insertion cannot collide
            let _ = self.add_layer(layer);
        }
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Applies a function to a specific layer mutably
    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(layer_id).map(|layer| f(layer.as_mut()))
    }

    /// Lists all layer IDs in render order
    pub fn layer_ids(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Renders all visible layers in z-order. A layer that fails to
    /// render is logged and skipped.
    pub fn render(&mut self, painter: &egui::Painter, viewport: &Viewport) {
        for layer_id in self.render_order.clone() {
            if let Some(layer) = self.layers.get_mut(&layer_id) {
                if layer.is_visible() {
                    if let Err(e) = layer.render(painter, viewport) {
                        log::warn!("layer '{}' failed to render: {}", layer_id, e);
                    }
                }
            }
        }
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
