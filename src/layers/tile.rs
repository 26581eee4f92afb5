use crate::{
    core::{
        geo::TileCoord,
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::{cache::TileCache, loader::TileLoader, OsmTileSource, TileSource},
    Result,
};

use crate::prelude::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Upper bound on live GPU textures before far-away tiles are dropped
const TEXTURE_BUDGET: usize = 384;

/// Base map layer that renders slippy map tiles.
///
/// Tiles are downloaded on background threads, decoded into an LRU cache
/// and uploaded as textures on demand. A tile that has not arrived yet is
/// simply skipped for the frame.
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    loader: TileLoader,
    rx: Receiver<(TileCoord, Vec<u8>)>,
    cache: TileCache,
    textures: HashMap<TileCoord, egui::TextureHandle>,
    pending: HashSet<TileCoord>,
}

impl TileLayer {
    /// Creates a tile layer over an arbitrary tile source
    pub fn new(id: String, name: String, source: Box<dyn TileSource>) -> Self {
        let properties = LayerProperties::new(id, name, LayerType::Tile);
        let (tx, rx) = channel();

        Self {
            properties,
            source,
            loader: TileLoader::new(tx),
            rx,
            cache: TileCache::with_default_capacity(),
            textures: HashMap::default(),
            pending: HashSet::default(),
        }
    }

    /// Creates a tile layer over the public OpenStreetMap servers
    pub fn openstreetmap(id: String, name: String) -> Self {
        Self::new(id, name, Box::new(OsmTileSource::new()))
    }

    /// Attribution text for the configured tile source
    pub fn attribution(&self) -> &str {
        self.source.attribution()
    }

    /// Computes the tile coordinates needed to cover the viewport at the
    /// nearest integer zoom level
    pub fn tiles_in_view(&self, viewport: &Viewport) -> Vec<TileCoord> {
        if viewport.size.x <= 0.0 || viewport.size.y <= 0.0 {
            return Vec::new();
        }

        let z = viewport.zoom.round().clamp(0.0, 19.0) as u8;
        let max_coord = 2_u32.pow(z as u32);
        let bounds = viewport.bounds();

        let north_west = crate::core::geo::LatLng::new(
            bounds.north_east.lat,
            bounds.south_west.lng,
        );
        let south_east = crate::core::geo::LatLng::new(
            bounds.south_west.lat,
            bounds.north_east.lng,
        );

        let first = TileCoord::from_lat_lng(&north_west, z);
        let last = TileCoord::from_lat_lng(&south_east, z);

        let x0 = first.x.min(max_coord - 1);
        let y0 = first.y.min(max_coord - 1);
        let x1 = last.x.min(max_coord - 1);
        let y1 = last.y.min(max_coord - 1);

        let mut tiles = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                tiles.push(TileCoord::new(x, y, z));
            }
        }
        tiles
    }

    /// Drains completed downloads into the decoded-image cache
    fn drain_downloads(&mut self) {
        while let Ok((coord, bytes)) = self.rx.try_recv() {
            self.pending.remove(&coord);
            match decode_tile(&bytes) {
                Ok(image) => {
                    self.cache.put(coord, Arc::new(image));
                }
                Err(e) => {
                    log::warn!("tile {:?} could not be decoded: {}", coord, e);
                }
            }
        }
    }

    /// Ensures a texture exists for the tile, requesting a download when
    /// the tile has not been fetched yet
    fn ensure_tile(&mut self, ctx: &egui::Context, coord: TileCoord) {
        if self.textures.contains_key(&coord) {
            return;
        }

        if let Some(image) = self.cache.get(&coord) {
            let texture = ctx.load_texture(
                format!("tile-{}-{}-{}", coord.z, coord.x, coord.y),
                image.as_ref().clone(),
                egui::TextureOptions::LINEAR,
            );
            self.textures.insert(coord, texture);
        } else if !self.pending.contains(&coord) {
            self.pending.insert(coord);
            self.loader.start_download(self.source.as_ref(), coord);
        }
    }

    /// Drops textures for tiles far outside the current view once the
    /// budget is exceeded
    fn prune_textures(&mut self, visible: &[TileCoord]) {
        if self.textures.len() <= TEXTURE_BUDGET {
            return;
        }
        let keep: HashSet<TileCoord> = visible.iter().copied().collect();
        self.textures.retain(|coord, _| keep.contains(coord));
    }
}

fn decode_tile(bytes: &[u8]) -> Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        image.as_flat_samples().as_slice(),
    ))
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn render(&mut self, painter: &egui::Painter, viewport: &Viewport) -> Result<()> {
        self.drain_downloads();

        let visible = self.tiles_in_view(viewport);
        self.prune_textures(&visible);

        let origin = painter.clip_rect().min;
        let tint = if self.opacity() < 1.0 {
            egui::Color32::WHITE.gamma_multiply(self.opacity())
        } else {
            egui::Color32::WHITE
        };
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

        for coord in visible {
            self.ensure_tile(painter.ctx(), coord);

            if let Some(texture) = self.textures.get(&coord) {
                let north_west = viewport.lat_lng_to_pixel(&coord.to_lat_lng());
                let south_east = viewport.lat_lng_to_pixel(
                    &TileCoord::new(coord.x + 1, coord.y + 1, coord.z).to_lat_lng(),
                );

                let rect = egui::Rect::from_min_max(
                    egui::pos2(
                        origin.x + north_west.x as f32,
                        origin.y + north_west.y as f32,
                    ),
                    egui::pos2(
                        origin.x + south_east.x as f32,
                        origin.y + south_east.y as f32,
                    ),
                );

                painter.image(texture.id(), rect, uv, tint);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};

    fn test_viewport() -> Viewport {
        Viewport::new(LatLng::new(59.0, 10.0), 8.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_openstreetmap_layer() {
        let layer = TileLayer::openstreetmap("basemap".to_string(), "OpenStreetMap".to_string());
        assert_eq!(layer.id(), "basemap");
        assert_eq!(layer.layer_type(), LayerType::Tile);
        assert_eq!(layer.attribution(), "© OpenStreetMap contributors");
    }

    #[test]
    fn test_tiles_cover_the_viewport() {
        let layer = TileLayer::openstreetmap("basemap".to_string(), "OpenStreetMap".to_string());
        let viewport = test_viewport();

        let tiles = layer.tiles_in_view(&viewport);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.z == 8 && t.is_valid()));

        let center_tile = TileCoord::from_lat_lng(&viewport.center, 8);
        assert!(tiles.contains(&center_tile));
    }

    #[test]
    fn test_no_tiles_for_detached_surface() {
        let layer = TileLayer::openstreetmap("basemap".to_string(), "OpenStreetMap".to_string());
        let viewport = Viewport::new(LatLng::new(59.0, 10.0), 8.0, Point::new(0.0, 0.0));
        assert!(layer.tiles_in_view(&viewport).is_empty());
    }
}
