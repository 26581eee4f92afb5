use crate::core::geo::TileCoord;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// In-memory cache of decoded tile images with LRU eviction.
///
/// Decoded images are kept so that a tile whose GPU texture has been
/// dropped can be re-uploaded without hitting the network again.
pub struct TileCache {
    cache: LruCache<TileCoord, Arc<egui::ColorImage>>,
}

impl TileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(512).expect("nonzero default"));
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Create a new tile cache with default capacity (512 tiles)
    pub fn with_default_capacity() -> Self {
        Self::new(512)
    }

    /// Get a tile image from the cache
    pub fn get(&mut self, coord: &TileCoord) -> Option<Arc<egui::ColorImage>> {
        self.cache.get(coord).cloned()
    }

    /// Insert a tile image into the cache
    pub fn put(&mut self, coord: TileCoord, image: Arc<egui::ColorImage>) {
        self.cache.put(coord, image);
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.cache.contains(coord)
    }

    /// Clear all tiles from the cache
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_tile() -> Arc<egui::ColorImage> {
        Arc::new(egui::ColorImage::new([2, 2], egui::Color32::WHITE))
    }

    #[test]
    fn test_tile_cache_basic_operations() {
        let mut cache = TileCache::new(2);
        let coord = TileCoord::new(1, 2, 3);

        assert!(cache.is_empty());

        cache.put(coord, blank_tile());
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&coord));
        assert!(cache.get(&coord).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tile_cache_lru_eviction() {
        let mut cache = TileCache::new(2);
        let coord1 = TileCoord::new(1, 1, 1);
        let coord2 = TileCoord::new(2, 2, 2);
        let coord3 = TileCoord::new(3, 3, 3);

        cache.put(coord1, blank_tile());
        cache.put(coord2, blank_tile());
        cache.put(coord3, blank_tile());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&coord1)); // evicted
        assert!(cache.contains(&coord2));
        assert!(cache.contains(&coord3));
    }
}
