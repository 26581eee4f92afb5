pub mod cache;
pub mod loader;

use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Attribution text that must be shown when tiles from this source are
    /// displayed.
    fn attribution(&self) -> &str;
}

/// Tile source for the default OpenStreetMap tile servers, rotating across
/// the public subdomains.
pub struct OsmTileSource {
    subdomains: Vec<&'static str>,
}

impl OsmTileSource {
    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OsmTileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OsmTileSource {
    fn url(&self, coord: TileCoord) -> String {
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        let sub = self.subdomains[idx];
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            sub, coord.z, coord.x, coord.y
        )
    }

    fn attribution(&self) -> &str {
        "© OpenStreetMap contributors"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_url_layout() {
        let source = OsmTileSource::new();
        let url = source.url(TileCoord::new(1, 2, 3));
        assert!(url.starts_with("https://"));
        assert!(url.contains(".tile.openstreetmap.org"));
        assert!(url.ends_with("/3/1/2.png"));
    }

    #[test]
    fn test_osm_subdomain_rotation() {
        let source = OsmTileSource::new();
        let a = source.url(TileCoord::new(0, 0, 1));
        let b = source.url(TileCoord::new(1, 0, 1));
        let c = source.url(TileCoord::new(2, 0, 1));
        assert_ne!(a, b);
        assert_ne!(b, c);
    }
}
