use std::collections::BTreeMap;

use foundation::TileCoord;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_HOST: &str = "maps.eox.at";
pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Zoom beyond which the mapping library stops requesting tiles at all.
pub const MAX_ZOOM: u8 = 19;
pub const STANDARD_NATIVE_ZOOM: u8 = 12;

/// The 2016 mosaic was only authored down to zoom 8.
pub const LEGACY_LAYER_ID: &str = "s2cloudless-2016_3857";
pub const LEGACY_NATIVE_ZOOM: u8 = 8;

pub const SHARD_PLACEHOLDER: &str = "{s}";
pub const Z_PLACEHOLDER: &str = "{z}";
pub const X_PLACEHOLDER: &str = "{x}";
pub const Y_PLACEHOLDER: &str = "{y}";

fn template_for(host: &str, layer_id: &str) -> String {
    format!("https://{{s}}.tiles.{host}/wmts/1.0.0/{layer_id}/default/g/{{z}}/{{y}}/{{x}}.jpg")
}

/// WMTS url template for `layer_id` on the default host.
///
/// Total: unknown ids still yield a well-formed (if unresolvable) template.
pub fn build_tile_url(layer_id: &str) -> String {
    template_for(DEFAULT_TILE_HOST, layer_id)
}

/// Native zoom ceiling of `layer_id` under the default exception table.
pub fn native_zoom_for(layer_id: &str) -> u8 {
    if layer_id == LEGACY_LAYER_ID {
        return LEGACY_NATIVE_ZOOM;
    }
    STANDARD_NATIVE_ZOOM
}

/// Per-identifier native zoom overrides on top of a standard ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeZoomTable {
    pub standard: u8,
    pub exceptions: BTreeMap<String, u8>,
}

impl Default for NativeZoomTable {
    fn default() -> Self {
        let mut exceptions = BTreeMap::new();
        exceptions.insert(LEGACY_LAYER_ID.to_string(), LEGACY_NATIVE_ZOOM);
        Self {
            standard: STANDARD_NATIVE_ZOOM,
            exceptions,
        }
    }
}

impl NativeZoomTable {
    pub fn lookup(&self, layer_id: &str) -> u8 {
        self.exceptions
            .get(layer_id)
            .copied()
            .unwrap_or(self.standard)
    }
}

/// Tile service the imagery layers are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSource {
    pub host: String,
    pub subdomains: Vec<String>,
    pub max_zoom: u8,
    pub native_zoom: NativeZoomTable,
    pub cross_origin: bool,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            host: DEFAULT_TILE_HOST.to_string(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            max_zoom: MAX_ZOOM,
            native_zoom: NativeZoomTable::default(),
            cross_origin: true,
        }
    }
}

impl TileSource {
    pub fn url_template(&self, layer_id: &str) -> String {
        template_for(&self.host, layer_id)
    }

    pub fn native_zoom_for(&self, layer_id: &str) -> u8 {
        self.native_zoom.lookup(layer_id)
    }

    /// Concrete url of one tile, sharded the way the mapping library does it.
    pub fn tile_url(&self, layer_id: &str, tile: TileCoord) -> String {
        let shard = shard_for(tile.x, tile.y, &self.subdomains).unwrap_or("");
        expand(&self.url_template(layer_id), shard, tile)
    }
}

/// Round-robin shard for a tile: `(x + y) mod n`.
pub fn shard_for(x: u32, y: u32, shards: &[String]) -> Option<&str> {
    if shards.is_empty() {
        return None;
    }
    let idx = (x as u64 + y as u64) % shards.len() as u64;
    Some(shards[idx as usize].as_str())
}

/// Substitutes the shard and tile placeholders of a url template.
pub fn expand(template: &str, shard: &str, tile: TileCoord) -> String {
    template
        .replace(SHARD_PLACEHOLDER, shard)
        .replace(Z_PLACEHOLDER, &tile.z.to_string())
        .replace(Y_PLACEHOLDER, &tile.y.to_string())
        .replace(X_PLACEHOLDER, &tile.x.to_string())
}
