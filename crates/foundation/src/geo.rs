use serde::{Deserialize, Serialize};

/// Latitude limit of the square web-mercator world.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_6;

/// Initial map center (Aral Sea region).
pub const DEFAULT_VIEW_CENTER: LatLon = LatLon::new(44.6, 59.0);
pub const DEFAULT_VIEW_ZOOM: u8 = 9;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatLon {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl Default for LatLon {
    fn default() -> Self {
        DEFAULT_VIEW_CENTER
    }
}

impl LatLon {
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// `[lat, lon]`, the pair order mapping libraries expect for a view center.
    pub fn to_array(self) -> [f64; 2] {
        [self.lat_deg, self.lon_deg]
    }
}

/// Initial viewport of the map surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    pub center: LatLon,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_CENTER, DEFAULT_VIEW_ZOOM)
    }
}

impl MapView {
    pub const fn new(center: LatLon, zoom: u8) -> Self {
        Self { center, zoom }
    }
}

/// Slippy-map tile address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Tile of the web-mercator grid at zoom `z` that covers `pos`.
    ///
    /// Latitudes beyond the mercator limit are clamped; longitudes wrap.
    pub fn containing(pos: LatLon, z: u8) -> Self {
        let n = (1u64 << z.min(31)) as f64;
        let lon = (pos.lon_deg + 180.0).rem_euclid(360.0);
        let lat = pos
            .lat_deg
            .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
            .to_radians();

        let fx = lon / 360.0 * n;
        let fy = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n;

        let max = n - 1.0;
        Self {
            z,
            x: fx.floor().clamp(0.0, max) as u32,
            y: fy.floor().clamp(0.0, max) as u32,
        }
    }
}
