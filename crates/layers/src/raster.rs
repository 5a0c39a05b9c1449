use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerHandle, Pane};
use crate::tiles::TileSource;

/// Options handed to the mapping library's tile layer constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerOptions {
    pub pane: String,
    pub subdomains: Vec<String>,
    pub max_zoom: u8,
    pub max_native_zoom: u8,
    pub cross_origin: bool,
}

/// One year of imagery bound to one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageryLayer {
    handle: LayerHandle,
    pane: Pane,
    /// Catalog identifier of the imagery year.
    pub layer_id: String,
    pub url_template: String,
    pub options: TileLayerOptions,
}

impl ImageryLayer {
    pub fn new(handle: LayerHandle, layer_id: &str, pane: Pane, source: &TileSource) -> Self {
        Self {
            handle,
            pane,
            layer_id: layer_id.to_string(),
            url_template: source.url_template(layer_id),
            options: TileLayerOptions {
                pane: pane.name().to_string(),
                subdomains: source.subdomains.clone(),
                max_zoom: source.max_zoom,
                max_native_zoom: source.native_zoom_for(layer_id),
                cross_origin: source.cross_origin,
            },
        }
    }

    pub fn options_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.options)
    }
}

impl Layer for ImageryLayer {
    fn handle(&self) -> LayerHandle {
        self.handle
    }

    fn pane(&self) -> Pane {
        self.pane
    }
}
