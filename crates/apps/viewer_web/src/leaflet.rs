use std::collections::BTreeMap;

use layers::{ImageryLayer, Layer, LayerHandle, Opacity, Pane, PaneClasses};
use runtime::{LayerSurface, SurfaceError, ViewerConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn l_map(element_id: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = createPane)]
    fn create_pane(this: &LeafletMap, name: &str) -> HtmlElement;

    #[wasm_bindgen(method, js_name = getPane)]
    fn get_pane(this: &LeafletMap, name: &str) -> Option<HtmlElement>;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &TileLayer) -> LeafletMap;

    #[derive(Debug, Clone)]
    pub type TileLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    fn l_tile_layer(url_template: &str, options: &JsValue) -> Result<TileLayer, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &TileLayer, map: &LeafletMap) -> TileLayer;
}

fn library_err(e: JsValue) -> SurfaceError {
    SurfaceError::Library(format!("{:?}", e))
}

/// Plain JS object from anything serde can describe.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, SurfaceError> {
    let raw = serde_json::to_string(value).map_err(|e| SurfaceError::Library(e.to_string()))?;
    js_sys::JSON::parse(&raw).map_err(library_err)
}

/// Map surface backed by a Leaflet map in the page.
#[derive(Debug)]
pub struct LeafletSurface {
    map: LeafletMap,
    panes: BTreeMap<Pane, HtmlElement>,
    layers: BTreeMap<LayerHandle, TileLayer>,
}

impl LeafletSurface {
    /// Creates the map on `config.map_root` and sets the initial view.
    pub fn new(config: &ViewerConfig) -> Result<Self, SurfaceError> {
        let options = to_js(&config.map_options())?;
        let map = l_map(&config.map_root, &options).map_err(library_err)?;
        let center = to_js(&config.view.center.to_array())?;
        map.set_view(&center, f64::from(config.view.zoom));
        Ok(Self {
            map,
            panes: BTreeMap::new(),
            layers: BTreeMap::new(),
        })
    }

    fn pane_el(&self, pane: Pane) -> Result<&HtmlElement, SurfaceError> {
        self.panes.get(&pane).ok_or(SurfaceError::MissingPane(pane))
    }

    fn set_style(&self, pane: Pane, property: &str, value: &str) -> Result<(), SurfaceError> {
        self.pane_el(pane)?
            .style()
            .set_property(property, value)
            .map_err(library_err)
    }
}

impl LayerSurface for LeafletSurface {
    fn create_pane(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError> {
        let el = self
            .map
            .get_pane(pane.name())
            .unwrap_or_else(|| self.map.create_pane(pane.name()));
        self.panes.insert(pane, el);
        self.set_pane_z_index(pane, z_index)
    }

    fn set_pane_classes(&mut self, pane: Pane, classes: &PaneClasses) -> Result<(), SurfaceError> {
        self.pane_el(pane)?.set_class_name(&classes.to_class_name());
        Ok(())
    }

    fn set_pane_z_index(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError> {
        self.set_style(pane, "z-index", &z_index.to_string())
    }

    fn set_pane_opacity(&mut self, pane: Pane, opacity: Opacity) -> Result<(), SurfaceError> {
        self.set_style(pane, "opacity", &opacity.to_css())
    }

    fn add_layer(&mut self, layer: &ImageryLayer) -> Result<(), SurfaceError> {
        self.pane_el(layer.pane())?;
        let options = to_js(&layer.options)?;
        let tile_layer = l_tile_layer(&layer.url_template, &options).map_err(library_err)?;
        tile_layer.add_to(&self.map);
        self.layers.insert(layer.handle(), tile_layer);
        Ok(())
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<(), SurfaceError> {
        let tile_layer = self
            .layers
            .remove(&handle)
            .ok_or(SurfaceError::UnknownLayer(handle))?;
        self.map.remove_layer(&tile_layer);
        Ok(())
    }
}
