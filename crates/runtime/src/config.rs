use catalog::{
    CatalogError, DEFAULT_BOTTOM_LAYER_ID, DEFAULT_TOP_LAYER_ID, ImageryCatalog, YearEntry,
};
use foundation::{DEFAULT_VIEW_CENTER, DEFAULT_VIEW_ZOOM, LatLon, MapView};
use layers::{Pane, TileSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAP_ROOT: &str = "mapRoot";
pub const DEFAULT_CENTER: LatLon = DEFAULT_VIEW_CENTER;
pub const DEFAULT_ZOOM: u8 = DEFAULT_VIEW_ZOOM;
pub const BOTTOM_PANE_Z: i32 = 200;
pub const TOP_PANE_Z: i32 = 210;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("viewer config json invalid: {0}")]
    Json(String),
    #[error("top pane z-index {top} must be above bottom pane z-index {bottom}")]
    PaneOrder { bottom: i32, top: i32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Stacking order of the two imagery panes. Fixed for the app's lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneLayout {
    pub bottom_z: i32,
    pub top_z: i32,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            bottom_z: BOTTOM_PANE_Z,
            top_z: TOP_PANE_Z,
        }
    }
}

impl PaneLayout {
    pub fn z_index(&self, pane: Pane) -> i32 {
        match pane {
            Pane::Bottom => self.bottom_z,
            Pane::Top => self.top_z,
        }
    }
}

/// What a display-mode or water-boost change does to the layers.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Every non-slider change rebuilds both layers.
    #[default]
    FullRebuild,
    /// Style-only changes restyle the panes and keep the layers.
    SplitStyle,
}

/// Map constructor options passed through to the mapping library.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom_control: bool,
    pub attribution_control: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map_root: String,
    pub view: MapView,
    pub zoom_control: bool,
    pub attribution_control: bool,
    pub panes: PaneLayout,
    pub tiles: TileSource,
    pub default_bottom: String,
    pub default_top: String,
    /// Replaces the built-in catalog when present.
    pub catalog: Option<Vec<YearEntry>>,
    pub refresh_policy: RefreshPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            map_root: DEFAULT_MAP_ROOT.to_string(),
            view: MapView::new(DEFAULT_CENTER, DEFAULT_ZOOM),
            zoom_control: false,
            attribution_control: false,
            panes: PaneLayout::default(),
            tiles: TileSource::default(),
            default_bottom: DEFAULT_BOTTOM_LAYER_ID.to_string(),
            default_top: DEFAULT_TOP_LAYER_ID.to_string(),
            catalog: None,
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses a (possibly partial) JSON override; missing keys keep defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panes.top_z <= self.panes.bottom_z {
            return Err(ConfigError::PaneOrder {
                bottom: self.panes.bottom_z,
                top: self.panes.top_z,
            });
        }
        if let Some(years) = &self.catalog {
            ImageryCatalog::new(years.clone())?;
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<ImageryCatalog, ConfigError> {
        match &self.catalog {
            Some(years) => Ok(ImageryCatalog::new(years.clone())?),
            None => Ok(ImageryCatalog::builtin()),
        }
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            zoom_control: self.zoom_control,
            attribution_control: self.attribution_control,
        }
    }
}
