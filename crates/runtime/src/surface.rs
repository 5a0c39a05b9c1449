use layers::{ImageryLayer, LayerHandle, Opacity, Pane, PaneClasses};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("pane {0} has not been created")]
    MissingPane(Pane),
    #[error("pane {0} already holds a layer")]
    PaneOccupied(Pane),
    #[error("{0} is not attached")]
    UnknownLayer(LayerHandle),
    #[error("mapping library error: {0}")]
    Library(String),
}

/// Pane and layer operations of the map surface.
///
/// Attaching a layer starts tile fetching in the mapping library; removing
/// one drops whatever it still has in flight.
pub trait LayerSurface {
    fn create_pane(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError>;

    /// Replaces the pane's whole class list.
    fn set_pane_classes(&mut self, pane: Pane, classes: &PaneClasses) -> Result<(), SurfaceError>;

    fn set_pane_z_index(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError>;

    fn set_pane_opacity(&mut self, pane: Pane, opacity: Opacity) -> Result<(), SurfaceError>;

    fn add_layer(&mut self, layer: &ImageryLayer) -> Result<(), SurfaceError>;

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<(), SurfaceError>;
}
