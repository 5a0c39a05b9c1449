use foundation::IdGen;
use layers::{ImageryLayer, Layer, LayerHandle, Pane, PaneClasses, TileSource};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, PaneLayout, RefreshPolicy, ViewerConfig};
use crate::controls::{ControlError, ControlEvent, ControlId, ControlSource, ControlState};
use crate::event_bus::EventBus;
use crate::surface::{LayerSurface, SurfaceError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Layers the engine has attached, one slot per pane.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaneLayers {
    pub bottom: Option<ImageryLayer>,
    pub top: Option<ImageryLayer>,
}

impl PaneLayers {
    pub fn get(&self, pane: Pane) -> Option<&ImageryLayer> {
        match pane {
            Pane::Bottom => self.bottom.as_ref(),
            Pane::Top => self.top.as_ref(),
        }
    }

    fn slot(&mut self, pane: Pane) -> &mut Option<ImageryLayer> {
        match pane {
            Pane::Bottom => &mut self.bottom,
            Pane::Top => &mut self.top,
        }
    }
}

/// Keeps the two imagery panes in step with the control panel.
///
/// The engine owns the only references to the attached layers; everything
/// else it needs is read from the controls at the moment of each call.
#[derive(Debug)]
pub struct SyncEngine {
    panes: PaneLayout,
    tiles: TileSource,
    policy: RefreshPolicy,
    layers: PaneLayers,
    ids: IdGen,
    trace: EventBus,
}

impl SyncEngine {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            panes: config.panes,
            tiles: config.tiles.clone(),
            policy: config.refresh_policy,
            layers: PaneLayers::default(),
            ids: IdGen::new(),
            trace: EventBus::new(),
        }
    }

    pub fn layers(&self) -> &PaneLayers {
        &self.layers
    }

    pub fn trace(&self) -> &EventBus {
        &self.trace
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Creates both panes with their identity classes and stacking order.
    pub fn install_panes(&mut self, surface: &mut impl LayerSurface) -> Result<(), SyncError> {
        for pane in Pane::ALL {
            let z = self.panes.z_index(pane);
            surface.create_pane(pane, z)?;
            surface.set_pane_classes(pane, &PaneClasses::base(pane))?;
            surface.set_pane_z_index(pane, z)?;
        }
        self.trace.emit("panes", "installed bottom and top panes");
        Ok(())
    }

    /// Full resync: restyle both panes, replace both layers, reapply opacity.
    pub fn refresh(
        &mut self,
        controls: &impl ControlSource,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        let state = controls.snapshot();
        self.apply(&state, surface)
    }

    /// The refresh transition for an explicit control snapshot.
    pub fn apply(
        &mut self,
        state: &ControlState,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        debug!(
            bottom = %state.bottom_layer_id,
            top = %state.top_layer_id,
            mode = %state.display_mode,
            water_boost = state.water_boost,
            "refresh imagery layers"
        );

        self.restyle(state, surface)?;

        // Detach both before attaching anything so a pane never holds two.
        for pane in Pane::ALL {
            if let Some(old) = self.layers.get(pane) {
                surface.remove_layer(old.handle())?;
            }
            *self.layers.slot(pane) = None;
        }

        for (pane, layer_id) in [
            (Pane::Bottom, state.bottom_layer_id.as_str()),
            (Pane::Top, state.top_layer_id.as_str()),
        ] {
            let handle = LayerHandle::from(self.ids.next_id());
            let layer = ImageryLayer::new(handle, layer_id, pane, &self.tiles);
            surface.add_layer(&layer)?;
            *self.layers.slot(pane) = Some(layer);
        }

        self.trace.emit(
            "refresh",
            format!(
                "bottom={} top={} mode={} water_boost={}",
                state.bottom_layer_id, state.top_layer_id, state.display_mode, state.water_boost
            ),
        );

        self.write_opacity(state, surface)
    }

    /// Slider path: writes the top pane opacity and nothing else.
    pub fn apply_opacity(
        &mut self,
        controls: &impl ControlSource,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        let opacity = controls.opacity();
        surface.set_pane_opacity(Pane::Top, opacity)?;
        self.trace.emit("opacity", opacity.to_css());
        Ok(())
    }

    /// Style-only path: pane classes, stacking order and opacity; layers kept.
    ///
    /// Falls back to a full refresh while a pane is still empty.
    pub fn refresh_styles(
        &mut self,
        controls: &impl ControlSource,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        let state = controls.snapshot();
        let layers_match = self
            .layers
            .bottom
            .as_ref()
            .is_some_and(|l| l.layer_id == state.bottom_layer_id)
            && self
                .layers
                .top
                .as_ref()
                .is_some_and(|l| l.layer_id == state.top_layer_id);
        if !layers_match {
            return self.apply(&state, surface);
        }

        debug!(mode = %state.display_mode, water_boost = state.water_boost, "restyle panes");
        self.restyle(&state, surface)?;
        self.trace.emit(
            "restyle",
            format!("mode={} water_boost={}", state.display_mode, state.water_boost),
        );
        self.write_opacity(&state, surface)
    }

    /// Routes one control notification to the matching sync path.
    pub fn handle(
        &mut self,
        event: ControlEvent,
        controls: &impl ControlSource,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        match (event.control(), self.policy) {
            (ControlId::Opacity, _) => self.apply_opacity(controls, surface),
            (ControlId::DisplayMode | ControlId::WaterBoost, RefreshPolicy::SplitStyle) => {
                self.refresh_styles(controls, surface)
            }
            _ => self.refresh(controls, surface),
        }
    }

    fn restyle(
        &self,
        state: &ControlState,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        for pane in Pane::ALL {
            let classes = PaneClasses::derive(pane, &state.display_mode, state.water_boost);
            surface.set_pane_classes(pane, &classes)?;
            // Class replacement may reset stacking on some surfaces.
            surface.set_pane_z_index(pane, self.panes.z_index(pane))?;
        }
        Ok(())
    }

    fn write_opacity(
        &mut self,
        state: &ControlState,
        surface: &mut impl LayerSurface,
    ) -> Result<(), SyncError> {
        surface.set_pane_opacity(Pane::Top, state.opacity)?;
        self.trace.emit("opacity", state.opacity.to_css());
        Ok(())
    }
}
