//! In-memory control panel and map surface.
//!
//! `StaticControls` behaves like the page's widgets (values, options and
//! listeners), and `HeadlessSurface` records every pane and layer operation in
//! order. Together with [`Harness`] they drive the engine without a browser.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use catalog::{ImageryCatalog, Selection, YearEntry};
use layers::{DisplayMode, ImageryLayer, Layer, LayerHandle, Opacity, Pane, PaneClasses};
use serde::Serialize;

use crate::bootstrap::bootstrap;
use crate::config::ViewerConfig;
use crate::controls::{ControlError, ControlEvent, ControlId, ControlListener, ControlSource};
use crate::surface::{LayerSurface, SurfaceError};
use crate::sync::{SyncEngine, SyncError};

/// Initial slider position of the page.
pub const DEFAULT_SLIDER_VALUE: &str = "0.5";

#[derive(Default)]
pub struct StaticControls {
    pub bottom: String,
    pub top: String,
    pub mode: String,
    pub water_boost: bool,
    pub opacity: String,
    pub bottom_options: Vec<YearEntry>,
    pub top_options: Vec<YearEntry>,
    pub mode_options: Vec<String>,
    listeners: Vec<ControlListener>,
}

impl std::fmt::Debug for StaticControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticControls")
            .field("bottom", &self.bottom)
            .field("top", &self.top)
            .field("mode", &self.mode)
            .field("water_boost", &self.water_boost)
            .field("opacity", &self.opacity)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl StaticControls {
    pub fn new() -> Self {
        Self {
            opacity: DEFAULT_SLIDER_VALUE.to_string(),
            ..Self::default()
        }
    }

    pub fn fire(&self, event: ControlEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn select_bottom(&mut self, layer_id: &str) {
        self.bottom = layer_id.to_string();
        self.fire(ControlEvent::Changed(ControlId::BottomYear));
    }

    pub fn select_top(&mut self, layer_id: &str) {
        self.top = layer_id.to_string();
        self.fire(ControlEvent::Changed(ControlId::TopYear));
    }

    pub fn select_mode(&mut self, mode: &str) {
        self.mode = mode.to_string();
        self.fire(ControlEvent::Changed(ControlId::DisplayMode));
    }

    pub fn set_water_boost(&mut self, on: bool) {
        self.water_boost = on;
        self.fire(ControlEvent::Changed(ControlId::WaterBoost));
    }

    /// Intermediate slider position while dragging.
    pub fn drag_opacity(&mut self, value: &str) {
        self.opacity = value.to_string();
        self.fire(ControlEvent::Input(ControlId::Opacity));
    }

    /// Slider released.
    pub fn commit_opacity(&mut self, value: &str) {
        self.opacity = value.to_string();
        self.fire(ControlEvent::Changed(ControlId::Opacity));
    }
}

impl ControlSource for StaticControls {
    fn bottom_layer_id(&self) -> String {
        self.bottom.clone()
    }

    fn top_layer_id(&self) -> String {
        self.top.clone()
    }

    fn display_mode(&self) -> DisplayMode {
        DisplayMode::new(self.mode.clone())
    }

    fn water_boost(&self) -> bool {
        self.water_boost
    }

    fn opacity_raw(&self) -> String {
        self.opacity.clone()
    }

    fn populate_years(
        &mut self,
        catalog: &ImageryCatalog,
        selection: Selection<'_>,
    ) -> Result<(), ControlError> {
        self.bottom_options = catalog.list_years().to_vec();
        self.top_options = catalog.list_years().to_vec();
        self.bottom = selection.bottom.layer_id.clone();
        self.top = selection.top.layer_id.clone();
        Ok(())
    }

    fn populate_display_modes(&mut self, presets: &[(&str, &str)]) -> Result<(), ControlError> {
        if self.mode_options.is_empty() {
            self.mode_options = presets.iter().map(|(value, _)| value.to_string()).collect();
        }
        if self.mode.is_empty() {
            if let Some(first) = self.mode_options.first() {
                self.mode = first.clone();
            }
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: ControlListener) -> Result<(), ControlError> {
        self.listeners.push(listener);
        Ok(())
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum SurfaceOp {
    CreatePane { pane: Pane, z_index: i32 },
    SetClasses { pane: Pane, class_name: String },
    SetZIndex { pane: Pane, z_index: i32 },
    SetOpacity { pane: Pane, value: String },
    AddLayer { handle: LayerHandle, pane: Pane, layer_id: String },
    RemoveLayer { handle: LayerHandle },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneState {
    pub classes: PaneClasses,
    pub z_index: i32,
    /// Style value as written; `None` means never set (fully opaque).
    pub opacity: Option<String>,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    panes: BTreeMap<Pane, PaneState>,
    attached: BTreeMap<LayerHandle, ImageryLayer>,
    ops: Vec<SurfaceOp>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn pane(&self, pane: Pane) -> Option<&PaneState> {
        self.panes.get(&pane)
    }

    pub fn layers_in(&self, pane: Pane) -> Vec<&ImageryLayer> {
        self.attached.values().filter(|l| l.pane() == pane).collect()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    fn pane_mut(&mut self, pane: Pane) -> Result<&mut PaneState, SurfaceError> {
        self.panes.get_mut(&pane).ok_or(SurfaceError::MissingPane(pane))
    }
}

impl LayerSurface for HeadlessSurface {
    fn create_pane(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError> {
        self.panes
            .entry(pane)
            .and_modify(|state| state.z_index = z_index)
            .or_insert_with(|| PaneState {
                classes: PaneClasses::base(pane),
                z_index,
                opacity: None,
            });
        self.ops.push(SurfaceOp::CreatePane { pane, z_index });
        Ok(())
    }

    fn set_pane_classes(&mut self, pane: Pane, classes: &PaneClasses) -> Result<(), SurfaceError> {
        self.pane_mut(pane)?.classes = classes.clone();
        self.ops.push(SurfaceOp::SetClasses {
            pane,
            class_name: classes.to_class_name(),
        });
        Ok(())
    }

    fn set_pane_z_index(&mut self, pane: Pane, z_index: i32) -> Result<(), SurfaceError> {
        self.pane_mut(pane)?.z_index = z_index;
        self.ops.push(SurfaceOp::SetZIndex { pane, z_index });
        Ok(())
    }

    fn set_pane_opacity(&mut self, pane: Pane, opacity: Opacity) -> Result<(), SurfaceError> {
        let value = opacity.to_css();
        self.pane_mut(pane)?.opacity = Some(value.clone());
        self.ops.push(SurfaceOp::SetOpacity { pane, value });
        Ok(())
    }

    fn add_layer(&mut self, layer: &ImageryLayer) -> Result<(), SurfaceError> {
        let pane = layer.pane();
        if !self.panes.contains_key(&pane) {
            return Err(SurfaceError::MissingPane(pane));
        }
        if self.attached.values().any(|l| l.pane() == pane) {
            return Err(SurfaceError::PaneOccupied(pane));
        }
        self.attached.insert(layer.handle(), layer.clone());
        self.ops.push(SurfaceOp::AddLayer {
            handle: layer.handle(),
            pane,
            layer_id: layer.layer_id.clone(),
        });
        Ok(())
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<(), SurfaceError> {
        self.attached
            .remove(&handle)
            .ok_or(SurfaceError::UnknownLayer(handle))?;
        self.ops.push(SurfaceOp::RemoveLayer { handle });
        Ok(())
    }
}

/// Collects control notifications so they can be handled after the
/// triggering mutation has finished.
#[derive(Debug, Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<ControlEvent>>>);

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> ControlListener {
        let queue = Rc::clone(&self.0);
        Rc::new(move |event| queue.borrow_mut().push_back(event))
    }

    pub fn pop(&self) -> Option<ControlEvent> {
        self.0.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A bootstrapped engine wired to headless controls and surface.
#[derive(Debug)]
pub struct Harness {
    pub engine: SyncEngine,
    pub controls: StaticControls,
    pub surface: HeadlessSurface,
    pub queue: EventQueue,
}

impl Harness {
    pub fn start(config: &ViewerConfig) -> Result<Self, SyncError> {
        Self::start_with(config, StaticControls::new())
    }

    pub fn start_with(config: &ViewerConfig, mut controls: StaticControls) -> Result<Self, SyncError> {
        let queue = EventQueue::new();
        let mut surface = HeadlessSurface::new();
        let engine = bootstrap(config, &mut controls, &mut surface, queue.listener())?;
        Ok(Self {
            engine,
            controls,
            surface,
            queue,
        })
    }

    /// Handles every queued notification in arrival order.
    pub fn pump(&mut self) -> Result<usize, SyncError> {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            self.engine.handle(event, &self.controls, &mut self.surface)?;
            handled += 1;
        }
        Ok(handled)
    }
}
