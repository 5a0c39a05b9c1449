use std::rc::Rc;

use catalog::{ImageryCatalog, Selection};
use layers::{DisplayMode, Opacity};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// The five user-facing controls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlId {
    BottomYear,
    TopYear,
    DisplayMode,
    WaterBoost,
    Opacity,
}

impl ControlId {
    pub const ALL: [ControlId; 5] = [
        ControlId::BottomYear,
        ControlId::TopYear,
        ControlId::DisplayMode,
        ControlId::WaterBoost,
        ControlId::Opacity,
    ];

    /// Element id of the control in the page.
    pub fn element_id(self) -> &'static str {
        match self {
            ControlId::BottomYear => "bottomYearSelect",
            ControlId::TopYear => "topYearSelect",
            ControlId::DisplayMode => "displayModeSelect",
            ControlId::WaterBoost => "waterBoostCheckbox",
            ControlId::Opacity => "topOpacityRange",
        }
    }
}

/// Change notification from a control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "control", rename_all = "lowercase")]
pub enum ControlEvent {
    /// A committed value change.
    Changed(ControlId),
    /// An intermediate value while dragging (opacity slider only).
    Input(ControlId),
}

impl ControlEvent {
    pub fn control(self) -> ControlId {
        match self {
            ControlEvent::Changed(id) | ControlEvent::Input(id) => id,
        }
    }
}

pub type ControlListener = Rc<dyn Fn(ControlEvent)>;

/// Snapshot of all five control values at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlState {
    pub bottom_layer_id: String,
    pub top_layer_id: String,
    pub display_mode: DisplayMode,
    pub water_boost: bool,
    pub opacity: Opacity,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control element not found: #{0}")]
    MissingElement(String),
    #[error("element #{id} is not a {expected}")]
    WrongElementType { id: String, expected: &'static str },
    #[error("control update failed: {0}")]
    Dom(String),
}

/// Read side and change notification of the control panel.
pub trait ControlSource {
    fn bottom_layer_id(&self) -> String;
    fn top_layer_id(&self) -> String;
    fn display_mode(&self) -> DisplayMode;
    fn water_boost(&self) -> bool;
    /// Slider value as the control reports it.
    fn opacity_raw(&self) -> String;

    /// Fills both year pickers in catalog order and selects `selection`.
    fn populate_years(
        &mut self,
        catalog: &ImageryCatalog,
        selection: Selection<'_>,
    ) -> Result<(), ControlError>;

    /// Offers `presets` (value, label) if the mode picker has no options yet.
    fn populate_display_modes(&mut self, presets: &[(&str, &str)]) -> Result<(), ControlError>;

    /// Registers `listener` for committed changes of every control and for
    /// every intermediate slider position.
    fn subscribe(&mut self, listener: ControlListener) -> Result<(), ControlError>;

    fn opacity(&self) -> Opacity {
        let raw = self.opacity_raw();
        Opacity::parse(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "opacity slider value is not a number; using opaque");
            Opacity::OPAQUE
        })
    }

    fn snapshot(&self) -> ControlState {
        ControlState {
            bottom_layer_id: self.bottom_layer_id(),
            top_layer_id: self.top_layer_id(),
            display_mode: self.display_mode(),
            water_boost: self.water_boost(),
            opacity: self.opacity(),
        }
    }
}
