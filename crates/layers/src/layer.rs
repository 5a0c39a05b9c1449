use std::fmt;

use foundation::Id;
use serde::{Deserialize, Serialize};

/// Handle of one constructed layer instance. Every rebuild gets a new one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerHandle(pub u64);

impl From<Id> for LayerHandle {
    fn from(id: Id) -> Self {
        LayerHandle(id.get())
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

pub trait Layer {
    fn handle(&self) -> LayerHandle;
    fn pane(&self) -> Pane;
}

/// The two fixed imagery panes. Bottom always renders beneath top.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Bottom,
    Top,
}

impl Pane {
    pub const ALL: [Pane; 2] = [Pane::Bottom, Pane::Top];

    /// Pane name registered with the mapping library.
    pub fn name(self) -> &'static str {
        match self {
            Pane::Bottom => "bottomImageryPane",
            Pane::Top => "topImageryPane",
        }
    }

    /// Identity class every style of this pane starts from.
    pub fn base_class(self) -> &'static str {
        match self {
            Pane::Bottom => "pane-bottom",
            Pane::Top => "pane-top",
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
