use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layer::Pane;

/// Class the mapping library puts on every pane element.
pub const LEAFLET_PANE_CLASS: &str = "leaflet-pane";
pub const WATER_BOOST_CLASS: &str = "water-boost-on";

/// Display-mode presets offered when the page does not define its own.
pub const DISPLAY_MODE_PRESETS: [(&str, &str); 3] = [
    ("mode-true-color", "True color"),
    ("mode-high-contrast", "High contrast"),
    ("mode-water", "Water emphasis"),
];

/// Display-mode picker value. It is used verbatim as a pane class, so the
/// stylesheet decides what each mode looks like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayMode(String);

impl DisplayMode {
    pub fn new(value: impl Into<String>) -> Self {
        DisplayMode(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Class tokens the mode contributes; blank modes contribute none.
    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl From<&str> for DisplayMode {
    fn from(s: &str) -> Self {
        DisplayMode::new(s)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full class set of a pane element. Always rebuilt from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneClasses(Vec<String>);

impl PaneClasses {
    /// Identity classes only; what a pane carries right after creation.
    pub fn base(pane: Pane) -> Self {
        PaneClasses(vec![LEAFLET_PANE_CLASS.to_string(), pane.base_class().to_string()])
    }

    pub fn derive(pane: Pane, mode: &DisplayMode, water_boost: bool) -> Self {
        let mut classes = Self::base(pane);
        classes.0.extend(mode.class_tokens().map(str::to_string));
        if water_boost {
            classes.0.push(WATER_BOOST_CLASS.to_string());
        }
        classes
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Space-joined form for an element's `className`.
    pub fn to_class_name(&self) -> String {
        self.0.join(" ")
    }
}

/// Top-pane opacity in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Clamps into range; NaN becomes opaque.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::OPAQUE;
        }
        // `+ 0.0` folds -0.0 into 0.0 so it never prints as "-0".
        Opacity(value.clamp(0.0, 1.0) + 0.0)
    }

    /// Parses a slider value. `None` when the text is not a number.
    pub fn parse(raw: &str) -> Option<Self> {
        let v = raw.trim().parse::<f64>().ok()?;
        if v.is_nan() {
            return None;
        }
        Some(Self::new(v))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Plain decimal form for a style property: `0.3`, `1`, `0`.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display never uses exponent notation and drops a trailing `.0`.
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classes_without_water_boost() {
        let c = PaneClasses::derive(Pane::Bottom, &"mode-true-color".into(), false);
        assert_eq!(c.to_class_name(), "leaflet-pane pane-bottom mode-true-color");
        assert!(!c.contains(WATER_BOOST_CLASS));
    }

    #[test]
    fn classes_with_water_boost() {
        let c = PaneClasses::derive(Pane::Top, &"mode-water".into(), true);
        assert_eq!(
            c.to_class_name(),
            "leaflet-pane pane-top mode-water water-boost-on"
        );
    }

    #[test]
    fn blank_mode_adds_no_token() {
        let c = PaneClasses::derive(Pane::Top, &DisplayMode::default(), false);
        assert_eq!(c, PaneClasses::base(Pane::Top));
    }

    #[test]
    fn opacity_formats_as_plain_decimal() {
        assert_eq!(Opacity::parse("0.3").map(Opacity::to_css), Some("0.3".to_string()));
        assert_eq!(Opacity::parse("1").map(Opacity::to_css), Some("1".to_string()));
        assert_eq!(Opacity::parse("0.0").map(Opacity::to_css), Some("0".to_string()));
        assert_eq!(Opacity::new(0.7).to_css(), "0.7");
    }

    #[test]
    fn opacity_is_clamped_and_validated() {
        assert_eq!(Opacity::parse(" 1.5 "), Some(Opacity::OPAQUE));
        assert_eq!(Opacity::parse("-2").map(Opacity::get), Some(0.0));
        assert_eq!(Opacity::parse("abc"), None);
        assert_eq!(Opacity::parse("NaN"), None);
        assert_eq!(Opacity::new(f64::NAN), Opacity::OPAQUE);
    }
}
