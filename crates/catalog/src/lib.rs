use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Layer shown underneath by default.
pub const DEFAULT_BOTTOM_LAYER_ID: &str = "s2cloudless-2018_3857";
/// Layer shown on top by default (most recent year).
pub const DEFAULT_TOP_LAYER_ID: &str = "s2cloudless-2023_3857";

const BUILTIN_YEARS: [(&str, &str); 6] = [
    ("2023", "s2cloudless-2023_3857"),
    ("2021", "s2cloudless-2021_3857"),
    ("2020", "s2cloudless-2020_3857"),
    ("2019", "s2cloudless-2019_3857"),
    ("2018", "s2cloudless-2018_3857"),
    ("2016", "s2cloudless-2016_3857"),
];

/// One selectable imagery year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    pub label: String,
    /// Tile-service layer identifier, also the picker option value.
    #[serde(alias = "layerId")]
    pub layer_id: String,
}

impl YearEntry {
    pub fn new(label: impl Into<String>, layer_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            layer_id: layer_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("imagery catalog has no years")]
    Empty,
    #[error("duplicate layer id in catalog: {0}")]
    DuplicateLayerId(String),
    #[error("imagery catalog json invalid: {0}")]
    Json(String),
}

/// Ordered, immutable list of imagery years. Order is the display order of
/// both year pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageryCatalog {
    years: Vec<YearEntry>,
}

/// Default picker selection resolved against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub bottom: &'a YearEntry,
    pub top: &'a YearEntry,
}

impl Default for ImageryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ImageryCatalog {
    /// Sentinel-2 cloudless mosaics, newest first.
    pub fn builtin() -> Self {
        Self {
            years: BUILTIN_YEARS
                .iter()
                .map(|(label, id)| YearEntry::new(*label, *id))
                .collect(),
        }
    }

    pub fn new(years: Vec<YearEntry>) -> Result<Self, CatalogError> {
        if years.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = BTreeSet::new();
        for y in &years {
            if !seen.insert(y.layer_id.as_str()) {
                return Err(CatalogError::DuplicateLayerId(y.layer_id.clone()));
            }
        }
        Ok(Self { years })
    }

    /// Parses a JSON array of `{label, layer_id}` objects.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let years = serde_json::from_str::<Vec<YearEntry>>(raw)
            .map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::new(years)
    }

    pub fn list_years(&self) -> &[YearEntry] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn find(&self, layer_id: &str) -> Option<&YearEntry> {
        self.years.iter().find(|y| y.layer_id == layer_id)
    }

    pub fn find_by_label(&self, label: &str) -> Option<&YearEntry> {
        self.years.iter().find(|y| y.label == label)
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.find(layer_id).is_some()
    }

    /// Resolves the preferred bottom/top ids. A preferred id missing from the
    /// catalog falls back to the middle entry (bottom) or the first entry (top).
    ///
    /// Both sides may resolve to the same entry; that is a legal comparison.
    pub fn selection(&self, bottom_id: &str, top_id: &str) -> Selection<'_> {
        let bottom = self.find(bottom_id).unwrap_or_else(|| {
            let fallback = &self.years[self.years.len() / 2];
            warn!(
                requested = bottom_id,
                fallback = %fallback.layer_id,
                "default bottom year not in catalog"
            );
            fallback
        });
        let top = self.find(top_id).unwrap_or_else(|| {
            let fallback = &self.years[0];
            warn!(
                requested = top_id,
                fallback = %fallback.layer_id,
                "default top year not in catalog"
            );
            fallback
        });
        Selection { bottom, top }
    }

    pub fn default_selection(&self) -> Selection<'_> {
        self.selection(DEFAULT_BOTTOM_LAYER_ID, DEFAULT_TOP_LAYER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_is_newest_first() {
        let catalog = ImageryCatalog::builtin();
        let labels: Vec<&str> = catalog
            .list_years()
            .iter()
            .map(|y| y.label.as_str())
            .collect();
        assert_eq!(labels, vec!["2023", "2021", "2020", "2019", "2018", "2016"]);
    }

    #[test]
    fn default_selection_is_2018_under_2023() {
        let catalog = ImageryCatalog::builtin();
        let sel = catalog.default_selection();
        assert_eq!(sel.bottom.label, "2018");
        assert_eq!(sel.top.label, "2023");
        assert_ne!(sel.bottom, sel.top);
    }

    #[test]
    fn lookups() {
        let catalog = ImageryCatalog::builtin();
        assert_eq!(
            catalog.find_by_label("2020").map(|y| y.layer_id.as_str()),
            Some("s2cloudless-2020_3857")
        );
        assert!(catalog.contains("s2cloudless-2016_3857"));
        assert!(!catalog.contains("s2cloudless-2017_3857"));
    }

    #[test]
    fn json_accepts_both_key_spellings() {
        let raw = r#"[
            {"label": "2024", "layer_id": "s2cloudless-2024_3857"},
            {"label": "2022", "layerId": "s2cloudless-2022_3857"}
        ]"#;
        let catalog = ImageryCatalog::from_json(raw).unwrap();
        assert_eq!(
            catalog.list_years(),
            &[
                YearEntry::new("2024", "s2cloudless-2024_3857"),
                YearEntry::new("2022", "s2cloudless-2022_3857"),
            ]
        );
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert_eq!(ImageryCatalog::from_json("[]"), Err(CatalogError::Empty));
        let dup = vec![YearEntry::new("a", "x"), YearEntry::new("b", "x")];
        assert_eq!(
            ImageryCatalog::new(dup),
            Err(CatalogError::DuplicateLayerId("x".to_string()))
        );
        assert!(matches!(
            ImageryCatalog::from_json("{"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn missing_defaults_fall_back() {
        let catalog = ImageryCatalog::new(vec![
            YearEntry::new("2024", "a"),
            YearEntry::new("2022", "b"),
            YearEntry::new("2020", "c"),
        ])
        .unwrap();
        let sel = catalog.default_selection();
        assert_eq!(sel.bottom.layer_id, "b");
        assert_eq!(sel.top.layer_id, "a");
    }

    #[test]
    fn single_entry_catalog_selects_it_twice() {
        let catalog = ImageryCatalog::new(vec![YearEntry::new("2024", "a")]).unwrap();
        let sel = catalog.default_selection();
        assert_eq!(sel.bottom, sel.top);
    }
}
