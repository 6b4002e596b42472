//! Per-type default overlays applied to resolved definitions

use rustc_hash::FxHashMap;
use serde_json::{json, Map, Value};

use crate::value::merge_objects;

const TEXT_TYPES: [&str; 3] = ["textBlock", "textFrame", "textLine"];

/// Run-scoped default tables.
///
/// Every definition first receives the `base` overlay and then the overlay
/// registered for its (possibly defaulted) type, using the template merge
/// rule so that authored values always win.
#[derive(Debug, Clone)]
pub struct Defaults {
    base: Map<String, Value>,
    font: Map<String, Value>,
    by_type: FxHashMap<String, Map<String, Value>>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self::new()
    }
}

impl Defaults {
    /// The standard default table
    pub fn new() -> Self {
        let font = object(json!({
            "family": "calibri",
            "size": 10,
            "style": "regular",
            "bold": false,
            "underline": false,
            "color": "#000000"
        }));

        let mut by_type = FxHashMap::default();
        by_type.insert("section".to_string(), object(json!({ "rotate": 0 })));
        by_type.insert(
            "grid".to_string(),
            object(json!({ "stroke": "#000000", "widths": [], "heights": [] })),
        );
        by_type.insert(
            "image".to_string(),
            object(json!({ "size": [100, 100], "scaling": "stretch" })),
        );
        by_type.insert("pdf".to_string(), object(json!({ "page": 0 })));
        by_type.insert(
            "textBlock".to_string(),
            object(json!({
                "decimals": 2,
                "align": "left",
                "style": "normal",
                "lines": 1,
                "lineHeight": null,
                "checkStyle": { "mode": "stroke", "stroke": "#000000", "width": 0.5 }
            })),
        );
        by_type.insert(
            "textFrame".to_string(),
            object(json!({ "decimals": 2, "label": "LABEL", "width": 100, "height": null })),
        );
        by_type.insert(
            "textLine".to_string(),
            object(json!({ "decimals": 2, "lineHeight": null })),
        );
        by_type.insert(
            "box".to_string(),
            object(json!({
                "size": [100, 100],
                "mode": "fill",
                "stroke": "#000000",
                "fill": "#ffffff",
                "width": 0.5
            })),
        );
        by_type.insert(
            "line".to_string(),
            object(json!({ "dest": [0, 0], "stroke": "#000000", "dash": [1, 0], "width": 1 })),
        );

        let base = object(json!({
            "type": "textBlock",
            "position": [0, 0],
            "name": null,
            "section": null
        }));

        let mut defaults = Self {
            base,
            font,
            by_type,
        };
        defaults.install_font();
        defaults
    }

    /// Override the paragraph font defaults (family, size, color, ...).
    ///
    /// Only truthy values of `font` replace the standard ones.
    pub fn with_font(mut self, font: &Map<String, Value>) -> Self {
        self.font = merge_objects(font, &self.font);
        self.install_font();
        self
    }

    /// The effective default font
    pub fn font(&self) -> &Map<String, Value> {
        &self.font
    }

    /// Default family name, lowercased
    pub fn font_family(&self) -> String {
        self.font
            .get("family")
            .and_then(Value::as_str)
            .unwrap_or("calibri")
            .to_lowercase()
    }

    /// Default font size
    pub fn font_size(&self) -> f64 {
        self.font.get("size").and_then(Value::as_f64).unwrap_or(10.0)
    }

    /// Apply the base overlay and then the type overlay to a raw definition
    pub fn apply(&self, def: &Map<String, Value>) -> Map<String, Value> {
        let merged = merge_objects(def, &self.base);
        let kind = merged
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        match kind.and_then(|k| self.by_type.get(&k)) {
            Some(overlay) => merge_objects(&merged, overlay),
            None => merged,
        }
    }

    fn install_font(&mut self) {
        for kind in TEXT_TYPES {
            if let Some(overlay) = self.by_type.get_mut(kind) {
                overlay.insert("font".to_string(), Value::Object(self.font.clone()));
            }
        }
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
