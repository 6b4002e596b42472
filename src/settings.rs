//! Run settings: paragraph defaults, font sources and asset location
//!
//! Settings are read from TOML. Anything not given falls back to the
//! built-in default document, so a settings file only needs the keys it
//! changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::typeset::DEFAULT_JUSTIFY_THRESHOLD;

/// Errors that can occur when loading or parsing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A font family and the files of its faces: regular, bold, italic,
/// bold-italic (only the first is required)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FontSource {
    pub name: String,
    pub files: Vec<String>,
}

/// Default paragraph font, applied under every text definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FontSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FontSettings {
    /// The overrides as a template font object
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Loaded run settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub name: Option<String>,
    pub description: Option<String>,
    pub font: FontSettings,
    /// Fraction of the line justified text must fill before it is spread
    pub justify_threshold: f64,
    /// Directory relative asset paths resolve against
    pub base_path: Option<PathBuf>,
    pub fonts: Vec<FontSource>,
}

#[derive(Deserialize)]
struct TomlSettings {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    paragraph: FontSettings,
    justify: Option<TomlJustify>,
    assets: Option<TomlAssets>,
    #[serde(default)]
    fonts: Vec<FontSource>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlJustify {
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct TomlAssets {
    base_path: Option<PathBuf>,
}

/// Built-in settings: the standard families looked up under `fonts/`
const DEFAULT_SETTINGS: &str = r##"
[metadata]
name = "default"

[paragraph]
family = "calibri"
size = 10
color = "#000000"

[justify]
threshold = 0.85

[[fonts]]
name = "calibri"
files = ["fonts/CALIBRI.TTF", "fonts/CALIBRIB.TTF", "fonts/CALIBRII.TTF", "fonts/CALIBRIZ.TTF"]

[[fonts]]
name = "arial"
files = ["fonts/arial.ttf", "fonts/arialbd.ttf"]

[[fonts]]
name = "times"
files = ["fonts/times.ttf", "fonts/timesbd.ttf", "fonts/timesi.ttf", "fonts/timesbi.ttf"]
"##;

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let parsed: TomlSettings = toml::from_str(content)?;

        Ok(Settings {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            font: parsed.paragraph,
            justify_threshold: parsed
                .justify
                .and_then(|j| j.threshold)
                .unwrap_or(DEFAULT_JUSTIFY_THRESHOLD),
            base_path: parsed.assets.and_then(|a| a.base_path),
            fonts: parsed.fonts,
        })
    }

    /// Settings with no font sources, for fully in-memory runs
    pub fn empty() -> Self {
        Settings {
            name: None,
            description: None,
            font: FontSettings::default(),
            justify_threshold: DEFAULT_JUSTIFY_THRESHOLD,
            base_path: None,
            fonts: Vec::new(),
        }
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn with_justify_threshold(mut self, threshold: f64) -> Self {
        self.justify_threshold = threshold;
        self
    }

    pub fn with_font_source(mut self, source: FontSource) -> Self {
        self.fonts.push(source);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        match Self::from_str(DEFAULT_SETTINGS) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("built-in settings are invalid: {}", e);
                Self::empty()
            }
        }
    }
}
