//! Template registry for storing raw, unresolved templates

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while registering or resolving templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template (or one of its bases) not found in registry
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// A raw definition has no usable `name`
    #[error("definition #{index} in template {template} has no name")]
    MissingName { template: String, index: usize },

    /// The base chain loops back on itself
    #[error("circular template base detected: {chain}")]
    CircularBase { chain: String },

    /// The raw template document does not have the expected shape
    #[error("malformed template {name}: {message}")]
    Malformed { name: String, message: String },

    /// A merged definition does not fit the typed definition model
    #[error("invalid definition {qualified_name} in template {template}: {message}")]
    InvalidDefinition {
        template: String,
        qualified_name: String,
        message: String,
    },

    /// A color key holds something that is not a hex color
    #[error("invalid color {value:?} on {qualified_name} in template {template}")]
    InvalidColor {
        template: String,
        qualified_name: String,
        value: String,
    },
}

/// A stored, unresolved template as authored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTemplate {
    /// Name of the single template this one inherits from
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub definitions: Vec<Map<String, Value>>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub resources: Vec<Value>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub fixed: Option<bool>,
    #[serde(default)]
    pub group: Option<String>,
}

impl RawTemplate {
    /// Parse a raw template from its JSON value
    pub fn from_value(name: &str, value: Value) -> Result<Self, TemplateError> {
        serde_json::from_value(value).map_err(|e| TemplateError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Registry for storing raw templates by name
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, RawTemplate>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a `{ name: template, ... }` object
    pub fn from_definitions(defs: &Map<String, Value>) -> Result<Self, TemplateError> {
        let mut registry = Self::new();
        for (name, value) in defs {
            registry.register_value(name, value.clone())?;
        }
        Ok(registry)
    }

    /// Register a parsed template, replacing any previous one with that name
    pub fn register(&mut self, name: impl Into<String>, template: RawTemplate) {
        self.templates.insert(name.into(), template);
    }

    /// Register a template from its JSON form
    pub fn register_value(&mut self, name: &str, value: Value) -> Result<(), TemplateError> {
        let template = RawTemplate::from_value(name, value)?;
        self.register(name, template);
        Ok(())
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&RawTemplate> {
        self.templates.get(name)
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get all template names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }
}
