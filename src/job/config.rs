//! Batch job input: page setup, layouts, templates and records

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::InputError;
use crate::layout::{CellLayout, LayoutError, PageSize};
use crate::settings::FontSource;

/// A whole job document: `{ config, records }`
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    pub config: JobConfig,
    #[serde(default)]
    pub records: Vec<Value>,
}

impl JobInput {
    pub fn from_json(source: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Page setup and template catalogue for one run
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    #[serde(default)]
    pub layouts: Vec<LayoutSpec>,
    #[serde(default = "default_page_size")]
    pub page_size: [f64; 2],
    /// `"postcard"`, `"<cols>x<rows>"` or an explicit cell list
    #[serde(default)]
    pub layout_mode: Option<Value>,
    /// Raw templates by name
    #[serde(default)]
    pub definitions: Map<String, Value>,
    /// Paragraph font overrides for this job
    #[serde(default)]
    pub font: Option<Map<String, Value>>,
    #[serde(default)]
    pub fonts: Vec<FontSource>,
    #[serde(default)]
    pub base_path: Option<PathBuf>,
}

fn default_page_size() -> [f64; 2] {
    [612.0, 792.0]
}

impl JobConfig {
    pub fn new(definitions: Map<String, Value>) -> Self {
        Self {
            layouts: Vec::new(),
            page_size: default_page_size(),
            layout_mode: None,
            definitions,
            font: None,
            fonts: Vec::new(),
            base_path: None,
        }
    }

    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layouts.push(layout);
        self
    }

    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.page_size = [width, height];
        self
    }

    pub fn with_layout_mode(mut self, mode: impl Into<Value>) -> Self {
        self.layout_mode = Some(mode.into());
        self
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_size[0], self.page_size[1])
    }

    /// Cells of one physical page; a single full-page cell when unset
    pub fn cell_layout(&self) -> Result<CellLayout, LayoutError> {
        match &self.layout_mode {
            None | Some(Value::Null) => Ok(CellLayout::default()),
            Some(mode) => CellLayout::from_value(mode),
        }
    }
}

/// One template placed on every record's pages
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutSpec {
    /// Record key the layout reads its data from
    pub name: String,
    /// Template to render; the layout name when absent
    #[serde(default)]
    pub template: Option<String>,
    /// 1-based physical page
    #[serde(default)]
    pub page: Option<usize>,
    /// Render one item per entry of an array value
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub positioning: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub columns: Option<usize>,
}

impl LayoutSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            page: None,
            array: false,
            positioning: None,
            direction: None,
            rows: None,
            columns: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_array(mut self, positioning: impl Into<String>) -> Self {
        self.array = true;
        self.positioning = Some(positioning.into());
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_grid(mut self, rows: usize, columns: usize) -> Self {
        self.rows = Some(rows);
        self.columns = Some(columns);
        self
    }

    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.name)
    }

    /// Zero-based page index; page 0 is treated as page 1
    pub fn page_index(&self) -> usize {
        self.page.unwrap_or(1).max(1) - 1
    }
}
