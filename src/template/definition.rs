//! Typed, immutable definitions produced by template resolution

use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Map, Value};

/// A 2D coordinate pair as written in templates (`[x, y]`)
pub type Pair = (f64, f64);

/// Font settings carried by text definitions.
///
/// Every field is optional because the merge rules turn falsy values into
/// `null`; [`FontSpec::family_or`] and friends apply the fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: Option<String>,
    pub size: Option<f64>,
    pub style: Option<String>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<u32>,
}

impl FontSpec {
    pub fn is_italic(&self) -> bool {
        matches!(self.style.as_deref(), Some("italics") | Some("italic"))
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    pub fn family_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.family.as_deref().unwrap_or(fallback)
    }

    pub fn size_or(&self, fallback: f64) -> f64 {
        self.size.unwrap_or(fallback)
    }

    pub fn color_or_black(&self) -> u32 {
        self.color.unwrap_or(0)
    }
}

/// Horizontal alignment of a typeset paragraph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// How a rectangle is painted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PaintMode {
    #[default]
    #[serde(rename = "fill")]
    Fill,
    #[serde(rename = "stroke")]
    Stroke,
    #[serde(rename = "fillAndStroke")]
    FillAndStroke,
}

impl PaintMode {
    pub fn fills(self) -> bool {
        matches!(self, PaintMode::Fill | PaintMode::FillAndStroke)
    }

    pub fn strokes(self) -> bool {
        matches!(self, PaintMode::Stroke | PaintMode::FillAndStroke)
    }
}

/// Image scaling mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    #[default]
    Stretch,
    Fit,
}

/// Rectangle paint settings, used by checklist boxes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoxStyle {
    pub mode: Option<PaintMode>,
    pub stroke: Option<u32>,
    pub fill: Option<u32>,
    pub width: Option<f64>,
}

/// Type-specific part of a definition, selected by its `type` key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DefinitionKind {
    Section {
        #[serde(default)]
        rotate: Option<f64>,
    },
    Group,
    #[serde(rename_all = "camelCase")]
    TextBlock {
        #[serde(default)]
        font: Option<FontSpec>,
        #[serde(default)]
        decimals: Option<usize>,
        #[serde(default)]
        align: Option<Align>,
        #[serde(default)]
        style: Option<String>,
        #[serde(default)]
        lines: Option<u32>,
        #[serde(default)]
        line_height: Option<f64>,
        #[serde(default)]
        check_style: Option<BoxStyle>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        perc: Option<f64>,
    },
    TextFrame {
        #[serde(default)]
        font: Option<FontSpec>,
        #[serde(default)]
        decimals: Option<usize>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    TextLine {
        #[serde(default)]
        font: Option<FontSpec>,
        #[serde(default)]
        decimals: Option<usize>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    Image {
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        scaling: Option<Scaling>,
        #[serde(default)]
        noscale: Option<bool>,
    },
    Pdf {
        #[serde(default)]
        pdf: Option<String>,
        #[serde(default)]
        page: Option<usize>,
    },
    #[serde(rename = "box")]
    Rectangle {
        #[serde(default)]
        mode: Option<PaintMode>,
        #[serde(default)]
        stroke: Option<u32>,
        #[serde(default)]
        fill: Option<u32>,
        #[serde(default)]
        width: Option<f64>,
    },
    Line {
        #[serde(default)]
        dest: Option<Pair>,
        #[serde(default)]
        stroke: Option<u32>,
        #[serde(default)]
        dash: Option<Vec<f64>>,
        #[serde(default)]
        width: Option<f64>,
    },
    Grid {
        #[serde(default)]
        stroke: Option<u32>,
        #[serde(default)]
        widths: Option<Vec<f64>>,
        #[serde(default)]
        heights: Option<Vec<f64>>,
        #[serde(default)]
        width: Option<f64>,
    },
    Qr,
    #[serde(other)]
    Unknown,
}

impl DefinitionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            DefinitionKind::Section { .. } => "section",
            DefinitionKind::Group => "group",
            DefinitionKind::TextBlock { .. } => "textBlock",
            DefinitionKind::TextFrame { .. } => "textFrame",
            DefinitionKind::TextLine { .. } => "textLine",
            DefinitionKind::Image { .. } => "image",
            DefinitionKind::Pdf { .. } => "pdf",
            DefinitionKind::Rectangle { .. } => "box",
            DefinitionKind::Line { .. } => "line",
            DefinitionKind::Grid { .. } => "grid",
            DefinitionKind::Qr => "qr",
            DefinitionKind::Unknown => "unknown",
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, DefinitionKind::Section { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self, DefinitionKind::Group)
    }
}

/// One drawable or structural unit of a resolved template
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub name: String,
    pub qualified_name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub position: Option<Pair>,
    #[serde(default)]
    pub size: Option<Pair>,
    #[serde(default)]
    pub field: Option<String>,
    /// Parsed but not used for paint order
    #[serde(default)]
    pub zindex: Option<f64>,
    #[serde(flatten)]
    pub kind: DefinitionKind,
}

impl Definition {
    /// Build a typed definition from a fully merged raw object
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(raw.clone()))
    }

    pub fn origin(&self) -> Pair {
        self.position.unwrap_or((0.0, 0.0))
    }

    /// Section this definition is attached to; empty for the root
    pub fn section_key(&self) -> &str {
        self.section.as_deref().unwrap_or("")
    }

    pub fn font(&self) -> Option<&FontSpec> {
        match &self.kind {
            DefinitionKind::TextBlock { font, .. }
            | DefinitionKind::TextFrame { font, .. }
            | DefinitionKind::TextLine { font, .. } => font.as_ref(),
            _ => None,
        }
    }
}

/// A resource reference declared by a template
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceSpec {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Pdf,
}

/// A named, fully resolved definition collection
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSet {
    pub name: String,
    pub definitions: Vec<Rc<Definition>>,
    pub data: Map<String, Value>,
    pub resources: Vec<ResourceSpec>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fixed: bool,
    /// Group area that array items of this template are anchored to
    pub group: Option<String>,
}

impl TemplateSet {
    /// Find a group definition by qualified name
    pub fn find_group(&self, name: &str) -> Option<&Definition> {
        self.definitions
            .iter()
            .map(|d| d.as_ref())
            .find(|d| d.kind.is_group() && d.qualified_name == name)
    }

    /// Every distinct field name referenced by a definition, in definition order
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for def in &self.definitions {
            if let Some(field) = def.field.as_deref() {
                if !names.contains(&field) {
                    names.push(field);
                }
            }
        }
        names
    }
}
