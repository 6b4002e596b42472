//! Render tree: definitions grouped under their sections

use std::cell::OnceCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::template::{Definition, TemplateSet};
use crate::value::assign;

use super::error::RenderError;
use super::procedure::{DrawContext, Procedure};

/// One node of the render tree.
///
/// The root node has no definition and acts as an unpositioned section.
#[derive(Debug)]
pub struct TreeNode {
    definition: Option<Rc<Definition>>,
    children: Vec<Rc<TreeNode>>,
    procedure: OnceCell<Rc<Procedure>>,
}

impl TreeNode {
    fn new(definition: Option<Rc<Definition>>, children: Vec<Rc<TreeNode>>) -> Self {
        Self {
            definition,
            children,
            procedure: OnceCell::new(),
        }
    }

    pub fn definition(&self) -> Option<&Rc<Definition>> {
        self.definition.as_ref()
    }

    pub fn children(&self) -> &[Rc<TreeNode>] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.definition.is_none()
    }

    /// Root and section-type nodes group children
    pub fn is_section(&self) -> bool {
        self.definition
            .as_ref()
            .map(|d| d.kind.is_section())
            .unwrap_or(true)
    }

    /// The compiled procedure for this node, built on first use
    pub fn compile(&self) -> Rc<Procedure> {
        self.procedure
            .get_or_init(|| Rc::new(Procedure::compile(self)))
            .clone()
    }

    /// Whether this node has been compiled yet
    pub fn is_compiled(&self) -> bool {
        self.procedure.get().is_some()
    }
}

/// A template's definitions arranged by section, ready to compile
#[derive(Debug)]
pub struct RenderTree {
    template: Rc<TemplateSet>,
    root: Rc<TreeNode>,
    fields: OnceCell<Map<String, Value>>,
}

impl RenderTree {
    /// Group a resolved template's definitions under their sections.
    ///
    /// Section references may point forward in the definition list.
    pub fn build(template: Rc<TemplateSet>) -> Result<Self, RenderError> {
        let root = Rc::new(group(&template)?);
        log::debug!(
            "built render tree for '{}' with {} top-level nodes",
            template.name,
            root.children.len()
        );
        Ok(Self {
            template,
            root,
            fields: OnceCell::new(),
        })
    }

    pub fn template(&self) -> &Rc<TemplateSet> {
        &self.template
    }

    pub fn root(&self) -> &Rc<TreeNode> {
        &self.root
    }

    /// Every field the template reads, initialized to null
    fn empty_fields(&self) -> &Map<String, Value> {
        self.fields.get_or_init(|| {
            self.template
                .field_names()
                .into_iter()
                .map(|name| (name.to_string(), Value::Null))
                .collect()
        })
    }

    /// Merge a record over the template's defaults and draw it
    pub fn process(&self, ctx: &mut DrawContext<'_>, record: &Value) -> Result<(), RenderError> {
        let empty = Map::new();
        let record = record.as_object().unwrap_or(&empty);
        let data = assign(&[self.empty_fields(), &self.template.data, record]);
        self.root.compile().run(ctx, &data)
    }
}

fn group(template: &TemplateSet) -> Result<TreeNode, RenderError> {
    let mut members: FxHashMap<&str, Vec<Rc<Definition>>> = FxHashMap::default();
    members.insert("", Vec::new());
    for def in &template.definitions {
        if def.kind.is_section() {
            members.entry(def.qualified_name.as_str()).or_default();
        }
    }
    for def in &template.definitions {
        match members.get_mut(def.section_key()) {
            Some(children) => children.push(Rc::clone(def)),
            None => {
                return Err(RenderError::MissingSection {
                    template: template.name.clone(),
                    definition: def.qualified_name.clone(),
                    section: def.section_key().to_string(),
                })
            }
        }
    }
    Ok(attach(None, &members))
}

fn attach(definition: Option<Rc<Definition>>, members: &FxHashMap<&str, Vec<Rc<Definition>>>) -> TreeNode {
    let key = definition
        .as_ref()
        .map(|d| d.qualified_name.as_str())
        .unwrap_or("");
    let is_section = definition
        .as_ref()
        .map(|d| d.kind.is_section())
        .unwrap_or(true);

    let children = if is_section {
        members
            .get(key)
            .map(|defs| {
                defs.iter()
                    .map(|def| Rc::new(attach(Some(Rc::clone(def)), members)))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    TreeNode::new(definition, children)
}
