//! Compiled draw procedures
//!
//! Each tree node compiles once into a [`Procedure`]. Section procedures
//! wrap their children in translate/rotate frames; leaf procedures look up
//! their field in the record and dispatch to a draw operation.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::assets::ResourceSet;
use crate::layout::Point;
use crate::renderer::Canvas;
use crate::template::{Definition, DefinitionKind};
use crate::typeset::Typesetter;
use crate::value::is_truthy;

use super::draw;
use super::error::RenderError;
use super::tree::TreeNode;

static NULL: Value = Value::Null;

/// Everything a procedure needs while drawing one record
pub struct DrawContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub typesetter: Typesetter<'a>,
    pub resources: &'a ResourceSet,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        canvas: &'a mut dyn Canvas,
        typesetter: Typesetter<'a>,
        resources: &'a ResourceSet,
    ) -> Self {
        Self {
            canvas,
            typesetter,
            resources,
        }
    }
}

/// Executable form of a tree node
#[derive(Debug)]
pub enum Procedure {
    /// Empty sections and inert definitions
    Noop,
    Section {
        origin: Point,
        rotate: Option<f64>,
        children: Vec<Rc<Procedure>>,
    },
    Leaf {
        definition: Rc<Definition>,
    },
}

impl Procedure {
    /// Compile a node, compiling (or reusing) its children's procedures
    pub fn compile(node: &TreeNode) -> Procedure {
        if node.is_section() {
            if node.children().is_empty() {
                return Procedure::Noop;
            }
            let (origin, rotate) = match node.definition().map(|d| (d.origin(), &d.kind)) {
                Some((origin, DefinitionKind::Section { rotate })) => {
                    (origin, rotate.filter(|angle| *angle != 0.0))
                }
                _ => ((0.0, 0.0), None),
            };
            return Procedure::Section {
                origin: origin.into(),
                rotate,
                children: node.children().iter().map(|c| c.compile()).collect(),
            };
        }
        match node.definition() {
            Some(def) if draw::is_drawable(&def.kind) => Procedure::Leaf {
                definition: Rc::clone(def),
            },
            _ => Procedure::Noop,
        }
    }

    /// Draw one record. Frames pushed here are popped on every path.
    pub fn run(&self, ctx: &mut DrawContext<'_>, record: &Map<String, Value>) -> Result<(), RenderError> {
        match self {
            Procedure::Noop => Ok(()),
            Procedure::Section {
                origin,
                rotate,
                children,
            } => {
                ctx.canvas.begin_translate(origin.x, origin.y);
                if let Some(angle) = rotate {
                    ctx.canvas.begin_rotate(*angle);
                }
                let result = children.iter().try_for_each(|child| child.run(ctx, record));
                if rotate.is_some() {
                    ctx.canvas.end_rotate();
                }
                ctx.canvas.end_translate();
                result
            }
            Procedure::Leaf { definition } => {
                let value = definition
                    .field
                    .as_deref()
                    .and_then(|field| record.get(field))
                    .unwrap_or(&NULL);
                if *value == Value::Bool(false) {
                    return Ok(());
                }
                let value = normalize_falsy(value);
                draw::draw(ctx, definition, &value)
            }
        }
    }
}

/// Keep numeric zero, turn every other falsy value into null
fn normalize_falsy(value: &Value) -> Value {
    if is_truthy(value) || value.as_f64() == Some(0.0) {
        value.clone()
    } else {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_falsy() {
        assert_eq!(normalize_falsy(&json!(0)), json!(0));
        assert_eq!(normalize_falsy(&json!("")), Value::Null);
        assert_eq!(normalize_falsy(&Value::Null), Value::Null);
        assert_eq!(normalize_falsy(&json!("x")), json!("x"));
        assert_eq!(normalize_falsy(&json!([])), json!([]));
    }
}
