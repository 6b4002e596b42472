//! Template resolution - turns raw templates into typed definition sets

use std::rc::Rc;

use log::debug;
use serde_json::{Map, Value};

use super::defaults::Defaults;
use super::definition::{Definition, ResourceSpec, TemplateSet};
use super::registry::{RawTemplate, TemplateError, TemplateRegistry};
use crate::value::{assign, is_truthy, merge_objects, normalize_colors};

/// A template after its base chain has been folded in, before defaults
#[derive(Debug, Clone, Default)]
struct MergedTemplate {
    definitions: Vec<Map<String, Value>>,
    data: Map<String, Value>,
    resources: Vec<Value>,
    width: Option<f64>,
    height: Option<f64>,
    fixed: bool,
    group: Option<String>,
}

/// Resolves registered templates against a set of default overlays
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a TemplateRegistry,
    defaults: &'a Defaults,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a TemplateRegistry, defaults: &'a Defaults) -> Self {
        Self { registry, defaults }
    }

    /// Resolve a template by name into a fresh [`TemplateSet`].
    ///
    /// The registry is never modified; every call builds new definitions.
    pub fn resolve(&self, name: &str) -> Result<TemplateSet, TemplateError> {
        let mut chain = Vec::new();
        let mut merged = self.merge_chain(name, &mut chain)?;
        debug!(
            "resolved base chain for {}: {} definitions",
            name,
            merged.definitions.len()
        );

        ensure_sections(&mut merged.definitions);

        let mut definitions = Vec::with_capacity(merged.definitions.len());
        for raw in &merged.definitions {
            let qualified_name = qualified_name_of(raw).to_string();
            let mut applied = self.defaults.apply(raw);
            normalize_colors(&mut applied).map_err(|value| TemplateError::InvalidColor {
                template: name.to_string(),
                qualified_name: qualified_name.clone(),
                value,
            })?;
            let def =
                Definition::from_raw(&applied).map_err(|e| TemplateError::InvalidDefinition {
                    template: name.to_string(),
                    qualified_name,
                    message: e.to_string(),
                })?;
            definitions.push(Rc::new(def));
        }

        let resources = merged
            .resources
            .into_iter()
            .map(serde_json::from_value::<ResourceSpec>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TemplateError::Malformed {
                name: name.to_string(),
                message: format!("bad resource: {}", e),
            })?;

        let mut data = merged.data;
        data.insert("hide".to_string(), Value::Bool(false));
        data.insert("hidden".to_string(), Value::Bool(false));

        Ok(TemplateSet {
            name: name.to_string(),
            definitions,
            data,
            resources,
            width: merged.width,
            height: merged.height,
            fixed: merged.fixed,
            group: merged.group,
        })
    }

    fn merge_chain(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<MergedTemplate, TemplateError> {
        if chain.iter().any(|n| n == name) {
            chain.push(name.to_string());
            return Err(TemplateError::CircularBase {
                chain: chain.join(" -> "),
            });
        }
        chain.push(name.to_string());

        let raw = self
            .registry
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })?;
        let own = qualify(name, raw)?;

        let merged = match raw.base.as_deref().filter(|b| !b.is_empty()) {
            Some(base_name) => {
                let base = self.merge_chain(base_name, chain)?;
                MergedTemplate {
                    definitions: merge_definitions(base.definitions, &own.definitions),
                    data: assign(&[&base.data, &own.data]),
                    resources: base.resources.into_iter().chain(own.resources).collect(),
                    width: own.width.or(base.width),
                    height: own.height.or(base.height),
                    fixed: own.fixed || base.fixed,
                    group: own.group.or(base.group),
                }
            }
            None => own,
        };

        chain.pop();
        Ok(merged)
    }
}

/// Assign qualified names to a raw template's own definitions
fn qualify(template: &str, raw: &RawTemplate) -> Result<MergedTemplate, TemplateError> {
    let mut definitions = Vec::with_capacity(raw.definitions.len());
    for (index, def) in raw.definitions.iter().enumerate() {
        let name = def
            .get("name")
            .filter(|v| is_truthy(v))
            .and_then(name_string)
            .ok_or_else(|| TemplateError::MissingName {
                template: template.to_string(),
                index,
            })?;
        let qualified = match def.get("section").filter(|v| is_truthy(v)).and_then(name_string) {
            Some(section) => format!("{}.{}", section, name),
            None => name.clone(),
        };

        let mut def = def.clone();
        def.insert("name".to_string(), Value::String(name));
        def.insert("qualifiedName".to_string(), Value::String(qualified));
        definitions.push(def);
    }

    Ok(MergedTemplate {
        definitions,
        data: raw.data.clone(),
        resources: raw.resources.clone(),
        width: raw.width.filter(|w| *w != 0.0),
        height: raw.height.filter(|h| *h != 0.0),
        fixed: raw.fixed.unwrap_or(false),
        group: raw.group.clone().filter(|g| !g.is_empty()),
    })
}

fn name_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn qualified_name_of(def: &Map<String, Value>) -> &str {
    def.get("qualifiedName")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn is_section(def: &Map<String, Value>) -> bool {
    def.get("type").and_then(Value::as_str) == Some("section")
}

/// Overlay child definitions onto base definitions keyed by qualified name.
///
/// Matched definitions keep their base position; child-only definitions are
/// appended after every inherited one.
fn merge_definitions(
    mut base: Vec<Map<String, Value>>,
    child: &[Map<String, Value>],
) -> Vec<Map<String, Value>> {
    let mut appended = Vec::new();
    for def in child {
        let qualified = qualified_name_of(def);
        match base.iter().position(|b| qualified_name_of(b) == qualified) {
            Some(index) => base[index] = merge_objects(def, &base[index]),
            None => appended.push(def.clone()),
        }
    }
    base.extend(appended);
    base
}

/// Materialize every ancestor section implied by a dotted qualified name and
/// point each definition at its immediate parent.
fn ensure_sections(defs: &mut Vec<Map<String, Value>>) {
    let names: Vec<String> = defs
        .iter()
        .map(|d| qualified_name_of(d).to_string())
        .collect();

    for (index, qualified) in names.iter().enumerate() {
        if let Some((parent, _)) = qualified.rsplit_once('.') {
            ensure_section(defs, parent);
            defs[index].insert("section".to_string(), Value::String(parent.to_string()));
        }
    }
}

fn ensure_section(defs: &mut Vec<Map<String, Value>>, qualified: &str) {
    if qualified.is_empty() {
        return;
    }
    let (parent, name) = match qualified.rsplit_once('.') {
        Some((parent, name)) => (parent, name),
        None => ("", qualified),
    };
    ensure_section(defs, parent);

    let exists = defs
        .iter()
        .any(|d| is_section(d) && qualified_name_of(d) == qualified);
    if exists {
        return;
    }

    debug!("synthesizing implicit section {}", qualified);
    let mut section = Map::new();
    section.insert("type".to_string(), Value::from("section"));
    section.insert("position".to_string(), Value::from(vec![0, 0]));
    section.insert("name".to_string(), Value::from(name));
    section.insert("qualifiedName".to_string(), Value::from(qualified));
    section.insert("section".to_string(), Value::from(parent));
    defs.push(section);
}
