//! Template system: raw template storage and resolution
//!
//! Templates are JSON documents holding a flat list of definitions. A template
//! may name a single `base` it inherits from; resolution folds the base chain
//! in, materializes implied sections, overlays per-type defaults and produces
//! an immutable [`TemplateSet`].
//!
//! # Example
//!
//! ```text
//! {
//!   "base": "letterhead",
//!   "definitions": [
//!     { "name": "header", "type": "section", "position": [0, 700] },
//!     { "name": "title", "section": "header", "field": "title",
//!       "font": { "size": 18, "bold": true } }
//!   ],
//!   "data": { "title": "Untitled" }
//! }
//! ```

mod defaults;
mod definition;
mod registry;
mod resolver;

pub use defaults::Defaults;
pub use definition::{
    Align, BoxStyle, Definition, DefinitionKind, FontSpec, PaintMode, Pair, ResourceKind,
    ResourceSpec, Scaling, TemplateSet,
};
pub use registry::{RawTemplate, TemplateError, TemplateRegistry};
pub use resolver::Resolver;
