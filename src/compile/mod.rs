//! Compilation of resolved templates into reusable draw procedures
//!
//! A [`RenderTree`] groups a template's definitions under their sections.
//! Each node compiles lazily into a [`Procedure`] that is cached on the node
//! and replayed for every record.

pub mod draw;
pub mod error;
pub mod procedure;
pub mod tree;

pub use error::RenderError;
pub use procedure::{DrawContext, Procedure};
pub use tree::{RenderTree, TreeNode};
