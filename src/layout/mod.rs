//! Page geometry: cell subdivision and repeated-item placement
//!
//! A physical page is split into cells by a [`CellLayout`]; each record fills
//! one cell. Array-bound layouts place one rendered block per item at the
//! anchors computed by a [`Positioner`] inside a [`GroupArea`].

pub mod cells;
pub mod error;
pub mod positioner;
pub mod transform;
pub mod types;

pub use cells::{CellLayout, Coord};
pub use error::LayoutError;
pub use positioner::{Direction, GroupArea, Positioner, Strategy};
pub use transform::Affine;
pub use types::*;
