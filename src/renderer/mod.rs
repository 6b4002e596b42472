//! Canvas backends
//!
//! Compiled templates draw through the [`Canvas`] trait. Two backends ship
//! with the crate: [`SvgCanvas`] produces one SVG document per page, and
//! [`RecordingCanvas`] keeps an operation log with absolute coordinates.

pub mod canvas;
pub mod config;
pub mod recording;
pub mod svg;

pub use canvas::{
    hex_color, BlockId, Canvas, GlyphRun, ModuleMatrix, RectPaint, Rgb, StrokeStyle,
};
pub use config::SvgConfig;
pub use recording::{DrawOp, RecordingCanvas};
pub use svg::SvgCanvas;
