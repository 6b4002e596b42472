//! The drawing surface the compiled templates render onto

use crate::assets::{DocumentAsset, ImageAsset};
use crate::layout::{BoundingBox, PageSize, Point};

/// A 24-bit RGB color packed as `0xRRGGBB`
pub type Rgb = u32;

/// Format a packed color as `#rrggbb`
pub fn hex_color(color: Rgb) -> String {
    format!("#{:06x}", color & 0xFF_FFFF)
}

/// How a rectangle is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RectPaint {
    Fill(Rgb),
    Stroke { color: Rgb, width: f64 },
}

/// Stroke settings for lines
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub width: f64,
    /// Dash pattern; `None` or `[x, 0]` draws a solid line
    pub dash: Option<Vec<f64>>,
}

impl StrokeStyle {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.dash = Some(dash);
        self
    }

    /// Whether the dash pattern produces visible gaps
    pub fn is_dashed(&self) -> bool {
        self.dash
            .as_ref()
            .map(|d| d.iter().skip(1).step_by(2).any(|gap| *gap > 0.0))
            .unwrap_or(false)
    }
}

/// One positioned run of text in a single font
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
}

/// Filled unit modules of a square code, already in y-up module coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMatrix {
    pub dim: u32,
    pub modules: Vec<(f64, f64)>,
}

/// Handle to a rendered, reusable block of drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// A page-description backend.
///
/// Translate and rotate frames nest and must be closed in LIFO order.
/// Blocks are recorded in their own coordinate frame and can be embedded any
/// number of times on later pages.
pub trait Canvas {
    fn begin_translate(&mut self, x: f64, y: f64);
    fn end_translate(&mut self);

    /// Counter-clockwise rotation in degrees
    fn begin_rotate(&mut self, angle: f64);
    fn end_rotate(&mut self);

    fn draw_rect(&mut self, rect: BoundingBox, paint: RectPaint);
    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle);
    fn write_text(&mut self, run: &GlyphRun);

    /// Place an image with its bottom-left corner at `(x, y)` and the given
    /// rendered size
    fn embed_image(&mut self, image: &ImageAsset, x: f64, y: f64, width: f64, height: f64);
    fn embed_document_page(&mut self, document: &DocumentAsset, page: usize, x: f64, y: f64);
    fn module_matrix(&mut self, matrix: &ModuleMatrix, x: f64, y: f64, module_size: f64);

    fn begin_block(&mut self, width: f64, height: f64);
    fn end_block(&mut self) -> BlockId;
    fn embed_block(&mut self, block: BlockId, x: f64, y: f64);

    fn begin_page(&mut self, size: PageSize);
    fn end_page(&mut self);
}
