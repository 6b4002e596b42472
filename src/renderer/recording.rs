//! Recording canvas: an operation log in absolute coordinates
//!
//! Every draw call is resolved through the current translate/rotate stack so
//! the log shows where things land on the page (or in the block being
//! recorded). Frame balance is tracked so callers can check that every
//! begin has a matching end.

use std::fmt;

use crate::assets::{DocumentAsset, ImageAsset};
use crate::layout::{Affine, BoundingBox, PageSize, Point};

use super::canvas::{BlockId, Canvas, GlyphRun, ModuleMatrix, RectPaint, StrokeStyle};

/// One recorded canvas operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPage {
        width: f64,
        height: f64,
    },
    EndPage,
    BeginBlock {
        id: BlockId,
    },
    EndBlock {
        id: BlockId,
    },
    Rect {
        bounds: BoundingBox,
        paint: RectPaint,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    Text {
        text: String,
        origin: Point,
        family: String,
        size: f64,
        bold: bool,
        italic: bool,
        color: u32,
    },
    Image {
        mime: String,
        origin: Point,
        width: f64,
        height: f64,
    },
    DocumentPage {
        src: String,
        page: usize,
        origin: Point,
    },
    Modules {
        count: usize,
        origin: Point,
        module_size: f64,
    },
    EmbedBlock {
        id: BlockId,
        origin: Point,
    },
}

impl fmt::Display for DrawOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawOp::BeginPage { width, height } => write!(f, "page {}x{}", width, height),
            DrawOp::EndPage => write!(f, "end page"),
            DrawOp::BeginBlock { id } => write!(f, "block {}", id.0),
            DrawOp::EndBlock { id } => write!(f, "end block {}", id.0),
            DrawOp::Rect { bounds, paint } => write!(
                f,
                "rect ({:.2}, {:.2}) {:.2}x{:.2} {:?}",
                bounds.x, bounds.y, bounds.width, bounds.height, paint
            ),
            DrawOp::Line { from, to, .. } => write!(
                f,
                "line ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                from.x, from.y, to.x, to.y
            ),
            DrawOp::Text {
                text, origin, size, ..
            } => write!(
                f,
                "text {:?} at ({:.2}, {:.2}) size {}",
                text, origin.x, origin.y, size
            ),
            DrawOp::Image {
                mime,
                origin,
                width,
                height,
            } => write!(
                f,
                "image {} at ({:.2}, {:.2}) {:.2}x{:.2}",
                mime, origin.x, origin.y, width, height
            ),
            DrawOp::DocumentPage { src, page, origin } => write!(
                f,
                "document {} page {} at ({:.2}, {:.2})",
                src, page, origin.x, origin.y
            ),
            DrawOp::Modules { count, origin, .. } => write!(
                f,
                "{} modules at ({:.2}, {:.2})",
                count, origin.x, origin.y
            ),
            DrawOp::EmbedBlock { id, origin } => write!(
                f,
                "embed block {} at ({:.2}, {:.2})",
                id.0, origin.x, origin.y
            ),
        }
    }
}

/// Kind of frame pushed by a begin call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Translate,
    Rotate,
}

#[derive(Debug, Default)]
struct Scope {
    transforms: Vec<(Frame, Affine)>,
    block: Option<BlockId>,
}

impl Scope {
    fn current(&self) -> Affine {
        self.transforms
            .last()
            .map(|(_, t)| *t)
            .unwrap_or_else(Affine::identity)
    }
}

/// Canvas that records operations instead of drawing them
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    scopes: Vec<Scope>,
    next_block: usize,
    unbalanced: usize,
    begins: usize,
    ends: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Number of begin translate/rotate calls so far
    pub fn frame_begins(&self) -> usize {
        self.begins
    }

    /// Number of end translate/rotate calls so far
    pub fn frame_ends(&self) -> usize {
        self.ends
    }

    /// True when every frame was closed in order and no page or block was
    /// finished with frames still open
    pub fn is_balanced(&self) -> bool {
        self.unbalanced == 0 && self.begins == self.ends && self.depth() == 0
    }

    /// Open translate/rotate frames in the current scope
    pub fn depth(&self) -> usize {
        self.scopes.last().map(|s| s.transforms.len()).unwrap_or(0)
    }

    /// Just the text runs, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count ops matching a predicate
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Number of drawing operations, excluding page and block structure
    pub fn draw_count(&self) -> usize {
        self.count(|op| {
            !matches!(
                op,
                DrawOp::BeginPage { .. }
                    | DrawOp::EndPage
                    | DrawOp::BeginBlock { .. }
                    | DrawOp::EndBlock { .. }
            )
        })
    }

    /// Human-readable trace, one op per line
    pub fn trace(&self) -> String {
        self.ops
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn scope(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn current(&self) -> Affine {
        self.scopes
            .last()
            .map(Scope::current)
            .unwrap_or_else(Affine::identity)
    }

    fn point(&self, x: f64, y: f64) -> Point {
        self.current().transform_point(Point::new(x, y))
    }

    fn push_frame(&mut self, frame: Frame, local: Affine) {
        self.begins += 1;
        let combined = self.current().then(&local);
        self.scope().transforms.push((frame, combined));
    }

    fn pop_frame(&mut self, frame: Frame) {
        self.ends += 1;
        match self.scope().transforms.pop() {
            Some((kind, _)) if kind == frame => {}
            _ => self.unbalanced += 1,
        }
    }

    fn close_scope(&mut self) -> Option<Scope> {
        let scope = self.scopes.pop();
        if scope.as_ref().map(|s| !s.transforms.is_empty()).unwrap_or(false) {
            self.unbalanced += 1;
        }
        scope
    }
}

impl Canvas for RecordingCanvas {
    fn begin_translate(&mut self, x: f64, y: f64) {
        self.push_frame(Frame::Translate, Affine::translate(x, y));
    }

    fn end_translate(&mut self) {
        self.pop_frame(Frame::Translate);
    }

    fn begin_rotate(&mut self, angle: f64) {
        self.push_frame(Frame::Rotate, Affine::rotate(angle));
    }

    fn end_rotate(&mut self) {
        self.pop_frame(Frame::Rotate);
    }

    fn draw_rect(&mut self, rect: BoundingBox, paint: RectPaint) {
        let bounds = self.current().transform_bounds(&rect);
        self.ops.push(DrawOp::Rect { bounds, paint });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        let from = self.point(from.x, from.y);
        let to = self.point(to.x, to.y);
        self.ops.push(DrawOp::Line {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn write_text(&mut self, run: &GlyphRun) {
        let origin = self.point(run.x, run.y);
        self.ops.push(DrawOp::Text {
            text: run.text.clone(),
            origin,
            family: run.family.clone(),
            size: run.size,
            bold: run.bold,
            italic: run.italic,
            color: run.color,
        });
    }

    fn embed_image(&mut self, image: &ImageAsset, x: f64, y: f64, width: f64, height: f64) {
        let origin = self.point(x, y);
        self.ops.push(DrawOp::Image {
            mime: image.mime.clone(),
            origin,
            width,
            height,
        });
    }

    fn embed_document_page(&mut self, document: &DocumentAsset, page: usize, x: f64, y: f64) {
        let origin = self.point(x, y);
        self.ops.push(DrawOp::DocumentPage {
            src: document.src.clone(),
            page,
            origin,
        });
    }

    fn module_matrix(&mut self, matrix: &ModuleMatrix, x: f64, y: f64, module_size: f64) {
        let origin = self.point(x, y);
        self.ops.push(DrawOp::Modules {
            count: matrix.modules.len(),
            origin,
            module_size,
        });
    }

    fn begin_block(&mut self, _width: f64, _height: f64) {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.scopes.push(Scope {
            transforms: vec![],
            block: Some(id),
        });
        self.ops.push(DrawOp::BeginBlock { id });
    }

    fn end_block(&mut self) -> BlockId {
        let id = self
            .close_scope()
            .and_then(|s| s.block)
            .unwrap_or(BlockId(usize::MAX));
        self.ops.push(DrawOp::EndBlock { id });
        id
    }

    fn embed_block(&mut self, block: BlockId, x: f64, y: f64) {
        let origin = self.point(x, y);
        self.ops.push(DrawOp::EmbedBlock { id: block, origin });
    }

    fn begin_page(&mut self, size: PageSize) {
        self.scopes.push(Scope::default());
        self.ops.push(DrawOp::BeginPage {
            width: size.width,
            height: size.height,
        });
    }

    fn end_page(&mut self) {
        self.close_scope();
        self.ops.push(DrawOp::EndPage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_coordinates_through_frames() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_page(PageSize::letter());
        canvas.begin_translate(100.0, 200.0);
        canvas.begin_translate(10.0, 5.0);
        canvas.draw_line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            &StrokeStyle::solid(0, 1.0),
        );
        canvas.end_translate();
        canvas.end_translate();
        canvas.end_page();

        assert!(canvas.is_balanced());
        match &canvas.ops()[1] {
            DrawOp::Line { from, to, .. } => {
                assert_eq!(*from, Point::new(110.0, 205.0));
                assert_eq!(*to, Point::new(120.0, 205.0));
            }
            other => panic!("expected line, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_frames_are_unbalanced() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_page(PageSize::letter());
        canvas.begin_translate(1.0, 1.0);
        canvas.end_rotate();
        canvas.end_page();
        assert!(!canvas.is_balanced());
    }

    #[test]
    fn test_page_closed_with_open_frame_is_unbalanced() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_page(PageSize::letter());
        canvas.begin_translate(1.0, 1.0);
        canvas.end_page();
        assert!(!canvas.is_balanced());
    }

    #[test]
    fn test_blocks_have_own_frame() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_page(PageSize::letter());
        canvas.begin_translate(50.0, 50.0);
        canvas.begin_block(10.0, 10.0);
        canvas.draw_rect(BoundingBox::new(1.0, 2.0, 3.0, 4.0), RectPaint::Fill(0));
        let id = canvas.end_block();
        canvas.embed_block(id, 5.0, 5.0);
        canvas.end_translate();
        canvas.end_page();

        assert_eq!(id, BlockId(0));
        assert!(canvas.ops().contains(&DrawOp::Rect {
            bounds: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            paint: RectPaint::Fill(0),
        }));
        assert!(canvas.ops().contains(&DrawOp::EmbedBlock {
            id,
            origin: Point::new(55.0, 55.0),
        }));
    }
}
