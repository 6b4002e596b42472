//! Typesetting of single lines with inline style markup
//!
//! Text goes through three passes: [`markup::parse`] turns the raw string
//! into styled spans, [`paragraph::layout_line`] measures them and applies
//! alignment, and [`Typesetter::layout_and_draw`] emits canvas calls.

pub mod markup;
pub mod metrics;
pub mod paragraph;

pub use markup::{parse, Directive, SpanStyle, StyledSpan};
pub use metrics::FontSet;
pub use paragraph::{layout_line, LineLayout, Paragraph, PlacedRun, DEFAULT_JUSTIFY_THRESHOLD};

use crate::assets::ResourceSet;
use crate::compile::RenderError;
use crate::layout::Point;
use crate::renderer::{Canvas, GlyphRun, StrokeStyle};

/// Lays out and draws lines of text against the run's fonts
#[derive(Debug, Clone, Copy)]
pub struct Typesetter<'a> {
    fonts: &'a FontSet,
    justify_threshold: f64,
}

impl<'a> Typesetter<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self {
            fonts,
            justify_threshold: DEFAULT_JUSTIFY_THRESHOLD,
        }
    }

    pub fn with_justify_threshold(mut self, perc: f64) -> Self {
        self.justify_threshold = perc;
        self
    }

    pub fn fonts(&self) -> &'a FontSet {
        self.fonts
    }

    /// Measure a plain string in one style
    pub fn width(&self, text: &str, style: &SpanStyle) -> Result<f64, RenderError> {
        self.fonts.width(text, style)
    }

    /// Lay out `text` without drawing it
    pub fn layout(
        &self,
        text: &str,
        paragraph: &Paragraph,
        resources: &ResourceSet,
    ) -> Result<LineLayout, RenderError> {
        let spans = parse(text, &paragraph.style);
        layout_line(spans, paragraph, self.justify_threshold, self.fonts, resources)
    }

    /// Typeset `text` with its baseline origin at `(x, y)`.
    ///
    /// Empty text draws nothing. Each run draws its inline image, then its
    /// glyphs, then its underline.
    pub fn layout_and_draw(
        &self,
        canvas: &mut dyn Canvas,
        text: &str,
        x: f64,
        y: f64,
        paragraph: &Paragraph,
        resources: &ResourceSet,
    ) -> Result<(), RenderError> {
        if text.is_empty() {
            return Ok(());
        }
        let line = self.layout(text, paragraph, resources)?;
        let x = x + line.origin_x;

        for run in &line.runs {
            let mut rx = x + run.x;
            if let (Some(image), Some((w, h))) = (&run.image, run.image_size()) {
                canvas.embed_image(image, rx, y, w, h);
                rx += w;
            }
            if !run.text.is_empty() {
                canvas.write_text(&GlyphRun {
                    text: run.text.clone(),
                    x: rx,
                    y,
                    family: run.style.family.clone(),
                    size: run.style.size,
                    bold: run.style.bold,
                    italic: run.style.italic,
                    color: run.style.color,
                });
            }
            if run.style.underline {
                let thick = run.style.size * 0.05;
                let uy = y - 1.0 - thick / 2.0;
                canvas.draw_line(
                    Point::new(rx, uy),
                    Point::new(x + run.x + run.width, uy),
                    &StrokeStyle::solid(run.style.color, thick),
                );
            }
        }
        Ok(())
    }
}
