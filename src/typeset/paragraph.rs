//! Line layout: measuring spans and applying alignment

use std::rc::Rc;

use crate::assets::{ImageAsset, ResourceSet};
use crate::compile::RenderError;
use crate::template::Align;

use super::markup::{SpanStyle, StyledSpan};
use super::metrics::FontSet;

/// Default fraction of the line a justified run must fill before extra
/// spacing is distributed
pub const DEFAULT_JUSTIFY_THRESHOLD: f64 = 0.85;

/// Paragraph-level settings for one typeset line
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub style: SpanStyle,
    pub align: Align,
    /// Box width for centering and justification
    pub width: Option<f64>,
    /// Justify threshold override
    pub perc: Option<f64>,
}

impl Paragraph {
    pub fn new(style: SpanStyle) -> Self {
        Self {
            style,
            align: Align::Left,
            width: None,
            perc: None,
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_perc(mut self, perc: f64) -> Self {
        self.perc = Some(perc);
        self
    }
}

/// A measured run at an offset from the line origin
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub text: String,
    pub style: SpanStyle,
    pub x: f64,
    /// Total advance, including the inline image if any
    pub width: f64,
    pub image: Option<Rc<ImageAsset>>,
}

impl PlacedRun {
    /// Rendered size of the inline image at this run's font size
    pub fn image_size(&self) -> Option<(f64, f64)> {
        self.image.as_ref().and_then(|img| inline_image_size(img, self.style.size))
    }
}

/// Laid-out line: runs relative to `origin_x`
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Horizontal shift applied by alignment
    pub origin_x: f64,
    pub runs: Vec<PlacedRun>,
}

impl LineLayout {
    pub fn total_width(&self) -> f64 {
        self.runs.iter().map(|r| r.width).sum()
    }
}

/// Inline images scale so their height is five points less than the font
/// size
fn inline_image_size(image: &ImageAsset, size: f64) -> Option<(f64, f64)> {
    if image.height == 0 {
        return None;
    }
    let scale = ((size - 5.0) / f64::from(image.height)).max(0.0);
    Some((f64::from(image.width) * scale, f64::from(image.height) * scale))
}

fn measure(
    spans: Vec<StyledSpan>,
    fonts: &FontSet,
    resources: &ResourceSet,
) -> Result<Vec<PlacedRun>, RenderError> {
    let mut runs = Vec::with_capacity(spans.len());
    let mut x = 0.0;
    for span in spans {
        let image = match &span.image {
            Some(name) => {
                let found = resources.image(name).cloned();
                if found.is_none() {
                    log::debug!("inline image '{}' is not a loaded resource", name);
                }
                found
            }
            None => None,
        };
        let mut width = fonts.width(&span.text, &span.style)?;
        if let Some((w, _)) = image.as_ref().and_then(|img| inline_image_size(img, span.style.size)) {
            width += w;
        }
        runs.push(PlacedRun {
            text: span.text,
            style: span.style,
            x,
            width,
            image,
        });
        x += width;
    }
    Ok(runs)
}

/// Re-tokenize runs on spaces and spread the remaining width between words.
///
/// Returns `None` when the text does not fill enough of the line or has
/// fewer than two words, in which case the original positions stay.
fn justify(
    runs: &[PlacedRun],
    width: f64,
    perc: f64,
    fonts: &FontSet,
) -> Result<Option<Vec<PlacedRun>>, RenderError> {
    let mut tokens = Vec::new();
    let mut is_word = Vec::new();
    let mut total = 0.0;
    for run in runs {
        let mut image = run.image.clone();
        for piece in run.text.split(' ').filter(|p| !p.is_empty()) {
            let mut w = fonts.width(piece, &run.style)?;
            let image = image.take();
            if let Some((iw, _)) = image.as_ref().and_then(|img| inline_image_size(img, run.style.size)) {
                w += iw;
            }
            is_word.push(piece.chars().any(|c| c.is_ascii_alphanumeric()));
            tokens.push(PlacedRun {
                text: piece.to_string(),
                style: run.style.clone(),
                x: total,
                width: w,
                image,
            });
            total += w;
        }
        // an image on a run without any token still needs a slot
        if let Some(image) = image {
            let w = inline_image_size(&image, run.style.size).map(|(w, _)| w).unwrap_or(0.0);
            is_word.push(false);
            tokens.push(PlacedRun {
                text: String::new(),
                style: run.style.clone(),
                x: total,
                width: w,
                image: Some(image),
            });
            total += w;
        }
    }

    let words = is_word.iter().filter(|w| **w).count();
    if total <= width * perc || words < 2 {
        return Ok(None);
    }

    let spacing = (width - total) / (words - 1) as f64;
    let mut gaps = 0usize;
    for (i, token) in tokens.iter_mut().enumerate() {
        if i > 0 && is_word[i] {
            gaps += 1;
        }
        token.x += spacing * gaps as f64;
    }
    Ok(Some(tokens))
}

/// Measure spans and apply the paragraph's alignment
pub fn layout_line(
    spans: Vec<StyledSpan>,
    paragraph: &Paragraph,
    default_perc: f64,
    fonts: &FontSet,
    resources: &ResourceSet,
) -> Result<LineLayout, RenderError> {
    let runs = measure(spans, fonts, resources)?;
    let total: f64 = runs.iter().map(|r| r.width).sum();
    let width = paragraph.width.filter(|w| *w != 0.0);

    let layout = match paragraph.align {
        Align::Left => LineLayout { origin_x: 0.0, runs },
        Align::Right => LineLayout {
            origin_x: -total,
            runs,
        },
        Align::Center => LineLayout {
            origin_x: match width {
                Some(w) => w / 2.0 - total / 2.0,
                None => -total / 2.0,
            },
            runs,
        },
        Align::Justify => {
            let perc = paragraph.perc.unwrap_or(default_perc);
            let justified = match width {
                Some(w) => justify(&runs, w, perc, fonts)?,
                None => None,
            };
            LineLayout {
                origin_x: 0.0,
                runs: justified.unwrap_or(runs),
            }
        }
    };
    Ok(layout)
}
