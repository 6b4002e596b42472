//! Leaf draw operations, one per definition type

use base64::Engine;
use serde_json::Value;

use crate::layout::{BoundingBox, Point};
use crate::renderer::{ModuleMatrix, RectPaint, StrokeStyle};
use crate::template::{Align, BoxStyle, Definition, DefinitionKind, FontSpec, PaintMode, Scaling};
use crate::typeset::{Paragraph, SpanStyle};
use crate::value::kind_name;

use super::error::RenderError;
use super::procedure::DrawContext;

const DEFAULT_FAMILY: &str = "calibri";
const DEFAULT_SIZE: f64 = 10.0;
const LABEL_SIZE: f64 = 8.0;
const FRAME_STROKE: f64 = 0.5;
/// Side of the square the QR payload is scaled into
const QR_EXTENT: f64 = 87.0;

static NULL: Value = Value::Null;

/// Whether a definition kind has a draw operation
pub fn is_drawable(kind: &DefinitionKind) -> bool {
    !matches!(
        kind,
        DefinitionKind::Section { .. } | DefinitionKind::Group | DefinitionKind::Unknown
    )
}

/// Draw one definition with its (already normalized) record value
pub fn draw(ctx: &mut DrawContext<'_>, def: &Definition, value: &Value) -> Result<(), RenderError> {
    let (x, y) = def.origin();
    match &def.kind {
        DefinitionKind::TextBlock {
            font,
            decimals,
            align,
            style,
            lines,
            line_height,
            check_style,
            width,
            perc,
        } => {
            let entries = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| text_value(def, item, *decimals))
                    .collect::<Result<Vec<_>, _>>()?,
                other => vec![text_value(def, other, *decimals)?],
            };
            let base = span_style(font.as_ref());
            let line_height = line_height.filter(|h| *h != 0.0).unwrap_or(base.size);
            let checklist = style.as_deref() == Some("checklist");
            let mut paragraph = Paragraph::new(base).with_align(align.unwrap_or_default());
            paragraph.width = *width;
            paragraph.perc = *perc;
            let check = check_style.clone().unwrap_or_else(|| BoxStyle {
                mode: Some(PaintMode::Stroke),
                stroke: Some(0),
                fill: None,
                width: Some(FRAME_STROKE),
            });

            let tx = if checklist { 10.0 } else { 0.0 };
            let mut ty = (f64::from(lines.unwrap_or(1)) - 1.0) * line_height;
            translated(ctx, x, y, |ctx| {
                for entry in &entries {
                    print(ctx, entry, tx, ty, &paragraph)?;
                    if checklist {
                        paint_box(
                            ctx,
                            BoundingBox::new(0.0, ty, 7.0, 7.0),
                            check.mode.unwrap_or(PaintMode::Stroke),
                            check.fill,
                            check.stroke,
                            check.width,
                        );
                    }
                    ty -= line_height;
                }
                Ok(())
            })
        }

        DefinitionKind::TextFrame {
            font,
            decimals,
            label,
            width,
            height,
        } => {
            let text = text_value(def, first(value), *decimals)?;
            let frame = LabelledFrame::new(font.as_ref(), label.as_deref(), *width, *height);
            frame.draw(ctx, x, y, &text, true)
        }

        DefinitionKind::TextLine {
            font,
            decimals,
            label,
            width,
            height,
        } => {
            let text = text_value(def, first(value), *decimals)?;
            let frame = LabelledFrame::new(font.as_ref(), label.as_deref(), *width, *height);
            frame.draw(ctx, x, y, &text, false)
        }

        DefinitionKind::Image {
            image,
            scaling,
            noscale,
        } => {
            let name = image.as_deref().unwrap_or_default();
            let asset = ctx
                .resources
                .image(name)
                .cloned()
                .ok_or_else(|| RenderError::missing_image(name))?;
            let (w, h) = def.size.unwrap_or((100.0, 100.0));
            let (iw, ih) = (f64::from(asset.width), f64::from(asset.height));
            let (rw, rh) = if noscale.unwrap_or(false) {
                (iw, ih)
            } else if iw == 0.0 || ih == 0.0 {
                (w, h)
            } else {
                let (mut ws, mut hs) = (w / iw, h / ih);
                if scaling.unwrap_or_default() == Scaling::Fit {
                    let scale = ws.min(hs);
                    ws = scale;
                    hs = scale;
                }
                (ws * iw, hs * ih)
            };
            ctx.canvas.embed_image(&asset, x, y, rw, rh);
            Ok(())
        }

        DefinitionKind::Pdf { pdf, page } => {
            let name = pdf.as_deref().unwrap_or_default();
            let document = ctx
                .resources
                .document(name)
                .cloned()
                .ok_or_else(|| RenderError::missing_document(name))?;
            ctx.canvas
                .embed_document_page(&document, page.unwrap_or(0), x, y);
            Ok(())
        }

        DefinitionKind::Rectangle {
            mode,
            stroke,
            fill,
            width,
        } => {
            let (w, h) = def.size.unwrap_or((100.0, 100.0));
            paint_box(
                ctx,
                BoundingBox::new(x, y, w, h),
                mode.unwrap_or_default(),
                *fill,
                *stroke,
                *width,
            );
            Ok(())
        }

        DefinitionKind::Line {
            dest,
            stroke,
            dash,
            width,
        } => {
            let (dx, dy) = dest.unwrap_or((0.0, 0.0));
            let mut style = StrokeStyle::solid(stroke.unwrap_or(0), line_width(*width));
            style.dash = dash.clone();
            ctx.canvas
                .draw_line(Point::new(x, y), Point::new(dx, dy), &style);
            Ok(())
        }

        DefinitionKind::Grid {
            stroke,
            widths,
            heights,
            width,
        } => {
            let widths = widths.as_deref().unwrap_or_default();
            let heights = heights.as_deref().unwrap_or_default();
            let total_w: f64 = widths.iter().sum();
            let total_h: f64 = heights.iter().sum();
            let style = StrokeStyle::solid(stroke.unwrap_or(0), line_width(*width));
            translated(ctx, x, y, |ctx| {
                for ry in rules(heights) {
                    ctx.canvas
                        .draw_line(Point::new(0.0, ry), Point::new(total_w, ry), &style);
                }
                for rx in rules(widths) {
                    ctx.canvas
                        .draw_line(Point::new(rx, 0.0), Point::new(rx, total_h), &style);
                }
                Ok(())
            })
        }

        DefinitionKind::Qr => {
            let matrix = match value {
                Value::Null => return Ok(()),
                Value::Object(_) => qr_matrix(def, value)?,
                other => {
                    return Err(RenderError::bad_value(
                        &def.qualified_name,
                        format!("expected a code object, found {}", kind_name(other)),
                    ))
                }
            };
            let module_size = QR_EXTENT / f64::from(matrix.dim);
            ctx.canvas.module_matrix(&matrix, x, y, module_size);
            Ok(())
        }

        DefinitionKind::Section { .. } | DefinitionKind::Group | DefinitionKind::Unknown => Ok(()),
    }
}

/// Run `body` inside a translate frame, closing it on every path
fn translated(
    ctx: &mut DrawContext<'_>,
    x: f64,
    y: f64,
    body: impl FnOnce(&mut DrawContext<'_>) -> Result<(), RenderError>,
) -> Result<(), RenderError> {
    ctx.canvas.begin_translate(x, y);
    let result = body(ctx);
    ctx.canvas.end_translate();
    result
}

fn print(
    ctx: &mut DrawContext<'_>,
    text: &str,
    x: f64,
    y: f64,
    paragraph: &Paragraph,
) -> Result<(), RenderError> {
    ctx.typesetter
        .layout_and_draw(&mut *ctx.canvas, text, x, y, paragraph, ctx.resources)
}

fn paint_box(
    ctx: &mut DrawContext<'_>,
    rect: BoundingBox,
    mode: PaintMode,
    fill: Option<u32>,
    stroke: Option<u32>,
    width: Option<f64>,
) {
    if mode.fills() {
        ctx.canvas
            .draw_rect(rect, RectPaint::Fill(fill.unwrap_or(0xFF_FFFF)));
    }
    if mode.strokes() {
        ctx.canvas.draw_rect(
            rect,
            RectPaint::Stroke {
                color: stroke.unwrap_or(0),
                width: width.unwrap_or(FRAME_STROKE),
            },
        );
    }
}

/// Stroke width, where unset or zero means one point
fn line_width(width: Option<f64>) -> f64 {
    width.filter(|w| *w != 0.0).unwrap_or(1.0)
}

/// Rule offsets for a list of track sizes: the leading edge, then every
/// cumulative boundary. No tracks means no rules.
fn rules(tracks: &[f64]) -> Vec<f64> {
    if tracks.is_empty() {
        return Vec::new();
    }
    let mut at = 0.0;
    let mut offsets = vec![at];
    for track in tracks {
        at += track;
        offsets.push(at);
    }
    offsets
}

fn span_style(font: Option<&FontSpec>) -> SpanStyle {
    match font {
        Some(font) => SpanStyle::new(
            font.family_or(DEFAULT_FAMILY),
            font.size.filter(|s| *s != 0.0).unwrap_or(DEFAULT_SIZE),
        )
        .with_bold(font.is_bold())
        .with_italic(font.is_italic())
        .with_underline(font.is_underline())
        .with_color(font.color_or_black()),
        None => SpanStyle::new(DEFAULT_FAMILY, DEFAULT_SIZE),
    }
}

/// Frame and line fields draw only the first entry of an array value
fn first(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    }
}

/// Render a scalar record value as text
fn text_value(def: &Definition, value: &Value, decimals: Option<usize>) -> Result<String, RenderError> {
    match first(value) {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or_default();
            Ok(format!("{:.*}", decimals.unwrap_or(2), n))
        }
        other => Err(RenderError::bad_value(
            &def.qualified_name,
            format!("cannot print {} as text", kind_name(other)),
        )),
    }
}

fn qr_matrix(def: &Definition, value: &Value) -> Result<ModuleMatrix, RenderError> {
    let bad = |message: &str| RenderError::bad_value(&def.qualified_name, message);
    let dim = value
        .get("dim")
        .and_then(Value::as_u64)
        .filter(|d| *d > 0)
        .and_then(|d| u32::try_from(d).ok())
        .ok_or_else(|| bad("code dimension must be a positive integer"))?;
    let data = value
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| bad("code data must be a base64 string"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| bad(&format!("invalid base64 code data: {}", e)))?;
    let modules = bytes
        .chunks_exact(2)
        .map(|pair| (f64::from(pair[0]), f64::from(dim) - f64::from(pair[1])))
        .collect();
    Ok(ModuleMatrix { dim, modules })
}

/// Label plus centered bold value shared by text frames and text lines
struct LabelledFrame {
    label: String,
    label_style: SpanStyle,
    value_style: SpanStyle,
    width: f64,
    height: f64,
}

impl LabelledFrame {
    fn new(font: Option<&FontSpec>, label: Option<&str>, width: Option<f64>, height: Option<f64>) -> Self {
        let base = span_style(font);
        let mut size = font.and_then(|f| f.size).filter(|s| *s != 0.0);
        let mut height = height.filter(|h| *h != 0.0);
        match (size, height) {
            (Some(s), None) => height = Some(s * 1.15),
            (None, Some(h)) => size = Some(h / 1.15),
            _ => {}
        }
        let height = height.unwrap_or(11.5);
        let size = size.unwrap_or(height / 1.15);

        Self {
            label: label.unwrap_or_default().to_string(),
            label_style: base.clone().with_size(LABEL_SIZE),
            value_style: base.with_size(size).with_bold(true),
            width: width.filter(|w| *w != 0.0).unwrap_or(100.0),
            height,
        }
    }

    fn draw(
        &self,
        ctx: &mut DrawContext<'_>,
        x: f64,
        y: f64,
        value: &str,
        boxed: bool,
    ) -> Result<(), RenderError> {
        let (w, h) = (self.width, self.height);
        let label_width = ctx.typesetter.width(&self.label, &self.label_style)?;
        let stroke = StrokeStyle::solid(0, FRAME_STROKE);

        let segments: Vec<(Point, Point)> = if boxed {
            let path = [
                Point::new(x + 2.0, y + h),
                Point::new(x, y + h),
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x + label_width + 3.0, y + h),
            ];
            path.windows(2).map(|p| (p[0], p[1])).collect()
        } else {
            vec![
                (Point::new(x + 2.0, y + h), Point::new(x, y + h)),
                (Point::new(x + w, y + h), Point::new(x + label_width + 3.0, y + h)),
            ]
        };
        for (from, to) in segments {
            ctx.canvas.draw_line(from, to, &stroke);
        }

        print(
            ctx,
            &self.label,
            x + 2.0,
            y + h - 1.5,
            &Paragraph::new(self.label_style.clone()),
        )?;
        let value_paragraph = Paragraph::new(self.value_style.clone())
            .with_align(Align::Center)
            .with_width(w);
        print(ctx, value, x, y + self.value_style.size * 0.2, &value_paragraph)
    }
}
