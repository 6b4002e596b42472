//! SVG canvas: one standalone SVG document per physical page

use std::collections::BTreeSet;

use base64::Engine;

use crate::assets::{DocumentAsset, ImageAsset};
use crate::layout::{BoundingBox, PageSize, Point};

use super::canvas::{hex_color, BlockId, Canvas, GlyphRun, ModuleMatrix, RectPaint, StrokeStyle};
use super::SvgConfig;

/// Elements collected for an open page or block
#[derive(Debug, Default)]
struct Buffer {
    elements: Vec<String>,
    used_blocks: BTreeSet<BlockId>,
    indent: usize,
    page: Option<PageSize>,
}

#[derive(Debug)]
struct Block {
    elements: Vec<String>,
    used_blocks: BTreeSet<BlockId>,
}

/// Emits SVG markup for every canvas call.
///
/// The page body is wrapped in a y-flip so drawing happens in y-up page
/// coordinates; text and images are flipped back locally so they read
/// upright.
#[derive(Debug)]
pub struct SvgCanvas {
    config: SvgConfig,
    stack: Vec<Buffer>,
    blocks: Vec<Block>,
    pages: Vec<String>,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new(SvgConfig::default())
    }
}

impl SvgCanvas {
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            stack: vec![],
            blocks: vec![],
            pages: vec![],
        }
    }

    /// Finished pages, in output order
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }

    fn prefix(&self) -> &str {
        self.config.id_prefix.as_deref().unwrap_or_default()
    }

    fn num(&self, value: f64) -> String {
        self.config.format_number(value)
    }

    fn block_id(&self, block: BlockId) -> String {
        format!("{}block-{}", self.prefix(), block.0)
    }

    fn newline(&self) -> &'static str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn buffer(&mut self) -> &mut Buffer {
        if self.stack.is_empty() {
            self.stack.push(Buffer::default());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push(&mut self, element: String) {
        let pretty = self.config.pretty_print;
        let buffer = self.buffer();
        let indent = if pretty {
            "  ".repeat(buffer.indent + 1)
        } else {
            String::new()
        };
        buffer.elements.push(format!("{}{}", indent, element));
    }

    fn open_group(&mut self, transform: String) {
        self.push(format!(r#"<g transform="{}">"#, transform));
        self.buffer().indent += 1;
    }

    fn close_group(&mut self) {
        let buffer = self.buffer();
        buffer.indent = buffer.indent.saturating_sub(1);
        self.push("</g>".to_string());
    }

    /// Every block reachable from `roots`, including nested embeds
    fn block_closure(&self, roots: &BTreeSet<BlockId>) -> BTreeSet<BlockId> {
        let mut seen = BTreeSet::new();
        let mut pending: Vec<BlockId> = roots.iter().copied().collect();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(block) = self.blocks.get(id.0) {
                pending.extend(block.used_blocks.iter().copied());
            }
        }
        seen
    }

    fn render_page(&self, size: PageSize, buffer: Buffer) -> String {
        let nl = self.newline();
        let ind = if self.config.pretty_print { "  " } else { "" };
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.num(size.width),
            h = self.num(size.height)
        ));
        svg.push_str(nl);

        let used = self.block_closure(&buffer.used_blocks);
        if !used.is_empty() {
            svg.push_str(&format!("{}<defs>{}", ind, nl));
            for id in used {
                if let Some(block) = self.blocks.get(id.0) {
                    svg.push_str(&format!(r#"{0}{0}<g id="{1}">{2}"#, ind, self.block_id(id), nl));
                    for element in &block.elements {
                        svg.push_str(&format!("{0}{0}{1}{2}", ind, element, nl));
                    }
                    svg.push_str(&format!("{0}{0}</g>{1}", ind, nl));
                }
            }
            svg.push_str(&format!("{}</defs>{}", ind, nl));
        }

        if let Some(color) = self.config.background {
            svg.push_str(&format!(
                r#"{}<rect width="100%" height="100%" fill="{}"/>{}"#,
                ind,
                hex_color(color),
                nl
            ));
        }

        svg.push_str(&format!(
            r#"{}<g class="{}page" transform="matrix(1 0 0 -1 0 {})">{}"#,
            ind,
            self.prefix(),
            self.num(size.height),
            nl
        ));
        for element in &buffer.elements {
            svg.push_str(&format!("{}{}{}", ind, element, nl));
        }
        svg.push_str(&format!("{}</g>{}", ind, nl));
        svg.push_str("</svg>");
        svg
    }
}

impl Canvas for SvgCanvas {
    fn begin_translate(&mut self, x: f64, y: f64) {
        self.open_group(format!("translate({} {})", self.num(x), self.num(y)));
    }

    fn end_translate(&mut self) {
        self.close_group();
    }

    fn begin_rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.to_radians().sin_cos();
        self.open_group(format!(
            "matrix({} {} {} {} 0 0)",
            self.num(cos),
            self.num(sin),
            self.num(-sin),
            self.num(cos)
        ));
    }

    fn end_rotate(&mut self) {
        self.close_group();
    }

    fn draw_rect(&mut self, rect: BoundingBox, paint: RectPaint) {
        let (x, width) = if rect.width < 0.0 {
            (rect.x + rect.width, -rect.width)
        } else {
            (rect.x, rect.width)
        };
        let (y, height) = if rect.height < 0.0 {
            (rect.y + rect.height, -rect.height)
        } else {
            (rect.y, rect.height)
        };
        let paint_attrs = match paint {
            RectPaint::Fill(color) => format!(r#"fill="{}""#, hex_color(color)),
            RectPaint::Stroke { color, width } => format!(
                r#"fill="none" stroke="{}" stroke-width="{}""#,
                hex_color(color),
                self.num(width)
            ),
        };
        self.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            self.num(x),
            self.num(y),
            self.num(width),
            self.num(height),
            paint_attrs
        ));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        let dash = match &stroke.dash {
            Some(pattern) if stroke.is_dashed() => format!(
                r#" stroke-dasharray="{}""#,
                pattern.iter().map(|v| self.num(*v)).collect::<Vec<_>>().join(" ")
            ),
            _ => String::new(),
        };
        self.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}/>"#,
            self.num(from.x),
            self.num(from.y),
            self.num(to.x),
            self.num(to.y),
            hex_color(stroke.color),
            self.num(stroke.width),
            dash
        ));
    }

    fn write_text(&mut self, run: &GlyphRun) {
        if run.text.is_empty() {
            return;
        }
        let weight = if run.bold { r#" font-weight="bold""# } else { "" };
        let style = if run.italic { r#" font-style="italic""# } else { "" };
        let element = format!(
            r#"<text class="{}text" transform="translate({} {}) scale(1 -1)" font-family="{}, {}" font-size="{}"{}{} fill="{}" xml:space="preserve">{}</text>"#,
            self.prefix(),
            self.num(run.x),
            self.num(run.y),
            escape_xml(&run.family),
            self.config.generic_family,
            self.num(run.size),
            weight,
            style,
            hex_color(run.color),
            escape_xml(&run.text)
        );
        self.push(element);
    }

    fn embed_image(&mut self, image: &ImageAsset, x: f64, y: f64, width: f64, height: f64) {
        let transform = format!("translate({} {}) scale(1 -1)", self.num(x), self.num(y + height));
        let element = if self.config.embed_images {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
            format!(
                r#"<image class="{}image" transform="{}" width="{}" height="{}" preserveAspectRatio="none" href="data:{};base64,{}"/>"#,
                self.prefix(),
                transform,
                self.num(width),
                self.num(height),
                image.mime,
                encoded
            )
        } else {
            format!(
                r##"<rect class="{}image" transform="{}" width="{}" height="{}" fill="none" stroke="#999999" stroke-width="0.5"/>"##,
                self.prefix(),
                transform,
                self.num(width),
                self.num(height)
            )
        };
        self.push(element);
    }

    fn embed_document_page(&mut self, document: &DocumentAsset, page: usize, x: f64, y: f64) {
        let element = format!(
            r#"<g class="{}document" data-src="{}" data-page="{}" transform="translate({} {})"/>"#,
            self.prefix(),
            escape_xml(&document.src),
            page,
            self.num(x),
            self.num(y)
        );
        self.push(element);
    }

    fn module_matrix(&mut self, matrix: &ModuleMatrix, x: f64, y: f64, module_size: f64) {
        self.push(format!(
            r##"<g class="{}modules" transform="translate({} {}) scale({})" fill="#000000">"##,
            self.prefix(),
            self.num(x),
            self.num(y),
            self.num(module_size)
        ));
        self.buffer().indent += 1;
        for (mx, my) in &matrix.modules {
            self.push(format!(
                r#"<rect x="{}" y="{}" width="1" height="1"/>"#,
                self.num(*mx),
                self.num(*my)
            ));
        }
        self.close_group();
    }

    fn begin_block(&mut self, _width: f64, _height: f64) {
        self.stack.push(Buffer::default());
    }

    fn end_block(&mut self) -> BlockId {
        let buffer = self.stack.pop().unwrap_or_default();
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            elements: buffer.elements,
            used_blocks: buffer.used_blocks,
        });
        id
    }

    fn embed_block(&mut self, block: BlockId, x: f64, y: f64) {
        let href = self.block_id(block);
        self.push(format!(
            r##"<use href="#{}" transform="translate({} {})"/>"##,
            href,
            self.num(x),
            self.num(y)
        ));
        self.buffer().used_blocks.insert(block);
    }

    fn begin_page(&mut self, size: PageSize) {
        self.stack.push(Buffer {
            page: Some(size),
            ..Buffer::default()
        });
    }

    fn end_page(&mut self) {
        let buffer = self.stack.pop().unwrap_or_default();
        let size = buffer.page.unwrap_or_default();
        let page = self.render_page(size, buffer);
        self.pages.push(page);
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn run(text: &str) -> GlyphRun {
        GlyphRun {
            text: text.to_string(),
            x: 10.0,
            y: 20.0,
            family: "calibri".to_string(),
            size: 12.0,
            bold: true,
            italic: false,
            color: 0xff0000,
        }
    }

    #[test]
    fn test_background_precedes_page_body() {
        let mut canvas = SvgCanvas::new(SvgConfig::new().with_background(0xeeeeee));
        canvas.begin_page(PageSize::letter());
        canvas.end_page();
        let page = &canvas.pages()[0];
        let background = page.find(r##"fill="#eeeeee""##).unwrap();
        assert!(background < page.find("matrix(1 0 0 -1").unwrap());
    }

    #[test]
    fn test_page_has_y_flip_and_size() {
        let mut canvas = SvgCanvas::default();
        canvas.begin_page(PageSize::new(612.0, 792.0));
        canvas.end_page();
        let page = &canvas.pages()[0];
        assert!(page.starts_with("<?xml"));
        assert!(page.contains(r#"viewBox="0 0 612 792""#));
        assert!(page.contains("matrix(1 0 0 -1 0 792)"));
    }

    #[test]
    fn test_text_is_escaped_and_unflipped() {
        let mut canvas = SvgCanvas::default();
        canvas.begin_page(PageSize::letter());
        canvas.write_text(&run("A & B"));
        canvas.end_page();
        let page = &canvas.pages()[0];
        assert!(page.contains("A &amp; B"));
        assert!(page.contains("translate(10 20) scale(1 -1)"));
        assert!(page.contains(r#"font-weight="bold""#));
        assert!(page.contains(r##"fill="#ff0000""##));
    }

    #[test]
    fn test_blocks_emitted_as_defs_on_pages_that_use_them() {
        let mut canvas = SvgCanvas::default();
        canvas.begin_block(100.0, 100.0);
        canvas.draw_rect(BoundingBox::new(0.0, 0.0, 10.0, 10.0), RectPaint::Fill(0));
        let block = canvas.end_block();

        canvas.begin_page(PageSize::letter());
        canvas.embed_block(block, 5.0, 6.0);
        canvas.end_page();
        canvas.begin_page(PageSize::letter());
        canvas.end_page();

        let pages = canvas.into_pages();
        assert!(pages[0].contains(r#"<g id="lg-block-0">"#));
        assert!(pages[0].contains(r##"<use href="#lg-block-0" transform="translate(5 6)"/>"##));
        assert!(!pages[1].contains("<defs>"));
    }

    #[test]
    fn test_transforms_nest_groups() {
        let mut canvas = SvgCanvas::new(SvgConfig::new().with_pretty_print(false));
        canvas.begin_page(PageSize::letter());
        canvas.begin_translate(1.0, 2.0);
        canvas.begin_rotate(90.0);
        canvas.end_rotate();
        canvas.end_translate();
        canvas.end_page();
        let page = &canvas.pages()[0];
        assert!(page.contains(r#"<g transform="translate(1 2)"><g transform="matrix(0 1 -1 0 0 0)"></g></g>"#));
    }

    #[test]
    fn test_image_data_uri() {
        let image = ImageAsset {
            width: 1,
            height: 1,
            mime: "image/png".to_string(),
            bytes: Rc::from(vec![1u8, 2, 3]),
        };
        let mut canvas = SvgCanvas::default();
        canvas.begin_page(PageSize::letter());
        canvas.embed_image(&image, 0.0, 0.0, 50.0, 20.0);
        canvas.end_page();
        assert!(canvas.pages()[0].contains("href=\"data:image/png;base64,AQID\""));
        assert!(canvas.pages()[0].contains("translate(0 20) scale(1 -1)"));
    }
}
