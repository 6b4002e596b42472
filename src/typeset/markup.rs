//! Inline style markup
//!
//! Text fields may switch style mid-run with `/fs:<directives>;<text>`
//! segments, for example `Total: /fs:b:#ff0000;42/fs:r; units`. Directives
//! are colon separated and apply to a style state that persists into later
//! segments until `r` resets it.

use logos::Logos;

/// Glyphs used for superscript text, in the order of [`SUPERSCRIPT_SOURCE`]
const SUPERSCRIPT_GLYPHS: [char; 25] = [
    'ᵃ', 'ᵇ', 'ᶜ', 'ᵈ', 'ᵉ', 'ᶠ', 'ᵍ', 'ʰ', 'ⁱ', 'ʲ', 'ᵏ', 'ˡ', 'ᵐ', 'ⁿ', 'ᵒ', 'ᵖ', 'ʳ', 'ˢ', 'ᵗ',
    'ᵘ', 'ᵛ', 'ʷ', 'ˣ', 'ʸ', 'ᶻ',
];

/// Lowercase letters with a superscript form (there is none for `q`)
const SUPERSCRIPT_SOURCE: &str = "abcdefghijklmnoprstuvwxyz";

/// Family forced by the superscript directive
pub const SUPERSCRIPT_FAMILY: &str = "calibri";

#[derive(Logos, Debug, Clone, PartialEq)]
enum Token {
    #[token("r")]
    Reset,
    #[token("sup")]
    Superscript,
    #[token("b")]
    Bold,
    #[token("nb")]
    NoBold,
    #[token("i")]
    Italic,
    #[token("bi")]
    #[token("ib")]
    #[token("z")]
    BoldItalic,
    #[token("u")]
    Underline,

    #[regex(r"#[0-9a-fA-F]{1,6}", |lex| u32::from_str_radix(&lex.slice()[1..], 16).ok())]
    Color(u32),

    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Size(f64),

    #[regex(r"_[^:]*", |lex| lex.slice()[1..].to_string())]
    Image(String),
}

/// One style directive inside an `fs:` segment
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Reset,
    Superscript,
    Bold,
    NoBold,
    Italic,
    BoldItalic,
    Underline,
    Color(u32),
    Size(f64),
    Image(String),
    /// Anything that is not one of the above names a font family
    Family(String),
}

impl Directive {
    /// Classify one directive. A directive is a keyword only when a single
    /// token covers all of it; everything else is a family name.
    pub fn classify(raw: &str) -> Directive {
        let mut lex = Token::lexer(raw);
        let token = match lex.next() {
            Some(Ok(token)) if lex.remainder().is_empty() => token,
            _ => return Directive::Family(raw.to_lowercase()),
        };
        match token {
            Token::Reset => Directive::Reset,
            Token::Superscript => Directive::Superscript,
            Token::Bold => Directive::Bold,
            Token::NoBold => Directive::NoBold,
            Token::Italic => Directive::Italic,
            Token::BoldItalic => Directive::BoldItalic,
            Token::Underline => Directive::Underline,
            Token::Color(color) => Directive::Color(color),
            Token::Size(size) => Directive::Size(size),
            Token::Image(name) => Directive::Image(name),
        }
    }
}

/// Resolved style of one span
#[derive(Debug, Clone, PartialEq)]
pub struct SpanStyle {
    /// Lowercased family name
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: u32,
    pub superscript: bool,
}

impl SpanStyle {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into().to_lowercase(),
            size,
            bold: false,
            italic: false,
            underline: false,
            color: 0,
            superscript: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    fn apply(&mut self, directive: Directive, base: &SpanStyle, image: &mut Option<String>) {
        match directive {
            Directive::Reset => *self = base.clone(),
            Directive::Superscript => {
                self.superscript = true;
                self.family = SUPERSCRIPT_FAMILY.to_string();
            }
            Directive::Bold => self.bold = true,
            Directive::NoBold => self.bold = false,
            Directive::Italic => self.italic = true,
            Directive::BoldItalic => {
                self.bold = true;
                self.italic = true;
            }
            Directive::Underline => self.underline = true,
            Directive::Color(color) => self.color = color,
            Directive::Size(size) => self.size = size,
            Directive::Image(name) => *image = Some(name),
            Directive::Family(family) => self.family = family,
        }
    }
}

/// A run of text in one style, optionally preceded by an inline image
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
    /// Name of an image resource drawn before the text
    pub image: Option<String>,
}

/// Map lowercase letters to superscript glyphs; other characters pass through
pub fn to_superscript(text: &str) -> String {
    text.chars()
        .map(|c| {
            SUPERSCRIPT_SOURCE
                .chars()
                .position(|s| s == c)
                .map(|i| SUPERSCRIPT_GLYPHS[i])
                .unwrap_or(c)
        })
        .collect()
}

/// Split text before every `/` that starts an `fs` segment, dropping that
/// slash. A leading empty piece is dropped.
fn split_segments(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices("/fs") {
        pieces.push(&text[start..idx]);
        start = idx + 1;
    }
    pieces.push(&text[start..]);
    if pieces.first().map(|p| p.is_empty()).unwrap_or(false) {
        pieces.remove(0);
    }
    pieces
}

/// Parse markup into styled spans, starting from the paragraph style.
///
/// This is a pure function of its inputs: resource lookup and measuring
/// happen later.
pub fn parse(text: &str, base: &SpanStyle) -> Vec<StyledSpan> {
    let mut state = base.clone();
    split_segments(text)
        .into_iter()
        .map(|piece| {
            let mut image = None;
            let literal = match piece.strip_prefix("fs:") {
                Some(rest) => {
                    let (directives, literal) = rest.split_once(';').unwrap_or((rest, ""));
                    for raw in directives.split(':').filter(|d| !d.is_empty()) {
                        state.apply(Directive::classify(raw), base, &mut image);
                    }
                    literal
                }
                None => piece,
            };
            let text = if state.superscript {
                to_superscript(literal)
            } else {
                literal.to_string()
            };
            StyledSpan {
                text,
                style: state.clone(),
                image,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> SpanStyle {
        SpanStyle::new("arial", 10.0)
    }

    fn texts(spans: &[StyledSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_directive_classification() {
        assert_eq!(Directive::classify("b"), Directive::Bold);
        assert_eq!(Directive::classify("nb"), Directive::NoBold);
        assert_eq!(Directive::classify("ib"), Directive::BoldItalic);
        assert_eq!(Directive::classify("z"), Directive::BoldItalic);
        assert_eq!(Directive::classify("12"), Directive::Size(12.0));
        assert_eq!(Directive::classify("7.5"), Directive::Size(7.5));
        assert_eq!(Directive::classify("#ff0000"), Directive::Color(0xff0000));
        assert_eq!(Directive::classify("_logo"), Directive::Image("logo".into()));
        assert_eq!(Directive::classify("Times"), Directive::Family("times".into()));
        assert_eq!(Directive::classify("bold"), Directive::Family("bold".into()));
        assert_eq!(Directive::classify("12pt"), Directive::Family("12pt".into()));
    }

    #[test]
    fn test_plain_text_is_one_span() {
        let spans = parse("Hello world", &base());
        assert_eq!(texts(&spans), vec!["Hello world"]);
        assert_eq!(spans[0].style, base());
    }

    #[test]
    fn test_style_switches_persist() {
        let spans = parse("Total: /fs:b:#ff0000;42/fs:12; units", &base());
        assert_eq!(texts(&spans), vec!["Total: ", "42", " units"]);
        assert!(spans[1].style.bold);
        assert_eq!(spans[1].style.color, 0xff0000);
        assert!(spans[2].style.bold);
        assert_eq!(spans[2].style.size, 12.0);
    }

    #[test]
    fn test_reset_restores_paragraph_style() {
        let spans = parse("/fs:b:u;a/fs:r;b", &base());
        assert_eq!(texts(&spans), vec!["a", "b"]);
        assert!(spans[0].style.underline);
        assert_eq!(spans[1].style, base());
    }

    #[test]
    fn test_literal_slashes() {
        let spans = parse("a/b /fsx", &base());
        assert_eq!(texts(&spans), vec!["a/b ", "fsx"]);
        assert_eq!(spans[1].style, base());
    }

    #[test]
    fn test_segment_without_semicolon_is_empty() {
        let spans = parse("x/fs:b", &base());
        assert_eq!(texts(&spans), vec!["x", ""]);
        assert!(spans[1].style.bold);
    }

    #[test]
    fn test_empty_directives_ignored() {
        let spans = parse("/fs::b::;x", &base());
        assert_eq!(spans.len(), 1);
        assert!(spans[0].style.bold);
    }

    #[test]
    fn test_superscript() {
        let spans = parse("x/fs:sup;nd q1", &base());
        assert_eq!(spans[1].text, "ⁿᵈ q1");
        assert_eq!(spans[1].style.family, "calibri");
        assert!(spans[1].style.superscript);
    }

    #[test]
    fn test_inline_image_on_segment_only() {
        let spans = parse("/fs:_logo; Acme/fs:b; Inc", &base());
        assert_eq!(spans[0].image.as_deref(), Some("logo"));
        assert_eq!(spans[1].image, None);
    }
}
