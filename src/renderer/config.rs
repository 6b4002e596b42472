//! Output options for the SVG canvas

use super::canvas::Rgb;

/// Options controlling the markup [`super::SvgCanvas`] writes per page
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Emit an XML declaration before each page
    pub standalone: bool,

    /// Newlines and indentation between elements
    pub pretty_print: bool,

    /// Prepended to CSS classes and block ids (`lg-` gives `lg-text`, `lg-block-0`)
    pub id_prefix: Option<String>,

    /// Inline image bytes as data URIs. When off, images are drawn as
    /// outlined placeholders of the same size.
    pub embed_images: bool,

    /// Appended to every `font-family` attribute
    pub generic_family: String,

    /// Maximum fraction digits written for coordinates
    pub precision: usize,

    /// Page fill drawn below everything else
    pub background: Option<Rgb>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            id_prefix: Some("lg-".to_string()),
            embed_images: true,
            generic_family: "sans-serif".to_string(),
            precision: 4,
            background: None,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn without_id_prefix(mut self) -> Self {
        self.id_prefix = None;
        self
    }

    pub fn with_embed_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    pub fn with_generic_family(mut self, family: impl Into<String>) -> Self {
        self.generic_family = family.into();
        self
    }

    pub fn with_precision(mut self, digits: usize) -> Self {
        self.precision = digits;
        self
    }

    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    /// Format a coordinate with at most `precision` fraction digits and no
    /// trailing zeros
    pub fn format_number(&self, value: f64) -> String {
        let s = format!("{:.*}", self.precision, value);
        let s = if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.')
        } else {
            s.as_str()
        };
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SvgConfig::default();
        assert!(config.standalone);
        assert!(config.embed_images);
        assert_eq!(config.id_prefix.as_deref(), Some("lg-"));
        assert_eq!(config.precision, 4);
        assert_eq!(config.background, None);
    }

    #[test]
    fn test_builders() {
        let config = SvgConfig::new()
            .with_pretty_print(false)
            .with_id_prefix("doc-")
            .with_precision(1)
            .with_background(0xffffff);
        assert!(!config.pretty_print);
        assert_eq!(config.id_prefix.as_deref(), Some("doc-"));
        assert_eq!(config.background, Some(0xffffff));
        assert_eq!(SvgConfig::new().without_id_prefix().id_prefix, None);
    }

    #[test]
    fn test_format_number() {
        let config = SvgConfig::default();
        assert_eq!(config.format_number(100.0), "100");
        assert_eq!(config.format_number(0.5), "0.5");
        assert_eq!(config.format_number(1.0 / 3.0), "0.3333");
        assert_eq!(config.format_number(-0.00001), "0");
        assert_eq!(config.with_precision(0).format_number(12.6), "13");
    }
}
