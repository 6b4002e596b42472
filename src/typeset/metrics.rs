//! Advance-width measurement with a run-scoped cache

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;

use crate::assets::FontFamily;
use crate::compile::RenderError;

use super::markup::SpanStyle;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WidthKey {
    family: String,
    bold: bool,
    italic: bool,
    size_bits: u64,
    text: String,
}

/// The font families loaded for a run, plus a width cache shared by every
/// template that measures text.
#[derive(Debug, Default)]
pub struct FontSet {
    families: FxHashMap<String, FontFamily>,
    cache: RefCell<FxHashMap<WidthKey, f64>>,
    misses: Cell<usize>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family, replacing any family of the same name
    pub fn insert(&mut self, family: FontFamily) {
        self.cache.borrow_mut().retain(|key, _| key.family != family.name);
        self.families.insert(family.name.clone(), family);
    }

    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.insert(family);
        self
    }

    pub fn get(&self, family: &str) -> Option<&FontFamily> {
        self.families.get(family)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Number of widths computed rather than served from the cache
    pub fn cache_misses(&self) -> usize {
        self.misses.get()
    }

    /// Width of `text` set in `style`, in points
    pub fn width(&self, text: &str, style: &SpanStyle) -> Result<f64, RenderError> {
        let key = WidthKey {
            family: style.family.clone(),
            bold: style.bold,
            italic: style.italic,
            size_bits: style.size.to_bits(),
            text: text.to_string(),
        };
        if let Some(width) = self.cache.borrow().get(&key) {
            return Ok(*width);
        }

        let family = self
            .families
            .get(&style.family)
            .ok_or_else(|| RenderError::missing_font(&style.family))?;
        let face = family.face(style.bold, style.italic);
        let units: f64 = text.chars().map(|c| face.advance(c)).sum();
        let width = units / 1000.0 * style.size;

        self.misses.set(self.misses.get() + 1);
        self.cache.borrow_mut().insert(key, width);
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FontFace;

    fn fonts() -> FontSet {
        FontSet::new().with_family(
            FontFamily::new("Arial", FontFace::uniform(500.0))
                .with_bold(FontFace::uniform(600.0)),
        )
    }

    #[test]
    fn test_width_scales_with_size() {
        let fonts = fonts();
        let style = SpanStyle::new("arial", 10.0);
        assert_eq!(fonts.width("abcd", &style).unwrap(), 20.0);
        assert_eq!(fonts.width("abcd", &style.clone().with_size(20.0)).unwrap(), 40.0);
        assert_eq!(fonts.width("ab", &style.with_bold(true)).unwrap(), 12.0);
    }

    #[test]
    fn test_unknown_code_points_are_zero_width() {
        let fonts = fonts();
        let style = SpanStyle::new("arial", 10.0);
        assert_eq!(fonts.width("aᵃ", &style).unwrap(), 5.0);
    }

    #[test]
    fn test_cache_hits() {
        let fonts = fonts();
        let style = SpanStyle::new("arial", 10.0);
        fonts.width("hello", &style).unwrap();
        fonts.width("hello", &style).unwrap();
        fonts.width("hello", &style.clone().with_bold(true)).unwrap();
        assert_eq!(fonts.cache_misses(), 2);
    }

    #[test]
    fn test_missing_family() {
        let fonts = fonts();
        let err = fonts.width("x", &SpanStyle::new("times", 10.0)).unwrap_err();
        assert_eq!(err, RenderError::missing_font("times"));
    }
}
