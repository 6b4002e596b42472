//! Asset loading: fonts, raster images and embedded documents
//!
//! The engine never touches the filesystem directly. Everything it needs is
//! requested through an [`AssetProvider`] while a batch is being prepared, so
//! the record loop itself performs no I/O.

mod fs;
mod memory;
mod resources;
mod sniff;

use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

pub use fs::FsAssets;
pub use memory::MemoryAssets;
pub use resources::ResourceSet;
pub use sniff::{image_dimensions, mime_from_extension};

/// Number of advance-width entries in a face table (one per 8-bit code point)
pub const WIDTH_TABLE_LEN: usize = 256;

/// Errors raised while loading assets
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset source does not exist
    #[error("asset not found: {src}")]
    NotFound { src: String },

    /// The asset exists but could not be read
    #[error("error reading asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The asset format is not one the engine can place
    #[error("unsupported asset format for {src}: {mime}")]
    UnsupportedFormat { src: String, mime: String },

    /// The asset bytes are not what their format promises
    #[error("malformed asset {src}: {message}")]
    Malformed { src: String, message: String },
}

impl AssetError {
    pub fn not_found(src: impl Into<String>) -> Self {
        Self::NotFound { src: src.into() }
    }

    pub fn malformed(src: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            src: src.into(),
            message: message.into(),
        }
    }

    /// Whether this failure means the source was unreachable rather than bad
    pub fn is_io(&self) -> bool {
        matches!(self, AssetError::NotFound { .. } | AssetError::Io { .. })
    }
}

/// Advance widths of one font face, in thousandths of an em
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    widths: Rc<[f64]>,
}

impl FontFace {
    pub fn new(widths: Vec<f64>) -> Self {
        Self {
            widths: widths.into(),
        }
    }

    /// A face where every code point has the same advance
    pub fn uniform(advance: f64) -> Self {
        Self::new(vec![advance; WIDTH_TABLE_LEN])
    }

    /// Advance of one character; unknown code points advance 0
    pub fn advance(&self, ch: char) -> f64 {
        self.widths.get(ch as usize).copied().unwrap_or(0.0)
    }
}

/// A font family with up to four styled faces.
///
/// Only the regular face is required; missing styles fall back
/// bold-italic -> bold -> regular and italic -> regular.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFamily {
    pub name: String,
    pub regular: FontFace,
    pub bold: Option<FontFace>,
    pub italic: Option<FontFace>,
    pub bold_italic: Option<FontFace>,
}

impl FontFamily {
    pub fn new(name: impl Into<String>, regular: FontFace) -> Self {
        Self {
            name: name.into().to_lowercase(),
            regular,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn with_bold(mut self, face: FontFace) -> Self {
        self.bold = Some(face);
        self
    }

    pub fn with_italic(mut self, face: FontFace) -> Self {
        self.italic = Some(face);
        self
    }

    pub fn with_bold_italic(mut self, face: FontFace) -> Self {
        self.bold_italic = Some(face);
        self
    }

    /// Face for a style, applying the fallback chain
    pub fn face(&self, bold: bool, italic: bool) -> &FontFace {
        let styled = match (bold, italic) {
            (true, true) => self.bold_italic.as_ref().or(self.bold.as_ref()),
            (true, false) => self.bold.as_ref(),
            (false, true) => self.italic.as_ref(),
            (false, false) => None,
        };
        styled.unwrap_or(&self.regular)
    }
}

/// A decoded raster image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    pub mime: String,
    pub bytes: Rc<[u8]>,
}

impl ImageAsset {
    /// Build an image from encoded bytes, reading dimensions from its header
    pub fn from_bytes(src: &str, mime: &str, bytes: Vec<u8>) -> Result<Self, AssetError> {
        if mime != "image/png" && mime != "image/jpeg" {
            return Err(AssetError::UnsupportedFormat {
                src: src.to_string(),
                mime: mime.to_string(),
            });
        }
        let (width, height) = image_dimensions(&bytes)
            .ok_or_else(|| AssetError::malformed(src, "cannot read image dimensions"))?;
        Ok(Self {
            width,
            height,
            mime: mime.to_string(),
            bytes: bytes.into(),
        })
    }
}

/// An embedded multi-page document (PDF)
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAsset {
    pub src: String,
    pub mime: String,
    pub bytes: Rc<[u8]>,
}

/// Source of fonts, images and documents for a run
pub trait AssetProvider {
    /// Load a font family from up to four files: regular, bold, italic,
    /// bold-italic
    fn load_font(&self, name: &str, files: &[String]) -> Result<FontFamily, AssetError>;

    fn load_image(&self, src: &str) -> Result<ImageAsset, AssetError>;

    fn load_document(&self, src: &str) -> Result<DocumentAsset, AssetError>;
}
