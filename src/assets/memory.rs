//! In-memory asset provider

use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{AssetError, AssetProvider, DocumentAsset, FontFamily, ImageAsset};

/// Serves pre-registered assets by source key.
///
/// Counts every load so callers can check that each distinct source is
/// decoded once per run.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    fonts: FxHashMap<String, FontFamily>,
    images: FxHashMap<String, ImageAsset>,
    documents: FxHashMap<String, DocumentAsset>,
    loads: Cell<usize>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font family under its (lowercased) name
    pub fn with_font(mut self, family: FontFamily) -> Self {
        self.fonts.insert(family.name.clone(), family);
        self
    }

    pub fn with_image(mut self, src: impl Into<String>, image: ImageAsset) -> Self {
        self.images.insert(src.into(), image);
        self
    }

    pub fn with_document(mut self, src: impl Into<String>, bytes: Vec<u8>) -> Self {
        let src = src.into();
        self.documents.insert(
            src.clone(),
            DocumentAsset {
                src,
                mime: "application/pdf".to_string(),
                bytes: Rc::from(bytes),
            },
        );
        self
    }

    /// Total number of successful and failed load requests
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    fn count(&self) {
        self.loads.set(self.loads.get() + 1);
    }
}

impl AssetProvider for MemoryAssets {
    fn load_font(&self, name: &str, _files: &[String]) -> Result<FontFamily, AssetError> {
        self.count();
        self.fonts
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| AssetError::not_found(name))
    }

    fn load_image(&self, src: &str) -> Result<ImageAsset, AssetError> {
        self.count();
        self.images
            .get(src)
            .cloned()
            .ok_or_else(|| AssetError::not_found(src))
    }

    fn load_document(&self, src: &str) -> Result<DocumentAsset, AssetError> {
        self.count();
        self.documents
            .get(src)
            .cloned()
            .ok_or_else(|| AssetError::not_found(src))
    }
}
