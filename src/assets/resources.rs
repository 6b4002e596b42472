//! Per-template view of loaded resources, keyed by resource name

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{DocumentAsset, ImageAsset};

/// Decoded images and documents a template can reference by name.
///
/// Handles are shared with the run-wide cache, so two templates naming the
/// same source point at the same decoded asset.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    images: FxHashMap<String, Rc<ImageAsset>>,
    documents: FxHashMap<String, Rc<DocumentAsset>>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under the same name replace earlier ones
    pub fn insert_image(&mut self, name: impl Into<String>, image: Rc<ImageAsset>) {
        self.images.insert(name.into(), image);
    }

    pub fn insert_document(&mut self, name: impl Into<String>, document: Rc<DocumentAsset>) {
        self.documents.insert(name.into(), document);
    }

    pub fn with_image(mut self, name: impl Into<String>, image: ImageAsset) -> Self {
        self.insert_image(name, Rc::new(image));
        self
    }

    pub fn image(&self, name: &str) -> Option<&Rc<ImageAsset>> {
        self.images.get(name)
    }

    pub fn document(&self, name: &str) -> Option<&Rc<DocumentAsset>> {
        self.documents.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.documents.is_empty()
    }
}
