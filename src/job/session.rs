//! Run-scoped state: default tables, loaded fonts and decoded resources

use std::rc::Rc;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::assets::{AssetError, AssetProvider, DocumentAsset, ImageAsset, ResourceSet};
use crate::compile::{DrawContext, RenderError, RenderTree};
use crate::layout::PageSize;
use crate::renderer::Canvas;
use crate::settings::FontSource;
use crate::template::{Defaults, ResourceKind, Resolver, TemplateRegistry, TemplateSet};
use crate::typeset::{FontSet, Typesetter, DEFAULT_JUSTIFY_THRESHOLD};
use crate::JobError;

/// Everything shared by the templates and records of one run.
///
/// Each distinct asset source is requested from the provider once; later
/// templates naming the same source share the decoded asset.
#[derive(Debug)]
pub struct Session {
    defaults: Defaults,
    fonts: FontSet,
    images: FxHashMap<String, Rc<ImageAsset>>,
    documents: FxHashMap<String, Rc<DocumentAsset>>,
    justify_threshold: f64,
}

impl Session {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            fonts: FontSet::new(),
            images: FxHashMap::default(),
            documents: FxHashMap::default(),
            justify_threshold: DEFAULT_JUSTIFY_THRESHOLD,
        }
    }

    pub fn with_justify_threshold(mut self, threshold: f64) -> Self {
        self.justify_threshold = threshold;
        self
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Load the configured font families.
    ///
    /// `optional` families that cannot be loaded are skipped with a warning;
    /// a failure in `required` aborts. A later family replaces an earlier one
    /// of the same name.
    pub fn load_fonts(
        &mut self,
        optional: &[FontSource],
        required: &[FontSource],
        assets: &dyn AssetProvider,
    ) -> Result<(), AssetError> {
        for source in optional {
            match assets.load_font(&source.name, &source.files) {
                Ok(family) => self.fonts.insert(family),
                Err(e) => warn!("skipping font '{}': {}", source.name, e),
            }
        }
        for source in required {
            let family = assets.load_font(&source.name, &source.files)?;
            self.fonts.insert(family);
        }
        info!("loaded {} font families", self.fonts.len());
        Ok(())
    }

    /// Resolve a template and arrange it into a render tree
    pub fn build_tree(&self, registry: &TemplateRegistry, name: &str) -> Result<RenderTree, JobError> {
        let resolver = Resolver::new(registry, &self.defaults);
        let template = resolver.resolve(name)?;
        Ok(RenderTree::build(Rc::new(template))?)
    }

    /// Decode the resources a template declares, reusing earlier loads
    pub fn resources_for(
        &mut self,
        template: &TemplateSet,
        assets: &dyn AssetProvider,
    ) -> Result<ResourceSet, AssetError> {
        let mut resources = ResourceSet::new();
        for spec in &template.resources {
            match spec.kind {
                ResourceKind::Image => {
                    let image = match self.images.get(&spec.src) {
                        Some(image) => Rc::clone(image),
                        None => {
                            debug!("loading image {}", spec.src);
                            let image = Rc::new(assets.load_image(&spec.src)?);
                            self.images.insert(spec.src.clone(), Rc::clone(&image));
                            image
                        }
                    };
                    resources.insert_image(spec.name.clone(), image);
                }
                ResourceKind::Pdf => {
                    let document = match self.documents.get(&spec.src) {
                        Some(document) => Rc::clone(document),
                        None => {
                            debug!("loading document {}", spec.src);
                            let document = Rc::new(assets.load_document(&spec.src)?);
                            self.documents.insert(spec.src.clone(), Rc::clone(&document));
                            document
                        }
                    };
                    resources.insert_document(spec.name.clone(), document);
                }
            }
        }
        Ok(resources)
    }

    /// Build, compile and load resources for one template
    pub fn compile(
        &mut self,
        registry: &TemplateRegistry,
        name: &str,
        assets: &dyn AssetProvider,
    ) -> Result<CompiledTemplate, JobError> {
        let tree = self.build_tree(registry, name)?;
        let resources = self.resources_for(tree.template(), assets)?;
        Ok(CompiledTemplate::new(tree, resources))
    }

    pub fn typesetter(&self) -> Typesetter<'_> {
        Typesetter::new(&self.fonts).with_justify_threshold(self.justify_threshold)
    }
}

/// A template ready to draw records, with its resources bound
#[derive(Debug)]
pub struct CompiledTemplate {
    tree: RenderTree,
    resources: ResourceSet,
}

impl CompiledTemplate {
    pub fn new(tree: RenderTree, resources: ResourceSet) -> Self {
        tree.root().compile();
        Self { tree, resources }
    }

    pub fn template(&self) -> &TemplateSet {
        self.tree.template()
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    /// Declared size, falling back to the page size per axis
    pub fn size(&self, page: PageSize) -> (f64, f64) {
        let template = self.tree.template();
        (
            template.width.unwrap_or(page.width),
            template.height.unwrap_or(page.height),
        )
    }

    /// Draw one record at the canvas's current origin
    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        session: &Session,
        record: &Value,
    ) -> Result<(), RenderError> {
        let mut ctx = DrawContext::new(canvas, session.typesetter(), &self.resources);
        self.tree.process(&mut ctx, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FontFace, FontFamily, MemoryAssets};
    use serde_json::json;

    fn png(width: u32, height: u32) -> ImageAsset {
        ImageAsset {
            width,
            height,
            mime: "image/png".to_string(),
            bytes: Rc::from(Vec::new()),
        }
    }

    fn source(name: &str) -> FontSource {
        FontSource {
            name: name.to_string(),
            files: vec![format!("{}.ttf", name)],
        }
    }

    #[test]
    fn test_optional_font_failure_is_skipped() {
        let assets = MemoryAssets::new().with_font(FontFamily::new("arial", FontFace::uniform(500.0)));
        let mut session = Session::new(Defaults::new());
        session
            .load_fonts(&[source("missing"), source("arial")], &[], &assets)
            .unwrap();
        assert!(session.fonts().contains("arial"));
        assert_eq!(session.fonts().len(), 1);
    }

    #[test]
    fn test_required_font_failure_aborts() {
        let assets = MemoryAssets::new();
        let mut session = Session::new(Defaults::new());
        let err = session.load_fonts(&[], &[source("arial")], &assets).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_shared_source_loaded_once() {
        let assets = MemoryAssets::new().with_image("logo.png", png(10, 10));
        let mut registry = TemplateRegistry::new();
        for name in ["a", "b"] {
            registry
                .register_value(
                    name,
                    json!({
                        "definitions": [{"name": "pic", "type": "image", "image": "logo"}],
                        "resources": [{"type": "image", "name": "logo", "src": "logo.png"}]
                    }),
                )
                .unwrap();
        }

        let mut session = Session::new(Defaults::new());
        let a = session.compile(&registry, "a", &assets).unwrap();
        let b = session.compile(&registry, "b", &assets).unwrap();
        assert_eq!(assets.load_count(), 1);
        assert!(a.tree().root().is_compiled());
        assert_eq!(b.size(PageSize::letter()), (612.0, 792.0));
    }

    #[test]
    fn test_missing_resource_is_io() {
        let mut registry = TemplateRegistry::new();
        registry
            .register_value(
                "a",
                json!({ "resources": [{"type": "pdf", "name": "form", "src": "form.pdf"}] }),
            )
            .unwrap();
        let mut session = Session::new(Defaults::new());
        let err = session
            .compile(&registry, "a", &MemoryAssets::new())
            .unwrap_err();
        assert!(matches!(err, JobError::Asset(ref e) if e.is_io()));
    }
}
