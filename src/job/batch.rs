//! Batch orchestration: prepare a run, then render records into pages

use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::assets::AssetProvider;
use crate::compile::RenderError;
use crate::layout::{CellLayout, Direction, GroupArea, PageSize, Point, Positioner, Strategy};
use crate::renderer::{BlockId, Canvas};
use crate::settings::Settings;
use crate::template::{Defaults, TemplateRegistry, TemplateSet};
use crate::value::{is_truthy, kind_name};
use crate::JobError;

use super::config::{JobConfig, LayoutSpec};
use super::diagnostic::{
    diagnostic_record, diagnostic_template, failure_template, DIAGNOSTIC_TEMPLATE, FAILURE_TEMPLATE,
};
use super::session::{CompiledTemplate, Session};

static NULL: Value = Value::Null;

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub pages: usize,
    /// Slots whose template failed and were replaced by a diagnostic block
    pub isolated_failures: usize,
}

#[derive(Debug)]
enum LayoutKind {
    /// Rendered once during preparation
    Fixed(BlockId),
    /// One block per entry of an array value
    Array {
        area: GroupArea,
        strategy: Strategy,
        direction: Direction,
        rows: usize,
        columns: usize,
    },
    /// One block per record
    Single,
}

#[derive(Debug)]
struct PreparedLayout {
    spec: LayoutSpec,
    template: CompiledTemplate,
    kind: LayoutKind,
}

/// One block placed inside a cell
#[derive(Debug, Clone, Copy)]
struct Placement {
    block: BlockId,
    at: Point,
}

/// A prepared run: compiled layouts, loaded assets and page geometry
#[derive(Debug)]
pub struct Batch {
    session: Session,
    page_size: PageSize,
    cells: CellLayout,
    layouts: Vec<PreparedLayout>,
    diagnostic: CompiledTemplate,
    summary: RunSummary,
}

impl Batch {
    /// Resolve, validate and load everything a run needs.
    ///
    /// Configuration errors are returned before the canvas is touched. The
    /// only canvas calls made here render fixed templates into blocks.
    pub fn prepare(
        config: &JobConfig,
        settings: &Settings,
        assets: &dyn AssetProvider,
        canvas: &mut dyn Canvas,
    ) -> Result<Batch, JobError> {
        let mut defaults = Defaults::new().with_font(&settings.font.to_map());
        if let Some(font) = &config.font {
            defaults = defaults.with_font(font);
        }
        let mut registry = TemplateRegistry::from_definitions(&config.definitions)?;
        registry.register_value(DIAGNOSTIC_TEMPLATE, diagnostic_template())?;

        let page_size = config.page_size();
        let cells = config.cell_layout()?;
        let mut session =
            Session::new(defaults).with_justify_threshold(settings.justify_threshold);

        let trees = config
            .layouts
            .iter()
            .map(|spec| session.build_tree(&registry, spec.template_name()))
            .collect::<Result<Vec<_>, _>>()?;
        let diagnostic_tree = session.build_tree(&registry, DIAGNOSTIC_TEMPLATE)?;

        let fixed: Vec<&TemplateSet> = trees
            .iter()
            .map(|tree| tree.template().as_ref())
            .filter(|template| template.fixed)
            .collect();
        let mut arrays = Vec::with_capacity(trees.len());
        for (spec, tree) in config.layouts.iter().zip(&trees) {
            arrays.push(if spec.array {
                let strategy = match spec.positioning.as_deref() {
                    Some(name) => name.parse()?,
                    None => Strategy::default(),
                };
                let group = tree.template().group.as_deref().unwrap_or(&spec.name);
                let area = GroupArea::discover(fixed.iter().copied(), group)?;
                Some((area, strategy))
            } else {
                None
            });
        }

        session.load_fonts(&settings.fonts, &config.fonts, assets)?;

        let diagnostic_resources = session.resources_for(diagnostic_tree.template(), assets)?;
        let diagnostic = CompiledTemplate::new(diagnostic_tree, diagnostic_resources);

        let mut batch = Batch {
            session,
            page_size,
            cells,
            layouts: Vec::with_capacity(trees.len()),
            diagnostic,
            summary: RunSummary::default(),
        };

        for ((spec, tree), array) in config.layouts.iter().zip(trees).zip(arrays) {
            let resources = batch.session.resources_for(tree.template(), assets)?;
            let template = CompiledTemplate::new(tree, resources);
            let kind = match array {
                Some((area, strategy)) => LayoutKind::Array {
                    area,
                    strategy,
                    direction: Direction::parse(spec.direction.as_deref()),
                    rows: spec.rows.unwrap_or(1),
                    columns: spec.columns.unwrap_or(1),
                },
                None if template.template().fixed => {
                    let (block, failed) =
                        batch.render_block(canvas, &spec.name, &template, &Value::Object(Map::new()));
                    batch.summary.isolated_failures += usize::from(failed);
                    LayoutKind::Fixed(block)
                }
                None => LayoutKind::Single,
            };
            debug!("prepared layout '{}' ({:?})", spec.name, kind);
            batch.layouts.push(PreparedLayout {
                spec: spec.clone(),
                template,
                kind,
            });
        }

        info!(
            "prepared {} layouts on {} cells per page",
            batch.layouts.len(),
            batch.cells.count()
        );
        Ok(batch)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Number of physical pages every record with data produces
    pub fn pages_per_record(&self) -> usize {
        self.layouts
            .iter()
            .map(|layout| layout.spec.page_index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Render one record into its physical pages.
    ///
    /// Returns the number of pages written.
    pub fn render_record(&mut self, record: &Value, canvas: &mut dyn Canvas) -> Result<usize, JobError> {
        let cell_count = self.cells.count();
        let mut pages: Vec<Vec<Vec<Placement>>> =
            vec![vec![Vec::new(); cell_count]; self.pages_per_record()];
        let mut any = false;
        let mut failures = 0;

        for cell in 0..cell_count {
            let entry = if cell_count > 1 { record.get(cell) } else { Some(record) };
            let entry = match entry {
                Some(entry) if is_truthy(entry) => entry,
                _ => continue,
            };
            any = true;

            for layout in &self.layouts {
                let slot = &mut pages[layout.spec.page_index()][cell];
                let value = entry.get(&layout.spec.name);
                match &layout.kind {
                    LayoutKind::Fixed(block) => slot.push(Placement {
                        block: *block,
                        at: Point::default(),
                    }),
                    _ if !value.map(is_truthy).unwrap_or(false) => {}
                    LayoutKind::Array {
                        area,
                        strategy,
                        direction,
                        rows,
                        columns,
                    } => {
                        let items = match value {
                            Some(Value::Array(items)) => items,
                            Some(other) => {
                                let err = RenderError::bad_value(
                                    &layout.spec.name,
                                    format!("expected an array, found {}", kind_name(other)),
                                );
                                warn!("layout '{}' failed: {}", layout.spec.name, err);
                                failures += 1;
                                slot.push(Placement {
                                    block: self.diagnostic_block(canvas, &err),
                                    at: Point::default(),
                                });
                                continue;
                            }
                            None => continue,
                        };
                        let (w, h) = layout.template.size(self.page_size);
                        let positioner = Positioner::new(area.bounds, w, h, items.len())
                            .with_strategy(*strategy)
                            .with_direction(*direction)
                            .with_grid(*rows, *columns);
                        for (index, item) in items.iter().enumerate() {
                            if *item == Value::Bool(false) {
                                continue;
                            }
                            let (block, failed) =
                                self.render_block(canvas, &layout.spec.name, &layout.template, item);
                            failures += usize::from(failed);
                            slot.push(Placement {
                                block,
                                at: positioner.position(index),
                            });
                        }
                    }
                    LayoutKind::Single => {
                        let value = value.unwrap_or(&NULL);
                        let (block, failed) =
                            self.render_block(canvas, &layout.spec.name, &layout.template, value);
                        failures += usize::from(failed);
                        slot.push(Placement {
                            block,
                            at: Point::default(),
                        });
                    }
                }
            }
        }

        self.summary.records += 1;
        self.summary.isolated_failures += failures;
        if !any {
            debug!("record {} has no data, no pages written", self.summary.records);
            return Ok(0);
        }

        for page in &pages {
            canvas.begin_page(self.page_size);
            let result = self.place_cells(canvas, page);
            canvas.end_page();
            result?;
        }
        self.summary.pages += pages.len();
        Ok(pages.len())
    }

    fn place_cells(&self, canvas: &mut dyn Canvas, page: &[Vec<Placement>]) -> Result<(), JobError> {
        for (index, placements) in page.iter().enumerate() {
            if placements.is_empty() {
                continue;
            }
            let cell = self.cells.cell(index, self.page_size)?;
            canvas.begin_translate(cell.x, cell.y);
            for placement in placements {
                canvas.embed_block(placement.block, placement.at.x, placement.at.y);
            }
            canvas.end_translate();
        }
        Ok(())
    }

    /// Render every record in order.
    ///
    /// A fatal error once pages have been written is followed by one
    /// diagnostic page before it is returned.
    pub fn run<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r Value>,
        canvas: &mut dyn Canvas,
    ) -> Result<RunSummary, JobError> {
        for record in records {
            if let Err(e) = self.render_record(record, canvas) {
                error!("record {} failed: {}", self.summary.records, e);
                if self.summary.pages > 0 {
                    let block = self.diagnostic_block(canvas, &e);
                    canvas.begin_page(self.page_size);
                    canvas.embed_block(block, 0.0, 0.0);
                    canvas.end_page();
                    self.summary.pages += 1;
                }
                return Err(e);
            }
        }
        info!(
            "rendered {} records into {} pages ({} isolated failures)",
            self.summary.records, self.summary.pages, self.summary.isolated_failures
        );
        Ok(self.summary)
    }

    /// Render a template into a block, substituting a diagnostic block when
    /// drawing fails. The flag reports whether the substitution happened.
    fn render_block(
        &self,
        canvas: &mut dyn Canvas,
        layout: &str,
        template: &CompiledTemplate,
        record: &Value,
    ) -> (BlockId, bool) {
        let (w, h) = template.size(self.page_size);
        canvas.begin_block(w, h);
        let result = template.render(canvas, &self.session, record);
        let block = canvas.end_block();
        match result {
            Ok(()) => (block, false),
            Err(e) => {
                warn!("layout '{}' failed: {}", layout, e);
                (self.diagnostic_block(canvas, &e), true)
            }
        }
    }

    fn diagnostic_block(&self, canvas: &mut dyn Canvas, err: &dyn std::error::Error) -> BlockId {
        let (w, h) = self.diagnostic.size(self.page_size);
        canvas.begin_block(w, h);
        let record = diagnostic_record("Error", err);
        if let Err(e) = self.diagnostic.render(canvas, &self.session, &record) {
            error!("diagnostic fragment failed: {}", e);
        }
        canvas.end_block()
    }
}

/// Render a standalone 600x400 page describing `err`, for failures that
/// happen before a batch exists
pub fn render_failure_page(
    err: &dyn std::error::Error,
    settings: &Settings,
    assets: &dyn AssetProvider,
    canvas: &mut dyn Canvas,
) -> Result<(), JobError> {
    let mut registry = TemplateRegistry::new();
    registry.register_value(FAILURE_TEMPLATE, failure_template())?;
    let defaults = Defaults::new().with_font(&settings.font.to_map());
    let mut session = Session::new(defaults);
    session.load_fonts(&settings.fonts, &[], assets)?;
    let template = session.compile(&registry, FAILURE_TEMPLATE, assets)?;

    let (w, h) = template.size(PageSize::letter());
    canvas.begin_page(PageSize::new(w, h));
    let result = template.render(canvas, &session, &diagnostic_record("Error", err));
    canvas.end_page();
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FontFace, FontFamily, MemoryAssets};
    use crate::renderer::{DrawOp, RecordingCanvas};
    use crate::settings::FontSource;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn assets() -> MemoryAssets {
        MemoryAssets::new().with_font(FontFamily::new("calibri", FontFace::uniform(500.0)))
    }

    fn settings() -> Settings {
        Settings::empty().with_font_source(FontSource {
            name: "calibri".to_string(),
            files: vec!["calibri.ttf".to_string()],
        })
    }

    fn config(definitions: Value) -> JobConfig {
        match definitions {
            Value::Object(map) => JobConfig::new(map),
            _ => unreachable!(),
        }
    }

    fn text_template() -> Value {
        json!({
            "definitions": [{"name": "title", "type": "textBlock", "field": "title", "position": [10, 20]}]
        })
    }

    #[test]
    fn test_single_layout_one_page_per_record() {
        let config = config(json!({ "card": text_template() })).with_layout(LayoutSpec::new("card"));
        let mut canvas = RecordingCanvas::new();
        let mut batch = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap();

        let records = vec![
            json!({"card": {"title": "one"}}),
            json!({"card": {"title": "two"}}),
        ];
        let summary = batch.run(&records, &mut canvas).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.isolated_failures, 0);
        assert_eq!(canvas.texts(), vec!["one", "two"]);
        assert!(canvas.is_balanced());
    }

    #[test]
    fn test_falsy_entry_skips_layout() {
        let config = config(json!({ "card": text_template(), "back": text_template() }))
            .with_layout(LayoutSpec::new("card"))
            .with_layout(LayoutSpec::new("back"));
        let mut canvas = RecordingCanvas::new();
        let mut batch = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap();

        batch
            .render_record(&json!({"card": {"title": "front"}, "back": ""}), &mut canvas)
            .unwrap();
        assert_eq!(canvas.texts(), vec!["front"]);
    }

    #[test]
    fn test_empty_record_writes_no_pages() {
        let config = config(json!({ "card": text_template() })).with_layout(LayoutSpec::new("card"));
        let mut canvas = RecordingCanvas::new();
        let mut batch = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap();

        assert_eq!(batch.render_record(&Value::Null, &mut canvas).unwrap(), 0);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::BeginPage { .. })), 0);
    }

    #[test]
    fn test_render_failure_isolated_to_slot() {
        let config = config(json!({
            "card": {
                "definitions": [{"name": "pic", "type": "image", "image": "missing"}]
            }
        }))
        .with_layout(LayoutSpec::new("card"));
        let mut canvas = RecordingCanvas::new();
        let mut batch = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap();

        let pages = batch.render_record(&json!({"card": {"x": 1}}), &mut canvas).unwrap();
        assert_eq!(pages, 1);
        assert_eq!(batch.summary().isolated_failures, 1);
        assert_eq!(
            canvas.texts(),
            vec!["Error", "image resource 'missing' not found"]
        );
        assert!(canvas.is_balanced());
    }

    #[test]
    fn test_unknown_positioning_rejected_before_output() {
        let config = config(json!({
            "page": {"fixed": true, "definitions": [{"name": "rows", "type": "group", "size": [100, 100]}]},
            "row": {"group": "rows", "definitions": []}
        }))
        .with_layout(LayoutSpec::new("page"))
        .with_layout(LayoutSpec::new("items").with_template("row").with_array("spiral"));
        let mut canvas = RecordingCanvas::new();
        let err = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap_err();
        assert!(matches!(err, JobError::Layout(_)));
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn test_missing_group_rejected() {
        let config = config(json!({ "row": {"definitions": []} }))
            .with_layout(LayoutSpec::new("items").with_template("row").with_array("linear"));
        let mut canvas = RecordingCanvas::new();
        let err = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn test_pages_per_record_follows_highest_page() {
        let config = config(json!({ "card": text_template() }))
            .with_layout(LayoutSpec::new("card"))
            .with_layout(LayoutSpec::new("back").with_template("card").with_page(3));
        let mut canvas = RecordingCanvas::new();
        let mut batch = Batch::prepare(&config, &settings(), &assets(), &mut canvas).unwrap();
        assert_eq!(batch.pages_per_record(), 3);

        let pages = batch
            .render_record(&json!({"card": {"title": "x"}}), &mut canvas)
            .unwrap();
        assert_eq!(pages, 3);
    }

    #[test]
    fn test_failure_page() {
        let mut canvas = RecordingCanvas::new();
        let err = crate::layout::LayoutError::group_not_found("rows");
        render_failure_page(&err, &settings(), &assets(), &mut canvas).unwrap();
        assert_eq!(
            canvas.ops()[0],
            DrawOp::BeginPage {
                width: 600.0,
                height: 400.0
            }
        );
        assert_eq!(
            canvas.texts(),
            vec!["Error", "group 'rows' not found in any fixed layout"]
        );
    }
}
