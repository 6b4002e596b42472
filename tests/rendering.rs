//! Compiled templates drawn onto the recording canvas

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use layoutgen::assets::{FontFace, FontFamily, ResourceSet};
use layoutgen::compile::{DrawContext, RenderError, RenderTree};
use layoutgen::layout::Point;
use layoutgen::renderer::{DrawOp, RecordingCanvas, RectPaint};
use layoutgen::template::{Defaults, Resolver, TemplateRegistry};
use layoutgen::typeset::{FontSet, Typesetter};

fn tree(template: Value) -> RenderTree {
    let mut registry = TemplateRegistry::new();
    registry.register_value("t", template).unwrap();
    let defaults = Defaults::new();
    let set = Resolver::new(&registry, &defaults).resolve("t").unwrap();
    RenderTree::build(Rc::new(set)).unwrap()
}

fn fonts() -> FontSet {
    FontSet::new().with_family(FontFamily::new("calibri", FontFace::uniform(500.0)))
}

fn draw(tree: &RenderTree, record: &Value) -> (RecordingCanvas, Result<(), RenderError>) {
    let fonts = fonts();
    let resources = ResourceSet::new();
    let mut canvas = RecordingCanvas::new();
    let result = {
        let mut ctx = DrawContext::new(&mut canvas, Typesetter::new(&fonts), &resources);
        tree.process(&mut ctx, record)
    };
    (canvas, result)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_rotated_section_places_children() {
    let tree = tree(json!({
        "definitions": [
            {"name": "s", "type": "section", "position": [100, 200], "rotate": 90},
            {"name": "b", "section": "s", "type": "box", "position": [10, 0], "size": [20, 10]}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({}));
    result.unwrap();

    let bounds = canvas
        .ops()
        .iter()
        .find_map(|op| match op {
            DrawOp::Rect { bounds, .. } => Some(*bounds),
            _ => None,
        })
        .unwrap();
    assert!(approx(bounds.x, 90.0), "x = {}", bounds.x);
    assert!(approx(bounds.y, 210.0), "y = {}", bounds.y);
    assert!(approx(bounds.width, 10.0));
    assert!(approx(bounds.height, 20.0));
    assert!(canvas.is_balanced());
}

#[test]
fn test_implicit_section_translates() {
    let tree = tree(json!({
        "definitions": [
            {"name": "title", "section": "header", "field": "title", "position": [5, 5]}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({"title": "hi"}));
    result.unwrap();
    match &canvas.ops()[0] {
        DrawOp::Text { text, origin, .. } => {
            assert_eq!(text, "hi");
            assert_eq!(*origin, Point::new(5.0, 5.0));
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_false_suppresses_and_zero_draws() {
    let tree = tree(json!({
        "definitions": [{"name": "v", "field": "v"}]
    }));

    let (canvas, result) = draw(&tree, &json!({"v": false}));
    result.unwrap();
    assert_eq!(canvas.draw_count(), 0);

    let (canvas, result) = draw(&tree, &json!({"v": 0}));
    result.unwrap();
    assert_eq!(canvas.texts(), vec!["0.00"]);
}

#[test]
fn test_template_data_fills_missing_fields() {
    let tree = tree(json!({
        "definitions": [{"name": "title", "field": "title"}],
        "data": {"title": "Untitled"}
    }));
    let (canvas, _) = draw(&tree, &json!({}));
    assert_eq!(canvas.texts(), vec!["Untitled"]);

    let (canvas, _) = draw(&tree, &json!({"title": "Report"}));
    assert_eq!(canvas.texts(), vec!["Report"]);
}

#[test]
fn test_failing_draw_keeps_frames_balanced() {
    let tree = tree(json!({
        "definitions": [
            {"name": "s", "type": "section", "position": [10, 10], "rotate": 45},
            {"name": "inner", "section": "s", "type": "section", "position": [5, 5]},
            {"name": "pic", "section": "s.inner", "type": "image", "image": "absent"}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({}));
    assert_eq!(result.unwrap_err(), RenderError::missing_image("absent"));
    // root, section translate and rotate, inner section
    assert_eq!(canvas.frame_begins(), 4);
    assert!(canvas.is_balanced());
}

#[test]
fn test_procedures_compiled_once_across_records() {
    let tree = tree(json!({
        "definitions": [{"name": "v", "field": "v"}]
    }));
    let (_, first) = draw(&tree, &json!({"v": "a"}));
    first.unwrap();
    let compiled = tree.root().compile();
    let (_, second) = draw(&tree, &json!({"v": "b"}));
    second.unwrap();
    assert!(Rc::ptr_eq(&compiled, &tree.root().compile()));
}

#[test]
fn test_text_frame_label_and_value() {
    let tree = tree(json!({
        "definitions": [
            {"name": "total", "type": "textFrame", "field": "total", "label": "TOTAL"}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({"total": 12.5}));
    result.unwrap();
    assert_eq!(canvas.texts(), vec!["TOTAL", "12.50"]);
    assert_eq!(canvas.count(|op| matches!(op, DrawOp::Line { .. })), 5);
}

#[test]
fn test_grid_rules() {
    let tree = tree(json!({
        "definitions": [
            {"name": "table", "type": "grid", "widths": [10, 20], "heights": [5]}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({}));
    result.unwrap();
    let lines: Vec<(Point, Point)> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![
            (Point::new(0.0, 0.0), Point::new(30.0, 0.0)),
            (Point::new(0.0, 5.0), Point::new(30.0, 5.0)),
            (Point::new(0.0, 0.0), Point::new(0.0, 5.0)),
            (Point::new(10.0, 0.0), Point::new(10.0, 5.0)),
            (Point::new(30.0, 0.0), Point::new(30.0, 5.0)),
        ]
    );
}

#[test]
fn test_box_fill_and_stroke() {
    let tree = tree(json!({
        "definitions": [
            {"name": "b", "type": "box", "mode": "fillAndStroke", "fill": "#00ff00",
             "stroke": "#0000ff", "width": 2, "size": [30, 40], "position": [1, 2]}
        ]
    }));
    let (canvas, result) = draw(&tree, &json!({}));
    result.unwrap();
    let paints: Vec<RectPaint> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { paint, .. } => Some(*paint),
            _ => None,
        })
        .collect();
    assert_eq!(
        paints,
        vec![
            RectPaint::Fill(0x00ff00),
            RectPaint::Stroke {
                color: 0x0000ff,
                width: 2.0
            }
        ]
    );
}

#[test]
fn test_qr_modules() {
    let tree = tree(json!({
        "definitions": [{"name": "code", "type": "qr", "field": "code", "position": [3, 4]}]
    }));
    let (canvas, result) = draw(&tree, &json!({"code": {"dim": 2, "data": "AAABAQ=="}}));
    result.unwrap();
    assert_eq!(
        canvas.ops(),
        &[DrawOp::Modules {
            count: 2,
            origin: Point::new(3.0, 4.0),
            module_size: 43.5,
        }]
    );

    let (canvas, result) = draw(&tree, &json!({"code": null}));
    result.unwrap();
    assert_eq!(canvas.draw_count(), 0);

    let (_, result) = draw(&tree, &json!({"code": "not a code"}));
    assert!(matches!(result, Err(RenderError::BadFieldValue { .. })));
}

#[test]
fn test_unknown_type_is_inert() {
    let tree = tree(json!({
        "definitions": [{"name": "w", "type": "widget", "field": "w"}]
    }));
    let (canvas, result) = draw(&tree, &json!({"w": "x"}));
    result.unwrap();
    assert_eq!(canvas.draw_count(), 0);
}
