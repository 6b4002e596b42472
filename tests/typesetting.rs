//! Text blocks typeset through resolved templates

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use layoutgen::assets::{FontFace, FontFamily, ResourceSet};
use layoutgen::compile::{DrawContext, RenderError, RenderTree};
use layoutgen::layout::{BoundingBox, Point};
use layoutgen::renderer::{DrawOp, RecordingCanvas};
use layoutgen::template::{Defaults, Resolver, TemplateRegistry};
use layoutgen::typeset::{FontSet, Typesetter};

/// Render one text block definition with `value` bound to its field
fn render(definition: Value, value: Value) -> (RecordingCanvas, Result<(), RenderError>) {
    let mut registry = TemplateRegistry::new();
    registry
        .register_value("t", json!({ "definitions": [definition] }))
        .unwrap();
    let defaults = Defaults::new();
    let set = Resolver::new(&registry, &defaults).resolve("t").unwrap();
    let tree = RenderTree::build(Rc::new(set)).unwrap();

    // half an em per glyph: 5 points per character at size 10
    let fonts = FontSet::new().with_family(FontFamily::new("calibri", FontFace::uniform(500.0)));
    let resources = ResourceSet::new();
    let mut canvas = RecordingCanvas::new();
    let result = {
        let mut ctx = DrawContext::new(&mut canvas, Typesetter::new(&fonts), &resources);
        tree.process(&mut ctx, &json!({ "v": value }))
    };
    (canvas, result)
}

/// (text, origin, bold, color) of every text run
fn runs(canvas: &RecordingCanvas) -> Vec<(String, Point, bool, u32)> {
    canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                text,
                origin,
                bold,
                color,
                ..
            } => Some((text.clone(), *origin, *bold, *color)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_markup_switches_style_mid_line() {
    let (canvas, result) = render(
        json!({"name": "total", "field": "v"}),
        json!("Total: /fs:b:#ff0000;42/fs:r; units"),
    );
    result.unwrap();
    assert_eq!(
        runs(&canvas),
        vec![
            ("Total: ".to_string(), Point::new(0.0, 0.0), false, 0),
            ("42".to_string(), Point::new(35.0, 0.0), true, 0xff0000),
            (" units".to_string(), Point::new(45.0, 0.0), false, 0),
        ]
    );
}

#[test]
fn test_right_aligned_ends_at_position() {
    let (canvas, result) = render(
        json!({"name": "amount", "field": "v", "align": "right", "position": [200, 50]}),
        json!("abcd"),
    );
    result.unwrap();
    assert_eq!(runs(&canvas)[0].1, Point::new(180.0, 50.0));
}

#[test]
fn test_centered_within_width() {
    let (canvas, result) = render(
        json!({"name": "title", "field": "v", "align": "center", "width": 100, "position": [10, 0]}),
        json!("ab"),
    );
    result.unwrap();
    assert_eq!(runs(&canvas)[0].1, Point::new(55.0, 0.0));
}

#[test]
fn test_justify_with_template_threshold() {
    let (canvas, result) = render(
        json!({"name": "body", "field": "v", "align": "justify", "width": 100, "perc": 0.2}),
        json!("aa bb cc"),
    );
    result.unwrap();
    let xs: Vec<f64> = runs(&canvas).iter().map(|r| r.1.x).collect();
    assert_eq!(xs, vec![0.0, 45.0, 90.0]);
}

#[test]
fn test_template_font_applies() {
    let (canvas, result) = render(
        json!({"name": "n", "field": "v", "font": {"size": 20, "bold": true, "color": "#0000ff"}}),
        json!("x"),
    );
    result.unwrap();
    match &canvas.ops()[0] {
        DrawOp::Text {
            family,
            size,
            bold,
            color,
            ..
        } => {
            assert_eq!(family, "calibri");
            assert_eq!(*size, 20.0);
            assert!(*bold);
            assert_eq!(*color, 0x0000ff);
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_superscript_suffix() {
    let (canvas, result) = render(json!({"name": "day", "field": "v"}), json!("4/fs:sup;th"));
    result.unwrap();
    assert_eq!(canvas.texts(), vec!["4", "ᵗʰ"]);
}

#[test]
fn test_underlined_text() {
    let (canvas, result) = render(
        json!({"name": "u", "field": "v", "font": {"underline": true}}),
        json!("ab"),
    );
    result.unwrap();
    let line = canvas.ops().iter().find_map(|op| match op {
        DrawOp::Line { from, to, stroke } => Some((*from, *to, stroke.width)),
        _ => None,
    });
    // half the 0.5 point stroke below one point under the baseline
    assert_eq!(
        line,
        Some((Point::new(0.0, -1.25), Point::new(10.0, -1.25), 0.5))
    );
}

#[test]
fn test_array_value_stacks_lines_downward() {
    let (canvas, result) = render(
        json!({"name": "lines", "field": "v", "lines": 3}),
        json!(["one", "two", "three"]),
    );
    result.unwrap();
    let ys: Vec<f64> = runs(&canvas).iter().map(|r| r.1.y).collect();
    assert_eq!(ys, vec![20.0, 10.0, 0.0]);
}

#[test]
fn test_checklist_boxes_each_entry() {
    let (canvas, result) = render(
        json!({"name": "todo", "field": "v", "style": "checklist"}),
        json!(["one", "two"]),
    );
    result.unwrap();
    let origins: Vec<Point> = runs(&canvas).iter().map(|r| r.1).collect();
    assert_eq!(origins, vec![Point::new(10.0, 0.0), Point::new(10.0, -10.0)]);

    let boxes: Vec<BoundingBox> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { bounds, .. } => Some(*bounds),
            _ => None,
        })
        .collect();
    assert_eq!(
        boxes,
        vec![
            BoundingBox::new(0.0, 0.0, 7.0, 7.0),
            BoundingBox::new(0.0, -10.0, 7.0, 7.0),
        ]
    );
}

#[test]
fn test_unloaded_family_fails() {
    let (canvas, result) = render(
        json!({"name": "n", "field": "v", "font": {"family": "garamond"}}),
        json!("x"),
    );
    assert_eq!(result.unwrap_err(), RenderError::missing_font("garamond"));
    assert!(canvas.is_balanced());
}
