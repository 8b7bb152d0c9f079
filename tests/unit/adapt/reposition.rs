use super::*;
use crate::analysis::profile::LayoutProfile;
use crate::document::model::NodeDef;
use crate::placement::scoring::{GridRegion, score_placement};

fn doc_from(v: serde_json::Value) -> Document {
    Document::from_def(serde_json::from_value::<NodeDef>(v).unwrap()).unwrap()
}

fn ctx(frame: Dimensions, target: Dimensions, safe: Bounds) -> RepositionContext {
    RepositionContext {
        scaled_frame: frame,
        target,
        safe,
        offset: Vec2::ZERO,
        background_coverage: 0.9,
        faces: Vec::new(),
        placement: None,
        scaled_bounds: BTreeMap::new(),
    }
}

#[test]
fn bleed_keeps_ratio_from_the_nearer_edge() {
    let frame = Dimensions::new(1000.0, 1000.0);
    let target = Dimensions::new(2000.0, 500.0);
    // Left-near: 10% of the width from the left edge.
    let (x, _) = reposition_bleed(Bounds::new(100.0, -50.0, 200.0, 200.0), frame, target);
    assert_eq!(x, 200.0);
    // Right-near: overflows the right edge by 10% of the width.
    let (x, y) = reposition_bleed(Bounds::new(900.0, 700.0, 200.0, 400.0), frame, target);
    assert_eq!(x, 2000.0 + 200.0 - 200.0);
    assert_eq!(y, 500.0 + 50.0 - 400.0);
}

#[test]
fn bleed_is_idempotent_for_identical_frames() {
    let frame = Dimensions::new(1080.0, 1350.0);
    for b in [
        Bounds::new(-120.0, 40.0, 400.0, 300.0),
        Bounds::new(900.0, 1200.0, 300.0, 300.0),
        Bounds::new(-33.0, -71.0, 1200.0, 90.0),
    ] {
        let (x, y) = reposition_bleed(b, frame, frame);
        assert!((x - b.x).abs() <= 0.5, "{x} vs {}", b.x);
        assert!((y - b.y).abs() <= 0.5, "{y} vs {}", b.y);
    }
}

#[test]
fn bleed_detection_uses_a_half_pixel_tolerance() {
    let frame = Dimensions::new(100.0, 100.0);
    assert!(!is_hero_bleed(Bounds::new(0.0, 0.0, 100.0, 100.0), frame));
    assert!(!is_hero_bleed(Bounds::new(-0.4, 0.0, 100.0, 100.0), frame));
    assert!(is_hero_bleed(Bounds::new(-1.0, 0.0, 50.0, 50.0), frame));
    assert!(is_hero_bleed(Bounds::new(60.0, 60.0, 50.0, 50.0), frame));
}

#[test]
fn pass_handles_background_bleed_and_clamping() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1080, "height": 1920,
        "children": [
            { "name": "bg", "type": "RECTANGLE", "width": 1000, "height": 1000 },
            { "name": "hero", "type": "RECTANGLE",
              "x": 800, "y": 100, "width": 400, "height": 400 },
            { "name": "logo", "type": "VECTOR", "x": 10, "y": 10, "width": 100, "height": 40 },
            { "name": "hidden", "type": "TEXT", "x": -500, "y": -500, "width": 10, "height": 10,
              "visible": false }
        ]
    }));
    let mut c = ctx(
        Dimensions::new(1000.0, 1000.0),
        Dimensions::new(1080.0, 1920.0),
        Bounds::new(54.0, 96.0, 972.0, 1728.0),
    );
    c.offset = Vec2::new(40.4, 460.0);
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();
    assert_eq!(report.backgrounds, 1);
    assert_eq!(report.bleeds, 1);
    assert_eq!(report.moved, 1);

    let bg = doc.bounds(doc.find_by_name("bg").unwrap()).unwrap();
    assert_eq!(bg, Bounds::new(0.0, 0.0, 1080.0, 1920.0));

    let hero = doc.bounds(doc.find_by_name("hero").unwrap()).unwrap();
    assert_eq!(hero.x, 1080.0 + 216.0 - 400.0);
    assert_eq!(hero.y, 192.0);

    let logo = doc.bounds(doc.find_by_name("logo").unwrap()).unwrap();
    assert_eq!((logo.x, logo.y), (54.0, 470.0));

    let hidden = doc.bounds(doc.find_by_name("hidden").unwrap()).unwrap();
    assert_eq!((hidden.x, hidden.y), (-500.0, -500.0));
}

#[test]
fn oversized_children_are_shrunk_to_the_safe_rect() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [
            { "name": "card", "type": "FRAME", "x": 0, "y": 0, "width": 800, "height": 400,
              "children": [{ "name": "inner", "type": "RECTANGLE", "x": 100, "y": 100,
                             "width": 200, "height": 200 }] }
        ]
    }));
    let c = ctx(
        Dimensions::new(1000.0, 1000.0),
        Dimensions::new(1000.0, 1000.0),
        Bounds::new(100.0, 100.0, 400.0, 800.0),
    );
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();
    let card = doc.find_by_name("card").unwrap();
    assert_eq!(report.downscaled, vec![(card, 0.5)]);
    assert_eq!(doc.bounds(card).unwrap(), Bounds::new(100.0, 100.0, 400.0, 200.0));
    let inner = doc.bounds(doc.find_by_name("inner").unwrap()).unwrap();
    assert_eq!(inner, Bounds::new(50.0, 50.0, 100.0, 100.0));
}

#[test]
fn text_is_nudged_off_faces() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [{ "name": "headline", "type": "TEXT", "x": 300, "y": 300,
                       "width": 200, "height": 60 }]
    }));
    let mut c = ctx(
        Dimensions::new(1000.0, 1000.0),
        Dimensions::new(1000.0, 1000.0),
        Bounds::new(0.0, 0.0, 1000.0, 1000.0),
    );
    c.faces = vec![Bounds::new(250.0, 200.0, 200.0, 150.0)];
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();
    assert_eq!(report.nudged, 1);
    let t = doc.bounds(doc.find_by_name("headline").unwrap()).unwrap();
    assert_eq!(t.overlap_area(c.faces[0]), 0.0);
    assert!(c.safe.contains_bounds(t));
}

#[test]
fn unresolved_collision_falls_back_to_recommended_region() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 300, "height": 300,
        "children": [{ "name": "headline", "type": "TEXT", "x": 50, "y": 50,
                       "width": 100, "height": 40 }]
    }));
    let frame = Dimensions::new(300.0, 300.0);
    let safe = Bounds::new(0.0, 0.0, 300.0, 300.0);
    let mut c = ctx(frame, frame, safe);
    c.faces = vec![Bounds::new(0.0, 0.0, 300.0, 300.0)];
    c.placement = Some(score_placement(LayoutProfile::Vertical, frame, safe, &[], None));
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();
    assert_eq!(report.relocated, 1);
    assert_eq!(
        c.placement.as_ref().unwrap().recommended_region,
        GridRegion::BottomCenter
    );
    let t = doc.bounds(doc.find_by_name("headline").unwrap()).unwrap();
    assert_eq!((t.x, t.y), (100.0, 230.0));
}

#[test]
fn flow_line_is_shrunk_into_the_padded_interior() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 400, "height": 400,
        "layout": { "mode": "VERTICAL", "item_spacing": 20,
                    "padding": { "left": 50, "right": 50, "top": 50, "bottom": 50 } },
        "children": [
            { "name": "a", "type": "RECTANGLE", "width": 100, "height": 100 },
            { "name": "b", "type": "RECTANGLE", "width": 100, "height": 100 },
            { "name": "c", "type": "RECTANGLE", "width": 100, "height": 100 }
        ]
    }));
    let frame = Dimensions::new(400.0, 400.0);
    let safe = Bounds::new(50.0, 50.0, 300.0, 300.0);
    let c = ctx(frame, frame, safe);
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();

    let fit = 300.0 / 340.0;
    assert_eq!(report.moved, 0);
    assert_eq!(report.downscaled.len(), 3);
    assert!(report.downscaled.iter().all(|&(_, f)| (f - fit).abs() < 1e-12));
    let spacing = doc.node(root).unwrap().layout().unwrap().item_spacing;
    assert!((spacing - 20.0 * fit).abs() < 1e-9);

    let last = doc.bounds(doc.find_by_name("c").unwrap()).unwrap();
    assert!((last.bottom() - 350.0).abs() < 1e-9);
    for &child in doc.children(root) {
        assert!(safe.contains_bounds(doc.bounds(child).unwrap()));
    }
}

#[test]
fn fitting_flow_line_is_left_alone() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 400, "height": 400,
        "layout": { "mode": "HORIZONTAL", "item_spacing": 10 },
        "children": [
            { "name": "a", "type": "RECTANGLE", "width": 100, "height": 100 },
            { "name": "b", "type": "RECTANGLE", "width": 100, "height": 100 }
        ]
    }));
    let frame = Dimensions::new(400.0, 400.0);
    let c = ctx(frame, frame, frame.to_bounds());
    let root = doc.root();
    let report = reposition_children(&mut doc, root, &c).unwrap();
    assert!(report.downscaled.is_empty());
    let b = doc.bounds(doc.find_by_name("b").unwrap()).unwrap();
    assert_eq!((b.x, b.width), (110.0, 100.0));
}
