use super::*;
use crate::document::model::NodeDef;

fn doc_from(v: serde_json::Value) -> Document {
    Document::from_def(serde_json::from_value::<NodeDef>(v).unwrap()).unwrap()
}

fn ctx(doc: &Document, profile: LayoutProfile, target: Dimensions, safe: Bounds) -> AdaptContext {
    AdaptContext {
        root: doc.root(),
        profile,
        scale: 1.0,
        target,
        safe,
        density: ContentDensity::Normal,
        root_anchor: target.to_bounds(),
        centering_region: safe,
        mode_override: None,
        background_coverage: 0.9,
    }
}

fn stack_doc(mode: &str, align: &str) -> Document {
    doc_from(serde_json::json!({
        "type": "FRAME", "width": 1080, "height": 1920,
        "children": [{
            "name": "stack", "type": "FRAME", "x": 50, "y": 800, "width": 900, "height": 200,
            "layout": { "mode": mode, "item_spacing": 20, "primary_align": align,
                        "padding": { "left": 10, "right": 10, "top": 10, "bottom": 10 } },
            "children": [
                { "name": "a", "type": "RECTANGLE", "width": 200, "height": 100 },
                { "name": "b", "type": "RECTANGLE", "width": 200, "height": 100 },
                { "name": "c", "type": "RECTANGLE", "width": 200, "height": 100 }
            ]
        }]
    }))
}

#[test]
fn vertical_targets_always_adopt_vertical_flow() {
    let horizontal = AutoLayout {
        mode: LayoutMode::Horizontal,
        ..AutoLayout::default()
    };
    assert!(should_adopt_vertical_flow(LayoutProfile::Vertical, &horizontal));
    assert!(!should_adopt_vertical_flow(LayoutProfile::Square, &horizontal));
    assert!(!should_adopt_vertical_flow(LayoutProfile::Horizontal, &horizontal));
    assert!(!should_adopt_vertical_flow(
        LayoutProfile::Vertical,
        &AutoLayout::default()
    ));
}

#[test]
fn spacing_distributes_extra_space_with_caps() {
    let cfg = SpacingConfig::default();
    assert_eq!(interior_spacing(10.0, 40.0, 3, 0.5, &cfg), 20.0);
    assert_eq!(interior_spacing(10.0, 400.0, 1, 0.5, &cfg), 10.0);
    assert_eq!(interior_spacing(0.0, 400.0, 3, 0.5, &cfg), 0.0);
    assert_eq!(interior_spacing(10.0, 0.0, 3, 0.5, &cfg), 10.0);
    // 10 + 200 * 0.5 = 110, damped above 50: 50 + 60 * 0.25 = 65.
    assert_eq!(interior_spacing(10.0, 200.0, 2, 0.5, &cfg), 65.0);
    // Damped value would be 50 + 990 * 0.25 = 297.5, capped at 150.
    assert_eq!(interior_spacing(10.0, 2000.0, 2, 0.5, &cfg), 150.0);
}

#[test]
fn distribution_ratio_favours_sparse_layouts() {
    let cfg = SpacingConfig::default();
    assert_eq!(distribution_ratio(ContentDensity::Sparse, &cfg), 0.55);
    assert_eq!(distribution_ratio(ContentDensity::Normal, &cfg), 0.45);
    assert_eq!(distribution_ratio(ContentDensity::Dense, &cfg), 0.35);
}

#[test]
fn alignment_collapses_only_with_slack() {
    assert_eq!(resolve_primary_align(PrimaryAlign::Center, true, 40.0), PrimaryAlign::Min);
    assert_eq!(
        resolve_primary_align(PrimaryAlign::SpaceBetween, true, 40.0),
        PrimaryAlign::Min
    );
    assert_eq!(
        resolve_primary_align(PrimaryAlign::SpaceBetween, true, 0.0),
        PrimaryAlign::SpaceBetween
    );
    assert_eq!(
        resolve_primary_align(PrimaryAlign::Center, false, 40.0),
        PrimaryAlign::Center
    );
    assert_eq!(resolve_primary_align(PrimaryAlign::Max, true, 40.0), PrimaryAlign::Max);
}

#[test]
fn wrap_and_promotion_rules() {
    assert_eq!(resolve_wrap(LayoutWrap::Wrap, LayoutMode::Vertical), LayoutWrap::NoWrap);
    assert_eq!(resolve_wrap(LayoutWrap::Wrap, LayoutMode::Horizontal), LayoutWrap::Wrap);
    assert!(should_promote_absolute_children(true, true));
    assert!(should_promote_absolute_children(false, false));
    assert!(!should_promote_absolute_children(false, true));
}

#[test]
fn horizontal_stack_rotates_for_vertical_target() {
    let mut doc = stack_doc("HORIZONTAL", "CENTER");
    let target = Dimensions::new(1080.0, 1920.0);
    let safe = Bounds::new(54.0, 96.0, 972.0, 1728.0);
    let c = ctx(&doc, LayoutProfile::Vertical, target, safe);
    let stack = doc.find_by_name("stack").unwrap();
    let plan = plan_container(&doc, stack, &c, &SpacingConfig::default())
        .unwrap()
        .unwrap();

    assert!(plan.adopted_vertical);
    assert_eq!(plan.layout_mode, LayoutMode::Vertical);
    assert_eq!(plan.wrap, LayoutWrap::NoWrap);
    assert_eq!(plan.primary_align, PrimaryAlign::Min);
    assert_eq!(plan.size, Dimensions::new(900.0, 1728.0));

    // avail 1708, content 300, base gaps 40 => extra 1368; 20 + 1368 * 0.45 / 2 = 327.8,
    // damped above 100: 100 + 227.8 * 0.25 = 156.95.
    assert!((plan.item_spacing - 156.95).abs() < 1e-9);
    assert_eq!(plan.vertical.interior, plan.item_spacing);
    assert_eq!(plan.vertical.start, 10.0);
    assert_eq!(plan.horizontal.interior, 0.0);

    apply_plan(&mut doc, &plan, 0.9).unwrap();
    let b = doc.find_by_name("b").unwrap();
    let bb = doc.bounds(b).unwrap();
    assert_eq!(bb.x, 10.0);
    assert!((bb.y - (10.0 + 100.0 + plan.item_spacing)).abs() < 1e-9);
    let layout = *doc.node(stack).unwrap().layout().unwrap();
    assert_eq!(layout.mode, LayoutMode::Vertical);
}

#[test]
fn square_target_keeps_horizontal_and_scales_padding_exactly() {
    let doc = stack_doc("HORIZONTAL", "SPACE_BETWEEN");
    let target = Dimensions::new(1080.0, 1080.0);
    let safe = Bounds::new(54.0, 54.0, 972.0, 972.0);
    let mut c = ctx(&doc, LayoutProfile::Square, target, safe);
    c.scale = 2.0;
    let stack = doc.find_by_name("stack").unwrap();
    let plan = plan_container(&doc, stack, &c, &SpacingConfig::default())
        .unwrap()
        .unwrap();
    assert!(!plan.adopted_vertical);
    assert!(!plan.promote_absolute_children);
    assert_eq!(plan.layout_mode, LayoutMode::Horizontal);
    assert_eq!(plan.primary_align, PrimaryAlign::SpaceBetween);
    assert_eq!(plan.padding, Edges::uniform(20.0));
}

#[test]
fn atomic_and_nested_free_containers_are_skipped() {
    let doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [
            { "name": "Laptop mockup", "type": "FRAME", "width": 400, "height": 300,
              "layout": { "mode": "HORIZONTAL" },
              "children": [{ "type": "RECTANGLE", "width": 10, "height": 10 }] },
            { "name": "loose", "type": "GROUP", "width": 100, "height": 100,
              "children": [{ "type": "RECTANGLE", "width": 10, "height": 10 }] }
        ]
    }));
    let c = ctx(
        &doc,
        LayoutProfile::Vertical,
        Dimensions::new(1080.0, 1920.0),
        Bounds::new(0.0, 0.0, 1080.0, 1920.0),
    );
    let cfg = SpacingConfig::default();
    let mockup = doc.find_by_name("Laptop mockup").unwrap();
    let loose = doc.find_by_name("loose").unwrap();
    assert!(plan_container(&doc, mockup, &c, &cfg).unwrap().is_none());
    assert!(plan_container(&doc, loose, &c, &cfg).unwrap().is_none());
}

#[test]
fn free_root_centers_its_anchor_in_the_safe_area() {
    let doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1080, "height": 1920,
        "children": [{ "type": "TEXT", "x": 100, "y": 100, "width": 200, "height": 50 }]
    }));
    let target = Dimensions::new(1080.0, 1920.0);
    let safe = Bounds::new(54.0, 96.0, 972.0, 1728.0);
    let mut c = ctx(&doc, LayoutProfile::Vertical, target, safe);
    c.root_anchor = Bounds::new(100.0, 200.0, 972.0, 972.0);
    let plan = plan_container(&doc, doc.root(), &c, &SpacingConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(plan.layout_mode, LayoutMode::None);
    assert!(plan.promote_absolute_children);
    assert_eq!(plan.horizontal.start, 54.0);
    assert_eq!(plan.vertical.start, 96.0 + 378.0);
    assert_eq!(plan.content_offset, Vec2::new(-46.0, 274.0));
    assert_eq!(plan.vertical.end, 1920.0 - 474.0 - 972.0);
}

#[test]
fn leaves_cannot_be_planned() {
    let doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 10, "height": 10,
        "children": [{ "name": "t", "type": "TEXT", "width": 5, "height": 5 }]
    }));
    let c = ctx(
        &doc,
        LayoutProfile::Square,
        Dimensions::new(10.0, 10.0),
        Bounds::new(0.0, 0.0, 10.0, 10.0),
    );
    let t = doc.find_by_name("t").unwrap();
    assert!(plan_container(&doc, t, &c, &SpacingConfig::default()).is_err());
}

#[test]
fn hugging_stack_rotates_without_expanding() {
    let doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1080, "height": 1920,
        "children": [{
            "name": "row", "type": "FRAME", "x": 100, "y": 100, "width": 340, "height": 100,
            "layout": { "mode": "HORIZONTAL", "item_spacing": 20,
                        "primary_sizing": "AUTO", "counter_sizing": "AUTO" },
            "children": [
                { "type": "RECTANGLE", "width": 100, "height": 100 },
                { "type": "RECTANGLE", "width": 100, "height": 100 },
                { "type": "RECTANGLE", "width": 100, "height": 100 }
            ]
        }]
    }));
    let c = ctx(
        &doc,
        LayoutProfile::Vertical,
        Dimensions::new(1080.0, 1920.0),
        Bounds::new(54.0, 96.0, 972.0, 1728.0),
    );
    let row = doc.find_by_name("row").unwrap();
    let plan = plan_container(&doc, row, &c, &SpacingConfig::default())
        .unwrap()
        .unwrap();
    assert!(plan.adopted_vertical);
    assert_eq!(plan.item_spacing, 20.0);
    assert_eq!(plan.primary_sizing, AxisSizing::Auto);
    assert_eq!(plan.wrap, LayoutWrap::NoWrap);
}

#[test]
fn flow_root_pads_by_safe_insets() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1080, "height": 1920,
        "layout": { "mode": "VERTICAL", "item_spacing": 10, "primary_sizing": "AUTO",
                    "padding": { "left": 10, "right": 10, "top": 20, "bottom": 20 } },
        "children": [
            { "name": "first", "type": "RECTANGLE", "width": 200, "height": 100 },
            { "name": "second", "type": "RECTANGLE", "width": 200, "height": 100 }
        ]
    }));
    let target = Dimensions::new(1080.0, 1920.0);
    let safe = Bounds::new(54.0, 96.0, 972.0, 1728.0);
    let c = ctx(&doc, LayoutProfile::Vertical, target, safe);
    let plan = plan_container(&doc, doc.root(), &c, &SpacingConfig::default())
        .unwrap()
        .unwrap();

    assert_eq!(
        plan.padding,
        Edges {
            left: 64.0,
            right: 64.0,
            top: 116.0,
            bottom: 116.0
        }
    );
    assert_eq!((plan.horizontal.start, plan.horizontal.end), (64.0, 64.0));
    assert_eq!((plan.vertical.start, plan.vertical.end), (116.0, 116.0));
    assert_eq!(plan.size, target);
    assert_eq!(plan.primary_sizing, AxisSizing::Fixed);
    // Gaps grow into the free safe height and stop at the hard cap.
    assert_eq!(plan.item_spacing, 150.0);

    apply_plan(&mut doc, &plan, 0.9).unwrap();
    assert_eq!(doc.bounds(doc.root()).unwrap().dimensions(), target);
    let first = doc.bounds(doc.find_by_name("first").unwrap()).unwrap();
    let second = doc.bounds(doc.find_by_name("second").unwrap()).unwrap();
    assert_eq!((first.x, first.y), (64.0, 116.0));
    assert_eq!(second.y, 116.0 + 100.0 + 150.0);
    assert!(safe.contains_bounds(first) && safe.contains_bounds(second));
}

#[test]
fn fixed_stack_inside_flow_root_keeps_its_size() {
    let stack = serde_json::json!({
        "name": "row", "type": "FRAME", "width": 920, "height": 300,
        "layout": { "mode": "HORIZONTAL", "item_spacing": 40 },
        "children": [
            { "type": "RECTANGLE", "width": 440, "height": 300 },
            { "type": "RECTANGLE", "width": 440, "height": 300 }
        ]
    });
    let target = Dimensions::new(1080.0, 1080.0);
    let safe = Bounds::new(54.0, 54.0, 972.0, 972.0);
    let cfg = SpacingConfig::default();

    let flow_root = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "layout": { "mode": "VERTICAL" },
        "children": [stack.clone()]
    }));
    let c = ctx(&flow_root, LayoutProfile::Square, target, safe);
    let row = flow_root.find_by_name("row").unwrap();
    let plan = plan_container(&flow_root, row, &c, &cfg).unwrap().unwrap();
    assert_eq!(plan.size, Dimensions::new(920.0, 300.0));

    let free_root = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [stack]
    }));
    let c = ctx(&free_root, LayoutProfile::Square, target, safe);
    let row = free_root.find_by_name("row").unwrap();
    let plan = plan_container(&free_root, row, &c, &cfg).unwrap().unwrap();
    assert_eq!(plan.size, Dimensions::new(972.0, 300.0));
}
