use super::*;
use crate::adapt::layout_mode::interior_spacing;
use crate::advice::feedback::InMemoryFeedbackStore;
use crate::advice::policy::{ConfidenceTier, LayoutAdvice, PatternOption};
use crate::config::SpacingConfig;
use crate::document::model::{AxisSizing, FontName, LayoutWrap, NodeDef};
use crate::document::text::StaticFontLoader;

fn doc_from(v: serde_json::Value) -> Document {
    Document::from_def(serde_json::from_value::<NodeDef>(v).unwrap()).unwrap()
}

fn row_doc() -> Document {
    doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [{
            "name": "row", "type": "FRAME", "x": 100, "y": 450, "width": 800, "height": 100,
            "layout": { "mode": "HORIZONTAL", "item_spacing": 20 },
            "children": [
                { "name": "a", "type": "RECTANGLE", "width": 240, "height": 100 },
                { "name": "b", "type": "RECTANGLE", "width": 240, "height": 100 },
                { "name": "c", "type": "RECTANGLE", "width": 240, "height": 100 }
            ]
        }]
    }))
}

fn flow_root_doc() -> Document {
    doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "layout": { "mode": "HORIZONTAL", "item_spacing": 20 },
        "children": [
            { "name": "a", "type": "RECTANGLE", "width": 240, "height": 100 },
            { "name": "b", "type": "RECTANGLE", "width": 240, "height": 100 },
            { "name": "c", "type": "RECTANGLE", "width": 240, "height": 100 }
        ]
    }))
}

fn headline_doc() -> Document {
    doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [{
            "name": "Headline", "type": "TEXT", "x": 100, "y": 100, "width": 400, "height": 60,
            "text": {
                "characters": "Hello",
                "runs": [{ "start": 0, "end": 5, "font": { "family": "Inter", "style": "Bold" },
                           "font_size": 40 }]
            }
        }]
    }))
}

fn font_size(doc: &Document, name: &str) -> f64 {
    let id = doc.find_by_name(name).unwrap();
    match &doc.node(id).unwrap().kind {
        NodeKind::Text(t) => t.runs[0].font_size,
        _ => unreachable!(),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn run(
    orch: &ScalingOrchestrator,
    doc: &mut Document,
    request: &AdaptRequest,
) -> AdaptationOutcome {
    let mut fonts = FontCache::default();
    let mut loader = StaticFontLoader::accept_all();
    orch.adapt(doc, request, &mut fonts, &mut loader)
}

fn vertical_advice(confidence: f64) -> AdviceBundle {
    AdviceBundle {
        layout: Some(LayoutAdvice {
            target_id: "story".to_string(),
            patterns: vec![PatternOption {
                pattern_id: "stacked".to_string(),
                confidence,
                layout_mode: Some(LayoutMode::Vertical),
            }],
            ..LayoutAdvice::default()
        }),
        ..AdviceBundle::default()
    }
}

#[test]
fn compute_scale_per_strategy() {
    let source = Dimensions::new(1000.0, 1000.0);
    let content = Dimensions::new(800.0, 100.0);
    let safe = Dimensions::new(972.0, 1728.0);
    let target = Dimensions::new(1080.0, 1920.0);
    let s = |strategy| compute_scale(strategy, source, content, safe, target, 1.0);
    assert!((s(ScalingStrategy::Proportional) - 0.972).abs() < 1e-12);
    assert!((s(ScalingStrategy::Adaptive) - 1.215).abs() < 1e-12);
    assert!((s(ScalingStrategy::Fill) - 1.92).abs() < 1e-12);
}

#[test]
fn compute_scale_falls_back_on_degenerate_input() {
    let zero = Dimensions::new(0.0, 0.0);
    let d = Dimensions::new(100.0, 100.0);
    assert_eq!(compute_scale(ScalingStrategy::Proportional, zero, d, d, d, 0.75), 0.75);
    assert_eq!(
        compute_scale(ScalingStrategy::Adaptive, d, d, Dimensions::new(0.0, 0.0), d, 0.5),
        0.5
    );
}

#[test]
fn horizontal_stack_rotates_for_vertical_target() {
    let mut doc = row_doc();
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1080.0, 1920.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();

    assert_eq!(m.profile, LayoutProfile::Vertical);
    assert_eq!(m.aspect_class, AspectClass::ExtremeVertical);
    assert_eq!(m.strategy, ScalingStrategy::Adaptive);
    assert!((m.scale - 1.215).abs() < 1e-12);
    assert!((m.scaled_width - 1215.0).abs() < 1e-9);
    assert!(approx(m.safe_inset_x, 54.0) && approx(m.safe_inset_y, 96.0));
    assert_eq!((m.target_width, m.target_height), (1080.0, 1920.0));
    assert!(m.adopted_vertical_variant);

    let row = doc.find_by_name("row").unwrap();
    let layout = *doc.node(row).unwrap().layout().unwrap();
    assert_eq!(layout.mode, LayoutMode::Vertical);
    assert_eq!(layout.wrap, LayoutWrap::NoWrap);

    // Sparse content: 0.55 of the free primary space goes to the two gaps.
    let base = 20.0 * 1.215;
    let extra = 1728.0 - 3.0 * 121.5 - 2.0 * base;
    let expected = interior_spacing(base, extra, 3, 0.55, &SpacingConfig::default());
    assert!(approx(layout.item_spacing, expected));
    assert!(layout.item_spacing > base);

    // The expanded stack fills the safe area.
    let r = doc.bounds(row).unwrap();
    assert!(approx(r.x, 54.0) && approx(r.y, 96.0));
    assert!(approx(r.width, 972.0) && approx(r.height, 1728.0));
    let b = doc.bounds(doc.find_by_name("b").unwrap()).unwrap();
    assert!(approx(b.y, 121.5 + expected));

    assert!(approx(m.horizontal_plan.start, 54.0));
    assert!(approx(m.vertical_plan.start, 899.25));
    assert_eq!(m.reposition.moved, 1);
    assert_eq!(m.reposition.bleeds, 0);
    assert_eq!(
        doc.bounds(doc.root()).unwrap().dimensions(),
        Dimensions::new(1080.0, 1920.0)
    );
}

#[test]
fn loose_row_is_clustered_before_scaling() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [
            { "name": "a", "type": "RECTANGLE", "x": 100, "y": 400, "width": 200, "height": 100 },
            { "name": "b", "type": "RECTANGLE", "x": 330, "y": 400, "width": 200, "height": 100 },
            { "name": "c", "type": "RECTANGLE", "x": 560, "y": 400, "width": 200, "height": 100 }
        ]
    }));
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1080.0, 1920.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    assert_eq!(m.clusters_created, 1);
    let cluster = doc.find_by_name("Cluster 1").unwrap();
    assert_eq!(doc.children(doc.root()), &[cluster]);
    assert!(m.container_plans.iter().any(|p| p.container == cluster && p.adopted_vertical));
}

#[test]
fn clustering_can_be_disabled() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "children": [
            { "name": "a", "type": "RECTANGLE", "x": 100, "y": 400, "width": 200, "height": 100 },
            { "name": "b", "type": "RECTANGLE", "x": 330, "y": 400, "width": 200, "height": 100 }
        ]
    }));
    let cfg = ReframeConfig {
        cluster_loose_elements: false,
        ..ReframeConfig::default()
    };
    let out = run(&ScalingOrchestrator::new(cfg), &mut doc, &AdaptRequest::new(1080.0, 1920.0));
    assert_eq!(out.metrics.unwrap().clusters_created, 0);
    assert!(doc.find_by_name("Cluster 1").is_none());
}

#[test]
fn text_ranges_scale_with_geometry() {
    let mut doc = headline_doc();
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(2000.0, 2000.0));
    assert!(out.success, "{:?}", out.errors);
    let scale = out.metrics.unwrap().scale;
    assert!(approx(scale, 4.5));
    assert!(approx(font_size(&doc, "Headline"), 180.0));
}

#[test]
fn missing_font_is_a_warning_and_geometry_still_scales() {
    let mut doc = headline_doc();
    let mut fonts = FontCache::default();
    let mut loader = StaticFontLoader::with_fonts(Vec::<FontName>::new());
    let out = ScalingOrchestrator::default().adapt(
        &mut doc,
        &AdaptRequest::new(2000.0, 2000.0),
        &mut fonts,
        &mut loader,
    );
    assert!(out.success);
    assert!(out.warnings.iter().any(|w| w.contains("not rescaled")));
    assert_eq!(font_size(&doc, "Headline"), 40.0);
    let headline = doc.bounds(doc.find_by_name("Headline").unwrap()).unwrap();
    assert!(approx(headline.width, 1800.0));
}

#[test]
fn degenerate_target_is_sanitized_with_warning() {
    let mut doc = row_doc();
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(f64::NAN, 500.0));
    assert!(out.success, "{:?}", out.errors);
    assert!(out.warnings.iter().any(|w| w.contains("sanitized")));
    let m = out.metrics.unwrap();
    assert_eq!(m.target_width, 1.0);
    assert!(m.scale.is_finite() && m.scale > 0.0);
}

#[test]
fn high_confidence_advice_overrides_root_flow() {
    let mut doc = flow_root_doc();
    let request = AdaptRequest {
        advice: Some(vertical_advice(0.9)),
        ..AdaptRequest::new(1000.0, 1000.0)
    };
    let out = run(&ScalingOrchestrator::default(), &mut doc, &request);
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    assert_eq!(m.advice.as_ref().unwrap().tier, ConfidenceTier::High);
    let root_plan = m.container_plans.iter().find(|p| p.container == doc.root()).unwrap();
    assert_eq!(root_plan.layout_mode, LayoutMode::Vertical);
    assert_eq!(doc.node(doc.root()).unwrap().layout().unwrap().mode, LayoutMode::Vertical);
}

#[test]
fn medium_confidence_advice_is_flagged() {
    let mut doc = flow_root_doc();
    let request = AdaptRequest {
        advice: Some(vertical_advice(0.7)),
        ..AdaptRequest::new(1000.0, 1000.0)
    };
    let out = run(&ScalingOrchestrator::default(), &mut doc, &request);
    assert!(out.warnings.iter().any(|w| w.contains("review")));
    assert!(out.metrics.unwrap().advice.unwrap().flagged);
}

#[test]
fn rejections_demote_a_pattern() {
    let mut orch =
        ScalingOrchestrator::default().with_feedback(Box::new(InMemoryFeedbackStore::new()));
    for _ in 0..5 {
        orch.record_decision("story", "stacked", false);
    }
    let mut doc = flow_root_doc();
    let request = AdaptRequest {
        advice: Some(vertical_advice(0.9)),
        ..AdaptRequest::new(1000.0, 1000.0)
    };
    let out = run(&orch, &mut doc, &request);
    // 0.9 + (1/7 - 0.5) * 0.2 is below the high threshold.
    assert_eq!(out.metrics.unwrap().advice.unwrap().tier, ConfidenceTier::Medium);
}

#[test]
fn unknown_background_hint_is_reported() {
    let mut doc = row_doc();
    let mut advice = vertical_advice(0.2);
    if let Some(layout) = advice.layout.as_mut() {
        layout.background_node_id = Some("404:1".to_string());
    }
    let request = AdaptRequest {
        advice: Some(advice),
        ..AdaptRequest::new(1080.0, 1920.0)
    };
    let out = run(&ScalingOrchestrator::default(), &mut doc, &request);
    assert!(out.success);
    assert!(out.warnings.iter().any(|w| w.contains("404:1")));
}

fn tall_flow_root_doc() -> Document {
    doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "layout": { "mode": "HORIZONTAL", "item_spacing": 30, "counter_align": "CENTER",
                    "padding": { "left": 110, "right": 110, "top": 300, "bottom": 300 } },
        "children": [
            { "name": "a", "type": "RECTANGLE", "x": 110, "y": 300, "width": 240, "height": 400 },
            { "name": "b", "type": "RECTANGLE", "x": 380, "y": 300, "width": 240, "height": 400 },
            { "name": "c", "type": "RECTANGLE", "x": 650, "y": 300, "width": 240, "height": 400 }
        ]
    }))
}

fn safe_rect(m: &AdaptationMetrics) -> Bounds {
    Bounds::new(
        m.safe_inset_x,
        m.safe_inset_y,
        m.target_width - 2.0 * m.safe_inset_x,
        m.target_height - 2.0 * m.safe_inset_y,
    )
}

fn assert_root_children_inside(doc: &Document, m: &AdaptationMetrics) {
    let frame = Dimensions::new(m.target_width, m.target_height).to_bounds();
    let safe = safe_rect(m);
    for &child in doc.children(doc.root()) {
        let node = doc.node(child).unwrap();
        let b = node.bounds;
        assert!(safe.contains_bounds(b), "{} at {b:?} leaves safe {safe:?}", node.name);
        assert!(frame.contains_bounds(b), "{} at {b:?} leaves the frame", node.name);
    }
}

#[test]
fn flow_root_children_stay_inside_safe_area_on_vertical_target() {
    let mut doc = tall_flow_root_doc();
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1080.0, 1920.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    assert!(m.adopted_vertical_variant);
    assert_eq!(
        doc.node(doc.root()).unwrap().layout().unwrap().mode,
        LayoutMode::Vertical
    );
    assert_eq!(
        doc.bounds(doc.root()).unwrap().dimensions(),
        Dimensions::new(1080.0, 1920.0)
    );

    // Leading offsets report the safe inset plus the scaled source padding.
    assert!(approx(m.horizontal_plan.start, 54.0 + 110.0 * m.scale));
    assert!(approx(m.vertical_plan.start, 96.0 + 300.0 * m.scale));
    let a = doc.bounds(doc.find_by_name("a").unwrap()).unwrap();
    assert!(a.y >= m.vertical_plan.start - 1e-6);

    assert_root_children_inside(&doc, &m);
}

#[test]
fn flow_root_children_stay_inside_safe_area_on_square_target() {
    let mut doc = tall_flow_root_doc();
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1080.0, 1080.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    assert_eq!(m.profile, LayoutProfile::Square);
    assert!(!m.adopted_vertical_variant);
    assert_eq!(
        doc.node(doc.root()).unwrap().layout().unwrap().mode,
        LayoutMode::Horizontal
    );
    assert!(approx(m.horizontal_plan.start, m.safe_inset_x + 110.0 * m.scale));
    assert_root_children_inside(&doc, &m);
}

#[test]
fn overflowing_flow_line_is_shrunk_into_the_safe_area() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "layout": { "mode": "VERTICAL", "item_spacing": 20,
                    "padding": { "top": 50, "bottom": 50 } },
        "children": [
            { "name": "a", "type": "RECTANGLE", "y": 0, "width": 1000, "height": 320 },
            { "name": "b", "type": "RECTANGLE", "y": 340, "width": 1000, "height": 320 },
            { "name": "c", "type": "RECTANGLE", "y": 680, "width": 1000, "height": 320 }
        ]
    }));
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1920.0, 1080.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    assert_eq!(m.reposition.downscaled.len(), 3);
    let factor = m.reposition.downscaled[0].1;
    assert!(factor < 1.0);
    assert!(m.reposition.downscaled.iter().all(|&(_, f)| approx(f, factor)));
    let root = *doc.node(doc.root()).unwrap().layout().unwrap();
    assert!(approx(root.item_spacing, m.container_plans.last().unwrap().item_spacing * factor));
    assert_root_children_inside(&doc, &m);
}

#[test]
fn fixed_stack_in_flow_root_shares_the_main_axis() {
    let mut doc = doc_from(serde_json::json!({
        "type": "FRAME", "width": 1000, "height": 1000,
        "layout": { "mode": "VERTICAL", "item_spacing": 20,
                    "padding": { "left": 40, "right": 40, "top": 40, "bottom": 40 } },
        "children": [
            { "name": "title", "type": "RECTANGLE", "x": 40, "y": 40, "width": 920, "height": 300 },
            { "name": "row", "type": "FRAME", "x": 40, "y": 360, "width": 920, "height": 300,
              "layout": { "mode": "HORIZONTAL", "item_spacing": 40 },
              "children": [
                  { "type": "RECTANGLE", "width": 440, "height": 300 },
                  { "type": "RECTANGLE", "x": 480, "width": 440, "height": 300 }
              ] },
            { "name": "footer", "type": "RECTANGLE",
              "x": 40, "y": 680, "width": 920, "height": 280 }
        ]
    }));
    let out = run(&ScalingOrchestrator::default(), &mut doc, &AdaptRequest::new(1080.0, 1920.0));
    assert!(out.success, "{:?}", out.errors);
    let m = out.metrics.unwrap();
    let safe = safe_rect(&m);

    let row = doc.find_by_name("row").unwrap();
    let row_plan = m.container_plans.iter().find(|p| p.container == row).unwrap();
    assert!(row_plan.adopted_vertical);
    assert!(row_plan.size.height < safe.height);
    assert_eq!(row_plan.primary_sizing, AxisSizing::Auto);

    let footer = doc.bounds(doc.find_by_name("footer").unwrap()).unwrap();
    assert!(footer.bottom() <= safe.bottom() + 1e-6);
    let title = doc.bounds(doc.find_by_name("title").unwrap()).unwrap();
    assert!(title.x >= safe.x - 1e-6);
    assert_root_children_inside(&doc, &m);
}
