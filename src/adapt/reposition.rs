use std::collections::BTreeMap;

use crate::{
    analysis::content::is_background_like,
    document::flow::layout_flow_children,
    document::model::{Document, NodeId, NodeKind},
    foundation::core::{Bounds, Dimensions, Vec2},
    foundation::error::ReframeResult,
    placement::nudge::nudge_text_away_from_faces,
    placement::scoring::{PlacementScoring, region_bounds},
};

/// Tolerance (px) before an edge overrun counts as bleed.
const BLEED_TOLERANCE: f64 = 0.5;

/// Overshoot (px) still treated as fitting the safe rectangle.
const FIT_EPSILON: f64 = 1e-6;

/// Geometry of one repositioning pass over a container's free children.
#[derive(Clone, Debug)]
pub struct RepositionContext {
    /// Source frame size after uniform scaling.
    pub scaled_frame: Dimensions,
    /// Target frame size.
    pub target: Dimensions,
    /// Clamp rectangle for non-bleed children (safe area, or the whole frame).
    pub safe: Bounds,
    /// Offset added to every scaled position.
    pub offset: Vec2,
    /// Coverage at which a child counts as background.
    pub background_coverage: f64,
    /// Face rectangles in target pixels.
    pub faces: Vec<Bounds>,
    /// Placement scoring over `safe`, used when a nudge cannot clear a face.
    pub placement: Option<PlacementScoring>,
    /// Child bounds right after uniform scaling. Background and bleed detection use these
    /// when present, since flow adaptation may already have resized the child.
    pub scaled_bounds: BTreeMap<NodeId, Bounds>,
}

/// What the pass did.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RepositionReport {
    /// Children offset and clamped.
    pub moved: usize,
    /// Children reset as backgrounds.
    pub backgrounds: usize,
    /// Children re-anchored edge-relative.
    pub bleeds: usize,
    /// Text children moved clear of faces.
    pub nudged: usize,
    /// Text children relocated to the recommended region.
    pub relocated: usize,
    /// Children uniformly shrunk to fit, with their factor.
    pub downscaled: Vec<(NodeId, f64)>,
}

/// `true` when `b` extends past any edge of a `frame`-sized rectangle at the origin.
pub fn is_hero_bleed(b: Bounds, frame: Dimensions) -> bool {
    b.x < -BLEED_TOLERANCE
        || b.y < -BLEED_TOLERANCE
        || b.right() > frame.width + BLEED_TOLERANCE
        || b.bottom() > frame.height + BLEED_TOLERANCE
}

/// Re-anchor on one axis, keeping the ratio of the offset from the nearer edge.
fn anchor_axis(start: f64, len: f64, frame_len: f64, target_len: f64) -> f64 {
    if frame_len <= 0.0 {
        return start;
    }
    let center = start + len / 2.0;
    if center <= frame_len / 2.0 {
        start / frame_len * target_len
    } else {
        let trailing = (frame_len - (start + len)) / frame_len;
        target_len - trailing * target_len - len
    }
}

/// New origin for a bleed element so each axis keeps its edge-relative overflow ratio.
pub fn reposition_bleed(b: Bounds, frame: Dimensions, target: Dimensions) -> (f64, f64) {
    (
        anchor_axis(b.x, b.width, frame.width, target.width).round(),
        anchor_axis(b.y, b.height, frame.height, target.height).round(),
    )
}

/// Position the free children of `container` for the target frame.
///
/// Backgrounds go to the origin at full size. Bleed elements keep their edge ratios and are
/// exempt from clamping. Everything else is offset, rounded and clamped into the safe
/// rectangle, then validated: anything still larger than the safe rectangle is shrunk.
/// Flow children of an auto-layout container are validated against its padded interior.
#[tracing::instrument(skip(doc, ctx))]
pub fn reposition_children(
    doc: &mut Document,
    container: NodeId,
    ctx: &RepositionContext,
) -> ReframeResult<RepositionReport> {
    let mut report = RepositionReport::default();
    fit_flow_children(doc, container, &mut report)?;
    let free: Vec<NodeId> = doc
        .children(container)
        .iter()
        .copied()
        .filter(|&c| !doc.is_flow_child(c))
        .collect();

    let mut clamped = Vec::new();
    for child in free {
        let node = doc.node(child)?;
        if !node.visible {
            continue;
        }
        let b = node.bounds;
        let is_text = matches!(node.kind, NodeKind::Text(_));
        let scaled = ctx.scaled_bounds.get(&child).copied().unwrap_or(b);

        if is_background_like(scaled, ctx.scaled_frame, ctx.background_coverage) {
            doc.set_position(child, 0.0, 0.0)?;
            doc.resize(child, ctx.target.width, ctx.target.height)?;
            report.backgrounds += 1;
            continue;
        }
        if is_hero_bleed(scaled, ctx.scaled_frame) {
            let (x, y) = reposition_bleed(
                Bounds::new(scaled.x, scaled.y, b.width, b.height),
                ctx.scaled_frame,
                ctx.target,
            );
            doc.set_position(child, x, y)?;
            report.bleeds += 1;
            continue;
        }

        let moved = Bounds::new(
            (b.x + ctx.offset.x).round(),
            (b.y + ctx.offset.y).round(),
            b.width,
            b.height,
        )
        .clamp_position_within(ctx.safe);
        doc.set_position(child, moved.x, moved.y)?;
        report.moved += 1;
        clamped.push((child, is_text));
    }

    for (child, is_text) in clamped {
        let b = doc.bounds(child)?;
        if b.width > ctx.safe.width + FIT_EPSILON || b.height > ctx.safe.height + FIT_EPSILON {
            let fit = (ctx.safe.width / b.width).min(ctx.safe.height / b.height);
            doc.scale_subtree(child, fit)?;
            let shrunk = doc.bounds(child)?.clamp_position_within(ctx.safe);
            doc.set_position(child, shrunk.x, shrunk.y)?;
            tracing::debug!(child = ?child, fit, "child shrunk to fit");
            report.downscaled.push((child, fit));
        } else if !ctx.safe.contains_bounds(b) {
            let b = b.clamp_position_within(ctx.safe);
            doc.set_position(child, b.x, b.y)?;
        }
        if is_text && !ctx.faces.is_empty() {
            avoid_faces(doc, child, ctx, &mut report)?;
        }
    }
    Ok(report)
}

/// Shrink the flow children of `container` uniformly, gaps included, when the laid-out
/// line no longer fits the container's padded interior, then lay the line out again.
fn fit_flow_children(
    doc: &mut Document,
    container: NodeId,
    report: &mut RepositionReport,
) -> ReframeResult<()> {
    let Some(layout) = doc.node(container)?.layout().copied() else {
        return Ok(());
    };
    let Some(axis) = layout.mode.primary_axis() else {
        return Ok(());
    };
    let flow: Vec<(NodeId, Bounds)> = doc
        .children(container)
        .iter()
        .copied()
        .filter(|&c| doc.is_flow_child(c))
        .filter_map(|c| doc.node(c).ok().filter(|n| n.visible).map(|n| (c, n.bounds)))
        .collect();
    if flow.is_empty() {
        return Ok(());
    }

    let cross = axis.cross();
    let frame = doc.bounds(container)?;
    let (pad_start, pad_end) = axis.edges_of(layout.padding);
    let (cross_pad_start, cross_pad_end) = cross.edges_of(layout.padding);
    let inner_primary = (axis.len_of(frame) - pad_start - pad_end).max(1.0);
    let inner_cross = (cross.len_of(frame) - cross_pad_start - cross_pad_end).max(1.0);

    let gaps = (flow.len() - 1) as f64;
    let needed_primary = flow.iter().map(|(_, b)| axis.len_of(*b)).sum::<f64>()
        + layout.item_spacing.max(0.0) * gaps;
    let needed_cross = flow
        .iter()
        .map(|(_, b)| cross.len_of(*b))
        .fold(0.0, f64::max);
    let fit = fit_factor(needed_primary, inner_primary).min(fit_factor(needed_cross, inner_cross));

    if fit < 1.0 {
        for &(child, _) in &flow {
            doc.scale_subtree(child, fit)?;
            report.downscaled.push((child, fit));
        }
        let mut shrunk = layout;
        shrunk.item_spacing = layout.item_spacing * fit;
        doc.set_layout(container, shrunk)?;
        tracing::debug!(container = ?container, fit, axis = ?axis, "flow line shrunk to fit");
    }
    layout_flow_children(doc, container)
}

fn fit_factor(needed: f64, available: f64) -> f64 {
    if needed > available + FIT_EPSILON && needed > 0.0 {
        available / needed
    } else {
        1.0
    }
}

fn avoid_faces(
    doc: &mut Document,
    child: NodeId,
    ctx: &RepositionContext,
    report: &mut RepositionReport,
) -> ReframeResult<()> {
    let b = doc.bounds(child)?;
    let Some(result) = nudge_text_away_from_faces(b, &ctx.faces, ctx.safe) else {
        return Ok(());
    };
    if result.resolved() {
        doc.set_position(child, result.bounds.x, result.bounds.y)?;
        report.nudged += 1;
        return Ok(());
    }
    if let Some(scoring) = &ctx.placement {
        let cell = region_bounds(ctx.safe, scoring.recommended_region);
        let c = cell.center();
        let target = Bounds::new(c.x - b.width / 2.0, c.y - b.height / 2.0, b.width, b.height)
            .clamp_position_within(ctx.safe);
        doc.set_position(child, target.x, target.y)?;
        tracing::debug!(
            child = ?child,
            region = ?scoring.recommended_region,
            "text relocated to recommended region"
        );
        report.relocated += 1;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/adapt/reposition.rs"]
mod tests;
