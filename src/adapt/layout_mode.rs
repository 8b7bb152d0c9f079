use crate::{
    analysis::content::{ContentDensity, is_background_like},
    analysis::profile::LayoutProfile,
    config::SpacingConfig,
    document::flow::layout_flow_children,
    document::model::{
        AutoLayout, AxisSizing, CounterAlign, Document, LayoutMode, LayoutWrap, NodeId,
        Positioning, PrimaryAlign,
    },
    foundation::core::{Axis, Bounds, Dimensions, Edges, Vec2},
    foundation::error::{ReframeError, ReframeResult},
};

/// Slack (px) below which a stack counts as full.
const SLACK_EPS: f64 = 0.5;

/// Padding and gap decomposition along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisExpansionPlan {
    /// Leading space: padding for flow containers, inset plus centering for free frames.
    pub start: f64,
    /// Trailing space.
    pub end: f64,
    /// Gap between consecutive flow children.
    pub interior: f64,
}

impl AxisExpansionPlan {
    /// Leading space `start`, centering `anchor_len` inside `region_len` starting at
    /// `region_start`. `total` is the full axis length of the frame.
    pub fn centered(region_start: f64, region_len: f64, anchor_len: f64, total: f64) -> Self {
        let start = region_start + (region_len - anchor_len) / 2.0;
        AxisExpansionPlan {
            start,
            end: total - start - anchor_len,
            interior: 0.0,
        }
    }
}

/// Layout decision for one container, applied once and then dropped.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdaptationPlan {
    /// Container the plan applies to.
    pub container: NodeId,
    /// Mode before adaptation.
    pub source_mode: LayoutMode,
    /// Mode after adaptation.
    pub layout_mode: LayoutMode,
    /// Wrapping after adaptation.
    pub wrap: LayoutWrap,
    /// Gap between flow children, in target pixels.
    pub item_spacing: f64,
    /// Padding written to the container: the original padding times the scale, plus the
    /// safe-area insets when the container is the root.
    pub padding: Edges,
    /// Primary-axis distribution.
    pub primary_align: PrimaryAlign,
    /// Counter-axis placement.
    pub counter_align: CounterAlign,
    /// Primary-axis sizing.
    pub primary_sizing: AxisSizing,
    /// Counter-axis sizing.
    pub counter_sizing: AxisSizing,
    /// A horizontal stack was rotated to vertical.
    pub adopted_vertical: bool,
    /// Absolute children join the flow (or get expanded, for free frames).
    pub promote_absolute_children: bool,
    /// Container size after adaptation.
    pub size: Dimensions,
    /// X-axis decomposition.
    pub horizontal: AxisExpansionPlan,
    /// Y-axis decomposition.
    pub vertical: AxisExpansionPlan,
    /// Shift added to scaled positions of freely positioned children.
    pub content_offset: Vec2,
}

/// Inputs shared by every container of one pass.
#[derive(Clone, Debug)]
pub struct AdaptContext {
    /// Root frame.
    pub root: NodeId,
    /// Target profile.
    pub profile: LayoutProfile,
    /// Uniform scale already applied to geometry.
    pub scale: f64,
    /// Target frame size.
    pub target: Dimensions,
    /// Safe rectangle in root coordinates.
    pub safe: Bounds,
    /// Root content density.
    pub density: ContentDensity,
    /// Scaled bounds that get centered in `centering_region` for the root.
    pub root_anchor: Bounds,
    /// Region the root anchor is centered in.
    pub centering_region: Bounds,
    /// Mode suggested by accepted advice; applies to the root's flow layout only.
    pub mode_override: Option<LayoutMode>,
    /// Coverage at which a child counts as background.
    pub background_coverage: f64,
}

/// Whether a horizontal stack should rotate to vertical: whenever the target is vertical,
/// even for a single flow child.
pub fn should_adopt_vertical_flow(profile: LayoutProfile, source: &AutoLayout) -> bool {
    profile == LayoutProfile::Vertical && source.mode == LayoutMode::Horizontal
}

/// Share of the extra space handed to gaps.
pub fn distribution_ratio(density: ContentDensity, cfg: &SpacingConfig) -> f64 {
    match density {
        ContentDensity::Sparse => cfg.sparse_ratio,
        ContentDensity::Normal => cfg.moderate_ratio,
        ContentDensity::Dense => cfg.dense_ratio,
    }
}

/// Gap after distributing `extra` free space over `flow_count - 1` gaps.
///
/// Growth above `soft_cap_multiple × base` is damped, and the result never exceeds
/// `hard_cap_multiple × base`. A zero base stays zero.
pub fn interior_spacing(
    base: f64,
    extra: f64,
    flow_count: usize,
    ratio: f64,
    cfg: &SpacingConfig,
) -> f64 {
    if !base.is_finite() || base <= 0.0 {
        return 0.0;
    }
    if flow_count < 2 || !extra.is_finite() || extra <= 0.0 {
        return base;
    }
    let gaps = (flow_count - 1) as f64;
    let mut spacing = base + extra * ratio / gaps;
    let soft = base * cfg.soft_cap_multiple;
    if spacing > soft {
        spacing = soft + (spacing - soft) * cfg.soft_cap_damping;
    }
    spacing.min(base * cfg.hard_cap_multiple)
}

/// Primary alignment after adaptation.
pub fn resolve_primary_align(source: PrimaryAlign, adopted: bool, slack: f64) -> PrimaryAlign {
    match source {
        PrimaryAlign::Center | PrimaryAlign::SpaceBetween if adopted && slack > SLACK_EPS => {
            PrimaryAlign::Min
        }
        other => other,
    }
}

/// Vertical stacks never wrap.
pub fn resolve_wrap(wrap: LayoutWrap, mode: LayoutMode) -> LayoutWrap {
    if mode == LayoutMode::Vertical {
        LayoutWrap::NoWrap
    } else {
        wrap
    }
}

/// Whether absolutely positioned children are pulled into the flow (or expanded).
pub fn should_promote_absolute_children(adopted: bool, had_auto_layout: bool) -> bool {
    adopted || !had_auto_layout
}

/// Centering of the root anchor inside the centering region, per axis.
fn root_axes(ctx: &AdaptContext) -> (AxisExpansionPlan, AxisExpansionPlan) {
    let region = ctx.centering_region;
    let anchor = ctx.root_anchor;
    (
        AxisExpansionPlan::centered(region.x, region.width, anchor.width, ctx.target.width),
        AxisExpansionPlan::centered(region.y, region.height, anchor.height, ctx.target.height),
    )
}

/// `padding` widened by the margins between the target frame and the safe rectangle.
pub fn safe_padding(padding: Edges, safe: Bounds, target: Dimensions) -> Edges {
    Edges {
        left: padding.left + safe.x.max(0.0),
        right: padding.right + (target.width - safe.right()).max(0.0),
        top: padding.top + safe.y.max(0.0),
        bottom: padding.bottom + (target.height - safe.bottom()).max(0.0),
    }
}

/// Plan one container. Returns `None` for atomic groups and for nested free-positioned
/// containers, which move as a unit with their parent.
pub fn plan_container(
    doc: &Document,
    id: NodeId,
    ctx: &AdaptContext,
    cfg: &SpacingConfig,
) -> ReframeResult<Option<AdaptationPlan>> {
    let node = doc.node(id)?;
    let Some(source) = node.layout().copied() else {
        return Err(ReframeError::validation(format!(
            "node '{}' is not a container",
            node.name
        )));
    };
    if doc.is_atomic(id) || doc.is_inside_atomic(id) {
        return Ok(None);
    }
    let is_root = id == ctx.root;
    let had_auto_layout = source.mode != LayoutMode::None;
    if !had_auto_layout && !is_root {
        return Ok(None);
    }

    let own = node.bounds;
    let scale = ctx.scale;
    let padding = source.padding.scaled(scale);

    if !had_auto_layout {
        let (horizontal, vertical) = root_axes(ctx);
        return Ok(Some(AdaptationPlan {
            container: id,
            source_mode: LayoutMode::None,
            layout_mode: LayoutMode::None,
            wrap: source.wrap,
            item_spacing: source.item_spacing * scale,
            padding,
            primary_align: source.primary_align,
            counter_align: source.counter_align,
            primary_sizing: source.primary_sizing,
            counter_sizing: source.counter_sizing,
            adopted_vertical: false,
            promote_absolute_children: true,
            size: ctx.target,
            content_offset: Vec2::new(
                horizontal.start - ctx.root_anchor.x,
                vertical.start - ctx.root_anchor.y,
            ),
            horizontal,
            vertical,
        }));
    }

    let requested = match ctx.mode_override {
        Some(mode) if is_root && mode != LayoutMode::None => mode,
        _ => source.mode,
    };
    let adopted = should_adopt_vertical_flow(ctx.profile, &source)
        || (source.mode == LayoutMode::Horizontal && requested == LayoutMode::Vertical);
    let layout_mode = if adopted { LayoutMode::Vertical } else { requested };
    let axis = match layout_mode {
        LayoutMode::Horizontal => Axis::Horizontal,
        _ => Axis::Vertical,
    };
    let cross = axis.cross();
    let promote = should_promote_absolute_children(adopted, had_auto_layout);

    let frame = own.dimensions();
    let flow: Vec<Bounds> = doc
        .children(id)
        .iter()
        .filter_map(|&c| doc.node(c).ok())
        .filter(|n| n.visible)
        .filter(|n| {
            n.positioning == Positioning::Auto
                || (promote && !is_background_like(n.bounds, frame, ctx.background_coverage))
        })
        .map(|n| n.bounds)
        .collect();

    // Hugging stacks keep hugging. Fixed stacks placed directly on a free root expand into
    // the safe area; inside a flow root they share the root's main axis with their siblings.
    let root_is_free = doc
        .node(ctx.root)?
        .layout()
        .is_none_or(|l| l.mode == LayoutMode::None);
    let expandable = is_root
        || (root_is_free
            && node.parent == Some(ctx.root)
            && source.primary_sizing == AxisSizing::Fixed);
    let available = if is_root {
        ctx.target
    } else if expandable {
        ctx.safe.dimensions()
    } else {
        frame
    };
    // The root spans the target, so its flow is inset by the safe margins.
    let applied = if is_root {
        safe_padding(padding, ctx.safe, ctx.target)
    } else {
        padding
    };
    let (pad_start, pad_end) = axis.edges_of(applied);
    let (cross_pad_start, cross_pad_end) = cross.edges_of(applied);

    let primary_len = if expandable {
        axis.dim_of(available)
    } else {
        axis.len_of(own)
    };
    let avail_primary = (axis.dim_of(available) - pad_start - pad_end).max(0.0);
    let content_primary: f64 = flow.iter().map(|b| axis.len_of(*b)).sum();
    let n = flow.len();
    let gaps = n.saturating_sub(1) as f64;
    let base = source.item_spacing.max(0.0) * scale;
    let extra = (avail_primary - content_primary - base * gaps).max(0.0);
    let ratio = distribution_ratio(ctx.density, cfg);
    let item_spacing = interior_spacing(base, extra, n, ratio, cfg);
    let slack = avail_primary - content_primary - item_spacing * gaps;
    let primary_align = resolve_primary_align(source.primary_align, adopted, slack);

    let cross_len = if is_root {
        cross.dim_of(ctx.target)
    } else {
        let current = if adopted {
            // The old primary extent becomes the cross extent.
            cross.len_of(own).max(
                flow.iter().map(|b| cross.len_of(*b)).fold(0.0, f64::max)
                    + cross_pad_start
                    + cross_pad_end,
            )
        } else {
            cross.len_of(own)
        };
        if expandable {
            current.min(cross.dim_of(available))
        } else {
            current
        }
    };
    let size = match axis {
        Axis::Horizontal => Dimensions::new(primary_len, cross_len),
        Axis::Vertical => Dimensions::new(cross_len, primary_len),
    };
    let (primary_sizing, counter_sizing) = if is_root {
        (AxisSizing::Fixed, AxisSizing::Fixed)
    } else if adopted && !expandable {
        (AxisSizing::Auto, source.counter_sizing)
    } else if adopted {
        (AxisSizing::Fixed, source.counter_sizing)
    } else {
        (source.primary_sizing, source.counter_sizing)
    };

    let primary_plan = AxisExpansionPlan {
        start: pad_start,
        end: pad_end,
        interior: item_spacing,
    };
    let cross_plan = AxisExpansionPlan {
        start: cross_pad_start,
        end: cross_pad_end,
        interior: 0.0,
    };
    let (horizontal, vertical) = match axis {
        Axis::Horizontal => (primary_plan, cross_plan),
        Axis::Vertical => (cross_plan, primary_plan),
    };

    let content_offset = if is_root {
        let (h, v) = root_axes(ctx);
        Vec2::new(h.start - ctx.root_anchor.x, v.start - ctx.root_anchor.y)
    } else {
        Vec2::ZERO
    };

    tracing::debug!(
        container = ?id,
        ?layout_mode,
        adopted,
        flow = n,
        item_spacing,
        slack,
        "container planned"
    );
    Ok(Some(AdaptationPlan {
        container: id,
        source_mode: source.mode,
        layout_mode,
        wrap: resolve_wrap(source.wrap, layout_mode),
        item_spacing,
        padding: applied,
        primary_align,
        counter_align: source.counter_align,
        primary_sizing,
        counter_sizing,
        adopted_vertical: adopted,
        promote_absolute_children: promote,
        size,
        horizontal,
        vertical,
        content_offset,
    }))
}

/// Write `plan` to the document and relayout the container's flow children.
///
/// Free-positioned frames are left to the repositioner.
pub fn apply_plan(
    doc: &mut Document,
    plan: &AdaptationPlan,
    background_coverage: f64,
) -> ReframeResult<()> {
    if plan.layout_mode == LayoutMode::None {
        return Ok(());
    }
    let id = plan.container;
    if plan.promote_absolute_children {
        let frame = doc.bounds(id)?.dimensions();
        let promoted: Vec<NodeId> = doc
            .children(id)
            .iter()
            .copied()
            .filter(|&c| {
                doc.node(c).is_ok_and(|n| {
                    n.visible
                        && n.positioning == Positioning::Absolute
                        && !is_background_like(n.bounds, frame, background_coverage)
                })
            })
            .collect();
        for child in promoted {
            doc.set_positioning(child, Positioning::Auto)?;
        }
    }
    doc.set_layout(
        id,
        AutoLayout {
            mode: plan.layout_mode,
            wrap: plan.wrap,
            item_spacing: plan.item_spacing,
            padding: plan.padding,
            primary_align: plan.primary_align,
            counter_align: plan.counter_align,
            primary_sizing: plan.primary_sizing,
            counter_sizing: plan.counter_sizing,
        },
    )?;
    doc.resize(id, plan.size.width, plan.size.height)?;
    layout_flow_children(doc, id)
}

#[cfg(test)]
#[path = "../../tests/unit/adapt/layout_mode.rs"]
mod tests;
