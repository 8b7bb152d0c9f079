//! Reframe adapts a positioned design composition to a new canvas size and aspect ratio.
//!
//! A source frame (an element tree loaded as a [`Document`]) is re-targeted in place so its
//! content fits a target size while staying inside a safe area and clear of detected faces.
//!
//! # Pipeline overview
//!
//! 1. **Analyze**: content bounds, density and scaling strategy of the root frame.
//! 2. **Cluster**: loose elements of a free-positioned root are grouped into flow containers.
//! 3. **Scale**: one uniform factor is applied to the whole subtree, text ranges included.
//! 4. **Adapt**: auto-layout containers get a mode, spacing and size for the target profile.
//! 5. **Reposition**: free children are offset, clamped, re-anchored (hero bleeds) and
//!    moved clear of faces.
//!
//! [`ScalingOrchestrator::adapt`] runs the whole pass and reports an [`AdaptationOutcome`];
//! each stage is also exposed on its own.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod adapt;
mod advice;
mod analysis;
mod cluster;
mod document;
mod foundation;
mod orchestrate;
mod placement;

/// Tunables for every stage, loadable from JSON.
pub mod config;

pub use adapt::layout_mode::{
    AdaptContext, AdaptationPlan, AxisExpansionPlan, apply_plan, distribution_ratio,
    interior_spacing, plan_container, resolve_primary_align, resolve_wrap,
    should_adopt_vertical_flow, should_promote_absolute_children,
};
pub use adapt::reposition::{
    RepositionContext, RepositionReport, is_hero_bleed, reposition_bleed, reposition_children,
};
pub use advice::feedback::{
    FeedbackStats, FeedbackStore, InMemoryFeedbackStore, biased_confidence, feedback_weight,
    record_decision,
};
pub use advice::policy::{
    AdviceBundle, AdviceDecision, BlendStrategy, ConfidenceTier, LayoutAdvice, PatternOption,
    PreferDeterministic, apply_affinity, confidence_tier, resolve_advice,
};
pub use analysis::content::{
    ContentAnalysis, ContentDensity, ScalingStrategy, analyze_content, is_background_like,
};
pub use analysis::profile::{AspectClass, LayoutProfile, classify_aspect, resolve_layout_profile};
pub use analysis::safe_area::{SafeAreaInsets, SafeZoneProfile};
pub use cluster::proximity::{
    ClusterDirection, ClusteringOutcome, PositionRole, ProximityCluster, ProximityElement,
    RejectedCluster, classify_direction, classify_role, detect_clusters, infer_spacing,
    synthesize_clusters,
};
pub use config::{AdviceConfig, AnalysisConfig, ClusterConfig, ReframeConfig, SpacingConfig};
pub use document::flow::layout_flow_children;
pub use document::model::{
    AutoLayout, AxisSizing, ContainerRole, CounterAlign, Document, Fill, FillKind, FontName,
    LayoutMode, LayoutWrap, LetterSpacing, LineHeight, Node, NodeDef, NodeId, NodeKind, NodeTag,
    NodeType, Positioning, PrimaryAlign, ShapeKind, TextContent, TextRun,
};
pub use document::text::{FontCache, FontLoader, StaticFontLoader, scale_text_ranges};
pub use foundation::core::{Axis, Bounds, Dimensions, Edges, Point, Rect, Vec2};
pub use foundation::error::{ReframeError, ReframeResult};
pub use orchestrate::scaler::{
    AdaptRequest, AdaptationMetrics, AdaptationOutcome, ScalingOrchestrator, compute_scale,
};
pub use placement::nudge::{
    FaceOverlap, NudgeResult, detect_overlaps, nudge_text_away_from_faces,
};
pub use placement::scoring::{
    FaceRegion, FocalPoint, GridDimensions, GridRegion, PlacementScoring, RegionScore,
    region_bounds, score_placement,
};
