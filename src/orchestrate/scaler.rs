use std::{collections::BTreeMap, time::Duration};

use crate::{
    adapt::layout_mode::{
        AdaptContext, AdaptationPlan, AxisExpansionPlan, apply_plan, plan_container,
    },
    adapt::reposition::{RepositionContext, RepositionReport, reposition_children},
    advice::feedback::{FeedbackStore, record_decision},
    advice::policy::{
        AdviceBundle, AdviceDecision, BlendStrategy, PreferDeterministic, resolve_advice,
    },
    analysis::content::{ContentAnalysis, ScalingStrategy, analyze_content},
    analysis::profile::{AspectClass, LayoutProfile, classify_aspect},
    analysis::safe_area::{SafeAreaInsets, SafeZoneProfile},
    cluster::proximity::synthesize_clusters,
    config::ReframeConfig,
    document::model::{Document, LayoutMode, NodeId, NodeKind},
    document::text::{FontCache, FontLoader, scale_text_ranges},
    foundation::core::{Bounds, Dimensions},
    foundation::error::{ReframeError, ReframeResult},
    foundation::math::valid_scale_or,
    placement::scoring::{PlacementScoring, score_placement},
};

/// One adaptation request for the document root.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdaptRequest {
    /// Target frame width.
    pub target_width: f64,
    /// Target frame height.
    pub target_height: f64,
    /// Identifier used for advice and feedback lookups.
    pub target_id: String,
    /// Patterns known to suit this target.
    pub preferred_patterns: Vec<String>,
    /// Usable share of each dimension; the configured default when absent.
    pub safe_area_ratio: Option<f64>,
    /// Platform safe zone; overrides `safe_area_ratio`.
    pub safe_zone: Option<SafeZoneProfile>,
    /// Optional external advice.
    pub advice: Option<AdviceBundle>,
}

impl AdaptRequest {
    /// Request for a `width × height` target with defaults elsewhere.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            target_width: width,
            target_height: height,
            ..Self::default()
        }
    }

    /// Target size.
    pub fn target(&self) -> Dimensions {
        Dimensions::new(self.target_width, self.target_height)
    }
}

/// Numbers describing one completed adaptation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdaptationMetrics {
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Source width times `scale`.
    pub scaled_width: f64,
    /// Source height times `scale`.
    pub scaled_height: f64,
    /// Left safe inset.
    pub safe_inset_x: f64,
    /// Top safe inset.
    pub safe_inset_y: f64,
    /// Target width.
    pub target_width: f64,
    /// Target height.
    pub target_height: f64,
    /// Root x-axis decomposition.
    pub horizontal_plan: AxisExpansionPlan,
    /// Root y-axis decomposition.
    pub vertical_plan: AxisExpansionPlan,
    /// Target profile.
    pub profile: LayoutProfile,
    /// Any stack was rotated to vertical.
    pub adopted_vertical_variant: bool,
    /// Scale derivation used.
    pub strategy: ScalingStrategy,
    /// Fine aspect bucket of the target.
    pub aspect_class: AspectClass,
    /// Containers synthesized by proximity clustering.
    pub clusters_created: usize,
    /// Every applied container plan, children before parents.
    pub container_plans: Vec<AdaptationPlan>,
    /// Text placement scoring over the safe area.
    pub placement: PlacementScoring,
    /// Free-child repositioning summary for the root.
    pub reposition: RepositionReport,
    /// Advice outcome, when advice was supplied.
    pub advice: Option<AdviceDecision>,
}

/// Result of [`ScalingOrchestrator::adapt`]. Never an error; failures are listed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdaptationOutcome {
    /// The pass finished without errors.
    pub success: bool,
    /// Present whenever the pass got far enough to scale the root.
    pub metrics: Option<AdaptationMetrics>,
    /// Failures that left part of the tree unadapted.
    pub errors: Vec<String>,
    /// Non-fatal notes.
    pub warnings: Vec<String>,
}

/// Uniform scale for `strategy`. Invalid results fall back to `fallback`.
pub fn compute_scale(
    strategy: ScalingStrategy,
    source: Dimensions,
    content: Dimensions,
    safe: Dimensions,
    target: Dimensions,
    fallback: f64,
) -> f64 {
    let raw = match strategy {
        ScalingStrategy::Proportional => {
            (safe.width / source.width).min(safe.height / source.height)
        }
        ScalingStrategy::Adaptive => (safe.width / content.width).min(safe.height / content.height),
        ScalingStrategy::Fill => (target.width / source.width).max(target.height / source.height),
    };
    valid_scale_or(raw, fallback)
}

/// Top-level sequencer: analyze, cluster, scale, adapt flows, reposition, validate.
pub struct ScalingOrchestrator {
    config: ReframeConfig,
    feedback: Option<Box<dyn FeedbackStore>>,
    blend: Box<dyn BlendStrategy>,
}

impl Default for ScalingOrchestrator {
    fn default() -> Self {
        Self::new(ReframeConfig::default())
    }
}

impl ScalingOrchestrator {
    /// Orchestrator with `config`, no feedback history and the deterministic blend.
    pub fn new(config: ReframeConfig) -> Self {
        Self {
            config,
            feedback: None,
            blend: Box::new(PreferDeterministic),
        }
    }

    /// Use `store` to calibrate advice confidence.
    pub fn with_feedback(mut self, store: Box<dyn FeedbackStore>) -> Self {
        self.feedback = Some(store);
        self
    }

    /// Use `blend` for low-confidence suggestions.
    pub fn with_blend(mut self, blend: Box<dyn BlendStrategy>) -> Self {
        self.blend = blend;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ReframeConfig {
        &self.config
    }

    /// Record that the user kept or undid `pattern_id` on `target_id`. No-op without a store.
    pub fn record_decision(&mut self, target_id: &str, pattern_id: &str, accepted: bool) {
        if let Some(store) = self.feedback.as_deref_mut() {
            record_decision(store, target_id, pattern_id, accepted);
        }
    }

    /// Adapt the document root to the requested target in place.
    #[tracing::instrument(
        skip_all,
        fields(target_w = request.target_width, target_h = request.target_height)
    )]
    pub fn adapt(
        &self,
        doc: &mut Document,
        request: &AdaptRequest,
        fonts: &mut FontCache,
        loader: &mut dyn FontLoader,
    ) -> AdaptationOutcome {
        let mut outcome = AdaptationOutcome::default();
        match self.run(doc, request, fonts, loader, &mut outcome) {
            Ok(metrics) => outcome.metrics = Some(metrics),
            Err(e) => {
                tracing::warn!(error = %e, "adaptation aborted");
                outcome.errors.push(e.to_string());
            }
        }
        outcome.success = outcome.errors.is_empty();
        outcome
    }

    fn run(
        &self,
        doc: &mut Document,
        request: &AdaptRequest,
        fonts: &mut FontCache,
        loader: &mut dyn FontLoader,
        outcome: &mut AdaptationOutcome,
    ) -> ReframeResult<AdaptationMetrics> {
        let cfg = &self.config;
        let root = doc.root();
        let raw_target = request.target();
        let target = raw_target.sanitized();
        if target != raw_target {
            outcome
                .warnings
                .push(format!("target size {raw_target:?} sanitized to {target:?}"));
        }
        let source = doc.bounds(root)?.dimensions().sanitized();
        let aspect_class = classify_aspect(target);
        let profile = aspect_class.profile();

        let insets = match request.safe_zone {
            Some(zone) => SafeAreaInsets::from_profile(target, zone),
            None => SafeAreaInsets::from_ratio(
                target,
                request.safe_area_ratio.unwrap_or(cfg.default_safe_area_ratio),
            ),
        };
        let safe = insets.safe_bounds(target);

        let root_mode = doc
            .node(root)?
            .layout()
            .map_or(LayoutMode::None, |l| l.mode);
        let deterministic =
            if profile == LayoutProfile::Vertical && root_mode == LayoutMode::Horizontal {
                LayoutMode::Vertical
            } else {
                root_mode
            };
        let advice = request.advice.as_ref();
        let decision = advice.map(|a| {
            resolve_advice(
                a.layout.as_ref(),
                &request.preferred_patterns,
                deterministic,
                self.feedback.as_deref(),
                self.blend.as_ref(),
                &cfg.advice,
            )
        });
        if decision.as_ref().is_some_and(|d| d.flagged) {
            outcome
                .warnings
                .push("medium-confidence layout advice applied; review suggested".to_string());
        }
        let background_hint = decision
            .as_ref()
            .and_then(|d| d.background_hint.as_deref())
            .and_then(|key| {
                let found = doc.find_by_key(key);
                if found.is_none() {
                    outcome
                        .warnings
                        .push(format!("advised background node '{key}' not found"));
                }
                found
            });

        let analysis = analyze_content(doc, root, &cfg.analysis, background_hint)?;

        let mut clusters_created = 0;
        if cfg.cluster_loose_elements && root_mode == LayoutMode::None {
            let clustering = synthesize_clusters(
                doc,
                root,
                &cfg.clustering,
                cfg.analysis.background_coverage,
                Duration::from_millis(cfg.clustering.timeout_ms),
            );
            clusters_created = clustering.containers.len();
            outcome.warnings.extend(clustering.warnings);
            outcome
                .warnings
                .extend(clustering.errors.into_iter().map(|e| format!("clustering: {e}")));
        }

        let strategy = analysis.recommended_strategy;
        let raw_scale = compute_scale(
            strategy,
            source,
            analysis.effective_dimensions().sanitized(),
            safe.dimensions(),
            target,
            f64::NAN,
        );
        let scale = valid_scale_or(raw_scale, cfg.fallback_scale);
        if scale != raw_scale {
            tracing::warn!(fallback = scale, "computed scale invalid; using fallback");
            outcome
                .warnings
                .push(format!("scale could not be computed; fallback {scale} used"));
        }
        tracing::debug!(?profile, ?strategy, scale, "scale computed");

        doc.scale_subtree(root, scale)?;
        self.scale_text(doc, root, scale, fonts, loader, outcome);
        doc.resize(root, target.width, target.height)?;

        let (faces, focal) = match advice {
            Some(a) => (a.faces.as_slice(), a.focal_point),
            None => (&[][..], None),
        };
        let placement = score_placement(profile, target, safe, faces, focal);
        let scaled_bounds: BTreeMap<NodeId, Bounds> = doc
            .children(root)
            .iter()
            .filter_map(|&c| doc.bounds(c).ok().map(|b| (c, b)))
            .collect();

        let ctx = AdaptContext {
            root,
            profile,
            scale,
            target,
            safe,
            density: analysis.content_density,
            root_anchor: root_anchor(&analysis, source, scale),
            centering_region: if strategy == ScalingStrategy::Fill {
                target.to_bounds()
            } else {
                safe
            },
            mode_override: decision.as_ref().and_then(|d| d.layout_mode),
            background_coverage: cfg.analysis.background_coverage,
        };
        let container_plans = self.adapt_containers(doc, &ctx, outcome);
        let (horizontal_plan, vertical_plan, offset) =
            match container_plans.iter().find(|p| p.container == root) {
                Some(p) => (p.horizontal, p.vertical, p.content_offset),
                None => Default::default(),
            };

        let reposition = reposition_children(
            doc,
            root,
            &RepositionContext {
                scaled_frame: source.scaled(scale),
                target,
                safe,
                offset,
                background_coverage: cfg.analysis.background_coverage,
                faces: faces.iter().map(|f| f.to_pixel_bounds(target)).collect(),
                placement: Some(placement.clone()),
                scaled_bounds,
            },
        )?;
        for &(id, factor) in &reposition.downscaled {
            self.scale_text(doc, id, factor, fonts, loader, outcome);
        }

        Ok(AdaptationMetrics {
            scale,
            scaled_width: source.width * scale,
            scaled_height: source.height * scale,
            safe_inset_x: safe.x,
            safe_inset_y: safe.y,
            target_width: target.width,
            target_height: target.height,
            horizontal_plan,
            vertical_plan,
            profile,
            adopted_vertical_variant: container_plans.iter().any(|p| p.adopted_vertical),
            strategy,
            aspect_class,
            clusters_created,
            container_plans,
            placement,
            reposition,
            advice: decision,
        })
    }

    /// Plan and apply every adaptable container, deepest first so parents see final child sizes.
    fn adapt_containers(
        &self,
        doc: &mut Document,
        ctx: &AdaptContext,
        outcome: &mut AdaptationOutcome,
    ) -> Vec<AdaptationPlan> {
        let mut order: Vec<NodeId> = doc
            .descendants(ctx.root, self.config.analysis.max_walk_depth)
            .into_iter()
            .map(|(id, _)| id)
            .filter(|&id| doc.node(id).is_ok_and(|n| matches!(n.kind, NodeKind::Container { .. })))
            .collect();
        order.reverse();
        order.push(ctx.root);

        let mut plans = Vec::new();
        for id in order {
            let planned = plan_container(doc, id, ctx, &self.config.spacing).and_then(|plan| {
                if let Some(plan) = &plan {
                    apply_plan(doc, plan, ctx.background_coverage)?;
                }
                Ok(plan)
            });
            match planned {
                Ok(Some(plan)) => plans.push(plan),
                Ok(None) => {}
                Err(e) => outcome.errors.push(format!("adapt {id:?}: {e}")),
            }
        }
        plans
    }

    /// Scale ranged text of every text node in the subtree at `id`. Font failures are warnings.
    fn scale_text(
        &self,
        doc: &mut Document,
        id: NodeId,
        factor: f64,
        fonts: &mut FontCache,
        loader: &mut dyn FontLoader,
        outcome: &mut AdaptationOutcome,
    ) {
        let mut ids = vec![id];
        ids.extend(doc.descendants(id, usize::MAX).into_iter().map(|(d, _)| d));
        for id in ids {
            if !doc.node(id).is_ok_and(|n| matches!(n.kind, NodeKind::Text(_))) {
                continue;
            }
            match scale_text_ranges(doc, id, factor, fonts, loader) {
                Ok(()) => {}
                Err(e @ ReframeError::FontLoad { .. }) => {
                    outcome.warnings.push(format!("text {id:?} not rescaled: {e}"));
                }
                Err(e) => outcome.errors.push(format!("text {id:?}: {e}")),
            }
        }
    }
}

/// Scaled bounds the root layout is centered on.
fn root_anchor(analysis: &ContentAnalysis, source: Dimensions, scale: f64) -> Bounds {
    match analysis.recommended_strategy {
        ScalingStrategy::Adaptive => analysis.actual_content_bounds.scaled(scale),
        ScalingStrategy::Proportional | ScalingStrategy::Fill => source.to_bounds().scaled(scale),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrate/scaler.rs"]
mod tests;
