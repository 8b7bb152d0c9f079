use crate::{
    advice::feedback::{FeedbackStore, biased_confidence, feedback_weight},
    config::AdviceConfig,
    document::model::LayoutMode,
    foundation::math::clamp01,
    placement::scoring::{FaceRegion, FocalPoint},
};

/// One ranked layout pattern suggested for a target.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatternOption {
    /// Pattern identifier.
    pub pattern_id: String,
    /// Suggested confidence `[0, 1]`.
    pub confidence: f64,
    /// Flow direction the pattern implies, if any.
    #[serde(default)]
    pub layout_mode: Option<LayoutMode>,
}

/// Layout suggestions for one target.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutAdvice {
    /// Target the advice was produced for.
    pub target_id: String,
    /// Ranked patterns, best first.
    pub patterns: Vec<PatternOption>,
    /// Host key of the node to treat as background.
    pub background_node_id: Option<String>,
    /// Mode suggested independently of any pattern.
    pub suggested_layout_mode: Option<LayoutMode>,
}

/// Everything an external advisor may supply for one adaptation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdviceBundle {
    /// Detected faces.
    pub faces: Vec<FaceRegion>,
    /// Visual focal point.
    pub focal_point: Option<FocalPoint>,
    /// Layout suggestions.
    pub layout: Option<LayoutAdvice>,
}

/// How a suggestion is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Applied automatically.
    High,
    /// Applied and flagged for review.
    Medium,
    /// Blended with the deterministic result.
    Low,
    /// Ignored.
    Reject,
}

/// Tier of `confidence` against the configured thresholds.
pub fn confidence_tier(confidence: f64, cfg: &AdviceConfig) -> ConfidenceTier {
    let c = clamp01(confidence);
    if c >= cfg.high {
        ConfidenceTier::High
    } else if c >= cfg.medium {
        ConfidenceTier::Medium
    } else if c >= cfg.low {
        ConfidenceTier::Low
    } else {
        ConfidenceTier::Reject
    }
}

/// `confidence + affinity_boost` (capped at 1) when `pattern_id` is on the preferred list.
pub fn apply_affinity(
    confidence: f64,
    pattern_id: &str,
    preferred: &[String],
    cfg: &AdviceConfig,
) -> f64 {
    if preferred.iter().any(|p| p == pattern_id) {
        (clamp01(confidence) + cfg.affinity_boost).min(1.0)
    } else {
        clamp01(confidence)
    }
}

/// Combines a low-confidence suggestion with the deterministic decision.
pub trait BlendStrategy {
    /// Mode to use given both candidates.
    fn blend(&self, deterministic: LayoutMode, suggested: LayoutMode, confidence: f64)
    -> LayoutMode;
}

/// Keeps the deterministic mode; the suggestion only confirms it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreferDeterministic;

impl BlendStrategy for PreferDeterministic {
    fn blend(
        &self,
        deterministic: LayoutMode,
        _suggested: LayoutMode,
        _confidence: f64,
    ) -> LayoutMode {
        deterministic
    }
}

/// What the advice contributes to one adaptation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdviceDecision {
    /// Chosen pattern, if any survived tiering.
    pub pattern_id: Option<String>,
    /// Calibrated confidence of the chosen pattern.
    pub confidence: f64,
    /// Tier of `confidence`.
    pub tier: ConfidenceTier,
    /// Mode to apply to the root flow, if the advice decides one.
    pub layout_mode: Option<LayoutMode>,
    /// Host key of the background node.
    pub background_hint: Option<String>,
    /// Medium-tier result that should be surfaced for review.
    pub flagged: bool,
}

impl AdviceDecision {
    fn none() -> Self {
        AdviceDecision {
            pattern_id: None,
            confidence: 0.0,
            tier: ConfidenceTier::Reject,
            layout_mode: None,
            background_hint: None,
            flagged: false,
        }
    }
}

/// Resolve optional advice into one decision.
///
/// Each pattern's confidence is biased by feedback history and boosted when preferred; the
/// best calibrated pattern is tiered. `deterministic` is the mode the engine would choose
/// on its own and is what the blend strategy sees for low-tier suggestions.
pub fn resolve_advice(
    advice: Option<&LayoutAdvice>,
    preferred: &[String],
    deterministic: LayoutMode,
    feedback: Option<&dyn FeedbackStore>,
    blend: &dyn BlendStrategy,
    cfg: &AdviceConfig,
) -> AdviceDecision {
    let Some(advice) = advice else {
        return AdviceDecision::none();
    };
    let background_hint = advice.background_node_id.clone();

    let best = advice
        .patterns
        .iter()
        .map(|p| {
            let weight = feedback_weight(feedback, &advice.target_id, &p.pattern_id);
            let biased = biased_confidence(p.confidence, weight, cfg.feedback_bias);
            (p, apply_affinity(biased, &p.pattern_id, preferred, cfg))
        })
        .fold(None::<(&PatternOption, f64)>, |best, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        });

    let Some((pattern, confidence)) = best else {
        return AdviceDecision {
            background_hint,
            ..AdviceDecision::none()
        };
    };
    let tier = confidence_tier(confidence, cfg);
    let suggested = pattern.layout_mode.or(advice.suggested_layout_mode);
    let layout_mode = match (tier, suggested) {
        (ConfidenceTier::High | ConfidenceTier::Medium, Some(mode)) => Some(mode),
        (ConfidenceTier::Low, Some(mode)) => Some(blend.blend(deterministic, mode, confidence)),
        _ => None,
    };
    tracing::debug!(
        pattern = %pattern.pattern_id,
        confidence,
        ?tier,
        ?layout_mode,
        "advice resolved"
    );
    AdviceDecision {
        pattern_id: (tier != ConfidenceTier::Reject).then(|| pattern.pattern_id.clone()),
        confidence,
        tier,
        layout_mode,
        background_hint,
        flagged: tier == ConfidenceTier::Medium,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/advice/policy.rs"]
mod tests;
