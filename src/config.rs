//! Tunables for every adaptation pass.
//!
//! All sections deserialize with defaults, so a config file only needs to name the values it
//! overrides.

use std::{fs::File, io::BufReader, path::Path};

use crate::foundation::error::{ReframeError, ReframeResult};

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReframeConfig {
    /// Content analysis thresholds.
    pub analysis: AnalysisConfig,
    /// Interior spacing distribution.
    pub spacing: SpacingConfig,
    /// Proximity clustering.
    pub clustering: ClusterConfig,
    /// Advice tiering and calibration.
    pub advice: AdviceConfig,
    /// Scale substituted when the computed scale is not finite or not positive.
    pub fallback_scale: f64,
    /// Safe-area ratio used when the request does not carry one.
    pub default_safe_area_ratio: f64,
    /// Run proximity clustering on frames without auto-layout before adapting them.
    pub cluster_loose_elements: bool,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            spacing: SpacingConfig::default(),
            clustering: ClusterConfig::default(),
            advice: AdviceConfig::default(),
            fallback_scale: 1.0,
            default_safe_area_ratio: 0.9,
            cluster_loose_elements: true,
        }
    }
}

/// Content and background detection thresholds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Area coverage (0..1) at which a child counts as background.
    pub background_coverage: f64,
    /// Maximum depth of breadth-first tree walks.
    pub max_walk_depth: usize,
    /// At most this many children and below `sparse_coverage` is sparse.
    pub sparse_max_children: usize,
    /// Coverage below which a layout may be sparse.
    pub sparse_coverage: f64,
    /// At least this many children is dense.
    pub dense_min_children: usize,
    /// Coverage above which a layout is dense.
    pub dense_coverage: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            background_coverage: 0.9,
            max_walk_depth: 12,
            sparse_max_children: 3,
            sparse_coverage: 0.3,
            dense_min_children: 10,
            dense_coverage: 0.7,
        }
    }
}

/// Distribution of slack space into flow gaps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    /// Share of slack given to gaps for sparse content.
    pub sparse_ratio: f64,
    /// Share of slack given to gaps for normal content.
    pub moderate_ratio: f64,
    /// Share of slack given to gaps for dense content.
    pub dense_ratio: f64,
    /// Gap growth is damped above this multiple of the base spacing.
    pub soft_cap_multiple: f64,
    /// Gap never exceeds this multiple of the base spacing.
    pub hard_cap_multiple: f64,
    /// Fraction of growth kept above the soft cap.
    pub soft_cap_damping: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            sparse_ratio: 0.55,
            moderate_ratio: 0.45,
            dense_ratio: 0.35,
            soft_cap_multiple: 5.0,
            hard_cap_multiple: 15.0,
            soft_cap_damping: 0.25,
        }
    }
}

/// Proximity clustering thresholds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Elements closer than this clearance (px) are linked.
    pub distance_threshold_px: f64,
    /// Clusters with a lower direction confidence are rejected.
    pub confidence_threshold: f64,
    /// Direction confidence below this is reported as chaotic.
    pub chaotic_below: f64,
    /// Soft deadline for the whole pass, in milliseconds.
    pub timeout_ms: u64,
    /// Max share of parent area for an element to be edge-floating.
    pub edge_max_area_ratio: f64,
    /// Corner zone, as a share of each parent dimension.
    pub edge_corner_zone: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            distance_threshold_px: 40.0,
            confidence_threshold: 0.6,
            chaotic_below: 0.35,
            timeout_ms: 250,
            edge_max_area_ratio: 0.04,
            edge_corner_zone: 0.12,
        }
    }
}

/// Confidence tiers and calibration for external layout advice.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    /// Auto-apply at or above.
    pub high: f64,
    /// Apply with a flag at or above.
    pub medium: f64,
    /// Blend as a hint at or above; below is rejected.
    pub low: f64,
    /// Added when a pattern is on the target's preferred list.
    pub affinity_boost: f64,
    /// Maximum shift applied from historical acceptance statistics.
    pub feedback_bias: f64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            high: 0.85,
            medium: 0.65,
            low: 0.45,
            affinity_boost: 0.10,
            feedback_bias: 0.2,
        }
    }
}

impl ReframeConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReframeResult<Self> {
        let cfg: ReframeConfig = serde_json::from_reader(r)
            .map_err(|e| ReframeError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReframeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReframeError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate ranges of every tunable.
    pub fn validate(&self) -> ReframeResult<()> {
        for (name, value) in [
            ("analysis.background_coverage", self.analysis.background_coverage),
            ("analysis.sparse_coverage", self.analysis.sparse_coverage),
            ("analysis.dense_coverage", self.analysis.dense_coverage),
            ("spacing.sparse_ratio", self.spacing.sparse_ratio),
            ("spacing.moderate_ratio", self.spacing.moderate_ratio),
            ("spacing.dense_ratio", self.spacing.dense_ratio),
            ("spacing.soft_cap_damping", self.spacing.soft_cap_damping),
            ("clustering.confidence_threshold", self.clustering.confidence_threshold),
            ("clustering.chaotic_below", self.clustering.chaotic_below),
            ("clustering.edge_max_area_ratio", self.clustering.edge_max_area_ratio),
            ("clustering.edge_corner_zone", self.clustering.edge_corner_zone),
            ("advice.high", self.advice.high),
            ("advice.medium", self.advice.medium),
            ("advice.low", self.advice.low),
            ("advice.affinity_boost", self.advice.affinity_boost),
            ("advice.feedback_bias", self.advice.feedback_bias),
            ("default_safe_area_ratio", self.default_safe_area_ratio),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ReframeError::validation(format!(
                    "{name} must be finite and within [0, 1]"
                )));
            }
        }
        if !(self.advice.low <= self.advice.medium && self.advice.medium <= self.advice.high) {
            return Err(ReframeError::validation(
                "advice tiers must satisfy low <= medium <= high",
            ));
        }
        if !self.spacing.soft_cap_multiple.is_finite()
            || !self.spacing.hard_cap_multiple.is_finite()
            || self.spacing.soft_cap_multiple < 1.0
            || self.spacing.hard_cap_multiple < self.spacing.soft_cap_multiple
        {
            return Err(ReframeError::validation(
                "spacing caps must satisfy 1 <= soft_cap_multiple <= hard_cap_multiple",
            ));
        }
        if !self.clustering.distance_threshold_px.is_finite()
            || self.clustering.distance_threshold_px < 0.0
        {
            return Err(ReframeError::validation(
                "clustering.distance_threshold_px must be finite and >= 0",
            ));
        }
        if !self.fallback_scale.is_finite() || self.fallback_scale <= 0.0 {
            return Err(ReframeError::validation(
                "fallback_scale must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
