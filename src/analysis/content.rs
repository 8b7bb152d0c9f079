use crate::{
    config::AnalysisConfig,
    document::model::{Document, LayoutMode, NodeId, NodeKind},
    foundation::core::{Bounds, Dimensions},
    foundation::error::ReframeResult,
};

/// How much of the frame the content occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDensity {
    /// Few elements with a lot of empty space.
    Sparse,
    /// Neither sparse nor dense.
    Normal,
    /// Many elements or high coverage.
    Dense,
}

/// How the uniform scale is derived for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingStrategy {
    /// Fit the whole source frame into the safe area.
    Proportional,
    /// Fit the effective content bounds into the safe area.
    Adaptive,
    /// Cover the whole target.
    Fill,
}

/// Geometry summary of a source frame, computed once per adaptation pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContentAnalysis {
    /// Union of visible, non-background children, clipped to the frame.
    pub actual_content_bounds: Bounds,
    /// Frame has a flow layout.
    pub has_auto_layout: bool,
    /// Frame flow direction.
    pub layout_direction: LayoutMode,
    /// Visible direct children.
    pub child_count: usize,
    /// Any visible text descendant.
    pub has_text: bool,
    /// Any visible image-bearing descendant.
    pub has_images: bool,
    /// Density class.
    pub content_density: ContentDensity,
    /// Scale derivation to use.
    pub recommended_strategy: ScalingStrategy,
    /// Width of the effective content (frame width when nothing is distinguishable).
    pub effective_width: f64,
    /// Height of the effective content (frame height when nothing is distinguishable).
    pub effective_height: f64,
}

impl ContentAnalysis {
    /// Effective content size.
    pub fn effective_dimensions(&self) -> Dimensions {
        Dimensions::new(self.effective_width, self.effective_height)
    }
}

/// `true` when `child` covers at least `threshold` of the frame area.
pub fn is_background_like(child: Bounds, frame: Dimensions, threshold: f64) -> bool {
    let frame_area = frame.area();
    if frame_area <= 0.0 {
        return false;
    }
    child.overlap_area(frame.to_bounds()) / frame_area >= threshold
}

/// Analyze `root` without mutating anything.
///
/// `background_hint` marks an externally identified background node, which is excluded from
/// content bounds regardless of its coverage.
#[tracing::instrument(skip(doc, cfg))]
pub fn analyze_content(
    doc: &Document,
    root: NodeId,
    cfg: &AnalysisConfig,
    background_hint: Option<NodeId>,
) -> ReframeResult<ContentAnalysis> {
    let root_node = doc.node(root)?;
    let frame = root_node.bounds.dimensions().sanitized();
    let frame_bounds = frame.to_bounds();
    let layout_direction = root_node
        .layout()
        .map(|l| l.mode)
        .unwrap_or(LayoutMode::None);

    let mut child_count = 0usize;
    let mut content: Option<Bounds> = None;
    let mut covered_area = 0.0f64;
    for &child in doc.children(root) {
        let node = doc.node(child)?;
        if !node.visible || node.bounds.is_empty() {
            continue;
        }
        child_count += 1;
        if Some(child) == background_hint
            || is_background_like(node.bounds, frame, cfg.background_coverage)
        {
            continue;
        }
        let clipped = node.bounds.intersection(frame_bounds);
        if clipped.is_empty() {
            continue;
        }
        covered_area += clipped.area();
        content = Some(match content {
            Some(acc) => acc.union(clipped),
            None => clipped,
        });
    }

    let mut has_text = false;
    let mut has_images = false;
    for (id, _) in doc.descendants(root, cfg.max_walk_depth) {
        let node = doc.node(id)?;
        if !node.visible {
            continue;
        }
        has_text |= matches!(node.kind, NodeKind::Text(_));
        has_images |= node.has_image_fill();
        if has_text && has_images {
            break;
        }
    }

    let coverage = (covered_area / frame.area()).min(1.0);
    let content_density = if child_count >= cfg.dense_min_children || coverage > cfg.dense_coverage
    {
        ContentDensity::Dense
    } else if child_count <= cfg.sparse_max_children && coverage < cfg.sparse_coverage {
        ContentDensity::Sparse
    } else {
        ContentDensity::Normal
    };

    let has_auto_layout = layout_direction != LayoutMode::None;
    let recommended_strategy = if has_auto_layout {
        ScalingStrategy::Adaptive
    } else if content.is_none() && has_images {
        ScalingStrategy::Fill
    } else if content_density == ContentDensity::Sparse {
        ScalingStrategy::Adaptive
    } else {
        ScalingStrategy::Proportional
    };

    let actual_content_bounds = content.unwrap_or(frame_bounds);
    let analysis = ContentAnalysis {
        actual_content_bounds,
        has_auto_layout,
        layout_direction,
        child_count,
        has_text,
        has_images,
        content_density,
        recommended_strategy,
        effective_width: actual_content_bounds.width,
        effective_height: actual_content_bounds.height,
    };
    tracing::debug!(
        child_count,
        coverage,
        density = ?analysis.content_density,
        strategy = ?analysis.recommended_strategy,
        "content analyzed"
    );
    Ok(analysis)
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/content.rs"]
mod tests;
