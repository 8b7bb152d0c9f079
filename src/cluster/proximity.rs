use std::time::{Duration, Instant};

use crate::{
    analysis::content::is_background_like,
    config::ClusterConfig,
    document::flow::layout_flow_children,
    document::model::{
        AutoLayout, AxisSizing, Document, LayoutMode, NodeId, NodeKind, Positioning,
    },
    foundation::core::{Axis, Bounds, Dimensions},
    foundation::error::{ReframeError, ReframeResult},
    foundation::math::{median, variance},
};

const EDGE_NAME_HINTS: [&str; 6] = ["logo", "badge", "watermark", "sticker", "corner", "tag"];

/// Arrangement of a cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterDirection {
    /// Members form a row.
    Horizontal,
    /// Members form a column.
    Vertical,
    /// No dominant axis.
    Chaotic,
}

impl ClusterDirection {
    fn axis(self) -> Option<Axis> {
        match self {
            ClusterDirection::Horizontal => Some(Axis::Horizontal),
            ClusterDirection::Vertical => Some(Axis::Vertical),
            ClusterDirection::Chaotic => None,
        }
    }

    fn layout_mode(self) -> LayoutMode {
        match self {
            ClusterDirection::Horizontal => LayoutMode::Horizontal,
            ClusterDirection::Vertical => LayoutMode::Vertical,
            ClusterDirection::Chaotic => LayoutMode::None,
        }
    }
}

/// Whether a member would join the synthesized flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionRole {
    /// Participates in the flow.
    Flow,
    /// Background-covering or corner-floating; stays free.
    Absolute,
}

/// Candidate member of a cluster.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProximityElement {
    /// Node handle.
    pub node: NodeId,
    /// Parent-relative bounds at detection time.
    pub bounds: Bounds,
    /// Container the node lives in.
    pub parent_container: NodeId,
    /// Classified role.
    pub role: PositionRole,
}

/// Spatially inferred group proposed for a new flow container.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProximityCluster {
    /// Members in detection order.
    pub elements: Vec<ProximityElement>,
    /// Inferred flow direction.
    pub recommended_direction: ClusterDirection,
    /// `0..=1`; how clearly one axis wins.
    pub direction_confidence: f64,
    /// Median consecutive gap along the direction.
    pub inferred_spacing: f64,
    /// Union of member bounds.
    pub bounds: Bounds,
}

/// Cluster that failed validation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RejectedCluster {
    /// Members.
    pub members: Vec<NodeId>,
    /// Why it was rejected.
    pub reason: String,
}

/// Result of a clustering pass. Never an error; failures are listed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClusteringOutcome {
    /// No per-cluster errors.
    pub success: bool,
    /// Synthesized containers, in creation order.
    pub containers: Vec<NodeId>,
    /// Clusters that produced a container.
    pub clusters: Vec<ProximityCluster>,
    /// Clusters that failed validation.
    pub rejected: Vec<RejectedCluster>,
    /// Per-cluster mutation failures.
    pub errors: Vec<String>,
    /// Non-fatal notes, including deadline overruns.
    pub warnings: Vec<String>,
    /// The soft deadline stopped the pass early.
    pub timed_out: bool,
}

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }

    /// Groups in order of their smallest member.
    fn groups(&mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            let r = self.find(i);
            by_root[r].push(i);
        }
        let mut groups: Vec<Vec<usize>> = by_root.into_iter().filter(|g| !g.is_empty()).collect();
        groups.sort_by_key(|g| g[0]);
        groups
    }
}

/// Arrangement of `bounds` from the variance of their centers. The axis with the tighter
/// alignment wins; a single element is chaotic.
pub fn classify_direction(bounds: &[Bounds], chaotic_below: f64) -> (ClusterDirection, f64) {
    if bounds.len() < 2 {
        return (ClusterDirection::Chaotic, 0.0);
    }
    let xs: Vec<f64> = bounds.iter().map(|b| b.center().x).collect();
    let ys: Vec<f64> = bounds.iter().map(|b| b.center().y).collect();
    let (var_x, var_y) = (variance(&xs), variance(&ys));
    let spread = var_x.max(var_y);
    if spread <= f64::EPSILON {
        return (ClusterDirection::Chaotic, 0.0);
    }
    let confidence = 1.0 - var_x.min(var_y) / spread;
    let direction = if confidence < chaotic_below {
        ClusterDirection::Chaotic
    } else if var_y <= var_x {
        ClusterDirection::Horizontal
    } else {
        ClusterDirection::Vertical
    };
    (direction, confidence)
}

/// Median of consecutive gaps along `direction`; zero for chaotic or single-member groups.
pub fn infer_spacing(bounds: &[Bounds], direction: ClusterDirection) -> f64 {
    let Some(axis) = direction.axis() else {
        return 0.0;
    };
    let mut sorted: Vec<Bounds> = bounds.to_vec();
    sorted.sort_by(|a, b| axis.start_of(*a).total_cmp(&axis.start_of(*b)));
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (axis.start_of(w[1]) - (axis.start_of(w[0]) + axis.len_of(w[0]))).max(0.0))
        .collect();
    median(&gaps).unwrap_or(0.0)
}

/// Role of one member inside a `parent`-sized container.
pub fn classify_role(
    bounds: Bounds,
    name: &str,
    parent: Dimensions,
    cfg: &ClusterConfig,
    background_coverage: f64,
) -> PositionRole {
    if is_background_like(bounds, parent, background_coverage) {
        return PositionRole::Absolute;
    }
    let small = bounds.area() <= parent.area() * cfg.edge_max_area_ratio;
    if !small {
        return PositionRole::Flow;
    }
    let zone_w = parent.width * cfg.edge_corner_zone;
    let zone_h = parent.height * cfg.edge_corner_zone;
    let c = bounds.center();
    let near_x = c.x <= zone_w || c.x >= parent.width - zone_w;
    let near_y = c.y <= zone_h || c.y >= parent.height - zone_h;
    let lower = name.to_ascii_lowercase();
    if (near_x && near_y) || EDGE_NAME_HINTS.iter().any(|h| lower.contains(h)) {
        PositionRole::Absolute
    } else {
        PositionRole::Flow
    }
}

/// Split a chaotic group into rows and columns of at least two members.
fn rows_and_columns(indices: &[usize], bounds: &[Bounds]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    for axis in [Axis::Vertical, Axis::Horizontal] {
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            axis.start_of(bounds[a])
                .total_cmp(&axis.start_of(bounds[b]))
        });
        // A band collects members whose center falls inside its span on `axis`.
        let mut bands: Vec<(f64, f64, Vec<usize>)> = Vec::new();
        for i in sorted {
            let b = bounds[i];
            let center = match axis {
                Axis::Horizontal => b.center().x,
                Axis::Vertical => b.center().y,
            };
            match bands
                .iter_mut()
                .find(|(lo, hi, _)| center >= *lo && center <= *hi)
            {
                Some(band) => band.2.push(i),
                None => bands.push((
                    axis.start_of(b),
                    axis.start_of(b) + axis.len_of(b),
                    vec![i],
                )),
            }
        }
        out.extend(bands.into_iter().map(|(_, _, m)| m).filter(|m| m.len() >= 2));
    }
    out
}

/// Detect clusters among the loose children of `container` without mutating anything.
///
/// Flow containers, atomic groups and background-like children are never clustered.
pub fn detect_clusters(
    doc: &Document,
    container: NodeId,
    cfg: &ClusterConfig,
    background_coverage: f64,
) -> ReframeResult<Vec<ProximityCluster>> {
    let parent = doc.node(container)?;
    if !matches!(parent.kind, NodeKind::Container { .. }) {
        return Err(ReframeError::validation(format!(
            "node '{}' is not a container",
            parent.name
        )));
    }
    if parent.has_auto_layout() || doc.is_atomic(container) || doc.is_inside_atomic(container) {
        return Ok(Vec::new());
    }
    let frame = parent.bounds.dimensions();

    let mut members: Vec<(NodeId, Bounds, String)> = Vec::new();
    for &child in doc.children(container) {
        let n = doc.node(child)?;
        if !n.visible || n.bounds.is_empty() {
            continue;
        }
        if is_background_like(n.bounds, frame, background_coverage) {
            continue;
        }
        members.push((child, n.bounds, n.name.clone()));
    }
    let bounds: Vec<Bounds> = members.iter().map(|m| m.1).collect();

    let mut uf = UnionFind::new(members.len());
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            if bounds[i].gap_to(bounds[j]) <= cfg.distance_threshold_px {
                uf.union(i, j);
            }
        }
    }

    let mut candidates: Vec<Vec<usize>> = Vec::new();
    for group in uf.groups().into_iter().filter(|g| g.len() >= 2) {
        let group_bounds: Vec<Bounds> = group.iter().map(|&i| bounds[i]).collect();
        let (direction, _) = classify_direction(&group_bounds, cfg.chaotic_below);
        if direction == ClusterDirection::Chaotic {
            candidates.extend(rows_and_columns(&group, &bounds));
        } else {
            candidates.push(group);
        }
    }

    // Larger groups win overlaps; ties keep detection order.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    let mut taken = vec![false; members.len()];
    let mut clusters = Vec::new();
    for candidate in candidates {
        if candidate.iter().any(|&i| taken[i]) {
            continue;
        }
        for &i in &candidate {
            taken[i] = true;
        }
        let cb: Vec<Bounds> = candidate.iter().map(|&i| bounds[i]).collect();
        let (direction, confidence) = classify_direction(&cb, cfg.chaotic_below);
        let union = cb.iter().skip(1).fold(cb[0], |acc, b| acc.union(*b));
        clusters.push(ProximityCluster {
            elements: candidate
                .iter()
                .map(|&i| ProximityElement {
                    node: members[i].0,
                    bounds: bounds[i],
                    parent_container: container,
                    role: classify_role(bounds[i], &members[i].2, frame, cfg, background_coverage),
                })
                .collect(),
            recommended_direction: direction,
            direction_confidence: confidence,
            inferred_spacing: infer_spacing(&cb, direction),
            bounds: union,
        });
    }
    Ok(clusters)
}

/// Why `cluster` must not become a container, if anything.
fn rejection_reason(cluster: &ProximityCluster, cfg: &ClusterConfig) -> Option<String> {
    if cluster.recommended_direction == ClusterDirection::Chaotic {
        return Some("no dominant direction".to_string());
    }
    if cluster.direction_confidence < cfg.confidence_threshold {
        return Some(format!(
            "direction confidence {:.2} below {:.2}",
            cluster.direction_confidence, cfg.confidence_threshold
        ));
    }
    let absolute = cluster
        .elements
        .iter()
        .filter(|e| e.role == PositionRole::Absolute)
        .count();
    if absolute * 2 > cluster.elements.len() {
        return Some(format!(
            "{absolute} of {} members are absolutely positioned",
            cluster.elements.len()
        ));
    }
    None
}

fn synthesize_one(
    doc: &mut Document,
    container: NodeId,
    cluster: &ProximityCluster,
    ordinal: usize,
) -> ReframeResult<NodeId> {
    let Some(axis) = cluster.recommended_direction.axis() else {
        return Err(ReframeError::validation("chaotic cluster has no flow axis"));
    };
    let mut flow: Vec<&ProximityElement> = cluster
        .elements
        .iter()
        .filter(|e| e.role == PositionRole::Flow)
        .collect();
    if flow.is_empty() {
        return Err(ReframeError::validation("cluster has no flow members"));
    }
    for e in &flow {
        let node = doc.node(e.node)?;
        if node.locked {
            return Err(ReframeError::mutation(format!(
                "member '{}' is locked",
                node.name
            )));
        }
    }
    flow.sort_by(|a, b| axis.start_of(a.bounds).total_cmp(&axis.start_of(b.bounds)));
    let bounds = flow
        .iter()
        .skip(1)
        .fold(flow[0].bounds, |acc, e| acc.union(e.bounds));

    let index = doc
        .children(container)
        .iter()
        .position(|c| flow.iter().any(|e| e.node == *c))
        .unwrap_or(0);
    let layout = AutoLayout {
        mode: cluster.recommended_direction.layout_mode(),
        item_spacing: cluster.inferred_spacing,
        primary_sizing: AxisSizing::Auto,
        counter_sizing: AxisSizing::Auto,
        ..AutoLayout::default()
    };
    let id = doc.create_container(
        container,
        index,
        format!("Cluster {ordinal}"),
        bounds,
        layout,
    )?;
    for e in &flow {
        doc.append_child(id, e.node)?;
        doc.set_position(e.node, e.bounds.x - bounds.x, e.bounds.y - bounds.y)?;
        doc.set_positioning(e.node, Positioning::Auto)?;
    }
    layout_flow_children(doc, id)?;
    Ok(id)
}

/// Detect clusters under `container` and synthesize a flow container for each accepted one.
///
/// The elapsed time is checked before each cluster; once `budget` is spent the remaining
/// clusters are abandoned with a warning. Containers already created stay in place.
#[tracing::instrument(skip(doc, cfg))]
pub fn synthesize_clusters(
    doc: &mut Document,
    container: NodeId,
    cfg: &ClusterConfig,
    background_coverage: f64,
    budget: Duration,
) -> ClusteringOutcome {
    let start = Instant::now();
    let mut outcome = ClusteringOutcome::default();
    let detected = match detect_clusters(doc, container, cfg, background_coverage) {
        Ok(c) => c,
        Err(e) => {
            outcome.errors.push(format!("cluster detection failed: {e}"));
            return outcome;
        }
    };

    let total = detected.len();
    for (i, cluster) in detected.into_iter().enumerate() {
        if start.elapsed() >= budget {
            let msg = format!(
                "clustering deadline of {}ms exceeded after {i} of {total} clusters",
                budget.as_millis()
            );
            tracing::warn!(processed = i, total, "{msg}");
            outcome.warnings.push(msg);
            outcome.timed_out = true;
            break;
        }
        let members: Vec<NodeId> = cluster.elements.iter().map(|e| e.node).collect();
        if let Some(reason) = rejection_reason(&cluster, cfg) {
            tracing::debug!(?members, %reason, "cluster rejected");
            outcome.rejected.push(RejectedCluster { members, reason });
            continue;
        }
        match synthesize_one(doc, container, &cluster, outcome.containers.len() + 1) {
            Ok(id) => {
                tracing::debug!(container = ?id, members = members.len(), "cluster synthesized");
                outcome.containers.push(id);
                outcome.clusters.push(cluster);
            }
            Err(e) => {
                tracing::warn!(?members, error = %e, "cluster synthesis failed");
                outcome.errors.push(format!("cluster {}: {e}", i + 1));
            }
        }
    }
    outcome.success = outcome.errors.is_empty();
    outcome
}

#[cfg(test)]
#[path = "../../tests/unit/cluster/proximity.rs"]
mod tests;
