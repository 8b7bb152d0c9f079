use crate::{
    analysis::profile::LayoutProfile,
    foundation::core::{Bounds, Dimensions, Point},
    foundation::math::{clamp01, finite_or},
};

/// Per-face penalty weight applied to `overlap share × confidence`.
const FACE_PENALTY_WEIGHT: f64 = 0.5;
/// Summed face penalty never exceeds this.
const FACE_PENALTY_CAP: f64 = 0.6;
/// Focal penalties apply only above this confidence.
const FOCAL_MIN_CONFIDENCE: f64 = 0.5;
/// Normalized radius of the focal falloff.
const FOCAL_RADIUS: f64 = 0.25;
/// Maximum focal penalty before confidence scaling.
const FOCAL_PENALTY_CAP: f64 = 0.25;

const FACE_MIN_SIZE: f64 = 0.03;
const FACE_MAX_SIZE: f64 = 0.80;

/// Detected face, normalized to `[0, 1]` of the frame. `x`/`y` are the face center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceRegion {
    /// Host key of the image node the face was detected in.
    #[serde(default)]
    pub node_id: String,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Detector confidence `[0, 1]`.
    pub confidence: f64,
}

impl FaceRegion {
    /// Copy with the invariants applied: center in `[0, 1]`, size in `[0.03, 0.80]`.
    pub fn normalized(&self) -> FaceRegion {
        FaceRegion {
            node_id: self.node_id.clone(),
            x: clamp01(finite_or(self.x, 0.5)),
            y: clamp01(finite_or(self.y, 0.5)),
            width: finite_or(self.width, FACE_MIN_SIZE).clamp(FACE_MIN_SIZE, FACE_MAX_SIZE),
            height: finite_or(self.height, FACE_MIN_SIZE).clamp(FACE_MIN_SIZE, FACE_MAX_SIZE),
            confidence: clamp01(self.confidence),
        }
    }

    /// Face rectangle in normalized frame space.
    pub fn normalized_bounds(&self) -> Bounds {
        let f = self.normalized();
        Bounds::new(f.x - f.width / 2.0, f.y - f.height / 2.0, f.width, f.height)
    }

    /// Face rectangle in pixels: `pixelX = (fx - fw/2) * frameW`, and so on.
    pub fn to_pixel_bounds(&self, frame: Dimensions) -> Bounds {
        let n = self.normalized_bounds();
        Bounds::new(
            n.x * frame.width,
            n.y * frame.height,
            n.width * frame.width,
            n.height * frame.height,
        )
    }
}

/// Visual focal point in normalized frame space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocalPoint {
    /// x in `[0, 1]`.
    pub x: f64,
    /// y in `[0, 1]`.
    pub y: f64,
    /// Confidence `[0, 1]`.
    pub confidence: f64,
}

/// Named cell of the 3×3 placement grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridRegion {
    /// Row 0, column 0.
    TopLeft,
    /// Row 0, column 1.
    TopCenter,
    /// Row 0, column 2.
    TopRight,
    /// Row 1, column 0.
    MiddleLeft,
    /// Row 1, column 1.
    MiddleCenter,
    /// Row 1, column 2.
    MiddleRight,
    /// Row 2, column 0.
    BottomLeft,
    /// Row 2, column 1.
    BottomCenter,
    /// Row 2, column 2.
    BottomRight,
}

impl GridRegion {
    /// All regions in row-major order.
    pub const ALL: [GridRegion; 9] = [
        GridRegion::TopLeft,
        GridRegion::TopCenter,
        GridRegion::TopRight,
        GridRegion::MiddleLeft,
        GridRegion::MiddleCenter,
        GridRegion::MiddleRight,
        GridRegion::BottomLeft,
        GridRegion::BottomCenter,
        GridRegion::BottomRight,
    ];

    fn index(self) -> usize {
        GridRegion::ALL
            .iter()
            .position(|r| *r == self)
            .unwrap_or_default()
    }

    /// Row `0..3`.
    pub fn row(self) -> usize {
        self.index() / 3
    }

    /// Column `0..3`.
    pub fn column(self) -> usize {
        self.index() % 3
    }
}

/// Score of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionScore {
    /// Cell.
    pub region_id: GridRegion,
    /// Profile heuristic.
    pub base_score: f64,
    /// Penalty from overlapping faces.
    pub face_avoidance: f64,
    /// Penalty from proximity to the focal point.
    pub focal_avoidance: f64,
    /// `max(0, base - face - focal)`.
    pub final_score: f64,
}

/// Grid shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDimensions {
    /// Rows.
    pub rows: u32,
    /// Columns.
    pub columns: u32,
}

/// Scores for every cell plus the winner. Recomputed per request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementScoring {
    /// Always 3×3.
    pub grid_dimensions: GridDimensions,
    /// One entry per cell, row-major.
    pub regions: Vec<RegionScore>,
    /// Cell with the highest final score.
    pub recommended_region: GridRegion,
}

impl PlacementScoring {
    /// Score of `region`.
    pub fn region(&self, region: GridRegion) -> Option<&RegionScore> {
        self.regions.iter().find(|r| r.region_id == region)
    }
}

/// Profile heuristic for text placement, row-major.
fn base_scores(profile: LayoutProfile) -> [f64; 9] {
    match profile {
        LayoutProfile::Vertical => [
            0.45, 0.55, 0.45, //
            0.50, 0.60, 0.50, //
            0.65, 0.80, 0.65,
        ],
        LayoutProfile::Square => [
            0.50, 0.60, 0.50, //
            0.50, 0.65, 0.50, //
            0.60, 0.75, 0.60,
        ],
        LayoutProfile::Horizontal => [
            0.55, 0.50, 0.70, //
            0.55, 0.55, 0.75, //
            0.55, 0.60, 0.70,
        ],
    }
}

/// Pixel rectangle of `region` inside `safe`.
pub fn region_bounds(safe: Bounds, region: GridRegion) -> Bounds {
    let w = safe.width / 3.0;
    let h = safe.height / 3.0;
    Bounds::new(
        safe.x + w * region.column() as f64,
        safe.y + h * region.row() as f64,
        w,
        h,
    )
}

/// Score the 3×3 grid over `safe` (pixels, frame-relative) for a frame of size `frame`.
///
/// With no faces and no confident focal point this reduces to the profile heuristic.
pub fn score_placement(
    profile: LayoutProfile,
    frame: Dimensions,
    safe: Bounds,
    faces: &[FaceRegion],
    focal: Option<FocalPoint>,
) -> PlacementScoring {
    let frame = frame.sanitized();
    let safe_norm = Bounds::new(
        safe.x / frame.width,
        safe.y / frame.height,
        safe.width / frame.width,
        safe.height / frame.height,
    );
    let faces: Vec<(Bounds, f64)> = faces
        .iter()
        .map(|f| (f.normalized_bounds(), clamp01(f.confidence)))
        .collect();
    let focal = focal.filter(|f| clamp01(f.confidence) > FOCAL_MIN_CONFIDENCE);
    let bases = base_scores(profile);

    let regions: Vec<RegionScore> = GridRegion::ALL
        .iter()
        .zip(bases)
        .map(|(&region, base_score)| {
            let cell = region_bounds(safe_norm, region);
            let face_avoidance = face_penalty(cell, &faces);
            let focal_avoidance = focal.map_or(0.0, |f| focal_penalty(cell.center(), f));
            RegionScore {
                region_id: region,
                base_score,
                face_avoidance,
                focal_avoidance,
                final_score: (base_score - face_avoidance - focal_avoidance).max(0.0),
            }
        })
        .collect();

    let mut best = regions[0];
    for r in &regions[1..] {
        if r.final_score > best.final_score {
            best = *r;
        }
    }
    tracing::debug!(
        ?profile,
        faces = faces.len(),
        recommended = ?best.region_id,
        "placement scored"
    );
    PlacementScoring {
        grid_dimensions: GridDimensions {
            rows: 3,
            columns: 3,
        },
        regions,
        recommended_region: best.region_id,
    }
}

fn face_penalty(cell: Bounds, faces: &[(Bounds, f64)]) -> f64 {
    let cell_area = cell.area();
    if cell_area <= 0.0 {
        return 0.0;
    }
    let sum: f64 = faces
        .iter()
        .map(|(face, confidence)| {
            let share = cell.overlap_area(*face) / cell_area;
            share * confidence * FACE_PENALTY_WEIGHT
        })
        .sum();
    sum.min(FACE_PENALTY_CAP)
}

fn focal_penalty(cell_center: Point, focal: FocalPoint) -> f64 {
    let d = cell_center.distance(Point::new(focal.x, focal.y));
    if !d.is_finite() || d >= FOCAL_RADIUS {
        return 0.0;
    }
    let falloff = (1.0 - d / FOCAL_RADIUS) * FOCAL_PENALTY_CAP;
    falloff.min(FOCAL_PENALTY_CAP) * clamp01(focal.confidence)
}

#[cfg(test)]
#[path = "../../tests/unit/placement/scoring.rs"]
mod tests;
