use crate::foundation::core::{Bounds, Vec2};

/// Coarse samples along the nudge ray before bisecting.
const COARSE_STEPS: usize = 32;
/// Bisection iterations inside the first clearing step.
const BISECT_STEPS: usize = 24;
/// Center distance below which the direction falls back to the diagonal.
const DIRECTION_EPS: f64 = 1e-9;

/// Overlap between the text rectangle and one face.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceOverlap {
    /// Index into the face slice.
    pub face_index: usize,
    /// Overlap area in square pixels.
    pub area: f64,
    /// Share of the text rectangle covered, `0..=100`.
    pub percent: f64,
}

/// A relocated text rectangle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NudgeResult {
    /// New rectangle, always inside the safe bounds.
    pub bounds: Bounds,
    /// Unit direction that was searched.
    pub direction: Vec2,
    /// Distance travelled along `direction` before clamping.
    pub distance: f64,
    /// Face overlap area left at the new position.
    pub residual_overlap: f64,
}

impl NudgeResult {
    /// `true` when the new position clears every face.
    pub fn resolved(&self) -> bool {
        self.residual_overlap <= 0.0
    }
}

/// Every face the text rectangle overlaps with a positive area.
pub fn detect_overlaps(text: Bounds, faces: &[Bounds]) -> Vec<FaceOverlap> {
    faces
        .iter()
        .enumerate()
        .filter_map(|(face_index, face)| {
            let area = text.overlap_area(*face);
            (area > 0.0).then(|| FaceOverlap {
                face_index,
                area,
                percent: text.overlap_percent(*face),
            })
        })
        .collect()
}

fn total_overlap(text: Bounds, faces: &[Bounds]) -> f64 {
    faces.iter().map(|f| text.overlap_area(*f)).sum()
}

/// Move `text` away from `faces` (pixel rectangles) while staying inside `safe`.
///
/// Returns `None` when nothing overlaps. Otherwise searches the smallest distance along
/// the ray from the nearest overlapping face center through the text center at which
/// the summed overlap reaches zero, clamping into `safe` at every step. When no distance
/// clears the faces the least-overlapping sample is returned with its residual overlap.
pub fn nudge_text_away_from_faces(
    text: Bounds,
    faces: &[Bounds],
    safe: Bounds,
) -> Option<NudgeResult> {
    let overlaps = detect_overlaps(text, faces);
    if overlaps.is_empty() {
        return None;
    }

    let sized = Bounds::new(
        text.x,
        text.y,
        text.width.min(safe.width).max(0.0),
        text.height.min(safe.height).max(0.0),
    );
    let text_center = sized.center();
    let nearest = overlaps
        .iter()
        .map(|o| faces[o.face_index].center())
        .min_by(|a, b| {
            a.distance(text_center)
                .total_cmp(&b.distance(text_center))
        })?;
    let away = text_center - nearest;
    let direction = if away.hypot() < DIRECTION_EPS {
        Vec2::new(1.0, 1.0).normalize()
    } else {
        away.normalize()
    };

    let place = |d: f64| sized.translate(direction * d).clamp_position_within(safe);

    let reach = safe.width.hypot(safe.height) + text.width.hypot(text.height);
    let step = reach / COARSE_STEPS as f64;

    let mut best = (0.0, place(0.0), total_overlap(place(0.0), faces));
    let mut prev = 0.0;
    for i in 0..=COARSE_STEPS {
        let d = step * i as f64;
        let candidate = place(d);
        let overlap = total_overlap(candidate, faces);
        if overlap <= 0.0 {
            let (mut lo, mut hi) = (prev, d);
            if i > 0 {
                for _ in 0..BISECT_STEPS {
                    let mid = (lo + hi) / 2.0;
                    if total_overlap(place(mid), faces) > 0.0 {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
            }
            let bounds = place(hi);
            tracing::debug!(distance = hi, "text nudged clear of faces");
            return Some(NudgeResult {
                bounds,
                direction,
                distance: hi,
                residual_overlap: 0.0,
            });
        }
        if overlap < best.2 {
            best = (d, candidate, overlap);
        }
        prev = d;
    }

    tracing::debug!(residual = best.2, "nudge could not clear faces");
    Some(NudgeResult {
        bounds: best.1,
        direction,
        distance: best.0,
        residual_overlap: best.2,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/placement/nudge.rs"]
mod tests;
