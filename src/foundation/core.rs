pub use kurbo::{Point, Rect, Vec2};

/// Pixel rectangle, frame-relative unless stated otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels; never negative after [`Bounds::sanitized`].
    pub width: f64,
    /// Height in pixels; never negative after [`Bounds::sanitized`].
    pub height: f64,
}

impl Bounds {
    /// Construct bounds from origin and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert from a kurbo rectangle (normalized first).
    pub fn from_rect(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }

    /// Convert into a kurbo rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.width.max(0.0),
            self.y + self.height.max(0.0),
        )
    }

    /// Right edge.
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Geometric center.
    pub fn center(self) -> Point {
        self.to_rect().center()
    }

    /// Area, zero for degenerate rectangles.
    pub fn area(self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// `true` when either dimension is zero, negative or not finite.
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Size of this rectangle.
    pub fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Intersection rectangle; zero-sized when the operands only touch or are disjoint.
    pub fn intersection(self, other: Bounds) -> Bounds {
        Bounds::from_rect(self.to_rect().intersect(other.to_rect()))
    }

    /// Overlap area of two axis-aligned rectangles. Commutative.
    pub fn overlap_area(self, other: Bounds) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        self.intersection(other).area()
    }

    /// Share of `self` covered by `other`, in percent `[0, 100]`.
    pub fn overlap_percent(self, other: Bounds) -> f64 {
        let own = self.area();
        if own <= 0.0 {
            return 0.0;
        }
        (self.overlap_area(other) / own * 100.0).clamp(0.0, 100.0)
    }

    /// Smallest rectangle containing both operands.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds::from_rect(self.to_rect().union(other.to_rect()))
    }

    /// Bounds shifted by `delta`.
    pub fn translate(self, delta: Vec2) -> Bounds {
        Bounds::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Bounds with every field multiplied by `s`.
    pub fn scaled(self, s: f64) -> Bounds {
        Bounds::new(self.x * s, self.y * s, self.width * s, self.height * s)
    }

    /// Clearance between two rectangles; zero when they touch or overlap.
    pub fn gap_to(self, other: Bounds) -> f64 {
        let dx = (other.x - self.right()).max(self.x - other.right()).max(0.0);
        let dy = (other.y - self.bottom()).max(self.y - other.bottom()).max(0.0);
        dx.hypot(dy)
    }

    /// `true` when `other` lies fully inside `self` (edges inclusive).
    pub fn contains_bounds(self, other: Bounds) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Move (never resize) so the rectangle lies within `area` where it fits.
    ///
    /// When the rectangle is larger than `area` on an axis, it is pinned to the
    /// area's leading edge on that axis.
    pub fn clamp_position_within(self, area: Bounds) -> Bounds {
        let max_x = area.right() - self.width;
        let max_y = area.bottom() - self.height;
        Bounds::new(
            self.x.min(max_x).max(area.x),
            self.y.min(max_y).max(area.y),
            self.width,
            self.height,
        )
    }

    /// Replace non-finite fields and enforce the 1px minimum dimension.
    pub fn sanitized(self) -> Bounds {
        fn finite_or(v: f64, fallback: f64) -> f64 {
            if v.is_finite() { v } else { fallback }
        }
        Bounds::new(
            finite_or(self.x, 0.0),
            finite_or(self.y, 0.0),
            finite_or(self.width, 1.0).max(1.0),
            finite_or(self.height, 1.0).max(1.0),
        )
    }
}

/// Width/height pair for frames and targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Dimensions {
    /// Construct dimensions.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`; `1.0` for degenerate input.
    pub fn aspect_ratio(self) -> f64 {
        let d = self.sanitized();
        d.width / d.height
    }

    /// Clamp to finite values with a 1px minimum.
    pub fn sanitized(self) -> Dimensions {
        fn dim(v: f64) -> f64 {
            if v.is_finite() { v.max(1.0) } else { 1.0 }
        }
        Dimensions::new(dim(self.width), dim(self.height))
    }

    /// Area in square pixels.
    pub fn area(self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Both dimensions multiplied by `s`.
    pub fn scaled(self, s: f64) -> Dimensions {
        Dimensions::new(self.width * s, self.height * s)
    }

    /// Rectangle of this size at the origin.
    pub fn to_bounds(self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// Per-side lengths (padding or insets) in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edges {
    /// Left side.
    #[serde(default)]
    pub left: f64,
    /// Right side.
    #[serde(default)]
    pub right: f64,
    /// Top side.
    #[serde(default)]
    pub top: f64,
    /// Bottom side.
    #[serde(default)]
    pub bottom: f64,
}

impl Edges {
    /// Same length on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            left: v,
            right: v,
            top: v,
            bottom: v,
        }
    }

    /// Every side multiplied by `s`.
    pub fn scaled(self, s: f64) -> Edges {
        Edges {
            left: self.left * s,
            right: self.right * s,
            top: self.top * s,
            bottom: self.bottom * s,
        }
    }

    /// `left + right`.
    pub fn horizontal(self) -> f64 {
        self.left + self.right
    }

    /// `top + bottom`.
    pub fn vertical(self) -> f64 {
        self.top + self.bottom
    }
}

/// Layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// X axis.
    Horizontal,
    /// Y axis.
    Vertical,
}

impl Axis {
    /// The other axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Leading coordinate of `b` on this axis.
    pub fn start_of(self, b: Bounds) -> f64 {
        match self {
            Axis::Horizontal => b.x,
            Axis::Vertical => b.y,
        }
    }

    /// Extent of `b` on this axis.
    pub fn len_of(self, b: Bounds) -> f64 {
        match self {
            Axis::Horizontal => b.width,
            Axis::Vertical => b.height,
        }
    }

    /// Extent of `d` on this axis.
    pub fn dim_of(self, d: Dimensions) -> f64 {
        match self {
            Axis::Horizontal => d.width,
            Axis::Vertical => d.height,
        }
    }

    /// Leading and trailing edges of `e` on this axis.
    pub fn edges_of(self, e: Edges) -> (f64, f64) {
        match self {
            Axis::Horizontal => (e.left, e.right),
            Axis::Vertical => (e.top, e.bottom),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
