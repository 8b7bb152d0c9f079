use crate::foundation::core::Dimensions;

/// Below this ratio a target is extreme vertical (9:16 and taller).
pub const EXTREME_VERTICAL_MAX: f64 = 0.57;
/// Below this ratio a target is moderately vertical (4:5 territory starts above).
pub const MODERATE_VERTICAL_MAX: f64 = 0.75;
/// Lower bound of the square band (inclusive).
pub const SQUARE_MIN: f64 = 0.8;
/// Upper bound of the square band (inclusive).
pub const SQUARE_MAX: f64 = 1.2;
/// Above this ratio a target is moderately horizontal.
pub const MODERATE_HORIZONTAL_MIN: f64 = 1.6;
/// Above this ratio a target is extreme horizontal (banners).
pub const EXTREME_HORIZONTAL_MIN: f64 = 2.5;

/// Coarse aspect bucket that drives direction and alignment heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutProfile {
    /// Wider than tall.
    Horizontal,
    /// Roughly square.
    Square,
    /// Taller than wide.
    Vertical,
}

/// Finer aspect classification within a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectClass {
    /// `< 0.57`
    ExtremeVertical,
    /// `[0.57, 0.75)`
    ModerateVertical,
    /// `[0.75, 0.8)`
    NearSquarePortrait,
    /// `[0.8, 1.2]`
    Square,
    /// `(1.2, 1.6]`
    NearSquareLandscape,
    /// `(1.6, 2.5]`
    ModerateHorizontal,
    /// `> 2.5`
    ExtremeHorizontal,
}

impl AspectClass {
    /// Classify a `width / height` ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < EXTREME_VERTICAL_MAX {
            AspectClass::ExtremeVertical
        } else if ratio < MODERATE_VERTICAL_MAX {
            AspectClass::ModerateVertical
        } else if ratio < SQUARE_MIN {
            AspectClass::NearSquarePortrait
        } else if ratio <= SQUARE_MAX {
            AspectClass::Square
        } else if ratio <= MODERATE_HORIZONTAL_MIN {
            AspectClass::NearSquareLandscape
        } else if ratio <= EXTREME_HORIZONTAL_MIN {
            AspectClass::ModerateHorizontal
        } else {
            AspectClass::ExtremeHorizontal
        }
    }

    /// Profile this class belongs to.
    pub fn profile(self) -> LayoutProfile {
        match self {
            AspectClass::ExtremeVertical
            | AspectClass::ModerateVertical
            | AspectClass::NearSquarePortrait => LayoutProfile::Vertical,
            AspectClass::Square => LayoutProfile::Square,
            AspectClass::NearSquareLandscape
            | AspectClass::ModerateHorizontal
            | AspectClass::ExtremeHorizontal => LayoutProfile::Horizontal,
        }
    }
}

/// Aspect class of a target canvas. Degenerate dimensions classify as square.
pub fn classify_aspect(target: Dimensions) -> AspectClass {
    AspectClass::from_ratio(target.aspect_ratio())
}

/// Layout profile of a target canvas.
pub fn resolve_layout_profile(target: Dimensions) -> LayoutProfile {
    classify_aspect(target).profile()
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/profile.rs"]
mod tests;
