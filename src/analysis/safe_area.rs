use crate::foundation::{
    core::{Bounds, Dimensions},
    math::finite_or,
};

/// Per-side distances from the frame edges to the safe rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SafeAreaInsets {
    /// Left inset.
    pub left: f64,
    /// Right inset.
    pub right: f64,
    /// Top inset.
    pub top: f64,
    /// Bottom inset.
    pub bottom: f64,
}

/// Platform surfaces with fixed UI chrome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeZoneProfile {
    /// TikTok feed video.
    Tiktok,
    /// Instagram story.
    InstagramStory,
    /// Instagram reel.
    InstagramReel,
    /// YouTube Shorts.
    YoutubeShorts,
}

/// Platform insets are specified against this canvas and scaled to the target.
const REFERENCE: Dimensions = Dimensions::new(1080.0, 1920.0);

impl SafeZoneProfile {
    /// `(left, right, top, bottom)` in reference pixels.
    fn reference_insets(self) -> (f64, f64, f64, f64) {
        match self {
            SafeZoneProfile::Tiktok => (60.0, 120.0, 150.0, 320.0),
            SafeZoneProfile::InstagramStory => (64.0, 64.0, 250.0, 250.0),
            SafeZoneProfile::InstagramReel => (64.0, 120.0, 220.0, 420.0),
            SafeZoneProfile::YoutubeShorts => (48.0, 144.0, 120.0, 360.0),
        }
    }
}

impl SafeAreaInsets {
    /// Symmetric insets leaving `ratio` of each dimension usable.
    ///
    /// `insets = dimension * (1 - ratio) / 2`; non-finite ratios mean no insets.
    pub fn from_ratio(frame: Dimensions, ratio: f64) -> Self {
        let ratio = finite_or(ratio, 1.0).clamp(0.0, 1.0);
        let x = frame.width * (1.0 - ratio) / 2.0;
        let y = frame.height * (1.0 - ratio) / 2.0;
        SafeAreaInsets {
            left: x,
            right: x,
            top: y,
            bottom: y,
        }
        .clamped(frame)
    }

    /// Fixed platform insets scaled from the 1080×1920 reference to `frame`.
    pub fn from_profile(frame: Dimensions, profile: SafeZoneProfile) -> Self {
        let (l, r, t, b) = profile.reference_insets();
        let sx = frame.width / REFERENCE.width;
        let sy = frame.height / REFERENCE.height;
        SafeAreaInsets {
            left: l * sx,
            right: r * sx,
            top: t * sy,
            bottom: b * sy,
        }
        .clamped(frame)
    }

    /// Enforce `0 <= inset <= dimension / 2` on every side.
    pub fn clamped(self, frame: Dimensions) -> Self {
        let half_w = (frame.width / 2.0).max(0.0);
        let half_h = (frame.height / 2.0).max(0.0);
        let side = |v: f64, half: f64| finite_or(v, 0.0).clamp(0.0, half);
        SafeAreaInsets {
            left: side(self.left, half_w),
            right: side(self.right, half_w),
            top: side(self.top, half_h),
            bottom: side(self.bottom, half_h),
        }
    }

    /// The safe rectangle inside a frame of size `frame`.
    pub fn safe_bounds(self, frame: Dimensions) -> Bounds {
        let c = self.clamped(frame);
        Bounds::new(
            c.left,
            c.top,
            (frame.width - c.left - c.right).max(0.0),
            (frame.height - c.top - c.bottom).max(0.0),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analysis/safe_area.rs"]
mod tests;
