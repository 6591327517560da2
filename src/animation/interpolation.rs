use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Values a tween can blend between
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

/// Weighted blend `t * end + (1 - t) * start`.
///
/// Unlike `start + (end - start) * t` this returns exactly `start` at 0 and
/// exactly `end` at 1.
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    t * end + (1.0 - t) * start
}

/// Maps normalized time onto normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// Constant speed, used for marker moves by default
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseOutCubic,
    EaseInOutSine,
}

impl EasingFunction {
    /// Progress at `t`, clamped to [0, 1] first. Every curve maps 0 to 0 and
    /// 1 to 1.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - rest * rest,
            Self::EaseInOutQuad if t < 0.5 => 2.0 * t * t,
            Self::EaseInOutQuad => 1.0 - 2.0 * rest * rest,
            Self::EaseOutCubic => 1.0 - rest * rest * rest,
            Self::EaseInOutSine => (1.0 - (std::f64::consts::PI * t).cos()) / 2.0,
        }
    }
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        lerp(*self, *other, t)
    }
}

impl Interpolatable for LatLng {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        LatLng::new(lerp(self.lat, other.lat, t), lerp(self.lng, other.lng, t))
    }
}
