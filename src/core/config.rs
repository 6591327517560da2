//! Configuration for marker animation, camera helpers and marker icons
//!
//! Options are grouped per concern and can be picked from presets or built
//! by hand, then loaded from and saved to JSON.

use crate::animation::interpolation::EasingFunction;
use crate::animation::marker::CompletionVisibility;
use crate::core::constants::{DEFAULT_BOUNDS_PADDING, FRAME_INTERVAL_MS, MARKER_ANIMATION_DURATION_MS};
use crate::rendering::icon::{IconResource, MarkerLayout};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationProfile {
    /// One second linear move at ~60 Hz
    Standard,
    /// Short eased move for dense updates
    Fast,
    /// Jump straight to the target on the first tick
    Instant,
    Custom(MapUtilOptions),
}

impl AnimationProfile {
    pub fn resolve(&self) -> MapUtilOptions {
        match self {
            Self::Standard => MapUtilOptions::default(),
            Self::Fast => MapUtilOptions {
                animation: MarkerAnimationConfig {
                    duration_ms: 300,
                    frame_interval_ms: FRAME_INTERVAL_MS,
                    easing: EasingFunction::EaseOutQuad,
                    on_complete: CompletionVisibility::Show,
                    snap_start_to_pixel: false,
                },
                ..MapUtilOptions::default()
            },
            Self::Instant => MapUtilOptions {
                animation: MarkerAnimationConfig {
                    duration_ms: 0,
                    ..MarkerAnimationConfig::default()
                },
                ..MapUtilOptions::default()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for AnimationProfile {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapUtilOptions {
    pub animation: MarkerAnimationConfig,
    pub camera: CameraConfig,
    pub icon: IconConfig,
}

impl MapUtilOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerAnimationConfig {
    pub duration_ms: u64,
    /// Requested delay between ticks; hosts may deliver ticks later
    pub frame_interval_ms: u64,
    pub easing: EasingFunction,
    /// Marker visibility applied once the move completes
    pub on_complete: CompletionVisibility,
    /// Round the projected start position to a whole pixel before
    /// converting it back, like hosts with integer screen points do
    pub snap_start_to_pixel: bool,
}

impl MarkerAnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Delay between ticks, never below one millisecond
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Rejects settings a move cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(MapError::InvalidInput(
                "frame_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Rough number of ticks one move takes at the requested rate
    pub fn expected_ticks(&self) -> u64 {
        let interval = self.frame_interval_ms.max(1);
        let intervals = self.duration_ms / interval + u64::from(self.duration_ms % interval != 0);
        intervals.saturating_add(1)
    }
}

impl Default for MarkerAnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: MARKER_ANIMATION_DURATION_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            easing: EasingFunction::Linear,
            on_complete: CompletionVisibility::Show,
            snap_start_to_pixel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Padding used by `fit_markers` when the caller passes none
    pub bounds_padding: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            bounds_padding: DEFAULT_BOUNDS_PADDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub layout: MarkerLayout,
    /// Icon used for navigation markers
    pub navigation_icon: Option<IconResource>,
}
