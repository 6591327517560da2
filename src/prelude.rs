//! Prelude module for common maputil types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maputil::prelude::*;`

pub use crate::core::{
    builder::MapToolkitBuilder,
    config::{
        AnimationProfile, CameraConfig, IconConfig, MapUtilOptions, MarkerAnimationConfig,
    },
    geo::{LatLng, LatLngBounds, Point},
    map::ViewportMap,
    toolkit::MapToolkit,
    viewport::Viewport,
};

pub use crate::layers::{
    marker::Marker,
    options::{MapMarker, MarkerOptions},
};

pub use crate::animation::{
    interpolation::{EasingFunction, Interpolatable},
    marker::{AnimationHandle, CompletionVisibility, MarkerAnimator},
    tweening::{Tween, TweenSample, TweenState},
};

pub use crate::rendering::{
    camera::{CameraPosition, CameraUpdate},
    icon::{Bitmap, IconResource, MarkerLayout},
};

#[cfg(feature = "render")]
pub use crate::rendering::icon::IconRasterizer;

pub use crate::runtime::{ManualClock, ManualScheduler, SystemClock, TaskHandle};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::TokioScheduler;

pub use crate::traits::{
    Clock, FrameScheduler, FrameTask, HostMap, MarkerHandle, MarkerId, Projection,
    ViewRasterizer,
};

pub use crate::{MapError, Result};

// Re-export commonly used external types
pub use fxhash::FxHashMap as HashMap;
pub use std::sync::Arc;
pub use std::time::Duration;
