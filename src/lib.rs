//! # maputil
//!
//! Helpers for driving a host map renderer: smooth marker moves, marker
//! option builders, camera moves and fit-to-markers, and marker icon
//! rasterization.
//!
//! The crate does not draw maps itself. It talks to the host through the
//! capability traits in [`traits`] and ships an in-process
//! [`core::map::ViewportMap`] plus virtual-time runtime pieces for headless
//! use and tests.

pub mod animation;
pub mod core;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{AnimationProfile, MapUtilOptions},
    geo::{LatLng, LatLngBounds, Point},
    map::ViewportMap,
    toolkit::MapToolkit,
    viewport::Viewport,
};

pub use layers::{marker::Marker, options::{MapMarker, MarkerOptions}};

pub use animation::{
    marker::{AnimationHandle, CompletionVisibility, MarkerAnimator},
    tweening::Tween,
};

pub use rendering::{
    camera::{CameraPosition, CameraUpdate},
    icon::{Bitmap, IconResource, MarkerLayout},
};

pub use traits::{Clock, FrameScheduler, HostMap, MarkerHandle, MarkerId, Projection, ViewRasterizer};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Marker {0} is no longer attached to its map")]
    MarkerDetached(MarkerId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[cfg(feature = "render")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs an `env_logger` backend driven by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
