//! Engine-wide defaults for marker animation, camera fitting and marker icons.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Length of a marker move animation.
pub const MARKER_ANIMATION_DURATION_MS: u64 = 1000;

/// Requested delay between two animation ticks (~60 Hz, best effort).
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Marker anchor, as a fraction of the icon size (centre).
pub const MARKER_ANCHOR: (f32, f32) = (0.5, 0.5);

/// Padding in pixels used when fitting the camera around markers.
pub const DEFAULT_BOUNDS_PADDING: f64 = 20.0;

/// Zoom limits of the Web Mercator viewport.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 21.0;

/// Camera tilt limit in degrees.
pub const MAX_TILT: f64 = 90.0;

/// Default marker layout size in pixels.
pub const MARKER_LAYOUT_SIZE: (u32, u32) = (48, 48);

/// Square tile size the projection is expressed in.
pub const TILE_SIZE: f64 = 256.0;
