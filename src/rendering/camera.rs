use crate::core::constants::{MAX_TILT, MAX_ZOOM, MIN_ZOOM};
use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

/// Where the camera looks and how
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: LatLng,
    pub zoom: f64,
    /// Degrees from nadir
    pub tilt: f64,
    /// Degrees clockwise from north
    pub bearing: f64,
}

impl CameraPosition {
    pub fn new(target: LatLng, zoom: f64) -> Self {
        Self {
            target,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            tilt: 0.0,
            bearing: 0.0,
        }
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = tilt.clamp(0.0, MAX_TILT);
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing.rem_euclid(360.0);
        self
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::new(LatLng::default(), MIN_ZOOM)
    }
}

/// A camera move handed to the host map
#[derive(Debug, Clone, PartialEq)]
pub enum CameraUpdate {
    /// Go to an explicit position
    Position(CameraPosition),
    /// Centre on the bounds at the largest zoom that keeps them inside the
    /// view minus `padding` pixels on every side
    Bounds { bounds: LatLngBounds, padding: f64 },
}

impl CameraUpdate {
    pub fn to_position(position: CameraPosition) -> Self {
        CameraUpdate::Position(position)
    }

    pub fn to_bounds(bounds: LatLngBounds, padding: f64) -> Self {
        CameraUpdate::Bounds {
            bounds,
            padding: padding.max(0.0),
        }
    }
}
