//! Capability traits consumed from the host map renderer and platform
//!
//! The helpers in this crate never talk to a concrete map engine. They are
//! written against these traits, which a host implements once; the crate
//! ships in-process implementations for headless use and tests.

use crate::{
    core::geo::{LatLng, Point},
    rendering::{
        camera::CameraUpdate,
        icon::{Bitmap, IconResource},
    },
    Result,
};
use std::time::Duration;

/// Stable identifier of a marker inside its host map
pub type MarkerId = u64;

/// Mapping between screen pixels and geographic coordinates for the
/// current camera view
pub trait Projection {
    /// Geographic coordinate to container pixel
    fn to_screen_location(&self, lat_lng: &LatLng) -> Point;

    /// Container pixel to geographic coordinate
    fn from_screen_location(&self, point: &Point) -> LatLng;
}

/// A marker displayed by the host renderer.
///
/// Handles are shared (`Arc<dyn MarkerHandle>`) between the caller and any
/// running animation, so all mutation goes through `&self`.
pub trait MarkerHandle: Send + Sync {
    fn id(&self) -> MarkerId;

    fn position(&self) -> LatLng;

    fn set_position(&self, position: LatLng);

    fn is_visible(&self) -> bool;

    fn set_visible(&self, visible: bool);

    /// False once the marker has been removed from its map
    fn is_attached(&self) -> bool;

    fn remove(&self);
}

/// The host map: a projection for the current view plus camera control
pub trait HostMap: Send + Sync {
    /// Snapshot of the projection for the current camera
    fn projection(&self) -> Box<dyn Projection + '_>;

    /// Move the camera, animated at the host's discretion
    fn animate_camera(&self, update: CameraUpdate);
}

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary, fixed origin
    fn now(&self) -> Duration;
}

/// A unit of work posted to a scheduler
pub type FrameTask = Box<dyn FnOnce() + Send + 'static>;

/// Frame/task scheduler of the host event loop.
///
/// `delay` is a request; hosts may run the task later than asked.
pub trait FrameScheduler: Send + Sync {
    fn post_delayed(&self, delay: Duration, task: FrameTask);

    fn post(&self, task: FrameTask) {
        self.post_delayed(Duration::ZERO, task);
    }
}

/// Renders an icon resource onto the marker layout
pub trait ViewRasterizer: Send + Sync {
    fn render_resource(&self, resource: IconResource) -> Result<Bitmap>;
}
