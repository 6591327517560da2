use crate::{
    core::{
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    layers::{marker::Marker, options::MarkerOptions},
    rendering::camera::CameraUpdate,
    traits::{HostMap, MarkerHandle, MarkerId, Projection},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

/// In-process host map.
///
/// Keeps a [`Viewport`] as its camera and owns the markers added to it.
/// Camera updates are applied immediately; a real renderer would animate
/// them. Used by the headless demo and by tests.
#[derive(Debug)]
pub struct ViewportMap {
    viewport: Mutex<Viewport>,
    markers: Mutex<Vec<Arc<Marker>>>,
    camera_updates: Mutex<Vec<CameraUpdate>>,
    next_marker_id: AtomicU64,
}

impl ViewportMap {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_viewport(Viewport::new(center, zoom, size))
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport: Mutex::new(viewport),
            markers: Mutex::new(Vec::new()),
            camera_updates: Mutex::new(Vec::new()),
            next_marker_id: AtomicU64::new(1),
        }
    }

    /// Copy of the current camera state
    pub fn viewport(&self) -> Viewport {
        lock(&self.viewport).clone()
    }

    pub fn set_size(&self, size: Point) {
        lock(&self.viewport).set_size(size);
    }

    /// Adds a marker built from `options` and returns a shared handle to it
    pub fn add_marker(&self, options: &MarkerOptions) -> Arc<Marker> {
        let id = self.next_marker_id.fetch_add(1, Ordering::Relaxed);
        let marker = Arc::new(Marker::from_options(id, options));
        lock(&self.markers).push(marker.clone());
        log::debug!(
            "added marker {} at ({:.6}, {:.6})",
            id,
            options.position.lat,
            options.position.lng
        );
        marker
    }

    /// Markers still attached to the map
    pub fn markers(&self) -> Vec<Arc<Marker>> {
        let mut markers = lock(&self.markers);
        markers.retain(|marker| marker.is_attached());
        markers.clone()
    }

    pub fn marker(&self, id: MarkerId) -> Option<Arc<Marker>> {
        lock(&self.markers)
            .iter()
            .find(|marker| marker.id() == id && marker.is_attached())
            .cloned()
    }

    /// Every camera update received, oldest first
    pub fn camera_updates(&self) -> Vec<CameraUpdate> {
        lock(&self.camera_updates).clone()
    }
}

impl Default for ViewportMap {
    fn default() -> Self {
        Self::with_viewport(Viewport::default())
    }
}

impl HostMap for ViewportMap {
    fn projection(&self) -> Box<dyn Projection + '_> {
        Box::new(self.viewport())
    }

    fn animate_camera(&self, update: CameraUpdate) {
        {
            let mut viewport = lock(&self.viewport);
            match &update {
                CameraUpdate::Position(camera) => viewport.apply_camera(camera),
                CameraUpdate::Bounds { bounds, padding } => viewport.fit_bounds(bounds, *padding),
            }
            log::debug!(
                "camera at ({:.6}, {:.6}) zoom {}",
                viewport.center.lat,
                viewport.center.lng,
                viewport.zoom
            );
        }
        lock(&self.camera_updates).push(update);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
