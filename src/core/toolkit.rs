//! High-level helpers bundling marker options, marker moves and camera moves
//!
//! A [`MapToolkit`] is built once per application with the icon rasterizer
//! injected, then passed around by reference.

use crate::{
    animation::marker::{AnimationHandle, MarkerAnimator},
    core::{
        config::MapUtilOptions,
        geo::{LatLng, LatLngBounds},
    },
    layers::options::{MapMarker, MarkerOptions},
    rendering::{
        camera::{CameraPosition, CameraUpdate},
        icon::{Bitmap, IconResource},
    },
    traits::{Clock, FrameScheduler, HostMap, MarkerHandle, ViewRasterizer},
    MapError, Result,
};
use std::sync::Arc;

pub struct MapToolkit {
    rasterizer: Arc<dyn ViewRasterizer>,
    options: MapUtilOptions,
    animator: MarkerAnimator,
}

impl MapToolkit {
    pub fn new(
        rasterizer: Arc<dyn ViewRasterizer>,
        options: MapUtilOptions,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Self {
        let animator = MarkerAnimator::new(clock, scheduler, options.animation.clone());
        Self {
            rasterizer,
            options,
            animator,
        }
    }

    pub fn options(&self) -> &MapUtilOptions {
        &self.options
    }

    pub fn animator(&self) -> &MarkerAnimator {
        &self.animator
    }

    /// Options for a plain marker using the host's default pin
    pub fn marker_options(&self, marker: &MapMarker, draggable: bool) -> Result<MarkerOptions> {
        MarkerOptions::from_map_marker(marker, draggable)
    }

    pub fn marker_options_with_bitmap(
        &self,
        marker: &MapMarker,
        draggable: bool,
        bitmap: Bitmap,
    ) -> Result<MarkerOptions> {
        Ok(MarkerOptions::from_map_marker(marker, draggable)?.icon(bitmap))
    }

    /// Options whose icon is `resource` rendered onto the marker layout
    pub fn marker_options_with_icon(
        &self,
        marker: &MapMarker,
        draggable: bool,
        resource: IconResource,
    ) -> Result<MarkerOptions> {
        let options = MarkerOptions::from_map_marker(marker, draggable)?;
        let bitmap = self.rasterizer.render_resource(resource)?;
        Ok(options.icon(bitmap))
    }

    /// Options using the configured navigation arrow icon
    pub fn navigation_marker_options(
        &self,
        marker: &MapMarker,
        draggable: bool,
    ) -> Result<MarkerOptions> {
        let resource = self.options.icon.navigation_icon.ok_or_else(|| {
            MapError::InvalidInput("no navigation icon configured".to_string())
        })?;
        self.marker_options_with_icon(marker, draggable, resource)
    }

    /// Asks the host to animate its camera to `location`
    pub fn animate_camera(
        &self,
        map: &dyn HostMap,
        location: LatLng,
        zoom: f64,
        tilt: f64,
    ) -> Result<()> {
        if !location.is_valid() {
            log::warn!("refusing to move camera to {:?}", location);
            return Err(MapError::InvalidCoordinates(format!(
                "camera target {:?} is out of range",
                location
            )));
        }

        let camera = CameraPosition::new(location, zoom).with_tilt(tilt);
        map.animate_camera(CameraUpdate::to_position(camera));
        Ok(())
    }

    /// Animates `marker` to `target` with the configured animation
    pub fn animate_marker<M>(
        &self,
        map: &dyn HostMap,
        marker: &Arc<M>,
        target: LatLng,
    ) -> Result<AnimationHandle>
    where
        M: MarkerHandle + ?Sized + 'static,
    {
        self.animator.animate_marker_to(map, marker, target)
    }

    /// Frames every attached marker in `markers`.
    ///
    /// `padding` in pixels; `None` uses the configured default.
    pub fn fit_markers<M>(
        &self,
        map: &dyn HostMap,
        markers: &[Arc<M>],
        padding: Option<f64>,
    ) -> Result<LatLngBounds>
    where
        M: MarkerHandle + ?Sized,
    {
        let positions: Vec<LatLng> = markers
            .iter()
            .filter(|marker| marker.is_attached())
            .map(|marker| marker.position())
            .collect();

        let bounds = LatLngBounds::from_points(&positions)
            .ok_or_else(|| MapError::InvalidInput("no attached markers to fit".to_string()))?;
        let padding = padding.unwrap_or(self.options.camera.bounds_padding);

        log::debug!("fitting {} markers with {} px padding", positions.len(), padding);
        map.animate_camera(CameraUpdate::to_bounds(bounds.clone(), padding));
        Ok(bounds)
    }

    /// Moves `marker` to `location` and follows it with the camera
    pub fn move_and_animate<M>(
        &self,
        map: &dyn HostMap,
        marker: &Arc<M>,
        location: LatLng,
        zoom: f64,
        tilt: f64,
    ) -> Result<AnimationHandle>
    where
        M: MarkerHandle + ?Sized + 'static,
    {
        let handle = self.animator.animate_marker_to(map, marker, location)?;
        self.animate_camera(map, location, zoom, tilt)?;
        Ok(handle)
    }

    /// Stops any move on `marker` and takes it off the map
    pub fn remove_marker<M>(&self, marker: &M)
    where
        M: MarkerHandle + ?Sized,
    {
        self.animator.cancel(marker.id());
        if marker.is_attached() {
            marker.remove();
            log::debug!("removed marker {}", marker.id());
        }
    }
}
