use crate::core::constants::{MAX_TILT, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::rendering::camera::CameraPosition;
use crate::traits::Projection;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distance from the antimeridian to Greenwich in EPSG:3857 meters
const HALF_WORLD_METERS: f64 = PI * 6378137.0;

/// Camera of a flat Web Mercator map: what it looks at and how big the view is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    /// Camera tilt in degrees; does not affect the flat projection
    pub tilt: f64,
    /// Camera bearing in degrees
    pub bearing: f64,
    /// View size in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: Self::clamp_center(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            tilt: 0.0,
            bearing: 0.0,
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    /// Sets the center of the viewport, clamped to the projectable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::clamp_center(center);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_tilt(&mut self, tilt: f64) {
        self.tilt = tilt.clamp(0.0, MAX_TILT);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Narrows the zoom range and re-clamps the current zoom
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.set_zoom(self.zoom);
    }

    /// Jumps to a camera position
    pub fn apply_camera(&mut self, camera: &CameraPosition) {
        self.set_center(camera.target);
        self.set_zoom(camera.zoom);
        self.set_tilt(camera.tilt);
        self.bearing = camera.bearing;
    }

    pub fn camera_position(&self) -> CameraPosition {
        CameraPosition::new(self.center, self.zoom)
            .with_tilt(self.tilt)
            .with_bearing(self.bearing)
    }

    /// Width of the whole world in pixels at `zoom` (the current zoom when `None`)
    pub fn world_size(&self, zoom: Option<f64>) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom.unwrap_or(self.zoom))
    }

    /// World pixel of `lat_lng`, origin at the north-west corner of the world
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let world = self.world_size(zoom);
        let meters = LatLng::new(LatLng::clamp_lat(lat_lng.lat), lat_lng.lng).to_mercator();

        Point::new(
            (1.0 + meters.x / HALF_WORLD_METERS) / 2.0 * world,
            (1.0 - meters.y / HALF_WORLD_METERS) / 2.0 * world,
        )
    }

    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let world = self.world_size(zoom);
        LatLng::from_mercator(Point::new(
            (2.0 * pixel.x / world - 1.0) * HALF_WORLD_METERS,
            (1.0 - 2.0 * pixel.y / world) * HALF_WORLD_METERS,
        ))
    }

    /// Container pixel, with the view center at `size / 2`
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let layer_point = self.lat_lng_to_layer_point(lat_lng);
        self.layer_point_to_container_point(&layer_point)
    }

    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let layer_point = self.container_point_to_layer_point(pixel);
        self.layer_point_to_lat_lng(&layer_point)
    }

    /// Offset in pixels from the view center
    pub fn lat_lng_to_layer_point(&self, lat_lng: &LatLng) -> Point {
        let projected = self.project(lat_lng, None);
        let center = self.project(&self.center, None);
        projected.subtract(&center)
    }

    pub fn layer_point_to_lat_lng(&self, point: &Point) -> LatLng {
        let center = self.project(&self.center, None);
        self.unproject(&point.add(&center), None)
    }

    pub fn layer_point_to_container_point(&self, point: &Point) -> Point {
        Point::new(point.x + self.size.x / 2.0, point.y + self.size.y / 2.0)
    }

    pub fn container_point_to_layer_point(&self, point: &Point) -> Point {
        Point::new(point.x - self.size.x / 2.0, point.y - self.size.y / 2.0)
    }

    /// Area currently on screen
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Centres on `bounds` at the largest whole zoom level that keeps them
    /// inside the viewport minus `padding` pixels on every side
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64) {
        let available = Point::new(
            (self.size.x - 2.0 * padding).max(1.0),
            (self.size.y - 2.0 * padding).max(1.0),
        );

        let nw = LatLng::new(bounds.north_east.lat, bounds.south_west.lng);
        let se = LatLng::new(bounds.south_west.lat, bounds.north_east.lng);

        let mut best_zoom = self.min_zoom;
        for test_zoom in (self.min_zoom.ceil() as i32)..=(self.max_zoom.floor() as i32) {
            let zoom = test_zoom as f64;
            let nw_px = self.project(&nw, Some(zoom));
            let se_px = self.project(&se, Some(zoom));

            if (se_px.x - nw_px.x).abs() <= available.x && (se_px.y - nw_px.y).abs() <= available.y
            {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        log::debug!(
            "fit bounds SW({:.6}, {:.6}) NE({:.6}, {:.6}) at zoom {}",
            bounds.south_west.lat,
            bounds.south_west.lng,
            bounds.north_east.lat,
            bounds.north_east.lng,
            best_zoom
        );

        self.set_center(bounds.center());
        self.set_zoom(best_zoom);
    }

    fn clamp_center(center: LatLng) -> LatLng {
        LatLng::new(
            LatLng::clamp_lat(center.lat),
            center.lng.clamp(-180.0, 180.0),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

impl Projection for Viewport {
    fn to_screen_location(&self, lat_lng: &LatLng) -> Point {
        self.lat_lng_to_pixel(lat_lng)
    }

    fn from_screen_location(&self, point: &Point) -> LatLng {
        self.pixel_to_lat_lng(point)
    }
}
