use geo::{BoundingRect, HaversineDistance};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sphere radius of EPSG:3857, in meters
const EARTH_RADIUS: f64 = 6378137.0;
/// Latitude at which the Web Mercator world becomes square
const MAX_LATITUDE: f64 = 85.0511287798;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite, with latitude in [-90, 90] and longitude in [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        geo_types::Point::from(*self).haversine_distance(&geo_types::Point::from(*other))
    }

    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Spherical Mercator meters (EPSG:3857)
    pub fn to_mercator(&self) -> Point {
        let phi = self.lat.to_radians();
        Point::new(
            EARTH_RADIUS * self.lng.to_radians(),
            EARTH_RADIUS * (PI / 4.0 + phi / 2.0).tan().ln(),
        )
    }

    pub fn from_mercator(meters: Point) -> Self {
        let phi = 2.0 * (meters.y / EARTH_RADIUS).exp().atan() - PI / 2.0;
        Self::new(phi.to_degrees(), (meters.x / EARTH_RADIUS).to_degrees())
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self { lat: 0.0, lng: 0.0 }
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(lat_lng: LatLng) -> Self {
        geo_types::Point::new(lat_lng.lng, lat_lng.lat)
    }
}

impl From<geo_types::Coord<f64>> for LatLng {
    fn from(coord: geo_types::Coord<f64>) -> Self {
        LatLng::new(coord.y, coord.x)
    }
}

/// Screen pixel or projected position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Nearest whole pixel
    pub fn round(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Axis-aligned box between a south-west and a north-east corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, or `None` for an empty set
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let multi_point: geo_types::MultiPoint<f64> = points
            .into_iter()
            .map(|p| geo_types::Point::from(*p))
            .collect::<Vec<_>>()
            .into();

        multi_point
            .bounding_rect()
            .map(|rect| Self::new(rect.min().into(), rect.max().into()))
    }

    /// Inclusive on every edge
    pub fn contains(&self, point: &LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}
