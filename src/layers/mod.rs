pub mod marker;
pub mod options;

pub use marker::Marker;
pub use options::{MapMarker, MarkerOptions};
