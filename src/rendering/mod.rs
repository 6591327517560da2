pub mod camera;
pub mod icon;

// Re-export main types
pub use camera::{CameraPosition, CameraUpdate};
pub use icon::{Bitmap, IconResource, MarkerLayout};

#[cfg(feature = "render")]
pub use icon::IconRasterizer;
