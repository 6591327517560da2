//! Marker icon bitmaps
//!
//! Icons are drawn onto a fixed marker layout: a canvas of the layout size,
//! an optional background fill, and the icon scaled to fit inside the padded
//! area and centred on it.

use crate::core::constants::MARKER_LAYOUT_SIZE;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Identifier of an icon registered with a rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IconResource(pub u32);

/// An RGBA8 image ready to be used as a marker icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wraps a row-major RGBA8 buffer, checking its length
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(MapError::Render(format!(
                "bitmap {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fully transparent bitmap
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }
}

/// The view icons are drawn into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerLayout {
    pub width: u32,
    pub height: u32,
    /// RGBA background fill; `None` leaves the canvas transparent
    pub background: Option<[u8; 4]>,
    /// Inset in pixels on every side of the icon area
    pub padding: u32,
}

impl MarkerLayout {
    /// Size of the area left for the icon once padding is taken out
    pub fn content_size(&self) -> (u32, u32) {
        (
            self.width.saturating_sub(self.padding.saturating_mul(2)),
            self.height.saturating_sub(self.padding.saturating_mul(2)),
        )
    }

    /// Icon size after scaling it down (never up) to fit the content area
    pub fn fit_icon(&self, icon_width: u32, icon_height: u32) -> (u32, u32) {
        let (available_w, available_h) = self.content_size();
        if icon_width == 0 || icon_height == 0 || available_w == 0 || available_h == 0 {
            return (0, 0);
        }
        if icon_width <= available_w && icon_height <= available_h {
            return (icon_width, icon_height);
        }

        let scale = (available_w as f64 / icon_width as f64)
            .min(available_h as f64 / icon_height as f64);
        (
            ((icon_width as f64 * scale).round() as u32).clamp(1, available_w),
            ((icon_height as f64 * scale).round() as u32).clamp(1, available_h),
        )
    }
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            width: MARKER_LAYOUT_SIZE.0,
            height: MARKER_LAYOUT_SIZE.1,
            background: None,
            padding: 0,
        }
    }
}

#[cfg(feature = "render")]
pub use self::raster::IconRasterizer;

#[cfg(feature = "render")]
mod raster {
    use super::{Bitmap, IconResource, MarkerLayout};
    use crate::traits::ViewRasterizer;
    use crate::{MapError, Result};
    use fxhash::FxHashMap;
    use image::{imageops, Rgba, RgbaImage};

    /// [`ViewRasterizer`] backed by the `image` crate
    pub struct IconRasterizer {
        layout: MarkerLayout,
        icons: FxHashMap<IconResource, RgbaImage>,
    }

    impl IconRasterizer {
        pub fn new(layout: MarkerLayout) -> Self {
            Self {
                layout,
                icons: FxHashMap::default(),
            }
        }

        pub fn layout(&self) -> &MarkerLayout {
            &self.layout
        }

        /// Decodes an encoded image (PNG) and registers it under `resource`
        pub fn register_encoded(&mut self, resource: IconResource, bytes: &[u8]) -> Result<()> {
            let icon = image::load_from_memory(bytes)?.to_rgba8();
            log::debug!(
                "registered icon {:?} ({}x{})",
                resource,
                icon.width(),
                icon.height()
            );
            self.icons.insert(resource, icon);
            Ok(())
        }

        /// Registers a raw RGBA8 icon
        pub fn register_rgba(
            &mut self,
            resource: IconResource,
            width: u32,
            height: u32,
            pixels: Vec<u8>,
        ) -> Result<()> {
            let icon = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
                MapError::Render(format!(
                    "icon {:?}: buffer does not match {}x{}",
                    resource, width, height
                ))
            })?;
            self.icons.insert(resource, icon);
            Ok(())
        }

        pub fn has_icon(&self, resource: IconResource) -> bool {
            self.icons.contains_key(&resource)
        }
    }

    impl ViewRasterizer for IconRasterizer {
        fn render_resource(&self, resource: IconResource) -> Result<Bitmap> {
            let icon = self
                .icons
                .get(&resource)
                .ok_or_else(|| MapError::Render(format!("unknown icon resource {:?}", resource)))?;

            let layout = &self.layout;
            let mut canvas = match layout.background {
                Some(fill) => RgbaImage::from_pixel(layout.width, layout.height, Rgba(fill)),
                None => RgbaImage::new(layout.width, layout.height),
            };

            let (icon_w, icon_h) = layout.fit_icon(icon.width(), icon.height());
            if icon_w > 0 && icon_h > 0 {
                let x = (layout.width - icon_w) / 2;
                let y = (layout.height - icon_h) / 2;
                if (icon_w, icon_h) == icon.dimensions() {
                    imageops::overlay(&mut canvas, icon, x as i64, y as i64);
                } else {
                    let scaled =
                        imageops::resize(icon, icon_w, icon_h, imageops::FilterType::Triangle);
                    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
                }
            }

            Bitmap::from_rgba(layout.width, layout.height, canvas.into_raw())
        }
    }
}
