//! Toolkit builder for fluent configuration
//!
//! Picks an animation profile, the clock and frame scheduler, and the icon
//! rasterizer, then builds a [`MapToolkit`].

use crate::{
    core::{
        config::{AnimationProfile, CameraConfig, IconConfig, MapUtilOptions, MarkerAnimationConfig},
        toolkit::MapToolkit,
    },
    runtime::SystemClock,
    traits::{Clock, FrameScheduler, ViewRasterizer},
    Result,
};
use std::sync::Arc;

/// Builder for creating and configuring [`MapToolkit`] instances
pub struct MapToolkitBuilder {
    /// Preset the options start from
    profile: AnimationProfile,
    animation: Option<MarkerAnimationConfig>,
    camera: Option<CameraConfig>,
    icon: Option<IconConfig>,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn FrameScheduler>>,
    rasterizer: Option<Arc<dyn ViewRasterizer>>,
}

impl MapToolkitBuilder {
    /// Create a new builder with the standard profile
    pub fn new() -> Self {
        Self {
            profile: AnimationProfile::default(),
            animation: None,
            camera: None,
            icon: None,
            clock: None,
            scheduler: None,
            rasterizer: None,
        }
    }

    pub fn with_profile(mut self, profile: AnimationProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Use fully custom options
    pub fn with_options(mut self, options: MapUtilOptions) -> Self {
        self.profile = AnimationProfile::Custom(options);
        self
    }

    pub fn with_animation(mut self, animation: MarkerAnimationConfig) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_icons(mut self, icon: IconConfig) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Shorthand for the move duration in milliseconds
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        let mut animation = self
            .animation
            .take()
            .unwrap_or_else(|| self.profile.resolve().animation);
        animation.duration_ms = duration_ms;
        self.animation = Some(animation);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn FrameScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn ViewRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Resolved options, with explicit overrides applied over the profile
    pub fn options(&self) -> MapUtilOptions {
        let mut options = self.profile.resolve();
        if let Some(animation) = &self.animation {
            options.animation = animation.clone();
        }
        if let Some(camera) = &self.camera {
            options.camera = camera.clone();
        }
        if let Some(icon) = &self.icon {
            options.icon = icon.clone();
        }
        options
    }

    /// Build the toolkit.
    ///
    /// Without an explicit scheduler the tokio runtime the caller runs in
    /// is used; without a rasterizer an empty `IconRasterizer` with the
    /// configured layout is used.
    pub fn build(self) -> Result<MapToolkit> {
        let options = self.options();
        options.animation.validate()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);

        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => default_scheduler()?,
        };

        let rasterizer = match self.rasterizer {
            Some(rasterizer) => rasterizer,
            None => default_rasterizer(&options)?,
        };

        log::info!(
            "map toolkit ready: {} ms moves every {} ms, {:?} easing",
            options.animation.duration_ms,
            options.animation.frame_interval_ms,
            options.animation.easing
        );

        Ok(MapToolkit::new(rasterizer, options, clock, scheduler))
    }
}

impl Default for MapToolkitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "tokio-runtime")]
fn default_scheduler() -> Result<Arc<dyn FrameScheduler>> {
    Ok(Arc::new(crate::runtime::TokioScheduler::current()?))
}

#[cfg(not(feature = "tokio-runtime"))]
fn default_scheduler() -> Result<Arc<dyn FrameScheduler>> {
    Err(crate::MapError::InvalidInput(
        "a frame scheduler is required without the tokio-runtime feature".to_string(),
    ))
}

#[cfg(feature = "render")]
fn default_rasterizer(options: &MapUtilOptions) -> Result<Arc<dyn ViewRasterizer>> {
    Ok(Arc::new(crate::rendering::icon::IconRasterizer::new(
        options.icon.layout.clone(),
    )))
}

#[cfg(not(feature = "render"))]
fn default_rasterizer(_options: &MapUtilOptions) -> Result<Arc<dyn ViewRasterizer>> {
    Err(crate::MapError::InvalidInput(
        "an icon rasterizer is required without the render feature".to_string(),
    ))
}
