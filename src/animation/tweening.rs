use crate::animation::interpolation::{EasingFunction, Interpolatable};
use std::time::Duration;

/// A tween between two values, sampled against elapsed time.
///
/// The tween holds no clock of its own; callers pass the time elapsed since
/// the animation started, which keeps it usable with virtual clocks.
#[derive(Debug, Clone)]
pub struct Tween<T: Interpolatable + Clone> {
    /// Starting value
    pub from: T,
    /// Ending value
    pub to: T,
    /// Animation duration
    pub duration: Duration,
    /// Easing function to use
    pub easing: EasingFunction,
}

/// One evaluation of a tween
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSample<T> {
    pub value: T,
    /// Eased progress in [0, 1]
    pub progress: f64,
    pub finished: bool,
}

impl<T: Interpolatable + Clone> Tween<T> {
    /// Create a new linear tween
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self::with_easing(from, to, duration, EasingFunction::Linear)
    }

    /// Create a new tween with custom easing
    pub fn with_easing(from: T, to: T, duration: Duration, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Normalized time in [0, 1]; a zero duration is complete immediately
    pub fn fraction(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Value at `elapsed`. Once finished the sample is exactly `to`.
    pub fn sample(&self, elapsed: Duration) -> TweenSample<T> {
        if self.is_finished(elapsed) {
            return TweenSample {
                value: self.to.clone(),
                progress: 1.0,
                finished: true,
            };
        }

        let progress = self.easing.apply(self.fraction(elapsed));
        TweenSample {
            value: self.from.lerp(&self.to, progress),
            progress,
            finished: false,
        }
    }
}

/// Lifecycle of a running tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TweenState {
    Running = 0,
    Finished = 1,
    Cancelled = 2,
}

impl TweenState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => TweenState::Finished,
            2 => TweenState::Cancelled,
            _ => TweenState::Running,
        }
    }
}
