pub mod interpolation;
pub mod marker;
pub mod tweening;

// Re-export commonly used types and functions for convenience
pub use interpolation::{lerp, EasingFunction, Interpolatable};
pub use marker::{AnimationHandle, CompletionVisibility, MarkerAnimator};
pub use tweening::{Tween, TweenSample, TweenState};
