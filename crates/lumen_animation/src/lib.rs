//! Lumen Animation System
//!
//! Easing curves, named presets, frame scheduling and tweens.
//!
//! # Features
//!
//! - **Easing**: power/back/exponential curves addressed by name (`power3.out`)
//! - **Presets**: the site's named from/to bundles (`fadeInUp`, `heroTitle`, ...)
//! - **Frame Scheduler**: host-driven frame callbacks and timeouts with
//!   cancel-on-drop task handles
//! - **Tweens**: staggered multi-target tweens over partial style values
//! - **AnimationContext**: per-component tween ownership with kill and revert
//! - **Sequences**: ordered entrance choreography with overlaps

pub mod context;
pub mod easing;
pub mod error;
pub mod presets;
pub mod scheduler;
pub mod timeline;
pub mod tween;
pub mod values;

pub use context::{AnimationContext, TweenId};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use presets::{AnimationPreset, DEFAULT_DURATION, DEFAULT_EASE};
pub use scheduler::{
    FrameControl, FrameInfo, FrameScheduler, FrameTask, FrameTaskId, SchedulerHandle,
};
pub use timeline::{Position, Sequence};
pub use tween::{Targets, Tween, TweenOptions};
pub use values::{Interpolate, StyleProps};
