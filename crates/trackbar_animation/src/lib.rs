//! trackbar animation system
//!
//! Time-based plumbing for the scroll container.
//!
//! # Features
//!
//! - **Scheduling**: animation frames and timers behind [`FrameScheduler`],
//!   on the wall clock or a deterministic virtual clock
//! - **Rate Limiting**: frame coalescing, trailing debounce, and throttling
//! - **Tweens**: cancellable fixed-duration scroll animations with easing

pub mod clock;
pub mod easing;
pub mod rate_limit;
pub mod scheduler;
pub mod tween;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use easing::Easing;
pub use rate_limit::{Debouncer, FrameCoalescer, ThrottleOptions, Throttler};
pub use scheduler::{
    AnimationScheduler, FrameRequestId, FrameScheduler, NullScheduler, SystemScheduler, TimerId,
    VirtualScheduler,
};
pub use tween::{start_scroll_tween, AnimationHandle, ScrollTween, Tween};
