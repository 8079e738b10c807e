//! Fixed-duration scroll tweens
//!
//! A [`ScrollTween`] interpolates a scroll position from a start to an end
//! point. [`start_scroll_tween`] drives one frame by frame on a
//! [`FrameScheduler`] and returns an [`AnimationHandle`] that owns the task:
//! cancelling or dropping the handle stops every further write.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::easing::Easing;
use crate::scheduler::{FrameRequestId, FrameScheduler};

/// Interpolation of a single value over a fixed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    /// Linear progress in 0.0..=1.0. Zero-length tweens are always complete.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let ratio = elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64;
        ratio.clamp(0.0, 1.0) as f32
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let eased = self.easing.apply(self.progress(elapsed));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// A tween over both scroll axes sharing one duration and easing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTween {
    pub x: Tween,
    pub y: Tween,
}

impl ScrollTween {
    pub fn new(from: (f32, f32), to: (f32, f32), duration: Duration, easing: Easing) -> Self {
        Self {
            x: Tween::new(from.0, to.0, duration, easing),
            y: Tween::new(from.1, to.1, duration, easing),
        }
    }

    pub fn duration(&self) -> Duration {
        self.x.duration.max(self.y.duration)
    }

    pub fn target(&self) -> (f32, f32) {
        (self.x.to, self.y.to)
    }

    pub fn position_at(&self, elapsed: Duration) -> (f32, f32) {
        (self.x.value_at(elapsed), self.y.value_at(elapsed))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.x.is_finished(elapsed) && self.y.is_finished(elapsed)
    }
}

type FrameWriter = Box<dyn FnMut(f32, f32)>;
type CompleteHook = Box<dyn FnOnce()>;

struct TweenTask {
    scheduler: Rc<dyn FrameScheduler>,
    tween: ScrollTween,
    started_at: Duration,
    cancelled: Cell<bool>,
    finished: Cell<bool>,
    request: Cell<Option<FrameRequestId>>,
    on_frame: RefCell<Option<FrameWriter>>,
    on_complete: RefCell<Option<CompleteHook>>,
}

impl TweenTask {
    fn schedule(self: &Rc<Self>) {
        let weak: Weak<TweenTask> = Rc::downgrade(self);
        let id = self.scheduler.request_frame(Box::new(move |now| {
            if let Some(task) = weak.upgrade() {
                task.step(now);
            }
        }));
        self.request.set(Some(id));
    }

    fn step(self: &Rc<Self>, now: Duration) {
        self.request.set(None);
        if self.cancelled.get() {
            return;
        }

        let elapsed = now.saturating_sub(self.started_at);
        let (x, y) = self.tween.position_at(elapsed);
        tracing::trace!("tween frame at {:?}: ({}, {})", elapsed, x, y);

        let writer = self.on_frame.borrow_mut().take();
        if let Some(mut writer) = writer {
            writer(x, y);
            if !self.cancelled.get() {
                *self.on_frame.borrow_mut() = Some(writer);
            }
        }
        if self.cancelled.get() {
            return;
        }

        if self.tween.is_finished(elapsed) {
            self.finished.set(true);
            self.on_frame.borrow_mut().take();
            let hook = self.on_complete.borrow_mut().take();
            if let Some(hook) = hook {
                hook();
            }
        } else {
            self.schedule();
        }
    }

    fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.request.take() {
            self.scheduler.cancel_frame(id);
        }
        self.on_frame.borrow_mut().take();
        self.on_complete.borrow_mut().take();
    }
}

/// Owner of a running scroll tween. Dropping it cancels the tween.
pub struct AnimationHandle {
    task: Rc<TweenTask>,
}

impl AnimationHandle {
    /// Stop the tween; no further frames are written and completion never fires
    pub fn cancel(&self) {
        if self.is_active() {
            tracing::debug!("scroll tween cancelled");
        }
        self.task.cancel();
    }

    /// Whether frames are still being written
    pub fn is_active(&self) -> bool {
        !self.task.cancelled.get() && !self.task.finished.get()
    }

    pub fn is_finished(&self) -> bool {
        self.task.finished.get()
    }

    pub fn target(&self) -> (f32, f32) {
        self.task.tween.target()
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.task.cancel();
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("target", &self.target())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Start driving `tween` on `scheduler`.
///
/// `on_frame` receives the interpolated position at every frame, the last one
/// being exactly the target. `on_complete` runs once after the final write
/// unless the tween was cancelled first.
pub fn start_scroll_tween<W, C>(
    scheduler: Rc<dyn FrameScheduler>,
    tween: ScrollTween,
    on_frame: W,
    on_complete: C,
) -> AnimationHandle
where
    W: FnMut(f32, f32) + 'static,
    C: FnOnce() + 'static,
{
    let started_at = scheduler.now();
    let task = Rc::new(TweenTask {
        scheduler,
        tween,
        started_at,
        cancelled: Cell::new(false),
        finished: Cell::new(false),
        request: Cell::new(None),
        on_frame: RefCell::new(Some(Box::new(on_frame))),
        on_complete: RefCell::new(Some(Box::new(on_complete))),
    });
    tracing::debug!(
        "scroll tween to {:?} over {:?}",
        tween.target(),
        tween.duration()
    );
    task.schedule();
    AnimationHandle { task }
}
