//! Animation scheduler
//!
//! A single-threaded queue of animation-frame callbacks and timers. Widgets
//! talk to it through the [`FrameScheduler`] trait so the same code runs on a
//! real event loop ([`SystemScheduler`]), under a virtual clock
//! ([`VirtualScheduler`]), or without any environment at all
//! ([`NullScheduler`]).

use std::cell::{Cell, RefCell};
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::clock::{Clock, SystemClock, VirtualClock};

new_key_type! {
    pub struct FrameRequestId;
    pub struct TimerId;
}

/// Callback run at the next frame boundary, given the frame time
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Callback run once a timer expires
pub type TimerCallback = Box<dyn FnOnce()>;

/// Default frame interval (~60fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Frame and timer scheduling as seen by widgets
pub trait FrameScheduler {
    /// Current scheduler time
    fn now(&self) -> Duration;

    /// Run `callback` once at the next frame boundary
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending frame callback. Unknown ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);

    /// Run `callback` once after `delay`
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Drop a pending timer. Unknown ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

struct PendingTimer {
    deadline: Duration,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
    callback: TimerCallback,
}

/// The scheduler that owns all pending frame callbacks and timers
pub struct AnimationScheduler<C: Clock = SystemClock> {
    clock: C,
    frame_interval: Duration,
    frames: RefCell<SlotMap<FrameRequestId, FrameCallback>>,
    frame_order: RefCell<Vec<FrameRequestId>>,
    timers: RefCell<SlotMap<TimerId, PendingTimer>>,
    next_seq: Cell<u64>,
    frame_count: Cell<u64>,
}

/// Scheduler driven by the wall clock; the host calls [`AnimationScheduler::pump`] every frame
pub type SystemScheduler = AnimationScheduler<SystemClock>;

/// Scheduler driven by [`AnimationScheduler::advance`]
pub type VirtualScheduler = AnimationScheduler<VirtualClock>;

impl<C: Clock> AnimationScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            frames: RefCell::new(SlotMap::with_key()),
            frame_order: RefCell::new(Vec::new()),
            timers: RefCell::new(SlotMap::with_key()),
            next_seq: Cell::new(0),
            frame_count: Cell::new(0),
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.frame_interval = Duration::from_secs(1) / fps.max(1);
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Check if anything is still waiting to run
    pub fn has_pending_work(&self) -> bool {
        self.pending_frames() > 0 || self.pending_timers() > 0
    }

    /// Run every frame callback requested before this call.
    ///
    /// Callbacks requested while the frame runs wait for the next one.
    pub fn run_frame(&self) -> usize {
        let now = self.clock.now();
        let batch = std::mem::take(&mut *self.frame_order.borrow_mut());
        let mut ran = 0;
        for id in batch {
            // Release the borrow before running: callbacks reschedule themselves
            let callback = self.frames.borrow_mut().remove(id);
            if let Some(callback) = callback {
                callback(now);
                ran += 1;
            }
        }
        self.frame_count.set(self.frame_count.get() + 1);
        tracing::trace!("frame {} at {:?}: {} callbacks", self.frame_count.get(), now, ran);
        ran
    }

    /// Run every timer whose deadline has passed, earliest first
    pub fn run_due_timers(&self) -> usize {
        let mut ran = 0;
        loop {
            let now = self.clock.now();
            let due = self
                .timers
                .borrow()
                .iter()
                .filter(|(_, timer)| timer.deadline <= now)
                .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
                .map(|(id, _)| id);
            let Some(id) = due else {
                break;
            };
            let timer = self.timers.borrow_mut().remove(id);
            if let Some(timer) = timer {
                (timer.callback)();
                ran += 1;
            }
        }
        ran
    }

    /// One event-loop turn: expired timers, then a frame
    pub fn pump(&self) {
        self.run_due_timers();
        self.run_frame();
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .borrow()
            .values()
            .map(|timer| timer.deadline)
            .min()
    }

    fn next_frame_boundary(&self) -> Duration {
        let interval = self.frame_interval.as_nanos().max(1);
        let frames = self.clock.now().as_nanos() / interval + 1;
        Duration::from_nanos((frames * interval) as u64)
    }
}

impl AnimationScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for AnimationScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

enum Step {
    Timer(Duration),
    Frame(Duration),
}

impl AnimationScheduler<VirtualClock> {
    /// Scheduler on a virtual clock starting at zero
    pub fn virtual_time() -> Self {
        Self::with_clock(VirtualClock::new())
    }

    /// Move virtual time forward by `delta`, running timers at their
    /// deadlines and pending frames on frame boundaries, in time order.
    ///
    /// A timer and a frame due at the same instant run timer first.
    pub fn advance(&self, delta: Duration) {
        let target = self.clock.now() + delta;
        loop {
            let next_timer = self.next_deadline();
            let next_frame = (self.pending_frames() > 0).then(|| self.next_frame_boundary());
            let step = match (next_timer, next_frame) {
                (Some(timer), Some(frame)) if timer <= frame => Step::Timer(timer),
                (_, Some(frame)) => Step::Frame(frame),
                (Some(timer), None) => Step::Timer(timer),
                (None, None) => break,
            };
            match step {
                Step::Timer(at) if at <= target => {
                    self.clock.set(at);
                    self.run_due_timers();
                }
                Step::Frame(at) if at <= target => {
                    self.clock.set(at);
                    self.run_frame();
                }
                _ => break,
            }
        }
        self.clock.set(target);
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Advance to the next frame boundary and run it
    pub fn next_frame(&self) {
        let boundary = self.next_frame_boundary();
        self.advance(boundary - self.clock.now());
    }
}

impl<C: Clock> FrameScheduler for AnimationScheduler<C> {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let id = self.frames.borrow_mut().insert(callback);
        self.frame_order.borrow_mut().push(id);
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.frames.borrow_mut().remove(id);
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().insert(PendingTimer {
            deadline: self.clock.now() + delay,
            seq,
            callback,
        })
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().remove(id);
    }
}

/// Scheduler for environments without frames or timers (server-side
/// rendering, detached widgets). Every callback is dropped unrun.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScheduler;

impl FrameScheduler for NullScheduler {
    fn now(&self) -> Duration {
        Duration::ZERO
    }

    fn request_frame(&self, _callback: FrameCallback) -> FrameRequestId {
        tracing::trace!("no environment: dropping frame request");
        FrameRequestId::default()
    }

    fn cancel_frame(&self, _id: FrameRequestId) {}

    fn set_timeout(&self, _delay: Duration, _callback: TimerCallback) -> TimerId {
        tracing::trace!("no environment: dropping timer");
        TimerId::default()
    }

    fn clear_timeout(&self, _id: TimerId) {}
}
