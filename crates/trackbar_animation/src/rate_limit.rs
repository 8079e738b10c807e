//! Rate-limiting wrappers for high-frequency handlers
//!
//! - [`FrameCoalescer`]: at most one run per animation frame, latest arguments win
//! - [`Debouncer`]: runs once a quiet period has passed without calls (trailing edge)
//! - [`Throttler`]: at most one run per interval
//!
//! Scheduled callbacks only hold a `Weak` reference to the wrapper, and
//! [`teardown`](FrameCoalescer::teardown) drops the wrapped handler, so a
//! callback that fires after its owner is gone does nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::scheduler::{FrameRequestId, FrameScheduler, TimerId};

type Handler<A> = Box<dyn FnMut(A)>;

/// The wrapped handler plus its teardown flag.
struct HandlerSlot<A> {
    handler: RefCell<Option<Handler<A>>>,
    torn_down: Cell<bool>,
}

impl<A> HandlerSlot<A> {
    fn new(handler: Handler<A>) -> Self {
        Self {
            handler: RefCell::new(Some(handler)),
            torn_down: Cell::new(false),
        }
    }

    /// Run the handler without holding a borrow, so it may call back into
    /// its own wrapper.
    fn invoke(&self, args: A) {
        let Some(mut handler) = self.handler.borrow_mut().take() else {
            return;
        };
        handler(args);
        if !self.torn_down.get() {
            *self.handler.borrow_mut() = Some(handler);
        }
    }

    fn teardown(&self) {
        self.torn_down.set(true);
        self.handler.borrow_mut().take();
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }
}

// ============================================================================
// Frame coalescer
// ============================================================================

struct CoalescerInner<A> {
    scheduler: Rc<dyn FrameScheduler>,
    slot: HandlerSlot<A>,
    pending: RefCell<Option<A>>,
    request: Cell<Option<FrameRequestId>>,
}

impl<A> CoalescerInner<A> {
    fn fire(&self) {
        self.request.set(None);
        let args = self.pending.borrow_mut().take();
        if let Some(args) = args {
            self.slot.invoke(args);
        }
    }
}

/// Runs a handler at most once per animation frame.
///
/// Calls made while a frame is already requested are not queued; they replace
/// the pending arguments, so the frame runs with the latest ones.
pub struct FrameCoalescer<A: 'static> {
    inner: Rc<CoalescerInner<A>>,
}

impl<A: 'static> FrameCoalescer<A> {
    pub fn new<F>(scheduler: Rc<dyn FrameScheduler>, handler: F) -> Self
    where
        F: FnMut(A) + 'static,
    {
        Self {
            inner: Rc::new(CoalescerInner {
                scheduler,
                slot: HandlerSlot::new(Box::new(handler)),
                pending: RefCell::new(None),
                request: Cell::new(None),
            }),
        }
    }

    pub fn call(&self, args: A) {
        let inner = &self.inner;
        if inner.slot.is_torn_down() {
            return;
        }
        *inner.pending.borrow_mut() = Some(args);
        if inner.request.get().is_some() {
            return;
        }
        let weak: Weak<CoalescerInner<A>> = Rc::downgrade(inner);
        let id = inner.scheduler.request_frame(Box::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.fire();
            }
        }));
        inner.request.set(Some(id));
    }

    /// Whether a frame is requested and not yet run
    pub fn is_pending(&self) -> bool {
        self.inner.request.get().is_some()
    }

    /// Run the pending call now instead of at the frame
    pub fn flush(&self) {
        if let Some(id) = self.inner.request.take() {
            self.inner.scheduler.cancel_frame(id);
        }
        self.inner.fire();
    }

    /// Drop the pending call, if any
    pub fn cancel(&self) {
        if let Some(id) = self.inner.request.take() {
            self.inner.scheduler.cancel_frame(id);
        }
        self.inner.pending.borrow_mut().take();
    }

    /// Cancel and release the handler; later calls are ignored
    pub fn teardown(&self) {
        self.cancel();
        self.inner.slot.teardown();
    }
}

impl<A: 'static> Drop for FrameCoalescer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Debouncer
// ============================================================================

struct DebouncerInner<A> {
    scheduler: Rc<dyn FrameScheduler>,
    wait: Duration,
    slot: HandlerSlot<A>,
    pending: RefCell<Option<A>>,
    timer: Cell<Option<TimerId>>,
}

impl<A> DebouncerInner<A> {
    fn fire(&self) {
        self.timer.set(None);
        let args = self.pending.borrow_mut().take();
        if let Some(args) = args {
            self.slot.invoke(args);
        }
    }
}

/// Trailing-edge debounce: the handler runs `wait` after the last call.
pub struct Debouncer<A: 'static> {
    inner: Rc<DebouncerInner<A>>,
}

impl<A: 'static> Debouncer<A> {
    pub fn new<F>(scheduler: Rc<dyn FrameScheduler>, wait: Duration, handler: F) -> Self
    where
        F: FnMut(A) + 'static,
    {
        Self {
            inner: Rc::new(DebouncerInner {
                scheduler,
                wait,
                slot: HandlerSlot::new(Box::new(handler)),
                pending: RefCell::new(None),
                timer: Cell::new(None),
            }),
        }
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    /// Record a call and restart the quiet period
    pub fn call(&self, args: A) {
        let inner = &self.inner;
        if inner.slot.is_torn_down() {
            return;
        }
        *inner.pending.borrow_mut() = Some(args);
        if let Some(id) = inner.timer.take() {
            inner.scheduler.clear_timeout(id);
        }
        let weak: Weak<DebouncerInner<A>> = Rc::downgrade(inner);
        let id = inner.scheduler.set_timeout(
            inner.wait,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire();
                }
            }),
        );
        inner.timer.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.timer.get().is_some()
    }

    /// Run the pending call now instead of waiting
    pub fn flush(&self) {
        if let Some(id) = self.inner.timer.take() {
            self.inner.scheduler.clear_timeout(id);
        }
        self.inner.fire();
    }

    pub fn cancel(&self) {
        if let Some(id) = self.inner.timer.take() {
            self.inner.scheduler.clear_timeout(id);
        }
        self.inner.pending.borrow_mut().take();
    }

    pub fn teardown(&self) {
        self.cancel();
        self.inner.slot.teardown();
    }
}

impl<A: 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Throttler
// ============================================================================

/// Edge options for [`Throttler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleOptions {
    /// Run immediately on the first call of an interval
    pub leading: bool,
    /// Run once more at the end of the interval with the latest arguments
    pub trailing: bool,
}

impl Default for ThrottleOptions {
    fn default() -> Self {
        Self {
            leading: true,
            trailing: true,
        }
    }
}

impl ThrottleOptions {
    /// Only the trailing edge runs
    pub fn trailing_only() -> Self {
        Self {
            leading: false,
            trailing: true,
        }
    }
}

struct ThrottlerInner<A> {
    scheduler: Rc<dyn FrameScheduler>,
    interval: Duration,
    options: ThrottleOptions,
    slot: HandlerSlot<A>,
    pending: RefCell<Option<A>>,
    timer: Cell<Option<TimerId>>,
    last_invoke: Cell<Option<Duration>>,
}

impl<A> ThrottlerInner<A> {
    fn fire(&self) {
        self.timer.set(None);
        let args = self.pending.borrow_mut().take();
        if let Some(args) = args {
            self.last_invoke.set(Some(self.scheduler.now()));
            self.slot.invoke(args);
        }
    }
}

/// Runs a handler at most once per `interval`.
pub struct Throttler<A: 'static> {
    inner: Rc<ThrottlerInner<A>>,
}

impl<A: 'static> Throttler<A> {
    pub fn new<F>(
        scheduler: Rc<dyn FrameScheduler>,
        interval: Duration,
        options: ThrottleOptions,
        handler: F,
    ) -> Self
    where
        F: FnMut(A) + 'static,
    {
        Self {
            inner: Rc::new(ThrottlerInner {
                scheduler,
                interval,
                options,
                slot: HandlerSlot::new(Box::new(handler)),
                pending: RefCell::new(None),
                timer: Cell::new(None),
                last_invoke: Cell::new(None),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn call(&self, args: A) {
        let inner = &self.inner;
        if inner.slot.is_torn_down() {
            return;
        }
        let now = inner.scheduler.now();
        let since_last = inner.last_invoke.get().map(|last| now.saturating_sub(last));
        let ready = since_last.map_or(true, |elapsed| elapsed >= inner.interval);

        if inner.options.leading && ready && inner.timer.get().is_none() {
            inner.last_invoke.set(Some(now));
            inner.pending.borrow_mut().take();
            inner.slot.invoke(args);
            return;
        }
        if !inner.options.trailing {
            return;
        }

        *inner.pending.borrow_mut() = Some(args);
        if inner.timer.get().is_some() {
            return;
        }
        let delay = match (inner.options.leading, since_last) {
            (true, Some(elapsed)) => inner.interval.saturating_sub(elapsed),
            _ => inner.interval,
        };
        let weak: Weak<ThrottlerInner<A>> = Rc::downgrade(inner);
        let id = inner.scheduler.set_timeout(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire();
                }
            }),
        );
        inner.timer.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.timer.get().is_some()
    }

    pub fn cancel(&self) {
        if let Some(id) = self.inner.timer.take() {
            self.inner.scheduler.clear_timeout(id);
        }
        self.inner.pending.borrow_mut().take();
    }

    pub fn teardown(&self) {
        self.cancel();
        self.inner.slot.teardown();
    }
}

impl<A: 'static> Drop for Throttler<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;

    fn setup() -> (Rc<VirtualScheduler>, Rc<RefCell<Vec<(u64, u32)>>>) {
        (
            Rc::new(VirtualScheduler::virtual_time()),
            Rc::new(RefCell::new(Vec::new())),
        )
    }

    fn recorder(
        scheduler: &Rc<VirtualScheduler>,
        calls: &Rc<RefCell<Vec<(u64, u32)>>>,
    ) -> impl FnMut(u32) + 'static {
        let scheduler = scheduler.clone();
        let calls = calls.clone();
        move |value| {
            let at = scheduler.now().as_millis() as u64;
            calls.borrow_mut().push((at, value));
        }
    }

    #[test]
    fn test_coalescer_runs_once_per_frame_with_latest_args() {
        let (scheduler, calls) = setup();
        let coalescer = FrameCoalescer::new(scheduler.clone(), recorder(&scheduler, &calls));

        coalescer.call(1);
        coalescer.call(2);
        coalescer.call(3);
        assert!(coalescer.is_pending());
        assert_eq!(scheduler.pending_frames(), 1);

        scheduler.next_frame();
        assert_eq!(*calls.borrow(), vec![(16, 3)]);
        assert!(!coalescer.is_pending());

        coalescer.call(4);
        scheduler.next_frame();
        assert_eq!(*calls.borrow(), vec![(16, 3), (32, 4)]);
    }

    #[test]
    fn test_coalescer_teardown_ignores_late_frame() {
        let (scheduler, calls) = setup();
        let coalescer = FrameCoalescer::new(scheduler.clone(), recorder(&scheduler, &calls));

        coalescer.call(1);
        coalescer.teardown();
        scheduler.next_frame();
        coalescer.call(2);
        scheduler.next_frame();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_coalescer_flush_runs_pending_now() {
        let (scheduler, calls) = setup();
        let coalescer = FrameCoalescer::new(scheduler.clone(), recorder(&scheduler, &calls));

        coalescer.flush();
        assert!(calls.borrow().is_empty());

        coalescer.call(5);
        coalescer.flush();
        assert_eq!(*calls.borrow(), vec![(0, 5)]);
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn test_coalescer_dropped_before_frame() {
        let (scheduler, calls) = setup();
        let coalescer = FrameCoalescer::new(scheduler.clone(), recorder(&scheduler, &calls));
        coalescer.call(1);
        drop(coalescer);
        scheduler.next_frame();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_debouncer_waits_for_quiet_period() {
        let (scheduler, calls) = setup();
        let debouncer = Debouncer::new(
            scheduler.clone(),
            Duration::from_millis(333),
            recorder(&scheduler, &calls),
        );

        debouncer.call(1);
        scheduler.advance_ms(300);
        debouncer.call(2);

        // The original deadline passes without a call
        scheduler.advance_ms(100);
        assert!(calls.borrow().is_empty());

        scheduler.advance_ms(233);
        assert_eq!(*calls.borrow(), vec![(633, 2)]);
    }

    #[test]
    fn test_debouncer_flush_and_cancel() {
        let (scheduler, calls) = setup();
        let debouncer = Debouncer::new(
            scheduler.clone(),
            Duration::from_millis(50),
            recorder(&scheduler, &calls),
        );

        debouncer.call(7);
        debouncer.flush();
        assert_eq!(*calls.borrow(), vec![(0, 7)]);

        debouncer.call(8);
        debouncer.cancel();
        scheduler.advance_ms(100);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_throttler_leading_and_trailing() {
        let (scheduler, calls) = setup();
        let throttler = Throttler::new(
            scheduler.clone(),
            Duration::from_millis(100),
            ThrottleOptions::default(),
            recorder(&scheduler, &calls),
        );

        throttler.call(1); // leading edge at 0
        scheduler.advance_ms(20);
        throttler.call(2);
        scheduler.advance_ms(20);
        throttler.call(3); // replaces 2 for the trailing edge

        scheduler.advance_ms(100);
        assert_eq!(*calls.borrow(), vec![(0, 1), (100, 3)]);
    }

    #[test]
    fn test_throttler_trailing_only() {
        let (scheduler, calls) = setup();
        let throttler = Throttler::new(
            scheduler.clone(),
            Duration::from_millis(100),
            ThrottleOptions::trailing_only(),
            recorder(&scheduler, &calls),
        );

        throttler.call(1);
        assert!(calls.borrow().is_empty());
        scheduler.advance_ms(50);
        throttler.call(2);
        scheduler.advance_ms(50);
        assert_eq!(*calls.borrow(), vec![(100, 2)]);

        // A new burst starts a new interval
        scheduler.advance_ms(30);
        throttler.call(3);
        scheduler.advance_ms(100);
        assert_eq!(*calls.borrow(), vec![(100, 2), (230, 3)]);
    }

    #[test]
    fn test_throttler_leading_only_drops_within_interval() {
        let (scheduler, calls) = setup();
        let throttler = Throttler::new(
            scheduler.clone(),
            Duration::from_millis(100),
            ThrottleOptions {
                leading: true,
                trailing: false,
            },
            recorder(&scheduler, &calls),
        );

        throttler.call(1);
        throttler.call(2);
        scheduler.advance_ms(100);
        throttler.call(3);
        assert_eq!(*calls.borrow(), vec![(0, 1), (100, 3)]);
    }

    #[test]
    fn test_handler_may_call_its_own_wrapper() {
        let scheduler = Rc::new(VirtualScheduler::virtual_time());
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Rc<FrameCoalescer<u32>>>>> = Rc::new(RefCell::new(None));

        let counter = count.clone();
        let this = slot.clone();
        let coalescer = Rc::new(FrameCoalescer::new(scheduler.clone(), move |n: u32| {
            counter.set(counter.get() + 1);
            if n > 0 {
                if let Some(me) = this.borrow().as_ref() {
                    me.call(n - 1);
                }
            }
        }));
        *slot.borrow_mut() = Some(coalescer.clone());

        coalescer.call(2);
        scheduler.advance_ms(100);
        assert_eq!(count.get(), 3);
        slot.borrow_mut().take();
    }
}
