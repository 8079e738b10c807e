//! In-memory host for tests and scenario runs
//!
//! Mirrors what a browser gives the container: a content region that clamps
//! its scroll offsets and reports scrolls, track elements with fixed layout
//! boxes, and a window listener registry. Time runs on a
//! [`VirtualScheduler`], so every debounce and tween is deterministic.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use trackbar_animation::{FrameScheduler, VirtualScheduler};
use trackbar_core::events::{deliver, event_types};
use trackbar_core::{Axis, Event, EventDispatcher, EventType, Listener, ListenerId, Rect};

use crate::container::ScrollContainer;
use crate::host::{Environment, ScrollSurface, SurfaceMetrics, TrackNode, WindowEvents};

type ScrollHook = Rc<dyn Fn()>;

/// Content region with clamped scroll offsets
pub struct HeadlessSurface {
    metrics: Cell<SurfaceMetrics>,
    scroll_hook: RefCell<Option<ScrollHook>>,
    writes: Cell<usize>,
}

impl HeadlessSurface {
    pub fn new(client_width: f32, client_height: f32, scroll_width: f32, scroll_height: f32) -> Self {
        Self {
            metrics: Cell::new(SurfaceMetrics {
                client_width,
                client_height,
                scroll_width,
                scroll_height,
                scroll_top: 0.0,
                scroll_left: 0.0,
            }),
            scroll_hook: RefCell::new(None),
            writes: Cell::new(0),
        }
    }

    /// Called after every scroll offset change, like a native scroll event
    pub fn set_scroll_hook<F>(&self, hook: F)
    where
        F: Fn() + 'static,
    {
        *self.scroll_hook.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn clear_scroll_hook(&self) {
        self.scroll_hook.borrow_mut().take();
    }

    /// Resize the visible region. Offsets are re-clamped.
    pub fn set_client_size(&self, width: f32, height: f32) {
        let mut metrics = self.metrics.get();
        metrics.client_width = width;
        metrics.client_height = height;
        self.metrics.set(metrics);
        self.reclamp();
    }

    /// Change the content extent. Offsets are re-clamped.
    pub fn set_content_size(&self, width: f32, height: f32) {
        let mut metrics = self.metrics.get();
        metrics.scroll_width = width;
        metrics.scroll_height = height;
        self.metrics.set(metrics);
        self.reclamp();
    }

    /// Number of offset writes that changed the position
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn scroll_top(&self) -> f32 {
        self.metrics.get().scroll_top
    }

    pub fn scroll_left(&self) -> f32 {
        self.metrics.get().scroll_left
    }

    fn max_scroll(metrics: &SurfaceMetrics, axis: Axis) -> f32 {
        metrics.viewport(axis).max_scroll()
    }

    fn reclamp(&self) {
        let metrics = self.metrics.get();
        let top = metrics.scroll_top.min(Self::max_scroll(&metrics, Axis::Vertical));
        let left = metrics.scroll_left.min(Self::max_scroll(&metrics, Axis::Horizontal));
        self.write(Axis::Vertical, top);
        self.write(Axis::Horizontal, left);
    }

    fn write(&self, axis: Axis, value: f32) {
        let mut metrics = self.metrics.get();
        let value = if value.is_finite() {
            value.clamp(0.0, Self::max_scroll(&metrics, axis))
        } else {
            0.0
        };
        let slot = match axis {
            Axis::Vertical => &mut metrics.scroll_top,
            Axis::Horizontal => &mut metrics.scroll_left,
        };
        if *slot == value {
            return;
        }
        *slot = value;
        self.metrics.set(metrics);
        self.writes.set(self.writes.get() + 1);

        let hook = self.scroll_hook.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl ScrollSurface for HeadlessSurface {
    fn metrics(&self) -> SurfaceMetrics {
        self.metrics.get()
    }

    fn set_scroll_top(&self, value: f32) {
        self.write(Axis::Vertical, value);
    }

    fn set_scroll_left(&self, value: f32) {
        self.write(Axis::Horizontal, value);
    }
}

/// Track element with a settable layout box
#[derive(Debug, Default)]
pub struct HeadlessTrack {
    rect: Cell<Rect>,
}

impl HeadlessTrack {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect: Cell::new(rect),
        }
    }

    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }
}

impl TrackNode for HeadlessTrack {
    fn bounding_rect(&self) -> Rect {
        self.rect.get()
    }
}

/// Window listener registry
#[derive(Default)]
pub struct HeadlessWindow {
    dispatcher: RefCell<EventDispatcher>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to the window's listeners.
    ///
    /// The registry is not borrowed while listeners run, so they may add or
    /// remove listeners.
    pub fn dispatch(&self, event: &mut Event) -> usize {
        let listeners = self.dispatcher.borrow().listeners_for(event.event_type);
        deliver(listeners, event)
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> usize {
        self.dispatch(&mut Event::pointer(event_types::POINTER_MOVE, x, y))
    }

    pub fn pointer_up(&self, x: f32, y: f32) -> usize {
        self.dispatch(&mut Event::pointer(event_types::POINTER_UP, x, y))
    }

    pub fn resize(&self, width: f32, height: f32) -> usize {
        self.dispatch(&mut Event::resize(width, height))
    }

    pub fn count_for(&self, event_type: EventType) -> usize {
        self.dispatcher.borrow().count_for(event_type)
    }
}

impl WindowEvents for HeadlessWindow {
    fn add_listener(&self, event_type: EventType, listener: Listener) -> ListenerId {
        self.dispatcher.borrow_mut().register_rc(event_type, listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.dispatcher.borrow_mut().unregister(id)
    }

    fn listener_count(&self) -> usize {
        self.dispatcher.borrow().len()
    }
}

/// A complete in-memory host: surface, tracks, window and virtual clock
pub struct HeadlessHost {
    pub scheduler: Rc<VirtualScheduler>,
    pub window: Rc<HeadlessWindow>,
    pub surface: Rc<HeadlessSurface>,
    pub vertical_track: Rc<HeadlessTrack>,
    pub horizontal_track: Rc<HeadlessTrack>,
}

/// Width of the headless track rails
pub const HEADLESS_TRACK_THICKNESS: f32 = 10.0;

impl HeadlessHost {
    /// Host whose container sits at the viewport origin, with tracks along
    /// the right and bottom edges of the visible region
    pub fn new(client_width: f32, client_height: f32, scroll_width: f32, scroll_height: f32) -> Self {
        let thickness = HEADLESS_TRACK_THICKNESS;
        Self {
            scheduler: Rc::new(VirtualScheduler::virtual_time()),
            window: Rc::new(HeadlessWindow::new()),
            surface: Rc::new(HeadlessSurface::new(
                client_width,
                client_height,
                scroll_width,
                scroll_height,
            )),
            vertical_track: Rc::new(HeadlessTrack::new(Rect::new(
                0.0,
                client_width - thickness,
                thickness,
                client_height,
            ))),
            horizontal_track: Rc::new(HeadlessTrack::new(Rect::new(
                client_height - thickness,
                0.0,
                client_width,
                thickness,
            ))),
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::attached(self.window.clone(), self.scheduler.clone())
    }

    pub fn track(&self, axis: Axis) -> &Rc<HeadlessTrack> {
        match axis {
            Axis::Vertical => &self.vertical_track,
            Axis::Horizontal => &self.horizontal_track,
        }
    }

    /// Attach the tracks and forward surface scrolls to `container`
    pub fn connect(&self, container: &ScrollContainer) {
        for &axis in container.config().direction.axes() {
            container.track_ref(axis).attach(self.track(axis).clone());
        }
        let weak = container.downgrade();
        self.surface.set_scroll_hook(move || {
            if let Some(container) = weak.upgrade() {
                container.on_scroll();
            }
        });
    }

    /// Resize the visible region and fire a window resize
    pub fn resize(&self, client_width: f32, client_height: f32) {
        self.surface.set_client_size(client_width, client_height);
        self.window.resize(client_width, client_height);
    }

    pub fn advance(&self, delta: Duration) {
        self.scheduler.advance(delta);
    }

    pub fn advance_ms(&self, millis: u64) {
        self.scheduler.advance_ms(millis);
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_clamps_offsets() {
        let surface = HeadlessSurface::new(100.0, 100.0, 100.0, 1000.0);
        surface.set_scroll_top(2000.0);
        assert_eq!(surface.scroll_top(), 900.0);
        surface.set_scroll_top(-5.0);
        assert_eq!(surface.scroll_top(), 0.0);
        surface.set_scroll_left(50.0);
        assert_eq!(surface.scroll_left(), 0.0);
    }

    #[test]
    fn test_surface_hook_fires_on_change_only() {
        let surface = HeadlessSurface::new(100.0, 100.0, 100.0, 1000.0);
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        surface.set_scroll_hook(move || counter.set(counter.get() + 1));

        surface.set_scroll_top(10.0);
        surface.set_scroll_top(10.0);
        assert_eq!(fired.get(), 1);
        assert_eq!(surface.write_count(), 1);
    }

    #[test]
    fn test_shrinking_content_reclamps() {
        let surface = HeadlessSurface::new(100.0, 100.0, 100.0, 1000.0);
        surface.set_scroll_top(800.0);
        surface.set_content_size(100.0, 500.0);
        assert_eq!(surface.scroll_top(), 400.0);
    }

    #[test]
    fn test_window_listener_may_remove_itself() {
        let window = Rc::new(HeadlessWindow::new());
        let id_slot = Rc::new(Cell::new(None));

        let win = Rc::downgrade(&window);
        let slot = id_slot.clone();
        let id = window.add_listener(
            event_types::POINTER_UP,
            Rc::new(move |_| {
                if let (Some(window), Some(id)) = (win.upgrade(), slot.get()) {
                    window.remove_listener(id);
                }
            }),
        );
        id_slot.set(Some(id));

        assert_eq!(window.pointer_up(0.0, 0.0), 1);
        assert_eq!(window.listener_count(), 0);
        assert_eq!(window.pointer_up(0.0, 0.0), 0);
    }

    #[test]
    fn test_host_track_layout() {
        let host = HeadlessHost::new(300.0, 100.0, 900.0, 500.0);
        assert_eq!(
            host.vertical_track.bounding_rect(),
            Rect::new(0.0, 290.0, 10.0, 100.0)
        );
        assert_eq!(
            host.horizontal_track.bounding_rect(),
            Rect::new(90.0, 0.0, 300.0, 10.0)
        );
    }
}
