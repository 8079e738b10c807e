//! Host environment seams
//!
//! The scroll container never touches a concrete UI toolkit. Everything it
//! reads or writes goes through these traits:
//!
//! - [`ScrollSurface`]: the natively scrollable content region
//! - [`TrackNode`]: a rendered track, for hit testing
//! - [`WindowEvents`]: window-level listeners (resize, drag tracking)
//! - [`FrameScheduler`]: frames, timers and the clock
//!
//! [`Environment::Detached`] stands in for hosts without a window (server
//! rendering, tests of pure view output): listener registration and
//! scheduling become no-ops.

use std::rc::Rc;

use trackbar_animation::{FrameScheduler, NullScheduler};
use trackbar_core::{Axis, EventType, Listener, ListenerId, Rect, ViewportMetrics};

/// Layout and scroll offsets of the content region, read in one go
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceMetrics {
    pub client_width: f32,
    pub client_height: f32,
    pub scroll_width: f32,
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub scroll_left: f32,
}

impl SurfaceMetrics {
    /// Visible vs. total extent along an axis
    pub fn viewport(&self, axis: Axis) -> ViewportMetrics {
        match axis {
            Axis::Vertical => ViewportMetrics::new(self.client_height, self.scroll_height),
            Axis::Horizontal => ViewportMetrics::new(self.client_width, self.scroll_width),
        }
    }

    /// Scroll offset along an axis
    pub fn scroll(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.scroll_top,
            Axis::Horizontal => self.scroll_left,
        }
    }
}

/// The content region whose native scrolling the container drives
pub trait ScrollSurface {
    fn metrics(&self) -> SurfaceMetrics;

    fn set_scroll_top(&self, value: f32);

    fn set_scroll_left(&self, value: f32);

    /// Write the scroll offset along an axis
    fn set_scroll(&self, axis: Axis, value: f32) {
        match axis {
            Axis::Vertical => self.set_scroll_top(value),
            Axis::Horizontal => self.set_scroll_left(value),
        }
    }
}

/// A rendered track element
pub trait TrackNode {
    /// Current layout box in viewport coordinates
    fn bounding_rect(&self) -> Rect;
}

/// Window-level event registration
pub trait WindowEvents {
    fn add_listener(&self, event_type: EventType, listener: Listener) -> ListenerId;

    /// Remove a listener. Returns false if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Number of listeners currently registered
    fn listener_count(&self) -> usize;
}

/// Where a container runs
#[derive(Clone)]
pub enum Environment {
    /// A live window with a frame scheduler
    Attached {
        window: Rc<dyn WindowEvents>,
        scheduler: Rc<dyn FrameScheduler>,
    },
    /// No window: nothing is scheduled and no listener is registered
    Detached,
}

impl Environment {
    pub fn attached(window: Rc<dyn WindowEvents>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Environment::Attached { window, scheduler }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Environment::Attached { .. })
    }

    pub fn window(&self) -> Option<&Rc<dyn WindowEvents>> {
        match self {
            Environment::Attached { window, .. } => Some(window),
            Environment::Detached => None,
        }
    }

    /// The scheduler, or a [`NullScheduler`] when detached
    pub fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        match self {
            Environment::Attached { scheduler, .. } => scheduler.clone(),
            Environment::Detached => Rc::new(NullScheduler),
        }
    }

    /// Register a window listener; `None` when detached
    pub fn add_window_listener(&self, event_type: EventType, listener: Listener) -> Option<ListenerId> {
        self.window()
            .map(|window| window.add_listener(event_type, listener))
    }

    pub fn remove_window_listener(&self, id: ListenerId) {
        if let Some(window) = self.window() {
            if !window.remove_listener(id) {
                tracing::warn!("window listener {:?} was already removed", id);
            }
        }
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Attached { window, .. } => f
                .debug_struct("Attached")
                .field("listeners", &window.listener_count())
                .finish(),
            Environment::Detached => f.write_str("Detached"),
        }
    }
}
