//! Scroll container controller
//!
//! Draws custom tracks over a natively scrollable content region. The
//! controller:
//!
//! - recomputes thumb size and offset from the content's metrics
//! - turns thumb drags into native scroll writes
//! - pages the content with a short tween on bare-track clicks
//! - rate-limits scroll, resize, drag and content-update handling
//! - fades the bars out after scroll inactivity when auto-hide is on
//!
//! # Example
//!
//! ```rust
//! use trackbar_core::{Axis, ScrollDirection};
//! use trackbar_widgets::headless::HeadlessHost;
//! use trackbar_widgets::{ScrollContainer, ScrollContainerConfig};
//!
//! let host = HeadlessHost::new(300.0, 100.0, 300.0, 500.0);
//! let container = ScrollContainer::new(
//!     ScrollContainerConfig::new(ScrollDirection::Vertical),
//!     host.surface.clone(),
//!     host.environment(),
//! );
//! host.connect(&container);
//! container.mount().unwrap();
//!
//! let view = container.axis_view(Axis::Vertical).unwrap();
//! assert_eq!(view.thumb_size, 20.0);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use trackbar_animation::{
    start_scroll_tween, AnimationHandle, Debouncer, FrameCoalescer, FrameScheduler, ScrollTween,
    ThrottleOptions, Throttler,
};
use trackbar_core::events::event_types;
use trackbar_core::{
    Axis, Event, Listener, ListenerId, PagingDirection, Point, Rect, ThumbGeometry, TrackGeometry,
    TrackHit,
};

use crate::config::ScrollContainerConfig;
use crate::error::{Result, ScrollError};
use crate::host::{Environment, ScrollSurface};
use crate::state::{DragState, HoverState, ScrollInput, ScrollState};
use crate::track::{AxisView, ScrollTrack, TrackRef, BASE_CLASS};

// ============================================================================
// View output
// ============================================================================

/// Negative margins that push the native scrollbars out of the clip box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipStyle {
    pub margin_right: Option<f32>,
    pub margin_bottom: Option<f32>,
}

impl ClipStyle {
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for (name, value) in [
            ("margin-right", self.margin_right),
            ("margin-bottom", self.margin_bottom),
        ] {
            if let Some(value) = value {
                if !css.is_empty() {
                    css.push_str("; ");
                }
                let _ = write!(css, "{name}: {value}px");
            }
        }
        css
    }
}

/// Everything a host needs to render the container
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerView {
    /// Space-separated root classes
    pub class_name: String,
    /// Class of the scrollable content region
    pub content_class: String,
    /// Inline style of the content region
    pub clip_style: ClipStyle,
    pub vertical: Option<ScrollTrack>,
    pub horizontal: Option<ScrollTrack>,
    pub state: ScrollState,
    pub force_visible: bool,
}

// ============================================================================
// Internal model
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct AxisModel {
    thumb: ThumbGeometry,
    track_size: f32,
    hover: HoverState,
}

impl AxisModel {
    fn view(&self) -> AxisView {
        AxisView {
            thumb_size: self.thumb.size,
            thumb_offset: self.thumb.offset,
            track_size: self.track_size,
            track_hovered: self.hover.track_hovered,
            thumb_hovered: self.hover.thumb_hovered,
        }
    }
}

#[derive(Debug, Default)]
struct ViewModel {
    vertical: AxisModel,
    horizontal: AxisModel,
    force_visible: bool,
}

impl ViewModel {
    fn axis(&self, axis: Axis) -> &AxisModel {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisModel {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
        }
    }
}

/// Rate-limited handlers, alive between mount and unmount
struct Limiters {
    scroll: FrameCoalescer<()>,
    resize: FrameCoalescer<()>,
    drag: FrameCoalescer<f32>,
    content_update: Throttler<()>,
    auto_hide: Debouncer<()>,
}

impl Limiters {
    fn new(inner: &Rc<ContainerInner>) -> Self {
        let scheduler = inner.scheduler.clone();
        let timing = &inner.config.timing;
        let weak = Rc::downgrade(inner);
        Self {
            scroll: FrameCoalescer::new(
                scheduler.clone(),
                bind(&weak, |inner, ()| inner.update_scroll_position()),
            ),
            resize: FrameCoalescer::new(
                scheduler.clone(),
                bind(&weak, |inner, ()| {
                    inner.invalidate_track_rects();
                    inner.update_thumb();
                }),
            ),
            drag: FrameCoalescer::new(
                scheduler.clone(),
                bind(&weak, |inner, pointer| inner.apply_drag(pointer)),
            ),
            content_update: Throttler::new(
                scheduler.clone(),
                timing.content_update_interval(),
                ThrottleOptions::trailing_only(),
                bind(&weak, |inner, ()| inner.update_thumb()),
            ),
            auto_hide: Debouncer::new(
                scheduler,
                timing.auto_hide_delay(),
                bind(&weak, |inner, ()| inner.auto_hide_after_scroll()),
            ),
        }
    }

    fn teardown(&self) {
        self.scroll.teardown();
        self.resize.teardown();
        self.drag.teardown();
        self.content_update.teardown();
        self.auto_hide.teardown();
    }
}

/// Wrap a handler so it only runs while the container is alive
fn bind<A: 'static>(
    weak: &Weak<ContainerInner>,
    handler: fn(&Rc<ContainerInner>, A),
) -> impl FnMut(A) + 'static {
    let weak = weak.clone();
    move |args| {
        if let Some(inner) = weak.upgrade() {
            handler(&inner, args);
        }
    }
}

struct ContainerInner {
    config: ScrollContainerConfig,
    geometry: TrackGeometry,
    surface: Rc<dyn ScrollSurface>,
    env: Environment,
    scheduler: Rc<dyn FrameScheduler>,
    vertical_track: TrackRef,
    horizontal_track: TrackRef,
    state: Cell<ScrollState>,
    model: RefCell<ViewModel>,
    animation: RefCell<Option<AnimationHandle>>,
    limiters: RefCell<Option<Rc<Limiters>>>,
    resize_listener: Cell<Option<ListenerId>>,
    drag_listeners: RefCell<SmallVec<[ListenerId; 2]>>,
    mounted: Cell<bool>,
}

// ============================================================================
// Public handle
// ============================================================================

/// Custom-scrollbar controller for one content region.
///
/// Clones share the same container.
#[derive(Clone)]
pub struct ScrollContainer {
    inner: Rc<ContainerInner>,
}

/// Non-owning handle to a [`ScrollContainer`]
#[derive(Clone)]
pub struct WeakScrollContainer {
    inner: Weak<ContainerInner>,
}

impl WeakScrollContainer {
    pub fn upgrade(&self) -> Option<ScrollContainer> {
        self.inner.upgrade().map(|inner| ScrollContainer { inner })
    }
}

impl ScrollContainer {
    /// Container using the process-wide native scrollbar width
    pub fn new(
        config: ScrollContainerConfig,
        surface: Rc<dyn ScrollSurface>,
        env: Environment,
    ) -> Self {
        Self::with_geometry(config, TrackGeometry::native(), surface, env)
    }

    pub fn with_geometry(
        config: ScrollContainerConfig,
        geometry: TrackGeometry,
        surface: Rc<dyn ScrollSurface>,
        env: Environment,
    ) -> Self {
        let scheduler = env.scheduler();
        let force_visible = !config.auto_hide;
        Self {
            inner: Rc::new(ContainerInner {
                config,
                geometry,
                surface,
                env,
                scheduler,
                vertical_track: TrackRef::new(Axis::Vertical),
                horizontal_track: TrackRef::new(Axis::Horizontal),
                state: Cell::new(ScrollState::Idle),
                model: RefCell::new(ViewModel {
                    force_visible,
                    ..Default::default()
                }),
                animation: RefCell::new(None),
                limiters: RefCell::new(None),
                resize_listener: Cell::new(None),
                drag_listeners: RefCell::new(SmallVec::new()),
                mounted: Cell::new(false),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakScrollContainer {
        WeakScrollContainer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &ScrollContainerConfig {
        &self.inner.config
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.inner.geometry
    }

    /// Slot for the host's rendered track node along `axis`
    pub fn track_ref(&self, axis: Axis) -> TrackRef {
        self.inner.track_ref(axis).clone()
    }

    /// Axes with a track, vertical first
    pub fn active_axes(&self) -> SmallVec<[Axis; 2]> {
        self.inner.config.direction.axes().iter().copied().collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Register window listeners and compute the initial geometry
    pub fn mount(&self) -> Result<()> {
        self.inner.mount()
    }

    /// Cancel the tween, remove every listener and tear down the rate limiters
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Native scroll of the content region
    pub fn on_scroll(&self) {
        self.inner.on_scroll();
    }

    /// Window resize
    pub fn on_resize(&self) {
        if let Some(limiters) = self.inner.limiters() {
            limiters.resize.call(());
        }
    }

    /// Click or key press inside the content, which may have changed its size
    pub fn on_content_update(&self) {
        if let Some(limiters) = self.inner.limiters() {
            limiters.content_update.call(());
        }
    }

    /// Pointer moved over the container
    pub fn on_pointer_move(&self, point: Point) {
        self.inner.on_pointer_move(point);
    }

    /// Pointer pressed inside the container. Returns true if it landed on a
    /// track or thumb.
    pub fn on_pointer_down(&self, event: &mut Event) -> bool {
        self.inner.on_pointer_down(event)
    }

    /// Pointer entered the container: track boxes are re-read on next use
    pub fn on_pointer_enter(&self) {
        self.inner.invalidate_track_rects();
    }

    pub fn on_pointer_leave(&self) {
        let mut model = self.inner.model.borrow_mut();
        model.vertical.hover.clear();
        model.horizontal.hover.clear();
    }

    /// Route a container-level event to its handler. Returns true if the
    /// container consumed it.
    pub fn handle_event(&self, event: &mut Event) -> bool {
        match event.event_type {
            event_types::POINTER_DOWN => self.on_pointer_down(event),
            event_types::POINTER_MOVE => {
                if let Some(point) = event.position() {
                    self.on_pointer_move(point);
                }
                false
            }
            event_types::POINTER_ENTER => {
                self.on_pointer_enter();
                false
            }
            event_types::POINTER_LEAVE => {
                self.on_pointer_leave();
                false
            }
            event_types::CLICK | event_types::KEY_DOWN => {
                self.on_content_update();
                false
            }
            event_types::SCROLL => {
                self.on_scroll();
                false
            }
            event_types::RESIZE => {
                self.on_resize();
                false
            }
            _ => false,
        }
    }

    // ========================================================================
    // Programmatic scrolling
    // ========================================================================

    /// Animate to an offset, clamped to the scrollable range. Ignored while
    /// a thumb is being dragged.
    pub fn scroll_to(&self, x: f32, y: f32) -> Result<()> {
        self.inner.ensure_mounted()?;
        let (x, y) = self.inner.clamp_target(x, y);
        if !self.inner.env.is_attached() {
            self.inner.jump_to(x, y);
        } else {
            self.inner.animate_to(x, y);
        }
        Ok(())
    }

    /// Jump to an offset without animating, stopping any tween in flight
    pub fn scroll_to_immediate(&self, x: f32, y: f32) -> Result<()> {
        self.inner.ensure_mounted()?;
        let (x, y) = self.inner.clamp_target(x, y);
        self.inner.jump_to(x, y);
        Ok(())
    }

    // ========================================================================
    // Geometry and view
    // ========================================================================

    /// Recompute thumb sizes and offsets now
    pub fn recompute(&self) -> Result<()> {
        self.inner.ensure_mounted()?;
        self.inner.update_thumb();
        Ok(())
    }

    /// Fresh thumb geometry for an axis, straight from the surface
    pub fn measure(&self, axis: Axis) -> Result<ThumbGeometry> {
        let metrics = self.inner.surface.metrics();
        let thumb = self.inner.geometry.thumb(
            metrics.viewport(axis),
            metrics.scroll(axis),
            self.inner.config.direction,
        )?;
        Ok(thumb)
    }

    pub fn state(&self) -> ScrollState {
        self.inner.state.get()
    }

    /// Whether the bars are currently forced visible
    pub fn is_visible(&self) -> bool {
        self.inner.model.borrow().force_visible
    }

    /// View state of an active axis
    pub fn axis_view(&self, axis: Axis) -> Option<AxisView> {
        if !self.inner.config.direction.has_axis(axis) {
            return None;
        }
        Some(self.inner.model.borrow().axis(axis).view())
    }

    /// The axis whose track is under the pointer, if any
    pub fn hovered_axis(&self) -> Option<Axis> {
        let model = self.inner.model.borrow();
        self.active_axes()
            .into_iter()
            .find(|axis| model.axis(*axis).hover.track_hovered)
    }

    /// Root classes: block, direction, caller class, then modifiers
    pub fn class_list(&self) -> SmallVec<[String; 6]> {
        let config = &self.inner.config;
        let mut classes = SmallVec::new();
        classes.push(BASE_CLASS.to_string());
        classes.push(format!("{BASE_CLASS}__{}", config.direction.name()));
        if let Some(class_name) = &config.class_name {
            classes.extend(class_name.split_whitespace().map(str::to_owned));
        }
        if config.auto_hide {
            classes.push(format!("{BASE_CLASS}__autohide"));
        }
        if self.is_visible() {
            classes.push(format!("{BASE_CLASS}__force-visible"));
        }
        if self.state().is_dragging() {
            classes.push(format!("{BASE_CLASS}__dragging"));
        }
        classes
    }

    /// Content clip style hiding the native bars of the active axes
    pub fn clip_style(&self) -> ClipStyle {
        let width = self.inner.geometry.scrollbar_width();
        if width <= 0.0 {
            return ClipStyle::default();
        }
        let direction = self.inner.config.direction;
        ClipStyle {
            margin_right: direction.has_axis(Axis::Vertical).then_some(-width),
            margin_bottom: direction.has_axis(Axis::Horizontal).then_some(-width),
        }
    }

    pub fn view(&self) -> ContainerView {
        ContainerView {
            class_name: self.class_list().join(" "),
            content_class: format!("{BASE_CLASS}__content-container"),
            clip_style: self.clip_style(),
            vertical: self
                .axis_view(Axis::Vertical)
                .map(|view| ScrollTrack::new(Axis::Vertical, view)),
            horizontal: self
                .axis_view(Axis::Horizontal)
                .map(|view| ScrollTrack::new(Axis::Horizontal, view)),
            state: self.state(),
            force_visible: self.is_visible(),
        }
    }
}

impl std::fmt::Debug for ScrollContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollContainer")
            .field("direction", &self.inner.config.direction)
            .field("state", &self.state())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// ============================================================================
// Controller internals
// ============================================================================

impl ContainerInner {
    fn track_ref(&self, axis: Axis) -> &TrackRef {
        match axis {
            Axis::Vertical => &self.vertical_track,
            Axis::Horizontal => &self.horizontal_track,
        }
    }

    fn axes(&self) -> &'static [Axis] {
        self.config.direction.axes()
    }

    fn limiters(&self) -> Option<Rc<Limiters>> {
        self.limiters.borrow().clone()
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.mounted.get() {
            Ok(())
        } else {
            Err(ScrollError::NotMounted)
        }
    }

    /// Apply an input to the state machine. Returns true on a transition.
    fn transition(&self, input: ScrollInput) -> bool {
        let current = self.state.get();
        match current.on_event(&input) {
            Some(next) => {
                tracing::debug!(
                    "scroll state {} -> {} on {:?}",
                    current.name(),
                    next.name(),
                    input
                );
                self.state.set(next);
                true
            }
            None => {
                tracing::trace!("ignored {:?} while {}", input, current.name());
                false
            }
        }
    }

    fn mount(self: &Rc<Self>) -> Result<()> {
        if self.mounted.get() {
            return Err(ScrollError::AlreadyMounted);
        }

        *self.limiters.borrow_mut() = Some(Rc::new(Limiters::new(self)));

        let weak = Rc::downgrade(self);
        let on_resize: Listener = Rc::new(move |_event: &mut Event| {
            if let Some(inner) = weak.upgrade() {
                if let Some(limiters) = inner.limiters() {
                    limiters.resize.call(());
                }
            }
        });
        self.resize_listener
            .set(self.env.add_window_listener(event_types::RESIZE, on_resize));

        self.mounted.set(true);
        self.update_thumb();
        tracing::debug!(
            "scroll container mounted ({}, auto_hide={}, env={:?})",
            self.config.direction.name(),
            self.config.auto_hide,
            self.env
        );
        Ok(())
    }

    fn unmount(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        self.transition(ScrollInput::Unmount);

        let animation = self.animation.borrow_mut().take();
        drop(animation);

        self.remove_drag_listeners();
        if let Some(id) = self.resize_listener.take() {
            self.env.remove_window_listener(id);
        }

        let limiters = self.limiters.borrow_mut().take();
        if let Some(limiters) = limiters {
            limiters.teardown();
        }

        let mut model = self.model.borrow_mut();
        model.vertical.hover.clear();
        model.horizontal.hover.clear();
        tracing::debug!("scroll container unmounted");
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    /// Full recomputation: sizes and offsets of every active axis
    fn update_thumb(&self) {
        let metrics = self.surface.metrics();
        let direction = self.config.direction;
        let mut model = self.model.borrow_mut();
        for &axis in self.axes() {
            let viewport = metrics.viewport(axis);
            match self.geometry.thumb(viewport, metrics.scroll(axis), direction) {
                Ok(thumb) => {
                    let entry = model.axis_mut(axis);
                    entry.thumb = thumb;
                    entry.track_size = self.geometry.track_size(viewport.visible_size, direction);
                    tracing::trace!(
                        "{} thumb: size={} offset={}",
                        axis.name(),
                        thumb.size,
                        thumb.offset
                    );
                }
                Err(err) => {
                    tracing::debug!("skipping {} thumb recompute: {}", axis.name(), err);
                }
            }
        }
    }

    /// Offsets only, after a scroll
    fn update_scroll_position(&self) {
        let metrics = self.surface.metrics();
        let direction = self.config.direction;
        let mut model = self.model.borrow_mut();
        for &axis in self.axes() {
            let viewport = metrics.viewport(axis);
            match self.geometry.thumb_offset(
                viewport.visible_size,
                viewport.total_size,
                metrics.scroll(axis),
                direction,
            ) {
                Ok(offset) => {
                    model.axis_mut(axis).thumb.offset = offset;
                    tracing::trace!("{} thumb offset={}", axis.name(), offset);
                }
                Err(err) => {
                    tracing::debug!("skipping {} offset update: {}", axis.name(), err);
                }
            }
        }
    }

    fn invalidate_track_rects(&self) {
        let mut model = self.model.borrow_mut();
        model.vertical.hover.invalidate_rect();
        model.horizontal.hover.invalidate_rect();
    }

    /// Cached track box, read from the host node when missing
    fn track_rect(&self, axis: Axis) -> Option<Rect> {
        if let Some(rect) = self.model.borrow().axis(axis).hover.track_rect {
            return Some(rect);
        }
        let rect = self.track_ref(axis).bounding_rect()?;
        self.model.borrow_mut().axis_mut(axis).hover.track_rect = Some(rect);
        Some(rect)
    }

    // ------------------------------------------------------------------------
    // Scroll and auto-hide
    // ------------------------------------------------------------------------

    fn on_scroll(&self) {
        let Some(limiters) = self.limiters() else {
            return;
        };
        self.model.borrow_mut().force_visible = true;
        limiters.scroll.call(());
        if self.config.auto_hide {
            limiters.auto_hide.call(());
        }
    }

    fn auto_hide_after_scroll(&self) {
        if !self.config.auto_hide || self.state.get().is_dragging() {
            return;
        }
        self.model.borrow_mut().force_visible = false;
        tracing::debug!("scrollbars hidden after inactivity");
    }

    // ------------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------------

    fn on_pointer_move(&self, point: Point) {
        if !self.mounted.get() || self.state.get().is_dragging() {
            return;
        }
        for &axis in self.axes() {
            let Some(rect) = self.track_rect(axis) else {
                continue;
            };
            let mut model = self.model.borrow_mut();
            let entry = model.axis_mut(axis);
            let hit = TrackHit::classify(point, rect, entry.thumb.offset, entry.thumb.size, axis);
            if entry.hover.apply(hit) {
                tracing::trace!(
                    "{} hover: track={} thumb={}",
                    axis.name(),
                    entry.hover.track_hovered,
                    entry.hover.thumb_hovered
                );
            }
        }
    }

    fn on_pointer_down(self: &Rc<Self>, event: &mut Event) -> bool {
        if !self.mounted.get() {
            return false;
        }
        let Some(point) = event.position() else {
            return false;
        };
        for &axis in self.axes() {
            let Some(rect) = self.track_rect(axis) else {
                continue;
            };
            let thumb = self.model.borrow().axis(axis).thumb;
            match TrackHit::classify(point, rect, thumb.offset, thumb.size, axis) {
                TrackHit::Outside => continue,
                TrackHit::Thumb => return self.start_drag(axis, point, event),
                TrackHit::Track => {
                    self.page(axis, point, rect, thumb);
                    return true;
                }
            }
        }
        false
    }

    fn start_drag(self: &Rc<Self>, axis: Axis, point: Point, event: &mut Event) -> bool {
        let drag = DragState {
            axis,
            drag_start_position: point.along(axis),
            starting_scroll_position: self.surface.metrics().scroll(axis),
        };
        if !self.transition(ScrollInput::ThumbPointerDown(drag)) {
            return false;
        }
        event.prevent_default();
        event.stop_propagation();
        self.model.borrow_mut().force_visible = true;

        let weak = Rc::downgrade(self);
        let on_move: Listener = Rc::new(move |event: &mut Event| {
            if let (Some(inner), Some(point)) = (weak.upgrade(), event.position()) {
                inner.on_drag_move(point);
            }
        });
        let weak = Rc::downgrade(self);
        let on_up: Listener = Rc::new(move |_event: &mut Event| {
            if let Some(inner) = weak.upgrade() {
                inner.end_drag();
            }
        });

        let mut listeners = self.drag_listeners.borrow_mut();
        listeners.extend(
            self.env
                .add_window_listener(event_types::POINTER_MOVE, on_move),
        );
        listeners.extend(self.env.add_window_listener(event_types::POINTER_UP, on_up));
        true
    }

    fn on_drag_move(&self, point: Point) {
        let Some(drag) = self.state.get().drag() else {
            return;
        };
        if let Some(limiters) = self.limiters() {
            limiters.drag.call(point.along(drag.axis));
        }
    }

    /// Frame-coalesced drag write
    fn apply_drag(&self, pointer: f32) {
        let Some(drag) = self.state.get().drag() else {
            return;
        };
        let viewport = self.surface.metrics().viewport(drag.axis);
        let scroll = drag.scroll_for(pointer, viewport.visible_size, viewport.total_size);
        tracing::trace!("drag {} to {}", drag.axis.name(), scroll);
        self.surface.set_scroll(drag.axis, scroll);
    }

    fn end_drag(&self) {
        // The last move of the drag may still be waiting for its frame
        if let Some(limiters) = self.limiters() {
            limiters.drag.flush();
        }
        if !self.transition(ScrollInput::PointerUp) {
            return;
        }
        self.remove_drag_listeners();
        if self.config.auto_hide {
            self.model.borrow_mut().force_visible = false;
        }
    }

    fn remove_drag_listeners(&self) {
        let ids = std::mem::take(&mut *self.drag_listeners.borrow_mut());
        for id in ids {
            self.env.remove_window_listener(id);
        }
    }

    // ------------------------------------------------------------------------
    // Programmatic scrolling
    // ------------------------------------------------------------------------

    fn page(self: &Rc<Self>, axis: Axis, point: Point, rect: Rect, thumb: ThumbGeometry) {
        let direction = PagingDirection::for_click(point, rect, thumb.offset, axis);
        let metrics = self.surface.metrics();
        let viewport = metrics.viewport(axis);
        let target = (metrics.scroll(axis) + direction.sign() * viewport.visible_size)
            .clamp(0.0, viewport.max_scroll());
        tracing::debug!("paging {:?} along {} to {}", direction, axis.name(), target);

        let (x, y) = match axis {
            Axis::Vertical => (metrics.scroll_left, target),
            Axis::Horizontal => (target, metrics.scroll_top),
        };
        if self.env.is_attached() {
            self.animate_to(x, y);
        } else {
            self.jump_to(x, y);
        }
    }

    fn clamp_target(&self, x: f32, y: f32) -> (f32, f32) {
        let metrics = self.surface.metrics();
        let clamp = |value: f32, axis: Axis| {
            if value.is_finite() {
                value.clamp(0.0, metrics.viewport(axis).max_scroll())
            } else {
                metrics.scroll(axis)
            }
        };
        (clamp(x, Axis::Horizontal), clamp(y, Axis::Vertical))
    }

    fn animate_to(self: &Rc<Self>, x: f32, y: f32) {
        if !self.transition(ScrollInput::ScrollTo {
            target_x: x,
            target_y: y,
        }) {
            tracing::debug!("scroll to ({x}, {y}) ignored during drag");
            return;
        }

        let metrics = self.surface.metrics();
        let timing = &self.config.timing;
        let tween = ScrollTween::new(
            (metrics.scroll_left, metrics.scroll_top),
            (x, y),
            timing.page_scroll_duration(),
            timing.page_scroll_easing,
        );
        let writer = Rc::downgrade(self);
        let completer = Rc::downgrade(self);
        let handle = start_scroll_tween(
            self.scheduler.clone(),
            tween,
            move |x, y| {
                if let Some(inner) = writer.upgrade() {
                    inner.write_scroll(x, y);
                }
            },
            move || {
                if let Some(inner) = completer.upgrade() {
                    inner.finish_animation();
                }
            },
        );

        // Replacing the handle cancels the tween in flight
        let previous = self.animation.borrow_mut().replace(handle);
        drop(previous);
    }

    fn finish_animation(&self) {
        self.transition(ScrollInput::AnimationComplete);
        let finished = self.animation.borrow_mut().take();
        drop(finished);
    }

    fn jump_to(&self, x: f32, y: f32) {
        if self.state.get().is_dragging() {
            tracing::debug!("scroll to ({x}, {y}) ignored during drag");
            return;
        }
        if self.transition(ScrollInput::Interrupt) {
            let animation = self.animation.borrow_mut().take();
            drop(animation);
        }
        self.write_scroll(x, y);
    }

    fn write_scroll(&self, x: f32, y: f32) {
        for &axis in self.axes() {
            let value = match axis {
                Axis::Vertical => y,
                Axis::Horizontal => x,
            };
            self.surface.set_scroll(axis, value);
        }
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;
    use trackbar_core::ScrollDirection;

    fn detached(config: ScrollContainerConfig, width: f32) -> (ScrollContainer, Rc<HeadlessSurface>) {
        let surface = Rc::new(HeadlessSurface::new(300.0, 100.0, 900.0, 500.0));
        let container = ScrollContainer::with_geometry(
            config,
            TrackGeometry::new(width),
            surface.clone(),
            Environment::Detached,
        );
        (container, surface)
    }

    #[test]
    fn test_mount_computes_geometry() {
        let (container, _) = detached(ScrollContainerConfig::default(), 0.0);
        assert_eq!(container.axis_view(Axis::Vertical).unwrap().thumb_size, 0.0);

        container.mount().unwrap();
        let view = container.axis_view(Axis::Vertical).unwrap();
        assert_eq!(view.thumb_size, 20.0);
        assert_eq!(view.thumb_offset, 0.0);
        assert_eq!(view.track_size, 100.0);
        assert!(view.is_scrollable());
        assert_eq!(container.axis_view(Axis::Horizontal), None);
    }

    #[test]
    fn test_double_mount_fails() {
        let (container, _) = detached(ScrollContainerConfig::default(), 0.0);
        container.mount().unwrap();
        assert_eq!(container.mount(), Err(ScrollError::AlreadyMounted));
    }

    #[test]
    fn test_operations_require_mount() {
        let (container, _) = detached(ScrollContainerConfig::default(), 0.0);
        assert_eq!(container.scroll_to(0.0, 10.0), Err(ScrollError::NotMounted));
        assert_eq!(
            container.scroll_to_immediate(0.0, 10.0),
            Err(ScrollError::NotMounted)
        );
        assert_eq!(container.recompute(), Err(ScrollError::NotMounted));
    }

    #[test]
    fn test_detached_scroll_to_jumps() {
        let (container, surface) = detached(ScrollContainerConfig::default(), 0.0);
        container.mount().unwrap();
        container.scroll_to(0.0, 250.0).unwrap();
        assert_eq!(surface.scroll_top(), 250.0);
        assert!(container.state().is_idle());

        // Clamped to the scrollable range
        container.scroll_to(0.0, 10_000.0).unwrap();
        assert_eq!(surface.scroll_top(), 400.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (container, surface) = detached(ScrollContainerConfig::new(ScrollDirection::Both), 15.0);
        container.mount().unwrap();
        surface.set_scroll_top(200.0);
        container.recompute().unwrap();
        let first = container.view();
        container.recompute().unwrap();
        assert_eq!(container.view(), first);
        assert_eq!(first.vertical.unwrap().view.thumb_offset, 34.0);
    }

    #[test]
    fn test_empty_content_is_skipped() {
        let surface = Rc::new(HeadlessSurface::new(300.0, 100.0, 0.0, 0.0));
        let container = ScrollContainer::with_geometry(
            ScrollContainerConfig::default(),
            TrackGeometry::new(0.0),
            surface,
            Environment::Detached,
        );
        container.mount().unwrap();
        assert_eq!(container.axis_view(Axis::Vertical), Some(AxisView::default()));
        assert!(matches!(
            container.measure(Axis::Vertical),
            Err(ScrollError::Geometry(_))
        ));
    }

    #[test]
    fn test_class_list() {
        let config = ScrollContainerConfig::new(ScrollDirection::Both)
            .auto_hide(true)
            .class_name("order-list");
        let (container, _) = detached(config, 0.0);
        assert_eq!(
            container.class_list().join(" "),
            "scroll-container scroll-container__both order-list scroll-container__autohide"
        );

        let (container, _) = detached(ScrollContainerConfig::default(), 0.0);
        assert_eq!(
            container.view().class_name,
            "scroll-container scroll-container__vertical scroll-container__force-visible"
        );
    }

    #[test]
    fn test_class_list_splits_caller_classes() {
        let config = ScrollContainerConfig::default().class_name("order-list  compact");
        let (container, _) = detached(config, 0.0);
        let classes = container.class_list();
        assert!(classes.iter().any(|class| class == "order-list"));
        assert!(classes.iter().any(|class| class == "compact"));
        assert_eq!(
            container.view().class_name,
            "scroll-container scroll-container__vertical order-list compact \
             scroll-container__force-visible"
        );

        let (container, _) = detached(ScrollContainerConfig::default().class_name(""), 0.0);
        assert_eq!(container.class_list().len(), 3);
    }

    #[test]
    fn test_clip_style_follows_active_axes() {
        let (container, _) = detached(ScrollContainerConfig::new(ScrollDirection::Both), 17.0);
        assert_eq!(
            container.clip_style().to_css(),
            "margin-right: -17px; margin-bottom: -17px"
        );

        let (container, _) = detached(ScrollContainerConfig::new(ScrollDirection::Horizontal), 17.0);
        assert_eq!(container.clip_style().to_css(), "margin-bottom: -17px");

        let (container, _) = detached(ScrollContainerConfig::default(), 0.0);
        assert_eq!(container.clip_style(), ClipStyle::default());
    }

    #[test]
    fn test_view_tracks() {
        let (container, _) = detached(ScrollContainerConfig::new(ScrollDirection::Horizontal), 0.0);
        container.mount().unwrap();
        let view = container.view();
        assert!(view.vertical.is_none());
        let horizontal = view.horizontal.unwrap();
        assert_eq!(horizontal.view.thumb_size, 100.0);
        assert_eq!(horizontal.thumb_style().to_css(), "left: 0px; width: 100px");
        assert_eq!(view.content_class, "scroll-container__content-container");
    }
}
