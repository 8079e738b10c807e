//! Interaction state machine for the scroll container
//!
//! Exactly one of three modes owns the scroll offset at any time:
//!
//! ```text
//!              ThumbPointerDown                 ScrollTo
//!   Dragging <------------------ Idle ----------------------> AnimatingScrollTo
//!       |                        ^  ^                              |   ^
//!       +------- PointerUp ------+  +-- AnimationComplete/Interrupt+   | ScrollTo
//!                                                                  +---+
//! ```
//!
//! Hover is tracked separately per axis in [`HoverState`]; it decorates any
//! of the modes without changing which one controls the offset.

use trackbar_core::{Axis, Rect, TrackHit};

/// Bookkeeping captured when a thumb drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub axis: Axis,
    /// Pointer coordinate along the axis at pointer-down
    pub drag_start_position: f32,
    /// Scroll offset along the axis at pointer-down
    pub starting_scroll_position: f32,
}

impl DragState {
    /// Scroll offset for a pointer position.
    ///
    /// The thumb moves `visible / total` pixels per scrolled pixel, so the
    /// pointer delta is scaled back up by `total / visible`.
    pub fn scroll_for(&self, pointer: f32, visible_size: f32, total_size: f32) -> f32 {
        if visible_size <= 0.0 {
            return self.starting_scroll_position;
        }
        let scroll_diff = (total_size / visible_size) * (pointer - self.drag_start_position);
        self.starting_scroll_position + scroll_diff
    }
}

/// Which mode controls the scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrollState {
    #[default]
    Idle,
    Dragging(DragState),
    AnimatingScrollTo { target_x: f32, target_y: f32 },
}

/// Inputs that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    /// Pointer pressed on a thumb
    ThumbPointerDown(DragState),
    /// Window-level pointer release
    PointerUp,
    /// Animated scroll requested (track paging or `scroll_to`)
    ScrollTo { target_x: f32, target_y: f32 },
    /// The scroll tween wrote its final frame
    AnimationComplete,
    /// The tween was stopped in favour of an immediate write
    Interrupt,
    /// The container is being torn down
    Unmount,
}

impl ScrollState {
    /// Handle an input and return the new state, or None if no transition
    pub fn on_event(&self, input: &ScrollInput) -> Option<Self> {
        use ScrollInput::*;
        match (self, input) {
            (ScrollState::Idle, ThumbPointerDown(drag)) => Some(ScrollState::Dragging(*drag)),
            (ScrollState::Dragging(_), PointerUp) => Some(ScrollState::Idle),

            // The drag owns the offset until release
            (ScrollState::Dragging(_), ScrollTo { .. }) => None,
            (_, ScrollTo { target_x, target_y }) => Some(ScrollState::AnimatingScrollTo {
                target_x: *target_x,
                target_y: *target_y,
            }),

            (ScrollState::AnimatingScrollTo { .. }, AnimationComplete | Interrupt) => {
                Some(ScrollState::Idle)
            }

            (ScrollState::Idle, Unmount) => None,
            (_, Unmount) => Some(ScrollState::Idle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScrollState::Idle => "idle",
            ScrollState::Dragging(_) => "dragging",
            ScrollState::AnimatingScrollTo { .. } => "animating",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ScrollState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, ScrollState::Dragging(_))
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, ScrollState::AnimatingScrollTo { .. })
    }

    pub fn drag(&self) -> Option<DragState> {
        match self {
            ScrollState::Dragging(drag) => Some(*drag),
            _ => None,
        }
    }
}

/// Per-axis hover decoration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverState {
    pub track_hovered: bool,
    pub thumb_hovered: bool,
    /// Cached track layout box, recomputed lazily after invalidation
    pub track_rect: Option<Rect>,
}

impl HoverState {
    /// Apply a hit-test result. Returns true if either flag changed.
    ///
    /// Any change drops the cached rectangle, so the next pointer move
    /// re-reads the layout.
    pub fn apply(&mut self, hit: TrackHit) -> bool {
        let track_hovered = hit.is_inside();
        let thumb_hovered = hit == TrackHit::Thumb;
        let changed = track_hovered != self.track_hovered || thumb_hovered != self.thumb_hovered;
        if changed {
            self.track_rect = None;
        }
        self.track_hovered = track_hovered;
        self.thumb_hovered = thumb_hovered;
        changed
    }

    /// Pointer left the container
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn invalidate_rect(&mut self) {
        self.track_rect = None;
    }
}
