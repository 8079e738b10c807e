//! Track widget view
//!
//! A [`ScrollTrack`] is the rendered state of one axis: the rail, the thumb
//! inside it, and their hover modifiers. Hosts turn it into whatever node
//! type they render, and hand the resulting node back through a
//! [`TrackRef`] so the container can hit-test against it.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use serde::Serialize;
use trackbar_core::{Axis, Rect, ThumbGeometry};

use crate::host::TrackNode;

/// Block name shared by every class the container emits
pub const BASE_CLASS: &str = "scroll-container";

/// Visual state of one axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AxisView {
    pub thumb_size: f32,
    pub thumb_offset: f32,
    pub track_size: f32,
    pub track_hovered: bool,
    pub thumb_hovered: bool,
}

impl AxisView {
    pub fn thumb(&self) -> ThumbGeometry {
        ThumbGeometry {
            size: self.thumb_size,
            offset: self.thumb_offset,
        }
    }

    /// Whether the content overflows along this axis. Hosts may hide tracks
    /// that are not scrollable.
    pub fn is_scrollable(&self) -> bool {
        self.thumb_size < self.track_size
    }
}

/// Inline style of a thumb; only the properties of its axis are set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbStyle {
    pub top: Option<f32>,
    pub left: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl ThumbStyle {
    /// CSS declarations, e.g. `top: 40px; height: 20px`
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for (name, value) in [
            ("top", self.top),
            ("left", self.left),
            ("width", self.width),
            ("height", self.height),
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

/// Rendered state of one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrack {
    pub axis: Axis,
    pub view: AxisView,
}

impl ScrollTrack {
    pub fn new(axis: Axis, view: AxisView) -> Self {
        Self { axis, view }
    }

    /// `scroll-container__track scroll-container__track-{axis}` plus
    /// `scroll-container__track-hover` while hovered
    pub fn track_class(&self) -> String {
        let axis = self.axis.name();
        let mut class = format!("{BASE_CLASS}__track {BASE_CLASS}__track-{axis}");
        if self.view.track_hovered {
            let _ = write!(class, " {BASE_CLASS}__track-hover");
        }
        class
    }

    pub fn thumb_class(&self) -> String {
        let axis = self.axis.name();
        let mut class = format!("{BASE_CLASS}__thumb {BASE_CLASS}__thumb-{axis}");
        if self.view.thumb_hovered {
            let _ = write!(class, " {BASE_CLASS}__thumb-hover");
        }
        class
    }

    pub fn thumb_style(&self) -> ThumbStyle {
        let AxisView {
            thumb_size,
            thumb_offset,
            ..
        } = self.view;
        match self.axis {
            Axis::Vertical => ThumbStyle {
                top: Some(thumb_offset),
                height: Some(thumb_size),
                ..Default::default()
            },
            Axis::Horizontal => ThumbStyle {
                left: Some(thumb_offset),
                width: Some(thumb_size),
                ..Default::default()
            },
        }
    }
}

/// Slot through which the host attaches the node rendered for a track.
///
/// Clones share the slot, so the container and the host each hold one.
#[derive(Clone)]
pub struct TrackRef {
    axis: Axis,
    node: Rc<RefCell<Option<Rc<dyn TrackNode>>>>,
}

impl TrackRef {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            node: Rc::new(RefCell::new(None)),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Attach the rendered node, replacing any previous one
    pub fn attach(&self, node: Rc<dyn TrackNode>) {
        tracing::trace!("{} track attached", self.axis.name());
        *self.node.borrow_mut() = Some(node);
    }

    pub fn detach(&self) {
        self.node.borrow_mut().take();
    }

    pub fn is_attached(&self) -> bool {
        self.node.borrow().is_some()
    }

    /// Current layout box of the attached node
    pub fn bounding_rect(&self) -> Option<Rect> {
        let node = self.node.borrow().clone();
        node.map(|node| node.bounding_rect())
    }
}

impl std::fmt::Debug for TrackRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackRef")
            .field("axis", &self.axis)
            .field("attached", &self.is_attached())
            .finish()
    }
}
