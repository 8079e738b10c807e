//! Scroll geometry
//!
//! Pure functions that turn viewport metrics and a scroll position into the
//! size and offset of a scrollbar thumb. Nothing here touches a host
//! environment; the only shared input is the native scrollbar width, which is
//! measured once per process.
//!
//! # Example
//!
//! ```rust
//! use trackbar_core::geometry::{ScrollDirection, TrackGeometry};
//!
//! let geometry = TrackGeometry::new(0.0);
//! let size = geometry.thumb_size(100.0, 500.0, ScrollDirection::Vertical).unwrap();
//! let offset = geometry
//!     .thumb_offset(100.0, 500.0, 200.0, ScrollDirection::Vertical)
//!     .unwrap();
//! assert_eq!((size, offset), (20.0, 40.0));
//! ```

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

// ============================================================================
// Axes and directions
// ============================================================================

/// A single scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    /// Lowercase name, used for class names and logs
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Vertical => "vertical",
            Axis::Horizontal => "horizontal",
        }
    }
}

/// The directions a container is allowed to scroll in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    /// Vertical scrolling only (default)
    #[default]
    Vertical,
    /// Horizontal scrolling only
    Horizontal,
    /// Both axes, with two tracks sharing the bottom-right corner
    Both,
}

impl ScrollDirection {
    /// Lowercase name, used for class names and logs
    pub fn name(&self) -> &'static str {
        match self {
            ScrollDirection::Vertical => "vertical",
            ScrollDirection::Horizontal => "horizontal",
            ScrollDirection::Both => "both",
        }
    }

    /// Whether the given axis has a track in this direction
    pub fn has_axis(&self, axis: Axis) -> bool {
        match self {
            ScrollDirection::Vertical => axis == Axis::Vertical,
            ScrollDirection::Horizontal => axis == Axis::Horizontal,
            ScrollDirection::Both => true,
        }
    }

    /// Active axes, vertical first
    pub fn axes(&self) -> &'static [Axis] {
        match self {
            ScrollDirection::Vertical => &[Axis::Vertical],
            ScrollDirection::Horizontal => &[Axis::Horizontal],
            ScrollDirection::Both => &[Axis::Vertical, Axis::Horizontal],
        }
    }
}

impl std::str::FromStr for ScrollDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(ScrollDirection::Vertical),
            "horizontal" => Ok(ScrollDirection::Horizontal),
            "both" => Ok(ScrollDirection::Both),
            other => Err(format!("unknown scroll direction '{other}'")),
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Visible vs. total extent of the content along one axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    /// Client height (vertical) or client width (horizontal)
    pub visible_size: f32,
    /// Scroll height (vertical) or scroll width (horizontal)
    pub total_size: f32,
}

impl ViewportMetrics {
    pub fn new(visible_size: f32, total_size: f32) -> Self {
        Self {
            visible_size,
            total_size,
        }
    }

    /// Whether the content overflows the viewport
    pub fn overflows(&self) -> bool {
        self.total_size > self.visible_size
    }

    /// Largest valid scroll offset
    pub fn max_scroll(&self) -> f32 {
        (self.total_size - self.visible_size).max(0.0)
    }
}

/// Size and offset of a thumb inside its track, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbGeometry {
    pub size: f32,
    pub offset: f32,
}

// ============================================================================
// Native scrollbar width
// ============================================================================

static NATIVE_SCROLLBAR_WIDTH: OnceLock<f32> = OnceLock::new();

/// Measure the platform scrollbar width once for the whole process.
///
/// `measure` runs at most once; later calls return the stored value. A `None`
/// (no display environment) or an invalid measurement stores `0`.
pub fn init_native_scrollbar_width<F>(measure: F) -> f32
where
    F: FnOnce() -> Option<f32>,
{
    *NATIVE_SCROLLBAR_WIDTH.get_or_init(|| {
        let width = measure()
            .filter(|w| w.is_finite() && *w >= 0.0)
            .unwrap_or(0.0);
        tracing::debug!("native scrollbar width measured as {width}px");
        width
    })
}

/// The process-wide native scrollbar width, `0` until initialized.
pub fn native_scrollbar_width() -> f32 {
    NATIVE_SCROLLBAR_WIDTH.get().copied().unwrap_or(0.0)
}

// ============================================================================
// Geometry
// ============================================================================

/// Round half up, like the browser's `Math.round`
#[inline]
fn round_px(value: f32) -> f32 {
    (value + 0.5).floor()
}

fn check_total(total_size: f32) -> Result<()> {
    if total_size > 0.0 && total_size.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::EmptyContent { total_size })
    }
}

fn check_visible(visible_size: f32) -> Result<()> {
    if visible_size >= 0.0 && visible_size.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::InvalidViewport { visible_size })
    }
}

/// Thumb geometry calculator bound to a scrollbar width.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackGeometry {
    scrollbar_width: f32,
}

impl TrackGeometry {
    pub fn new(scrollbar_width: f32) -> Self {
        Self {
            scrollbar_width: scrollbar_width.max(0.0),
        }
    }

    /// Geometry using the process-wide native scrollbar width
    pub fn native() -> Self {
        Self::new(native_scrollbar_width())
    }

    pub fn scrollbar_width(&self) -> f32 {
        self.scrollbar_width
    }

    /// Length of the track along an axis.
    ///
    /// With both tracks shown, each is shortened by the scrollbar width so
    /// the two don't overlap in the corner.
    pub fn track_size(&self, visible_size: f32, direction: ScrollDirection) -> f32 {
        match direction {
            ScrollDirection::Both => (visible_size - self.scrollbar_width).max(0.0),
            _ => visible_size,
        }
    }

    /// Thumb length, proportional to the visible fraction of the content
    pub fn thumb_size(
        &self,
        visible_size: f32,
        total_size: f32,
        direction: ScrollDirection,
    ) -> Result<f32> {
        check_total(total_size)?;
        check_visible(visible_size)?;
        let track = self.track_size(visible_size, direction);
        Ok(round_px(visible_size / total_size * track).clamp(0.0, track))
    }

    /// Thumb distance from the start of the track for a scroll position
    pub fn thumb_offset(
        &self,
        visible_size: f32,
        total_size: f32,
        scroll_amount: f32,
        direction: ScrollDirection,
    ) -> Result<f32> {
        let thumb = self.thumb_size(visible_size, total_size, direction)?;
        let track = self.track_size(visible_size, direction);
        let max_offset = (track - thumb).max(0.0);
        Ok(round_px(track * scroll_amount / total_size).clamp(0.0, max_offset))
    }

    /// Size and offset together
    pub fn thumb(
        &self,
        metrics: ViewportMetrics,
        scroll_amount: f32,
        direction: ScrollDirection,
    ) -> Result<ThumbGeometry> {
        let size = self.thumb_size(metrics.visible_size, metrics.total_size, direction)?;
        let offset = self.thumb_offset(
            metrics.visible_size,
            metrics.total_size,
            scroll_amount,
            direction,
        )?;
        Ok(ThumbGeometry { size, offset })
    }
}

/// [`TrackGeometry::track_size`] with the native scrollbar width
pub fn track_size(visible_size: f32, direction: ScrollDirection) -> f32 {
    TrackGeometry::native().track_size(visible_size, direction)
}

/// [`TrackGeometry::thumb_size`] with the native scrollbar width
pub fn thumb_size(visible_size: f32, total_size: f32, direction: ScrollDirection) -> Result<f32> {
    TrackGeometry::native().thumb_size(visible_size, total_size, direction)
}

/// [`TrackGeometry::thumb_offset`] with the native scrollbar width
pub fn thumb_offset(
    visible_size: f32,
    total_size: f32,
    scroll_amount: f32,
    direction: ScrollDirection,
) -> Result<f32> {
    TrackGeometry::native().thumb_offset(visible_size, total_size, scroll_amount, direction)
}

/// [`TrackGeometry::thumb`] with the native scrollbar width
pub fn thumb_geometry(
    metrics: ViewportMetrics,
    scroll_amount: f32,
    direction: ScrollDirection,
) -> Result<ThumbGeometry> {
    TrackGeometry::native().thumb(metrics, scroll_amount, direction)
}
