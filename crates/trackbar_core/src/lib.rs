//! trackbar core
//!
//! The host-independent foundation of the trackbar scroll container:
//!
//! - **Geometry**: thumb size and offset from viewport metrics
//! - **Hit testing**: track and thumb containment for pointer positions
//! - **Events**: host event model and a removable listener registry
//!
//! # Example
//!
//! ```rust
//! use trackbar_core::geometry::{ScrollDirection, TrackGeometry, ViewportMetrics};
//!
//! let geometry = TrackGeometry::new(0.0);
//! let thumb = geometry
//!     .thumb(ViewportMetrics::new(100.0, 500.0), 200.0, ScrollDirection::Vertical)
//!     .unwrap();
//! assert_eq!(thumb.size, 20.0);
//! assert_eq!(thumb.offset, 40.0);
//! ```

pub mod error;
pub mod events;
pub mod geometry;

pub use error::GeometryError;
pub use events::{Event, EventData, EventDispatcher, EventType, Listener, ListenerId};
pub use geometry::{
    init_native_scrollbar_width, native_scrollbar_width, Axis, ScrollDirection, ThumbGeometry,
    TrackGeometry, ViewportMetrics,
};
pub use hit_test::{point_in_rect, thumb_hit_test, PagingDirection, Point, Rect, TrackHit};
