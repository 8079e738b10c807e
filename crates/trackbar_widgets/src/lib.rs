//! Trackbar Widgets
//!
//! Custom scrollbar container: thumb geometry, drag and track paging,
//! auto-hide, and host seams for rendering and event delivery.
//!
//! # Example
//!
//! ```rust
//! use trackbar_core::ScrollDirection;
//! use trackbar_widgets::headless::HeadlessHost;
//! use trackbar_widgets::{ScrollContainer, ScrollContainerConfig};
//!
//! let host = HeadlessHost::new(300.0, 100.0, 300.0, 1000.0);
//! let container = ScrollContainer::new(
//!     ScrollContainerConfig::new(ScrollDirection::Vertical),
//!     host.surface.clone(),
//!     host.environment(),
//! );
//! host.connect(&container);
//! container.mount().unwrap();
//!
//! container.scroll_to(0.0, 300.0).unwrap();
//! host.advance_ms(100);
//! assert_eq!(host.surface.scroll_top(), 300.0);
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod headless;
pub mod host;
pub mod state;
pub mod track;

pub use config::{ScrollContainerConfig, TimingConfig};
pub use container::{ClipStyle, ContainerView, ScrollContainer, WeakScrollContainer};
pub use error::{Result, ScrollError};
pub use host::{Environment, ScrollSurface, SurfaceMetrics, TrackNode, WindowEvents};
pub use state::{DragState, HoverState, ScrollInput, ScrollState};
pub use track::{AxisView, ScrollTrack, ThumbStyle, TrackRef, BASE_CLASS};
