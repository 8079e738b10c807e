//! Geometry error types

use thiserror::Error;

/// Errors raised by the geometry functions.
///
/// These are contract violations on the caller's side: geometry must only be
/// recomputed once the content region has been laid out.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// The content has no scrollable extent along the axis
    #[error("content has no extent along the axis (total size {total_size})")]
    EmptyContent { total_size: f32 },

    /// The viewport extent is negative or not a number
    #[error("invalid viewport extent {visible_size}")]
    InvalidViewport { visible_size: f32 },
}

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;
