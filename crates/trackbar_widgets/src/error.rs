//! Scroll container error types

use thiserror::Error;
use trackbar_core::GeometryError;

/// Errors raised by the scroll container and its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("scroll container is not mounted")]
    NotMounted,

    #[error("scroll container is already mounted")]
    AlreadyMounted,

    #[error("invalid scroll container config: {0}")]
    Config(String),
}

/// Result type for scroll container operations
pub type Result<T> = std::result::Result<T, ScrollError>;
