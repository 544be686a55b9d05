//! Error types for the shared world model.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Errors raised while parsing or validating world model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Unknown map category: {0}")]
    UnknownCategory(String),

    #[error("Invalid world dimensions {width}x{height}: {message}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        message: String,
    },

    #[error("Invalid world date: {0}")]
    InvalidDate(String),

    #[error("Region detail for ({x},{y}) has {found} embark tiles, expected {expected}")]
    MalformedRegion {
        x: u32,
        y: u32,
        found: usize,
        expected: usize,
    },
}
