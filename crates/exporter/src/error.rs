//! Error types for the exporter crate.

use std::path::PathBuf;

use map_common::{MapCategory, WorldCoord};
use renderer::{CanvasError, PngError};
use thiserror::Error;

/// Errors that end an export run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no map categories requested")]
    EmptyRequest,

    #[error("world generation failed at ({x}, {y}): {source}")]
    GenerationFailed {
        x: u32,
        y: u32,
        #[source]
        source: GenerationError,
    },

    #[error("world of {width}x{height} tiles is not square")]
    UnsupportedWorld { width: u32, height: u32 },

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("{0} worker panicked")]
    WorkerPanicked(MapCategory),

    #[error("failed to write {category} map to {}: {source}", .path.display())]
    Flush {
        category: MapCategory,
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
}

impl ExportError {
    /// Create a GenerationFailed error for a world coordinate.
    pub fn generation_failed(coord: WorldCoord, source: GenerationError) -> Self {
        Self::GenerationFailed {
            x: coord.x,
            y: coord.y,
            source,
        }
    }

    /// Whether the run stopped during the world scan.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::GenerationFailed { .. })
    }
}

impl From<CanvasError> for ExportError {
    fn from(err: CanvasError) -> Self {
        match err {
            CanvasError::NotSquare { width, height } => Self::UnsupportedWorld { width, height },
            other => Self::Allocation(other.to_string()),
        }
    }
}

/// Failure to produce the detail of a world tile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("coordinate ({x}, {y}) is outside the world")]
    OutOfBounds { x: u32, y: u32 },

    #[error("region synthesis failed: {0}")]
    Failed(String),
}

/// Failure to write a finished map.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG encoding failed: {0}")]
    Png(#[from] PngError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Queue misuse or a vanished peer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("{0} queue already received its end marker")]
    Closed(MapCategory),

    #[error("{0} queue peer disconnected")]
    Disconnected(MapCategory),
}

/// Invalid export settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("failed to read settings file {path}: {message}")]
    Read { path: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
