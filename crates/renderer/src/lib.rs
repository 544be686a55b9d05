//! Image rendering for world map export.
//!
//! Provides:
//! - Map buffers in world tile layout (dense RGBA and raw 16-bit)
//! - Thick line drawing for overlay maps
//! - Category palettes
//! - PNG encoding (indexed, RGBA and 16-bit grayscale)

pub mod canvas;
pub mod color;
pub mod line;
pub mod palette;
pub mod png;

pub use canvas::{CanvasError, DenseBuffer, MapCanvas, RawBuffer};
pub use color::Rgb;
pub use png::PngError;
