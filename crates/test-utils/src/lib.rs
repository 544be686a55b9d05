//! Shared test utilities for the world map exporter workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Region detail generators
//! - Common world and site fixtures
//! - Output directory helpers
//! - Pixel assertion macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_pixel_eq, gradient_region, fixtures};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use paths::*;

/// Byte offset of pixel (x, y) in a row-major RGBA buffer.
pub fn rgba_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Macro asserting the RGBA value of one pixel in a row-major buffer.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixel_eq;
///
/// assert_pixel_eq!(bytes, 32, (3, 4), [255, 0, 0, 255]);
/// ```
#[macro_export]
macro_rules! assert_pixel_eq {
    ($bytes:expr, $width:expr, ($x:expr, $y:expr), $expected:expr) => {{
        let offset = $crate::rgba_offset($width, $x, $y);
        let actual: [u8; 4] = [
            $bytes[offset],
            $bytes[offset + 1],
            $bytes[offset + 2],
            $bytes[offset + 3],
        ];
        let expected: [u8; 4] = $expected;
        if actual != expected {
            panic!(
                "assertion failed: pixel ({}, {})\n  actual: `{:?}`,\nexpected: `{:?}`",
                $x, $y, actual, expected
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_offset() {
        assert_eq!(rgba_offset(4, 0, 0), 0);
        assert_eq!(rgba_offset(4, 1, 0), 4);
        assert_eq!(rgba_offset(4, 0, 1), 16);
    }

    #[test]
    fn test_assert_pixel_eq_passes() {
        let bytes = [0u8, 0, 0, 0, 9, 8, 7, 255];
        assert_pixel_eq!(bytes, 2, (1, 0), [9, 8, 7, 255]);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_pixel_eq_fails() {
        let bytes = [1u8, 2, 3, 4];
        assert_pixel_eq!(bytes, 1, (0, 0), [1, 2, 3, 5]);
    }
}
