//! Writing finished maps to disk.

use std::fs;
use std::path::Path;

use renderer::png::{create_png_auto, create_png_gray16};
use tracing::debug;

use crate::error::EncodeError;

/// Image-encoding collaborator used when flushing buffers.
pub trait ImageEncoder: Send + Sync {
    /// Write RGBA pixels (row-major, 4 bytes each).
    fn encode_rgba(
        &self,
        path: &Path,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<u64, EncodeError>;

    /// Write 16-bit samples stored little-endian.
    fn encode_gray16(
        &self,
        path: &Path,
        samples_le: &[u8],
        width: u32,
        height: u32,
    ) -> Result<u64, EncodeError>;
}

/// Writes PNG files with the renderer's encoder. Returns bytes written.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngFileEncoder;

impl PngFileEncoder {
    fn write(path: &Path, png: Vec<u8>) -> Result<u64, EncodeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &png)?;
        debug!(path = %path.display(), bytes = png.len(), "Wrote map image");
        Ok(png.len() as u64)
    }
}

impl ImageEncoder for PngFileEncoder {
    fn encode_rgba(
        &self,
        path: &Path,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<u64, EncodeError> {
        let png = create_png_auto(pixels, width as usize, height as usize)?;
        Self::write(path, png)
    }

    fn encode_gray16(
        &self,
        path: &Path,
        samples_le: &[u8],
        width: u32,
        height: u32,
    ) -> Result<u64, EncodeError> {
        let png = create_png_gray16(samples_le, width as usize, height as usize)?;
        Self::write(path, png)
    }
}
