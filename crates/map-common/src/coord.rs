//! World and embark coordinate types.
//!
//! A world tile is split into a 16x16 block of embark pixels. Tile (x, y)
//! owns the pixels `[16x, 16x + 16) x [16y, 16y + 16)`.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Embark pixels along one side of a world tile.
pub const TILE_SIZE: u32 = 16;

/// Embark pixels in one world tile.
pub const TILE_CELLS: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Position of a world tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: u32,
    pub y: u32,
}

impl WorldCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Top-left embark pixel of this tile.
    pub fn origin(&self) -> EmbarkPoint {
        EmbarkPoint::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }
}

/// Absolute embark pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbarkPoint {
    pub x: u32,
    pub y: u32,
}

impl EmbarkPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// World tile containing this pixel.
    pub fn world(&self) -> WorldCoord {
        WorldCoord::new(self.x >> 4, self.y >> 4)
    }

    /// Offset of this pixel inside its world tile, each in `[0, 16)`.
    pub fn offset(&self) -> (u32, u32) {
        (self.x % TILE_SIZE, self.y % TILE_SIZE)
    }
}

/// World size in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDims {
    pub width: u32,
    pub height: u32,
}

impl WorldDims {
    /// Create dimensions, rejecting empty worlds.
    pub fn new(width: u32, height: u32) -> MapResult<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions {
                width,
                height,
                message: "world must be at least 1x1".to_string(),
            });
        }
        // Pixel dimensions must stay addressable as u32 after the x16 expansion.
        if width.checked_mul(TILE_SIZE).is_none() || height.checked_mul(TILE_SIZE).is_none() {
            return Err(MapError::InvalidDimensions {
                width,
                height,
                message: "pixel size overflows".to_string(),
            });
        }
        Ok(Self { width, height })
    }

    /// Number of world tiles.
    pub fn tile_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn pixel_width(&self) -> u32 {
        self.width * TILE_SIZE
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * TILE_SIZE
    }

    /// Whether the world has as many rows as columns. Map buffers only
    /// accept square worlds.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn contains(&self, coord: WorldCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Iterate all coordinates in row-major order (y outer, x inner).
    pub fn coords(&self) -> impl Iterator<Item = WorldCoord> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| WorldCoord::new(x, y)))
    }
}
