//! Per-category map buffers.
//!
//! Pixels are grouped by world tile rather than by image scanline. For world
//! tile `(wx, wy)`, in-tile offset `(px, py)` and buffer pixel height `H`:
//!
//! ```text
//! index = wy * 16 * H + wx * 16 + py * H + px
//! ```
//!
//! The embark form splits an absolute pixel into tile and offset first, so
//! both forms always address the same index for the same physical pixel.
//! `H` doubles as the scanline stride, so the formula is only a bijection
//! onto row-major order when the world is square. Buffers refuse any other
//! shape.
//!
//! Writes that fall outside the buffer are ignored.

use map_common::{EmbarkPoint, WorldCoord, WorldDims, TILE_CELLS, TILE_SIZE};
use thiserror::Error;
use tracing::debug;

use crate::color::Rgb;

const RGBA_BYTES: usize = 4;
const RAW_BYTES: usize = 2;

/// Error raised while creating a buffer.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("failed to reserve {bytes} bytes for a {width}x{height} map buffer")]
    Allocation { bytes: usize, width: u32, height: u32 },

    #[error("a {width}x{height} map buffer does not fit in the address space")]
    TooLarge { width: u32, height: u32 },

    #[error("map buffers need a square world, got {width}x{height} tiles")]
    NotSquare { width: u32, height: u32 },
}

/// Reserve a zeroed byte buffer without aborting on allocation failure.
fn zeroed(bytes: usize, width: u32, height: u32) -> Result<Vec<u8>, CanvasError> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| CanvasError::Allocation { bytes, width, height })?;
    data.resize(bytes, 0);
    Ok(data)
}

/// Shared addressing for both buffer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    world: WorldDims,
    /// Image width in pixels.
    width: u32,
    /// Image height in pixels; also the scanline stride of the tile layout.
    height: u32,
    pixel_count: usize,
}

impl Layout {
    fn new(world: WorldDims) -> Result<Self, CanvasError> {
        if !world.is_square() {
            return Err(CanvasError::NotSquare {
                width: world.width,
                height: world.height,
            });
        }
        let width = world.pixel_width();
        let height = world.pixel_height();
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(CanvasError::TooLarge { width, height })?;
        Ok(Self {
            world,
            width,
            height,
            pixel_count,
        })
    }

    /// Buffer length for the given sample size.
    fn byte_len(&self, sample_bytes: usize) -> Result<usize, CanvasError> {
        self.pixel_count
            .checked_mul(sample_bytes)
            .ok_or(CanvasError::TooLarge {
                width: self.width,
                height: self.height,
            })
    }

    fn zeroed(&self, sample_bytes: usize) -> Result<Vec<u8>, CanvasError> {
        zeroed(self.byte_len(sample_bytes)?, self.width, self.height)
    }

    fn world_index(&self, wx: u32, wy: u32, px: u32, py: u32) -> Option<usize> {
        if wx >= self.world.width || wy >= self.world.height || px >= TILE_SIZE || py >= TILE_SIZE {
            return None;
        }
        let h = self.height as usize;
        let index = wy as usize * TILE_SIZE as usize * h
            + wx as usize * TILE_SIZE as usize
            + py as usize * h
            + px as usize;
        (index < self.pixel_count).then_some(index)
    }

    fn embark_index(&self, ex: u32, ey: u32) -> Option<usize> {
        self.world_index(ex >> 4, ey >> 4, ex % TILE_SIZE, ey % TILE_SIZE)
    }
}

/// Dense RGBA map buffer of `(W*16) x (H*16)` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseBuffer {
    layout: Layout,
    pixels: Vec<u8>,
}

impl DenseBuffer {
    /// Allocate a fully transparent buffer for a world of the given size.
    pub fn new(world: WorldDims) -> Result<Self, CanvasError> {
        let layout = Layout::new(world)?;
        let pixels = layout.zeroed(RGBA_BYTES)?;
        debug!(width = layout.width, height = layout.height, "Allocated dense map buffer");
        Ok(Self { layout, pixels })
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel index for a world tile and in-tile offset.
    pub fn world_index(&self, wx: u32, wy: u32, px: u32, py: u32) -> Option<usize> {
        self.layout.world_index(wx, wy, px, py)
    }

    /// Pixel index for an absolute embark pixel.
    pub fn embark_index(&self, ex: u32, ey: u32) -> Option<usize> {
        self.layout.embark_index(ex, ey)
    }

    /// Write a pixel addressed by world tile and in-tile offset.
    pub fn write_world(&mut self, wx: u32, wy: u32, px: u32, py: u32, color: Rgb) {
        if let Some(index) = self.layout.world_index(wx, wy, px, py) {
            self.put(index, color);
        }
    }

    /// Write a pixel addressed by absolute embark coordinates.
    pub fn write_embark(&mut self, ex: u32, ey: u32, color: Rgb) {
        if let Some(index) = self.layout.embark_index(ex, ey) {
            self.put(index, color);
        }
    }

    /// RGBA bytes of an embark pixel.
    pub fn rgba_at(&self, ex: u32, ey: u32) -> Option<[u8; 4]> {
        let offset = self.layout.embark_index(ex, ey)? * RGBA_BYTES;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + RGBA_BYTES]);
        Some(rgba)
    }

    /// RGB of an embark pixel, ignoring alpha.
    pub fn rgb_at(&self, ex: u32, ey: u32) -> Option<Rgb> {
        self.rgba_at(ex, ey).map(|[r, g, b, _]| Rgb::new(r, g, b))
    }

    /// Paint a whole world tile from 256 colors in row-major offset order.
    pub fn fill_tile<I>(&mut self, coord: WorldCoord, colors: I)
    where
        I: IntoIterator<Item = Rgb>,
    {
        for (cell, color) in colors.into_iter().take(TILE_CELLS).enumerate() {
            let px = cell as u32 % TILE_SIZE;
            let py = cell as u32 / TILE_SIZE;
            self.write_world(coord.x, coord.y, px, py, color);
        }
    }

    /// Draw one point of a thick line.
    ///
    /// The center pixel is written first, then the two neighbors on the same
    /// row and the three neighbors on the rows above and below take the
    /// border color. A neighbor whose current RGB already equals `center` is
    /// left alone so a border never erases the center of an earlier segment.
    pub fn write_thick_line_point(&mut self, point: EmbarkPoint, center: Rgb, border: Rgb) {
        let Some(center_index) = self.layout.embark_index(point.x, point.y) else {
            return;
        };
        self.put(center_index, center);

        const NEIGHBORS: [(i64, i64); 8] = [
            (1, 0),
            (-1, 0),
            (1, -1),
            (0, -1),
            (-1, -1),
            (1, 1),
            (0, 1),
            (-1, 1),
        ];
        for (dx, dy) in NEIGHBORS {
            let nx = point.x as i64 + dx;
            let ny = point.y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= self.layout.width as i64 || ny >= self.layout.height as i64 {
                continue;
            }
            let Some(index) = self.layout.embark_index(nx as u32, ny as u32) else {
                continue;
            };
            if self.rgb_index(index) != center {
                self.put(index, border);
            }
        }
    }

    fn rgb_index(&self, index: usize) -> Rgb {
        let offset = index * RGBA_BYTES;
        Rgb::new(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        )
    }

    #[inline]
    fn put(&mut self, index: usize, color: Rgb) {
        let offset = index * RGBA_BYTES;
        self.pixels[offset..offset + RGBA_BYTES].copy_from_slice(&color.to_rgba());
    }
}

/// Split a value into the two stored bytes, low byte first.
///
/// Values above `u16::MAX` are clamped.
pub fn pack_raw(value: u32) -> [u8; 2] {
    let value = value.min(u16::MAX as u32);
    if value <= 255 {
        [value as u8, 0]
    } else {
        [(value % 256) as u8, (value / 256) as u8]
    }
}

/// Numeric map buffer storing two bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuffer {
    layout: Layout,
    data: Vec<u8>,
}

impl RawBuffer {
    pub fn new(world: WorldDims) -> Result<Self, CanvasError> {
        let layout = Layout::new(world)?;
        let data = layout.zeroed(RAW_BYTES)?;
        debug!(width = layout.width, height = layout.height, "Allocated raw map buffer");
        Ok(Self { layout, data })
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Little-endian 16-bit samples in tile layout order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Store a value for a world tile and in-tile offset.
    pub fn write_data(&mut self, wx: u32, wy: u32, px: u32, py: u32, value: u32) {
        if let Some(index) = self.layout.world_index(wx, wy, px, py) {
            let offset = index * RAW_BYTES;
            self.data[offset..offset + RAW_BYTES].copy_from_slice(&pack_raw(value));
        }
    }

    /// Stored value for a world tile and in-tile offset.
    pub fn value_at(&self, wx: u32, wy: u32, px: u32, py: u32) -> Option<u16> {
        let offset = self.layout.world_index(wx, wy, px, py)? * RAW_BYTES;
        Some(u16::from_le_bytes([self.data[offset], self.data[offset + 1]]))
    }

    /// Store 256 values for a whole world tile.
    pub fn fill_tile(&mut self, coord: WorldCoord, values: &[u16]) {
        for (cell, value) in values.iter().take(TILE_CELLS).enumerate() {
            let px = cell as u32 % TILE_SIZE;
            let py = cell as u32 / TILE_SIZE;
            self.write_data(coord.x, coord.y, px, py, *value as u32);
        }
    }
}

/// Buffer owned by one category's worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapCanvas {
    Dense(DenseBuffer),
    Raw(RawBuffer),
}

impl MapCanvas {
    pub fn dense(world: WorldDims) -> Result<Self, CanvasError> {
        DenseBuffer::new(world).map(MapCanvas::Dense)
    }

    pub fn raw(world: WorldDims) -> Result<Self, CanvasError> {
        RawBuffer::new(world).map(MapCanvas::Raw)
    }

    /// Bytes a buffer of the given kind needs for `world`, without allocating.
    pub fn required_bytes(world: WorldDims, raw: bool) -> Result<usize, CanvasError> {
        let sample_bytes = if raw { RAW_BYTES } else { RGBA_BYTES };
        Layout::new(world)?.byte_len(sample_bytes)
    }

    pub fn width(&self) -> u32 {
        match self {
            MapCanvas::Dense(b) => b.width(),
            MapCanvas::Raw(b) => b.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            MapCanvas::Dense(b) => b.height(),
            MapCanvas::Raw(b) => b.height(),
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut DenseBuffer> {
        match self {
            MapCanvas::Dense(b) => Some(b),
            MapCanvas::Raw(_) => None,
        }
    }

    pub fn as_raw_mut(&mut self) -> Option<&mut RawBuffer> {
        match self {
            MapCanvas::Raw(b) => Some(b),
            MapCanvas::Dense(_) => None,
        }
    }
}
