//! Per-category packets carried from the scan to the workers.

use map_common::{BiomeType, SiteRecord, WaterFeature, WorldCoord, TILE_CELLS};

/// Elevation and surface water of one embark tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainCell {
    pub elevation: i16,
    pub water: WaterFeature,
}

/// Tile data copied out of a region detail for a single category.
///
/// Every cell vector holds 256 entries in row-major offset order.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One scalar per embark tile.
    Field(Vec<i16>),
    Biome(Vec<BiomeType>),
    Terrain(Vec<TerrainCell>),
    /// Terrain background plus the sites located in the tile.
    Overlay {
        cells: Vec<TerrainCell>,
        sites: Vec<SiteRecord>,
    },
    /// Values for a raw numeric map.
    Raw(Vec<u16>),
}

impl Payload {
    /// Number of cells carried.
    pub fn cell_count(&self) -> usize {
        match self {
            Payload::Field(v) => v.len(),
            Payload::Biome(v) => v.len(),
            Payload::Terrain(v) => v.len(),
            Payload::Overlay { cells, .. } => cells.len(),
            Payload::Raw(v) => v.len(),
        }
    }

    /// Whether the payload covers a full tile.
    pub fn is_complete(&self) -> bool {
        self.cell_count() == TILE_CELLS
    }
}

/// Unit of work on a category queue.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryPacket {
    Data { coord: WorldCoord, payload: Payload },
    /// Last packet of a stream; nothing follows it.
    EndOfStream,
}

impl CategoryPacket {
    pub fn is_end(&self) -> bool {
        matches!(self, CategoryPacket::EndOfStream)
    }
}
