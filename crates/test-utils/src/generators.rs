//! Region detail generators with predictable contents.
//!
//! These generators create details whose per-pixel values can be checked
//! directly in rendered buffers.

use map_common::{
    BiomeType, EmbarkTile, RegionDetail, SiteRecord, WaterFeature, WorldCoord, TILE_CELLS,
    TILE_SIZE,
};

/// Creates a detail where every embark tile is identical.
pub fn uniform_region(coord: WorldCoord, tile: EmbarkTile) -> RegionDetail {
    RegionDetail::uniform(coord, tile)
}

/// Creates a detail whose values encode the in-tile offset.
///
/// Each cell has `elevation = 100 + py * 16 + px`, `rainfall = px * 16 + py`
/// and `region_id = px + py * 16`, so any pixel can be traced back to its
/// source cell.
pub fn gradient_region(coord: WorldCoord) -> RegionDetail {
    let mut tiles = Vec::with_capacity(TILE_CELLS);
    for py in 0..TILE_SIZE {
        for px in 0..TILE_SIZE {
            tiles.push(EmbarkTile {
                elevation: (100 + py * TILE_SIZE + px) as i16,
                rainfall: (px * TILE_SIZE + py) as u8,
                region_id: (px + py * TILE_SIZE) as u16,
                ..EmbarkTile::default()
            });
        }
    }
    RegionDetail::new(coord, tiles, Vec::new()).expect("gradient detail has 256 tiles")
}

/// Creates an all-ocean detail.
pub fn ocean_region(coord: WorldCoord) -> RegionDetail {
    RegionDetail::uniform(
        coord,
        EmbarkTile {
            elevation: -50,
            biome: BiomeType::TemperateOcean,
            water: WaterFeature::Ocean,
            ..EmbarkTile::default()
        },
    )
}

/// Creates a default land detail holding `sites`.
pub fn site_region(coord: WorldCoord, sites: Vec<SiteRecord>) -> RegionDetail {
    RegionDetail::uniform(coord, EmbarkTile::default()).with_sites(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_region_encodes_offset() {
        let region = gradient_region(WorldCoord::new(1, 2));
        assert_eq!(region.tile(0, 0).elevation, 100);
        assert_eq!(region.tile(3, 1).elevation, 100 + 16 + 3);
        assert_eq!(region.tile(3, 1).region_id, 19);
        assert_eq!(region.tile(15, 15).rainfall, 255);
    }

    #[test]
    fn test_ocean_region() {
        let region = ocean_region(WorldCoord::new(0, 0));
        assert!(region.tiles().iter().all(|t| t.biome.is_ocean()));
    }
}
