//! Per-tile world snapshots.
//!
//! A [`RegionDetail`] holds everything the exporter can draw for one world
//! tile: a 16x16 grid of embark tiles plus the sites located in the tile.

use serde::{Deserialize, Serialize};

use crate::coord::{EmbarkPoint, WorldCoord, TILE_CELLS, TILE_SIZE};
use crate::error::{MapError, MapResult};

/// Snapshot of the simulated attributes of one world tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDetail {
    pos: WorldCoord,
    /// Embark tiles in row-major order (`py * 16 + px`).
    tiles: Vec<EmbarkTile>,
    sites: Vec<SiteRecord>,
}

impl RegionDetail {
    /// Build a region detail, checking that exactly 256 embark tiles are given.
    pub fn new(pos: WorldCoord, tiles: Vec<EmbarkTile>, sites: Vec<SiteRecord>) -> MapResult<Self> {
        if tiles.len() != TILE_CELLS {
            return Err(MapError::MalformedRegion {
                x: pos.x,
                y: pos.y,
                found: tiles.len(),
                expected: TILE_CELLS,
            });
        }
        Ok(Self { pos, tiles, sites })
    }

    /// Region where every embark tile is identical.
    pub fn uniform(pos: WorldCoord, tile: EmbarkTile) -> Self {
        Self {
            pos,
            tiles: vec![tile; TILE_CELLS],
            sites: Vec::new(),
        }
    }

    pub fn pos(&self) -> WorldCoord {
        self.pos
    }

    pub fn tiles(&self) -> &[EmbarkTile] {
        &self.tiles
    }

    /// Embark tile at in-tile offset `(px, py)`.
    pub fn tile(&self, px: u32, py: u32) -> &EmbarkTile {
        &self.tiles[(py * TILE_SIZE + px) as usize]
    }

    pub fn sites(&self) -> &[SiteRecord] {
        &self.sites
    }

    pub fn with_sites(mut self, sites: Vec<SiteRecord>) -> Self {
        self.sites = sites;
        self
    }
}

/// Attributes of a single embark tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbarkTile {
    /// Height above (positive) or below (negative) sea level.
    pub elevation: i16,
    /// Average temperature in in-game degrees.
    pub temperature: i16,
    pub rainfall: u8,
    pub drainage: u8,
    pub savagery: u8,
    pub volcanism: u8,
    pub vegetation: u8,
    pub evilness: u8,
    pub salinity: u8,
    pub biome: BiomeType,
    /// Identifier of the contiguous biome region this tile belongs to.
    pub region_id: u16,
    pub water: WaterFeature,
}

impl Default for EmbarkTile {
    fn default() -> Self {
        Self {
            elevation: 100,
            temperature: 20,
            rainfall: 50,
            drainage: 50,
            savagery: 33,
            volcanism: 0,
            vegetation: 50,
            evilness: 33,
            salinity: 0,
            biome: BiomeType::TemperateGrassland,
            region_id: 0,
            water: WaterFeature::None,
        }
    }
}

/// Surface water present on an embark tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaterFeature {
    #[default]
    None,
    River,
    Lake,
    Ocean,
}

/// Biome classification of an embark tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BiomeType {
    Mountain = 0,
    Glacier,
    Tundra,
    TemperateFreshwaterSwamp,
    TemperateSaltwaterSwamp,
    TemperateFreshwaterMarsh,
    TemperateSaltwaterMarsh,
    TropicalFreshwaterSwamp,
    TropicalSaltwaterSwamp,
    Mangrove,
    TropicalFreshwaterMarsh,
    TropicalSaltwaterMarsh,
    TaigaForest,
    TemperateConiferForest,
    TemperateBroadleafForest,
    TropicalConiferForest,
    TropicalDryBroadleafForest,
    TropicalMoistBroadleafForest,
    TemperateGrassland,
    TemperateSavanna,
    TemperateShrubland,
    TropicalGrassland,
    TropicalSavanna,
    TropicalShrubland,
    BadlandDesert,
    RockyDesert,
    SandDesert,
    ArcticOcean,
    TemperateOcean,
    TropicalOcean,
    TemperateFreshwaterLake,
    TemperateBrackishLake,
    TemperateSaltwaterLake,
    TropicalFreshwaterLake,
    TropicalBrackishLake,
    TropicalSaltwaterLake,
    TemperateFreshwaterRiver,
    TemperateBrackishRiver,
    TemperateSaltwaterRiver,
    TropicalFreshwaterRiver,
    TropicalBrackishRiver,
    TropicalSaltwaterRiver,
    Subterranean,
}

impl BiomeType {
    /// Numeric identifier used by raw exports.
    pub fn id(self) -> u16 {
        self as u8 as u16
    }

    pub fn is_ocean(self) -> bool {
        matches!(
            self,
            BiomeType::ArcticOcean | BiomeType::TemperateOcean | BiomeType::TropicalOcean
        )
    }

    pub fn is_lake(self) -> bool {
        matches!(
            self,
            BiomeType::TemperateFreshwaterLake
                | BiomeType::TemperateBrackishLake
                | BiomeType::TemperateSaltwaterLake
                | BiomeType::TropicalFreshwaterLake
                | BiomeType::TropicalBrackishLake
                | BiomeType::TropicalSaltwaterLake
        )
    }
}

/// Kind of settlement or structure placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    PlayerFortress,
    DarkFortress,
    Cave,
    MountainHall,
    ForestRetreat,
    Town,
    Hamlet,
    ImportantLocation,
    Lair,
    Fortress,
    Camp,
    Monument,
    Shrine,
    Tower,
    Monastery,
    Tomb,
}

/// Relationship between two civilizations' sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Peace,
    Alliance,
    War,
}

/// Diplomatic link from a site to another site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaticLink {
    pub target: EmbarkPoint,
    pub stance: Stance,
}

/// A site located inside a world tile, with the links drawn by the
/// trading, nobility and diplomacy maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: u32,
    pub kind: SiteKind,
    pub civ_id: u32,
    /// Absolute embark pixel of the site center.
    pub pos: EmbarkPoint,
    /// Half-size of the square footprint drawn on the sites map.
    pub radius: u8,
    #[serde(default)]
    pub trade_partners: Vec<EmbarkPoint>,
    /// Sites this site owes allegiance to.
    #[serde(default)]
    pub lords: Vec<EmbarkPoint>,
    #[serde(default)]
    pub diplomacy: Vec<DiplomaticLink>,
}

impl SiteRecord {
    pub fn new(id: u32, kind: SiteKind, civ_id: u32, pos: EmbarkPoint) -> Self {
        Self {
            id,
            kind,
            civ_id,
            pos,
            radius: 1,
            trade_partners: Vec::new(),
            lords: Vec::new(),
            diplomacy: Vec::new(),
        }
    }

    pub fn link_count(&self) -> usize {
        self.trade_partners.len() + self.lords.len() + self.diplomacy.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_requires_full_tile_grid() {
        let err = RegionDetail::new(WorldCoord::new(1, 2), vec![EmbarkTile::default(); 10], vec![])
            .unwrap_err();
        assert_eq!(
            err,
            MapError::MalformedRegion {
                x: 1,
                y: 2,
                found: 10,
                expected: 256
            }
        );
    }

    #[test]
    fn test_tile_lookup_is_row_major() {
        let mut tiles = vec![EmbarkTile::default(); TILE_CELLS];
        tiles[3 * 16 + 5].elevation = -42;
        let region = RegionDetail::new(WorldCoord::new(0, 0), tiles, vec![]).unwrap();
        assert_eq!(region.tile(5, 3).elevation, -42);
        assert_eq!(region.tile(3, 5).elevation, 100);
    }

    #[test]
    fn test_biome_ids_are_stable() {
        assert_eq!(BiomeType::Mountain.id(), 0);
        assert_eq!(BiomeType::Subterranean.id(), 42);
        assert!(BiomeType::TropicalOcean.is_ocean());
        assert!(BiomeType::TemperateBrackishLake.is_lake());
        assert!(!BiomeType::Glacier.is_ocean());
    }

    #[test]
    fn test_site_serde_defaults_links() {
        let json = r#"{"id":7,"kind":"town","civ_id":2,"pos":{"x":40,"y":12},"radius":2}"#;
        let site: SiteRecord = serde_json::from_str(json).unwrap();
        assert_eq!(site.kind, SiteKind::Town);
        assert_eq!(site.link_count(), 0);
    }
}
