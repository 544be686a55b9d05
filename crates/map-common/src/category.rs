//! Exportable map categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::MapError;

/// One exported visualization, each with its own queue, worker and buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapCategory {
    Temperature,
    Rainfall,
    Drainage,
    Savagery,
    Volcanism,
    Vegetation,
    Evilness,
    Salinity,
    Hydrosphere,
    Elevation,
    ElevationWater,
    Biome,
    Trading,
    Nobility,
    Diplomacy,
    Sites,
    BiomeTypeRaw,
    BiomeRegionRaw,
    DrainageRaw,
}

impl MapCategory {
    /// Every category in table order.
    pub const ALL: [MapCategory; 19] = [
        MapCategory::Temperature,
        MapCategory::Rainfall,
        MapCategory::Drainage,
        MapCategory::Savagery,
        MapCategory::Volcanism,
        MapCategory::Vegetation,
        MapCategory::Evilness,
        MapCategory::Salinity,
        MapCategory::Hydrosphere,
        MapCategory::Elevation,
        MapCategory::ElevationWater,
        MapCategory::Biome,
        MapCategory::Trading,
        MapCategory::Nobility,
        MapCategory::Diplomacy,
        MapCategory::Sites,
        MapCategory::BiomeTypeRaw,
        MapCategory::BiomeRegionRaw,
        MapCategory::DrainageRaw,
    ];

    /// Categories that report percent-complete while they drain.
    pub const SLOW: [MapCategory; 4] = [
        MapCategory::Trading,
        MapCategory::Nobility,
        MapCategory::Diplomacy,
        MapCategory::Sites,
    ];

    /// File name suffix for this category.
    pub fn slug(self) -> &'static str {
        match self {
            MapCategory::Temperature => "temperature",
            MapCategory::Rainfall => "rainfall",
            MapCategory::Drainage => "drainage",
            MapCategory::Savagery => "savagery",
            MapCategory::Volcanism => "volcanism",
            MapCategory::Vegetation => "vegetation",
            MapCategory::Evilness => "evilness",
            MapCategory::Salinity => "salinity",
            MapCategory::Hydrosphere => "hydrology",
            MapCategory::Elevation => "elevation",
            MapCategory::ElevationWater => "elevation-water",
            MapCategory::Biome => "biome",
            MapCategory::Trading => "trading",
            MapCategory::Nobility => "nobility",
            MapCategory::Diplomacy => "diplomacy",
            MapCategory::Sites => "sites-structures",
            MapCategory::BiomeTypeRaw => "biome-type-raw",
            MapCategory::BiomeRegionRaw => "biome-region-raw",
            MapCategory::DrainageRaw => "drainage-raw",
        }
    }

    /// Human readable label used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            MapCategory::Temperature => "Temperature map",
            MapCategory::Rainfall => "Rainfall map",
            MapCategory::Drainage => "Drainage map",
            MapCategory::Savagery => "Savagery map",
            MapCategory::Volcanism => "Volcanism map",
            MapCategory::Vegetation => "Vegetation map",
            MapCategory::Evilness => "Evilness map",
            MapCategory::Salinity => "Salinity map",
            MapCategory::Hydrosphere => "Hydrology map",
            MapCategory::Elevation => "Elevation map",
            MapCategory::ElevationWater => "Elevation with water map",
            MapCategory::Biome => "Biome map",
            MapCategory::Trading => "Trading map",
            MapCategory::Nobility => "Nobility map",
            MapCategory::Diplomacy => "Diplomacy map",
            MapCategory::Sites => "Sites map",
            MapCategory::BiomeTypeRaw => "Biome type raw map",
            MapCategory::BiomeRegionRaw => "Biome region raw map",
            MapCategory::DrainageRaw => "Drainage raw map",
        }
    }

    /// Whether this category's buffer stores 16-bit values instead of RGBA.
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            MapCategory::BiomeTypeRaw | MapCategory::BiomeRegionRaw | MapCategory::DrainageRaw
        )
    }

    pub fn is_slow(self) -> bool {
        Self::SLOW.contains(&self)
    }
}

impl fmt::Display for MapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for MapCategory {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        // "hydrosphere" and "sites" are accepted alongside their file slugs.
        match wanted.as_str() {
            "hydrosphere" => return Ok(MapCategory::Hydrosphere),
            "sites" => return Ok(MapCategory::Sites),
            _ => {}
        }
        MapCategory::ALL
            .iter()
            .copied()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| MapError::UnknownCategory(s.to_string()))
    }
}

/// Ordered, duplicate-free set of requested categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSelection(BTreeSet<MapCategory>);

impl MapSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every colored (non-raw) map.
    pub fn all_visual() -> Self {
        MapCategory::ALL.iter().copied().filter(|c| !c.is_raw()).collect()
    }

    /// Every raw numeric map.
    pub fn all_raw() -> Self {
        MapCategory::ALL.iter().copied().filter(|c| c.is_raw()).collect()
    }

    /// Parse a comma separated list of slugs; `all` and `all-raw` expand to groups.
    pub fn parse_list(list: &str) -> Result<Self, MapError> {
        let mut selection = Self::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.to_lowercase().as_str() {
                "all" => selection.extend(Self::all_visual().iter()),
                "all-raw" => selection.extend(Self::all_raw().iter()),
                _ => {
                    selection.insert(item.parse()?);
                }
            }
        }
        Ok(selection)
    }

    pub fn insert(&mut self, category: MapCategory) -> bool {
        self.0.insert(category)
    }

    pub fn contains(&self, category: MapCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = MapCategory> + '_ {
        self.0.iter().copied()
    }

    /// Requested categories that report progress.
    pub fn slow(&self) -> impl Iterator<Item = MapCategory> + '_ {
        self.iter().filter(|c| c.is_slow())
    }
}

impl FromIterator<MapCategory> for MapSelection {
    fn from_iter<I: IntoIterator<Item = MapCategory>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<MapCategory> for MapSelection {
    fn extend<I: IntoIterator<Item = MapCategory>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}
