//! Source of per-tile world detail.
//!
//! A world keeps some region details resident; every other tile is
//! synthesized on demand, dispatched once and handed straight back.

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::TAU;

use map_common::{
    BiomeType, DiplomaticLink, EmbarkPoint, EmbarkTile, RegionDetail, SiteKind, SiteRecord,
    Stance, WaterFeature, WorldCoord, WorldDate, WorldDims, TILE_CELLS, TILE_SIZE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::GenerationError;

/// World-data collaborator queried by the orchestrator.
pub trait WorldData {
    fn dimensions(&self) -> WorldDims;

    /// Name used as the output file prefix.
    fn region_name(&self) -> &str;

    fn current_date(&self) -> WorldDate;

    /// Coordinates whose detail is already held by the world.
    fn resident_coords(&self) -> BTreeSet<WorldCoord>;

    fn lookup_resident(&self, coord: WorldCoord) -> Option<&RegionDetail>;

    /// Produce a detail for a non-resident coordinate. The caller owns it.
    fn synthesize(&mut self, coord: WorldCoord) -> Result<RegionDetail, GenerationError>;

    /// Take back a synthesized detail once it has been dispatched.
    fn release(&mut self, detail: RegionDetail);
}

/// A region detail together with who owns it.
#[derive(Debug)]
pub enum ScannedRegion<'a> {
    /// Held by the world; never released.
    Borrowed(&'a RegionDetail),
    /// Synthesized for this scan step; must be released after dispatch.
    Owned(RegionDetail),
}

impl ScannedRegion<'_> {
    pub fn detail(&self) -> &RegionDetail {
        match self {
            ScannedRegion::Borrowed(detail) => detail,
            ScannedRegion::Owned(detail) => detail,
        }
    }
}

// ============================================================================
// Synthetic world
// ============================================================================

const SITE_SALT: u64 = 0x5173_e5a1;
const TILE_SALT: u64 = 0x7e11_da7a;
const LINK_RANGE: i64 = 3;

/// Deterministic, seed-driven world.
///
/// Terrain is a smooth function of the absolute embark pixel so neighboring
/// tiles join without seams. Sites and their links are drawn from per-tile
/// random streams, so the same seed always yields the same maps.
#[derive(Debug, Clone)]
pub struct SyntheticWorld {
    dims: WorldDims,
    seed: u64,
    name: String,
    date: WorldDate,
    site_chance: f64,
    resident: BTreeMap<WorldCoord, RegionDetail>,
    fail_at: Option<WorldCoord>,
    outstanding: BTreeSet<WorldCoord>,
    synthesized: u64,
    released: u64,
    double_released: u64,
}

impl SyntheticWorld {
    pub fn new(dims: WorldDims, seed: u64) -> Self {
        Self {
            dims,
            seed,
            name: "region1".to_string(),
            date: WorldDate {
                year: 250,
                month: 1,
                day: 1,
            },
            site_chance: 0.3,
            resident: BTreeMap::new(),
            fail_at: None,
            outstanding: BTreeSet::new(),
            synthesized: 0,
            released: 0,
            double_released: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_date(mut self, date: WorldDate) -> Self {
        self.date = date;
        self
    }

    /// Probability (0-1) that a tile holds a site.
    pub fn with_site_chance(mut self, chance: f64) -> Self {
        self.site_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Keep the details of a rectangle of tiles resident, as the area around
    /// an active embark would be.
    pub fn with_resident_area(mut self, origin: WorldCoord, width: u32, height: u32) -> Self {
        for y in origin.y..origin.y.saturating_add(height) {
            for x in origin.x..origin.x.saturating_add(width) {
                let coord = WorldCoord::new(x, y);
                if !self.dims.contains(coord) {
                    continue;
                }
                if let Ok(detail) = self.generate(coord) {
                    self.resident.insert(coord, detail);
                }
            }
        }
        self
    }

    /// Make synthesis fail at one coordinate.
    pub fn with_failure_at(mut self, coord: WorldCoord) -> Self {
        self.fail_at = Some(coord);
        self
    }

    /// Details synthesized so far.
    pub fn synthesized_count(&self) -> u64 {
        self.synthesized
    }

    /// Details handed back through `release`.
    pub fn released_count(&self) -> u64 {
        self.released
    }

    /// Releases of details that were not outstanding.
    pub fn double_released_count(&self) -> u64 {
        self.double_released
    }

    /// Synthesized details not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Generate the detail for a coordinate without recording it.
    pub fn generate(&self, coord: WorldCoord) -> Result<RegionDetail, GenerationError> {
        let mut rng = self.tile_rng(coord, TILE_SALT);
        let mut tiles = Vec::with_capacity(TILE_CELLS);
        for py in 0..TILE_SIZE {
            for px in 0..TILE_SIZE {
                let ex = coord.x * TILE_SIZE + px;
                let ey = coord.y * TILE_SIZE + py;
                tiles.push(self.embark_tile(ex, ey, &mut rng));
            }
        }
        RegionDetail::new(coord, tiles, self.sites_for(coord))
            .map_err(|e| GenerationError::Failed(e.to_string()))
    }

    fn tile_rng(&self, coord: WorldCoord, salt: u64) -> StdRng {
        let key = ((coord.y as u64) << 32) | coord.x as u64;
        StdRng::seed_from_u64(self.seed ^ salt ^ key.wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    fn phase(&self) -> f32 {
        (self.seed % 1000) as f32 / 1000.0 * TAU
    }

    fn elevation_at(&self, ex: u32, ey: u32) -> i16 {
        let fx = ex as f32 / self.dims.pixel_width() as f32;
        let fy = ey as f32 / self.dims.pixel_height() as f32;
        let p = self.phase();
        let shape = (fx * TAU * 1.5 + p).sin() * 0.55
            + (fy * TAU + p * 0.5).cos() * 0.35
            + (fx * TAU * 4.0 + fy * TAU * 3.0).sin() * 0.1;
        (shape * 260.0) as i16 + 20
    }

    fn embark_tile(&self, ex: u32, ey: u32, rng: &mut StdRng) -> EmbarkTile {
        let fx = ex as f32 / self.dims.pixel_width() as f32;
        let fy = ey as f32 / self.dims.pixel_height() as f32;
        let elevation = self.elevation_at(ex, ey);

        let temperature = (70.0 - fy * 100.0 - elevation.max(0) as f32 / 8.0) as i16;
        let wave =
            |scale: f32, offset: f32| ((fx * scale + fy * scale * 0.7 + offset).sin() + 1.0) * 50.0;
        let rainfall = wave(TAU * 2.0, self.phase()) as u8;
        let drainage = wave(TAU * 3.0, 1.0) as u8;
        let savagery = wave(TAU * 1.3, 2.0) as u8;
        let vegetation = (rainfall as i32 * 2 / 3 + 10).clamp(0, 100) as u8;
        let evilness = wave(TAU * 0.7, 4.0) as u8;
        let volcanism = if elevation > 220 { rng.gen_range(40..=100) } else { rng.gen_range(0..10) };

        let river = elevation > 0 && ((fx * 9.0 + (fy * TAU).sin() * 0.3).fract() < 0.012);
        let water = if elevation < 0 {
            WaterFeature::Ocean
        } else if elevation < 6 {
            WaterFeature::Lake
        } else if river {
            WaterFeature::River
        } else {
            WaterFeature::None
        };
        let salinity = match water {
            WaterFeature::Ocean => 100,
            WaterFeature::Lake => rng.gen_range(0..40),
            _ => 0,
        };

        let biome = classify_biome(elevation, temperature, rainfall, water);
        EmbarkTile {
            elevation,
            temperature,
            rainfall,
            drainage,
            savagery,
            volcanism,
            vegetation,
            evilness,
            salinity,
            biome,
            region_id: (ex / 48 + (ey / 48) * 64) as u16,
            water,
        }
    }

    /// Position of the site in a tile, if it has one.
    fn site_anchor(&self, coord: WorldCoord) -> Option<EmbarkPoint> {
        if !self.dims.contains(coord) {
            return None;
        }
        let mut rng = self.tile_rng(coord, SITE_SALT);
        if !rng.gen_bool(self.site_chance) {
            return None;
        }
        let origin = coord.origin();
        Some(EmbarkPoint::new(
            origin.x + rng.gen_range(2..TILE_SIZE - 2),
            origin.y + rng.gen_range(2..TILE_SIZE - 2),
        ))
    }

    fn sites_for(&self, coord: WorldCoord) -> Vec<SiteRecord> {
        let Some(pos) = self.site_anchor(coord) else {
            return Vec::new();
        };
        let mut rng = self.tile_rng(coord, SITE_SALT ^ 0xff);
        const KINDS: [SiteKind; 8] = [
            SiteKind::Town,
            SiteKind::Hamlet,
            SiteKind::Fortress,
            SiteKind::DarkFortress,
            SiteKind::MountainHall,
            SiteKind::ForestRetreat,
            SiteKind::Tower,
            SiteKind::Monastery,
        ];
        let kind = KINDS[rng.gen_range(0..KINDS.len())];
        let civ_id = coord.x / 4 + (coord.y / 4) * 100;
        let id = coord.y * self.dims.width + coord.x;
        let mut site = SiteRecord::new(id, kind, civ_id, pos);
        site.radius = rng.gen_range(1..=2);

        for dy in -LINK_RANGE..=LINK_RANGE {
            for dx in -LINK_RANGE..=LINK_RANGE {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = coord.x as i64 + dx;
                let ny = coord.y as i64 + dy;
                if nx < 0 || ny < 0 {
                    continue;
                }
                let Some(target) = self.site_anchor(WorldCoord::new(nx as u32, ny as u32)) else {
                    continue;
                };
                if rng.gen_bool(0.5) {
                    site.trade_partners.push(target);
                }
                if dx.abs() + dy.abs() <= 2 && rng.gen_bool(0.3) {
                    site.lords.push(target);
                }
                if rng.gen_bool(0.4) {
                    let stance = match rng.gen_range(0..3) {
                        0 => Stance::Peace,
                        1 => Stance::Alliance,
                        _ => Stance::War,
                    };
                    site.diplomacy.push(DiplomaticLink { target, stance });
                }
            }
        }
        vec![site]
    }
}

fn classify_biome(elevation: i16, temperature: i16, rainfall: u8, water: WaterFeature) -> BiomeType {
    let tropical = temperature > 45;
    match water {
        WaterFeature::Ocean if temperature < -5 => BiomeType::ArcticOcean,
        WaterFeature::Ocean if tropical => BiomeType::TropicalOcean,
        WaterFeature::Ocean => BiomeType::TemperateOcean,
        WaterFeature::Lake if tropical => BiomeType::TropicalFreshwaterLake,
        WaterFeature::Lake => BiomeType::TemperateFreshwaterLake,
        WaterFeature::River if tropical => BiomeType::TropicalFreshwaterRiver,
        WaterFeature::River => BiomeType::TemperateFreshwaterRiver,
        WaterFeature::None => match (elevation, temperature, rainfall) {
            (e, _, _) if e > 220 => BiomeType::Mountain,
            (_, t, _) if t < -15 => BiomeType::Glacier,
            (_, t, _) if t < 0 => BiomeType::Tundra,
            (_, t, r) if t < 15 && r > 50 => BiomeType::TaigaForest,
            (_, _, r) if r < 15 => BiomeType::SandDesert,
            (_, _, r) if r < 30 => BiomeType::RockyDesert,
            (_, _, r) if tropical && r > 70 => BiomeType::TropicalMoistBroadleafForest,
            (_, _, r) if tropical && r > 45 => BiomeType::TropicalSavanna,
            (_, _, _) if tropical => BiomeType::TropicalGrassland,
            (_, _, r) if r > 70 => BiomeType::TemperateBroadleafForest,
            (_, _, r) if r > 55 => BiomeType::TemperateConiferForest,
            (_, _, r) if r > 40 => BiomeType::TemperateShrubland,
            _ => BiomeType::TemperateGrassland,
        },
    }
}

impl WorldData for SyntheticWorld {
    fn dimensions(&self) -> WorldDims {
        self.dims
    }

    fn region_name(&self) -> &str {
        &self.name
    }

    fn current_date(&self) -> WorldDate {
        self.date
    }

    fn resident_coords(&self) -> BTreeSet<WorldCoord> {
        self.resident.keys().copied().collect()
    }

    fn lookup_resident(&self, coord: WorldCoord) -> Option<&RegionDetail> {
        self.resident.get(&coord)
    }

    fn synthesize(&mut self, coord: WorldCoord) -> Result<RegionDetail, GenerationError> {
        if !self.dims.contains(coord) {
            return Err(GenerationError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            });
        }
        if self.fail_at == Some(coord) {
            return Err(GenerationError::Failed(format!(
                "injected failure at ({}, {})",
                coord.x, coord.y
            )));
        }
        let detail = self.generate(coord)?;
        self.synthesized += 1;
        self.outstanding.insert(coord);
        Ok(detail)
    }

    fn release(&mut self, detail: RegionDetail) {
        if self.outstanding.remove(&detail.pos()) {
            self.released += 1;
        } else {
            self.double_released += 1;
            let pos = detail.pos();
            debug!(x = pos.x, y = pos.y, "Released a detail that was not outstanding");
        }
    }
}
