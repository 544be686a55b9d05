//! Category table: how each map copies its data out of a region detail and
//! how its worker paints that data.

use map_common::{
    EmbarkPoint, EmbarkTile, MapCategory, RegionDetail, SiteRecord, WorldCoord, WorldDims,
    TILE_CELLS,
};
use renderer::canvas::{CanvasError, MapCanvas};
use renderer::color::Rgb;
use renderer::line::draw_thick_line;
use renderer::palette::{self, LineStyle};

use crate::packet::{CategoryPacket, Payload, TerrainCell};

type BuildFn = fn(&RegionDetail) -> Payload;
type RenderFn = fn(&mut MapPainter, WorldCoord, &Payload);

/// One row of the category table.
pub struct CategoryEntry {
    pub category: MapCategory,
    /// Copy the fields this category needs.
    pub build: BuildFn,
    /// Paint a payload into the category's buffer.
    pub render: RenderFn,
}

macro_rules! entry {
    ($category:ident, $build:expr, $render:expr) => {
        CategoryEntry {
            category: MapCategory::$category,
            build: $build,
            render: $render,
        }
    };
}

/// Rows in `MapCategory::ALL` order.
static TABLE: [CategoryEntry; 19] = [
    entry!(Temperature, build_temperature, render_temperature),
    entry!(Rainfall, build_rainfall, render_rainfall),
    entry!(Drainage, build_drainage, render_drainage),
    entry!(Savagery, build_savagery, render_savagery),
    entry!(Volcanism, build_volcanism, render_volcanism),
    entry!(Vegetation, build_vegetation, render_vegetation),
    entry!(Evilness, build_evilness, render_evilness),
    entry!(Salinity, build_salinity, render_salinity),
    entry!(Hydrosphere, build_terrain, render_hydrology),
    entry!(Elevation, build_terrain, render_elevation),
    entry!(ElevationWater, build_terrain, render_elevation_water),
    entry!(Biome, build_biome, render_biome),
    entry!(Trading, build_overlay, render_trading),
    entry!(Nobility, build_overlay, render_nobility),
    entry!(Diplomacy, build_overlay, render_diplomacy),
    entry!(Sites, build_overlay, render_sites),
    entry!(BiomeTypeRaw, build_biome_type_raw, render_raw),
    entry!(BiomeRegionRaw, build_biome_region_raw, render_raw),
    entry!(DrainageRaw, build_drainage_raw, render_raw),
];

/// Table row for a category.
pub fn entry(category: MapCategory) -> &'static CategoryEntry {
    &TABLE[category as usize]
}

/// Data packet for one world tile.
pub fn build_packet(
    category: MapCategory,
    coord: WorldCoord,
    region: &RegionDetail,
) -> CategoryPacket {
    CategoryPacket::Data {
        coord,
        payload: (entry(category).build)(region),
    }
}

/// End-of-stream marker.
pub fn build_end() -> CategoryPacket {
    CategoryPacket::EndOfStream
}

/// Allocate the buffer a category draws into.
pub fn new_canvas(category: MapCategory, world: WorldDims) -> Result<MapCanvas, CanvasError> {
    if category.is_raw() {
        MapCanvas::raw(world)
    } else {
        MapCanvas::dense(world)
    }
}

/// Size of the buffer `new_canvas` would allocate.
pub fn canvas_bytes(category: MapCategory, world: WorldDims) -> Result<usize, CanvasError> {
    MapCanvas::required_bytes(world, category.is_raw())
}

// ============================================================================
// Painter
// ============================================================================

/// Overlay drawing that waits until every tile background is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredMark {
    Line {
        from: EmbarkPoint,
        to: EmbarkPoint,
        style: LineStyle,
    },
    Footprint {
        center: EmbarkPoint,
        radius: u8,
        color: Rgb,
    },
}

/// Worker-side drawing state: the buffer plus deferred overlay marks.
#[derive(Debug)]
pub struct MapPainter {
    canvas: MapCanvas,
    deferred: Vec<DeferredMark>,
    tiles: u64,
}

impl MapPainter {
    pub fn new(canvas: MapCanvas) -> Self {
        Self {
            canvas,
            deferred: Vec::new(),
            tiles: 0,
        }
    }

    /// Tiles painted so far.
    pub fn tiles(&self) -> u64 {
        self.tiles
    }

    pub fn deferred(&self) -> &[DeferredMark] {
        &self.deferred
    }

    /// Paint one payload with the category's render function.
    pub fn paint(&mut self, category: MapCategory, coord: WorldCoord, payload: &Payload) {
        (entry(category).render)(self, coord, payload);
        self.tiles += 1;
    }

    /// Draw the deferred marks and hand back the buffer with the mark count.
    pub fn finish(mut self) -> (MapCanvas, usize) {
        let marks = std::mem::take(&mut self.deferred);
        if let Some(buffer) = self.canvas.as_dense_mut() {
            for mark in &marks {
                match *mark {
                    DeferredMark::Line { from, to, style } => draw_thick_line(buffer, from, to, style),
                    DeferredMark::Footprint { center, radius, color } => {
                        let r = radius as u32;
                        for ey in center.y.saturating_sub(r)..=center.y.saturating_add(r) {
                            for ex in center.x.saturating_sub(r)..=center.x.saturating_add(r) {
                                buffer.write_embark(ex, ey, color);
                            }
                        }
                        buffer.write_embark(center.x, center.y, palette::SITE_MARKER);
                    }
                }
            }
        }
        (self.canvas, marks.len())
    }

    fn fill<F>(&mut self, coord: WorldCoord, count: usize, color_at: F)
    where
        F: Fn(usize) -> Rgb,
    {
        if let Some(buffer) = self.canvas.as_dense_mut() {
            buffer.fill_tile(coord, (0..count.min(TILE_CELLS)).map(color_at));
        }
    }

    fn defer(&mut self, mark: DeferredMark) {
        self.deferred.push(mark);
    }
}

// ============================================================================
// Builders
// ============================================================================

fn field(region: &RegionDetail, value: fn(&EmbarkTile) -> i16) -> Payload {
    Payload::Field(region.tiles().iter().map(value).collect())
}

fn build_temperature(region: &RegionDetail) -> Payload {
    field(region, |t| t.temperature)
}

fn build_rainfall(region: &RegionDetail) -> Payload {
    field(region, |t| t.rainfall as i16)
}

fn build_drainage(region: &RegionDetail) -> Payload {
    field(region, |t| t.drainage as i16)
}

fn build_savagery(region: &RegionDetail) -> Payload {
    field(region, |t| t.savagery as i16)
}

fn build_volcanism(region: &RegionDetail) -> Payload {
    field(region, |t| t.volcanism as i16)
}

fn build_vegetation(region: &RegionDetail) -> Payload {
    field(region, |t| t.vegetation as i16)
}

fn build_evilness(region: &RegionDetail) -> Payload {
    field(region, |t| t.evilness as i16)
}

fn build_salinity(region: &RegionDetail) -> Payload {
    field(region, |t| t.salinity as i16)
}

fn terrain_cells(region: &RegionDetail) -> Vec<TerrainCell> {
    region
        .tiles()
        .iter()
        .map(|t| TerrainCell {
            elevation: t.elevation,
            water: t.water,
        })
        .collect()
}

fn build_terrain(region: &RegionDetail) -> Payload {
    Payload::Terrain(terrain_cells(region))
}

fn build_biome(region: &RegionDetail) -> Payload {
    Payload::Biome(region.tiles().iter().map(|t| t.biome).collect())
}

fn build_overlay(region: &RegionDetail) -> Payload {
    Payload::Overlay {
        cells: terrain_cells(region),
        sites: region.sites().to_vec(),
    }
}

fn build_biome_type_raw(region: &RegionDetail) -> Payload {
    Payload::Raw(region.tiles().iter().map(|t| t.biome.id()).collect())
}

fn build_biome_region_raw(region: &RegionDetail) -> Payload {
    Payload::Raw(region.tiles().iter().map(|t| t.region_id).collect())
}

fn build_drainage_raw(region: &RegionDetail) -> Payload {
    Payload::Raw(region.tiles().iter().map(|t| t.drainage as u16).collect())
}

// ============================================================================
// Renderers
// ============================================================================

fn percent(value: i16) -> u8 {
    value.clamp(0, 255) as u8
}

fn paint_field(
    painter: &mut MapPainter,
    coord: WorldCoord,
    payload: &Payload,
    color: fn(i16) -> Rgb,
) {
    let Payload::Field(values) = payload else {
        return;
    };
    painter.fill(coord, values.len(), |i| color(values[i]));
}

fn render_temperature(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, palette::temperature_color);
}

fn render_rainfall(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::rainfall_color(percent(v)));
}

fn render_drainage(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::drainage_color(percent(v)));
}

fn render_savagery(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::savagery_color(percent(v)));
}

fn render_volcanism(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::volcanism_color(percent(v)));
}

fn render_vegetation(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::vegetation_color(percent(v)));
}

fn render_evilness(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::evilness_color(percent(v)));
}

fn render_salinity(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_field(painter, coord, payload, |v| palette::salinity_color(percent(v)));
}

fn paint_terrain(
    painter: &mut MapPainter,
    coord: WorldCoord,
    cells: &[TerrainCell],
    color: fn(TerrainCell) -> Rgb,
) {
    painter.fill(coord, cells.len(), |i| color(cells[i]));
}

fn render_hydrology(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    if let Payload::Terrain(cells) = payload {
        paint_terrain(painter, coord, cells, |c| palette::hydrology_color(c.elevation, c.water));
    }
}

fn render_elevation(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    if let Payload::Terrain(cells) = payload {
        paint_terrain(painter, coord, cells, |c| palette::elevation_color(c.elevation));
    }
}

fn render_elevation_water(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    if let Payload::Terrain(cells) = payload {
        paint_terrain(painter, coord, cells, |c| {
            palette::elevation_water_color(c.elevation, c.water)
        });
    }
}

fn render_biome(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    if let Payload::Biome(biomes) = payload {
        painter.fill(coord, biomes.len(), |i| palette::biome_color(biomes[i]));
    }
}

/// Paint the overlay background and hand each site to `mark`.
fn paint_overlay(
    painter: &mut MapPainter,
    coord: WorldCoord,
    payload: &Payload,
    mark: fn(&mut MapPainter, &SiteRecord),
) {
    let Payload::Overlay { cells, sites } = payload else {
        return;
    };
    paint_terrain(painter, coord, cells, |c| palette::overlay_background(c.elevation, c.water));
    for site in sites {
        mark(painter, site);
    }
}

fn render_trading(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_overlay(painter, coord, payload, |painter, site| {
        for partner in &site.trade_partners {
            painter.defer(DeferredMark::Line {
                from: site.pos,
                to: *partner,
                style: palette::TRADE_LINE,
            });
        }
    });
}

fn render_nobility(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_overlay(painter, coord, payload, |painter, site| {
        for lord in &site.lords {
            painter.defer(DeferredMark::Line {
                from: site.pos,
                to: *lord,
                style: palette::NOBILITY_LINE,
            });
        }
    });
}

fn render_diplomacy(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_overlay(painter, coord, payload, |painter, site| {
        for link in &site.diplomacy {
            painter.defer(DeferredMark::Line {
                from: site.pos,
                to: link.target,
                style: palette::diplomacy_line(link.stance),
            });
        }
    });
}

fn render_sites(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    paint_overlay(painter, coord, payload, |painter, site| {
        painter.defer(DeferredMark::Footprint {
            center: site.pos,
            radius: site.radius,
            color: palette::site_color(site.kind),
        });
    });
}

fn render_raw(painter: &mut MapPainter, coord: WorldCoord, payload: &Payload) {
    let Payload::Raw(values) = payload else {
        return;
    };
    if let Some(buffer) = painter.canvas.as_raw_mut() {
        buffer.fill_tile(coord, values);
    }
}
