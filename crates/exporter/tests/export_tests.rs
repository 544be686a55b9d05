//! Tests for the export orchestrator
//!
//! Runs complete exports against small worlds and checks the written files,
//! the queue accounting and the ownership of region details.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use exporter::{
    ExportError, GenerationError, MapsExporter, NoProgress, ProgressSink, SyntheticWorld,
    WorldData, PROGRESS_DONE,
};
use map_common::{
    MapCategory, MapSelection, RegionDetail, WorldCoord, WorldDate, WorldDims, TILE_SIZE,
};
use renderer::palette;
use test_utils::fixtures::{self, worlds};
use test_utils::{assert_pixel_eq, gradient_region, list_pngs, output_dir, site_region};

// ============================================================================
// Test world
// ============================================================================

/// World with hand-built details. Coordinates listed in `resident` are held
/// by the world; the rest are synthesized from `details` on request.
struct FixedWorld {
    dims: WorldDims,
    date: WorldDate,
    resident: BTreeMap<WorldCoord, RegionDetail>,
    details: BTreeMap<WorldCoord, RegionDetail>,
    fail_at: Option<WorldCoord>,
    synthesized: Vec<WorldCoord>,
    released: Vec<WorldCoord>,
}

impl FixedWorld {
    fn new(dims: WorldDims, build: impl Fn(WorldCoord) -> RegionDetail) -> Self {
        Self {
            dims,
            date: fixtures::date(),
            resident: BTreeMap::new(),
            details: dims.coords().map(|c| (c, build(c))).collect(),
            fail_at: None,
            synthesized: Vec::new(),
            released: Vec::new(),
        }
    }

    fn make_resident(mut self, coord: WorldCoord) -> Self {
        if let Some(detail) = self.details.remove(&coord) {
            self.resident.insert(coord, detail);
        }
        self
    }
}

impl WorldData for FixedWorld {
    fn dimensions(&self) -> WorldDims {
        self.dims
    }

    fn region_name(&self) -> &str {
        fixtures::REGION_NAME
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
        if self.fail_at == Some(coord) {
            return Err(GenerationError::Failed("fixture failure".to_string()));
        }
        let detail = self
            .details
            .get(&coord)
            .cloned()
            .ok_or(GenerationError::OutOfBounds {
                x: coord.x,
                y: coord.y,
            })?;
        self.synthesized.push(coord);
        Ok(detail)
    }

    fn release(&mut self, detail: RegionDetail) {
        self.released.push(detail.pos());
    }
}

/// Sink that records everything it is told.
#[derive(Default)]
struct RecordingSink {
    rows: Mutex<Vec<(u32, u32)>>,
    slow: Mutex<Vec<Vec<(MapCategory, i32)>>>,
}

impl ProgressSink for RecordingSink {
    fn scan_row(&self, row: u32, total_rows: u32) {
        self.rows.lock().unwrap().push((row, total_rows));
    }

    fn slow_maps(&self, progress: &[(MapCategory, i32)]) {
        self.slow.lock().unwrap().push(progress.to_vec());
    }
}

fn exporter(dir: &std::path::Path) -> MapsExporter {
    MapsExporter::new(dir)
        .with_progress_sink(Arc::new(NoProgress))
        .with_progress_interval(Duration::from_millis(5))
}

fn selection(list: &str) -> MapSelection {
    MapSelection::parse_list(list).unwrap()
}

// ============================================================================
// Successful exports
// ============================================================================

#[test]
fn test_elevation_export_writes_expected_file() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), gradient_region);

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("elevation"))
        .unwrap();

    let files = list_pngs(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("region1-250-3-14-elevation.png"));
    assert_eq!(summary.files_written(), 1);
    assert_eq!(summary.tiles_scanned, 4);

    let img = image::open(&files[0]).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 32));
    let bytes = img.into_raw();

    // Square world: tile (1, 0) pixel (3, 2) lands at (19, 2).
    let color = palette::elevation_color(100 + 2 * 16 + 3);
    assert_pixel_eq!(bytes, 32, (19, 2), [color.r, color.g, color.b, 255]);
    let color = palette::elevation_color(100 + 15 * 16 + 15);
    assert_pixel_eq!(bytes, 32, (31, 31), [color.r, color.g, color.b, 255]);
}

#[test]
fn test_one_file_per_requested_map() {
    let dir = output_dir();
    let mut world = SyntheticWorld::new(fixtures::dims(worlds::LARGE), 11);

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("all,all-raw"))
        .unwrap();

    assert_eq!(list_pngs(dir.path()).len(), 19);
    assert_eq!(summary.maps.len(), 19);
    for map in &summary.maps {
        assert_eq!(map.tiles_rendered, 9);
        assert_eq!(map.queue.data_packets, 9);
        assert_eq!(map.queue.end_markers, 1);
        assert!(map.completed);
        assert!(map.bytes_written > 0);

        let (width, height) = image::image_dimensions(map.file.as_ref().unwrap()).unwrap();
        assert_eq!((width, height), (3 * TILE_SIZE, 3 * TILE_SIZE));
    }
}

#[test]
fn test_raw_map_holds_region_ids() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), gradient_region);

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("biome-region-raw"))
        .unwrap();

    let path = summary
        .map(MapCategory::BiomeRegionRaw)
        .and_then(|m| m.file.clone())
        .unwrap();
    assert!(path.ends_with("region1-250-3-14-biome-region-raw.png"));

    let img = image::open(&path).unwrap().to_luma16();
    assert_eq!(img.dimensions(), (32, 32));
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
    assert_eq!(img.get_pixel(3, 1).0[0], 3 + 16);
    assert_eq!(img.get_pixel(16 + 5, 16 + 7).0[0], 5 + 7 * 16);
}

#[test]
fn test_trade_line_survives_later_tiles() {
    let dir = output_dir();
    let a = WorldCoord::new(0, 0);
    let b = WorldCoord::new(1, 1);
    let (first, second) = fixtures::trading_pair(a, b);
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), |coord| {
        if coord == a {
            site_region(coord, vec![first.clone()])
        } else if coord == b {
            site_region(coord, vec![second.clone()])
        } else {
            site_region(coord, Vec::new())
        }
    });

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("trading"))
        .unwrap();
    let trading = summary.map(MapCategory::Trading).unwrap();
    assert!(trading.overlay_marks >= 2);

    let img = image::open(trading.file.as_ref().unwrap()).unwrap().to_rgba8();
    let center = palette::TRADE_LINE.center;
    // The diagonal between (8, 8) and (24, 24) crosses tiles painted after it was queued.
    let px = img.get_pixel(16, 16).0;
    assert_eq!([px[0], px[1], px[2]], [center.r, center.g, center.b]);
}

#[test]
fn test_summary_serializes() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SINGLE), gradient_region);

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("hydrology,drainage-raw"))
        .unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["region_name"], "region1");
    assert_eq!(json["date"]["month"], 3);
    assert_eq!(json["world"]["width"], 1);
    assert_eq!(json["maps"][0]["category"], "hydrosphere");
    assert_eq!(json["maps"][1]["category"], "drainage-raw");
    assert_eq!(json["maps"][1]["queue"]["data_packets"], 1);
}

// ============================================================================
// Region detail ownership
// ============================================================================

#[test]
fn test_resident_details_are_never_released() {
    let dir = output_dir();
    let resident = WorldCoord::new(1, 0);
    let mut world = FixedWorld::new(fixtures::dims(worlds::LARGE), gradient_region)
        .make_resident(resident);

    let summary = exporter(dir.path())
        .generate(&mut world, &selection("rainfall"))
        .unwrap();

    assert_eq!(summary.tiles_resident, 1);
    assert_eq!(summary.tiles_synthesized, 8);
    assert!(!world.synthesized.contains(&resident));
    assert!(!world.released.contains(&resident));
    assert_eq!(world.released, world.synthesized);
}

#[test]
fn test_synthetic_world_releases_each_detail_once() {
    let dir = output_dir();
    let mut world = SyntheticWorld::new(fixtures::dims(worlds::LARGE), 5).with_resident_area(
        WorldCoord::new(0, 0),
        2,
        1,
    );

    exporter(dir.path())
        .generate(&mut world, &selection("biome,sites"))
        .unwrap();

    assert_eq!(world.synthesized_count(), 7);
    assert_eq!(world.released_count(), 7);
    assert_eq!(world.double_released_count(), 0);
    assert_eq!(world.outstanding(), 0);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_empty_request() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), gradient_region);

    let err = exporter(dir.path())
        .generate(&mut world, &MapSelection::new())
        .unwrap_err();

    assert!(matches!(err, ExportError::EmptyRequest));
    assert!(world.synthesized.is_empty());
    assert!(list_pngs(dir.path()).is_empty());
}

#[test]
fn test_generation_failure_aborts_cleanly() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), gradient_region);
    world.fail_at = Some(WorldCoord::new(0, 1));

    let run = exporter(dir.path()).run(&mut world, &selection("elevation,diplomacy,biome-type-raw"));

    let err = run.error.unwrap();
    assert!(err.is_abort());
    assert!(matches!(err, ExportError::GenerationFailed { x: 0, y: 1, .. }));
    assert!(run.summary.aborted);
    assert!(list_pngs(dir.path()).is_empty());

    assert_eq!(run.summary.maps.len(), 3);
    for map in &run.summary.maps {
        assert_eq!(map.queue.end_markers, 1);
        assert_eq!(map.queue.data_packets, 2);
        assert!(map.completed);
        assert!(map.file.is_none());
    }
    assert_eq!(world.released, world.synthesized);
}

#[test]
fn test_non_square_world_is_refused() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::OBLONG), gradient_region);

    let run = exporter(dir.path()).run(&mut world, &selection("elevation,trading"));

    assert!(matches!(
        run.error,
        Some(ExportError::UnsupportedWorld { width: 3, height: 2 })
    ));
    assert!(run.summary.maps.is_empty());
    assert!(world.synthesized.is_empty());
    assert!(list_pngs(dir.path()).is_empty());
}

#[test]
fn test_buffer_limit_stops_started_workers() {
    let dir = output_dir();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SQUARE), gradient_region);
    // Room for the elevation buffer only; the raw one started after it cannot fit.
    let dense_bytes = 32 * 32 * 4;
    let exporter = exporter(dir.path()).with_buffer_limit(dense_bytes);

    let run = exporter.run(&mut world, &selection("drainage-raw,elevation"));

    assert!(matches!(run.error, Some(ExportError::Allocation(_))));
    assert!(run.summary.maps.is_empty());
    assert!(world.synthesized.is_empty());
    assert!(list_pngs(dir.path()).is_empty());
}

#[test]
fn test_flush_failure_reports_path() {
    let dir = output_dir();
    // A file where the output directory should be.
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();
    let mut world = FixedWorld::new(fixtures::dims(worlds::SINGLE), gradient_region);

    let err = exporter(&blocked)
        .generate(&mut world, &selection("elevation"))
        .unwrap_err();

    match err {
        ExportError::Flush { category, path, .. } => {
            assert_eq!(category, MapCategory::Elevation);
            assert!(path.starts_with(&blocked));
        }
        other => panic!("expected flush error, got {other:?}"),
    }
}

// ============================================================================
// Progress
// ============================================================================

#[test]
fn test_progress_reaches_done() {
    let dir = output_dir();
    let sink = Arc::new(RecordingSink::default());
    let exporter = MapsExporter::new(dir.path())
        .with_progress_sink(sink.clone())
        .with_progress_interval(Duration::from_millis(1));
    let mut world = SyntheticWorld::new(fixtures::dims(worlds::LARGE), 3);

    exporter
        .generate(&mut world, &selection("trading,nobility,temperature"))
        .unwrap();

    assert!(exporter.progress().is_done(MapCategory::Trading));
    assert!(exporter.progress().is_done(MapCategory::Nobility));
    assert_eq!(exporter.progress().get(MapCategory::Temperature), None);

    let rows = sink.rows.lock().unwrap();
    assert_eq!(*rows, vec![(0, 3), (1, 3), (2, 3)]);

    let slow = sink.slow.lock().unwrap();
    let last = slow.last().unwrap();
    assert_eq!(
        *last,
        vec![
            (MapCategory::Trading, PROGRESS_DONE),
            (MapCategory::Nobility, PROGRESS_DONE)
        ]
    );
}
