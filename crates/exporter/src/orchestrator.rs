//! Export orchestration.
//!
//! A run scans the world once in row-major order. Every tile detail is fanned
//! out to one queue per requested map, each drained by its own worker thread
//! into a pixel buffer. Once the scan has ended every queue gets a single end
//! marker, the workers are joined and the finished buffers are flushed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use map_common::{MapCategory, MapSelection, RegionDetail, WorldCoord, WorldDate, WorldDims};
use rayon::prelude::*;
use renderer::canvas::MapCanvas;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::category::{build_packet, canvas_bytes, new_canvas};
use crate::config::ExportSettings;
use crate::encoder::{ImageEncoder, PngFileEncoder};
use crate::error::{EncodeError, ExportError, GenerationError, Result};
use crate::progress::{LogProgress, ProgressBoard, ProgressSink};
use crate::queue::{category_queue, QueueProducer, QueueStats};
use crate::worker::{spawn_worker, WorkerContext, WorkerOutput};
use crate::world::{ScannedRegion, WorldData};

/// Per-map outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    pub category: MapCategory,
    pub tiles_rendered: u64,
    pub overlay_marks: usize,
    pub queue: QueueStats,
    /// Whether the worker saw its end marker.
    pub completed: bool,
    /// Written file, if the map was flushed.
    pub file: Option<PathBuf>,
    pub bytes_written: u64,
}

/// Summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub region_name: String,
    pub date: WorldDate,
    pub world: WorldDims,
    pub tiles_scanned: u64,
    pub tiles_resident: u64,
    pub tiles_synthesized: u64,
    pub aborted: bool,
    pub maps: Vec<MapReport>,
    pub elapsed_ms: u64,
}

impl ExportSummary {
    fn new<W: WorldData + ?Sized>(world: &W) -> Self {
        Self {
            region_name: world.region_name().to_string(),
            date: world.current_date(),
            world: world.dimensions(),
            tiles_scanned: 0,
            tiles_resident: 0,
            tiles_synthesized: 0,
            aborted: false,
            maps: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn map(&self, category: MapCategory) -> Option<&MapReport> {
        self.maps.iter().find(|m| m.category == category)
    }

    pub fn files_written(&self) -> usize {
        self.maps.iter().filter(|m| m.file.is_some()).count()
    }
}

/// Summary of a run together with its first error.
#[derive(Debug)]
pub struct ExportRun {
    pub summary: ExportSummary,
    pub error: Option<ExportError>,
}

impl ExportRun {
    pub fn into_result(self) -> Result<ExportSummary> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.summary),
        }
    }
}

/// One requested map: the producer side of its queue and its worker.
struct Pipeline {
    category: MapCategory,
    producer: QueueProducer,
    handle: JoinHandle<WorkerOutput>,
}

/// Produces map images from a world.
pub struct MapsExporter<E = PngFileEncoder> {
    output_dir: PathBuf,
    progress_interval: Duration,
    encoder: E,
    sink: Arc<dyn ProgressSink>,
    board: Arc<ProgressBoard>,
    /// Cap on the summed size of all map buffers of a run.
    buffer_limit: Option<usize>,
}

impl MapsExporter<PngFileEncoder> {
    /// Exporter writing PNG files into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            progress_interval: Duration::from_secs(1),
            encoder: PngFileEncoder,
            sink: Arc::new(LogProgress),
            board: Arc::new(ProgressBoard::new()),
            buffer_limit: None,
        }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        let exporter =
            Self::new(settings.output_dir.clone()).with_progress_interval(settings.progress_interval());
        match settings.max_buffer_bytes {
            Some(limit) => exporter.with_buffer_limit(limit),
            None => exporter,
        }
    }
}

impl<E: ImageEncoder> MapsExporter<E> {
    pub fn with_encoder<F: ImageEncoder>(self, encoder: F) -> MapsExporter<F> {
        MapsExporter {
            output_dir: self.output_dir,
            progress_interval: self.progress_interval,
            encoder,
            sink: self.sink,
            board: self.board,
            buffer_limit: self.buffer_limit,
        }
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Refuse runs whose map buffers together exceed `bytes`.
    pub fn with_buffer_limit(mut self, bytes: usize) -> Self {
        self.buffer_limit = Some(bytes);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Progress cells of the slow maps.
    pub fn progress(&self) -> &ProgressBoard {
        &self.board
    }

    /// Run an export and return the summary, or the first error.
    pub fn generate<W: WorldData>(
        &self,
        world: &mut W,
        selection: &MapSelection,
    ) -> Result<ExportSummary> {
        self.run(world, selection).into_result()
    }

    /// Run an export, keeping the summary even when the run fails.
    pub fn run<W: WorldData>(&self, world: &mut W, selection: &MapSelection) -> ExportRun {
        let started = Instant::now();
        let mut summary = ExportSummary::new(&*world);

        if selection.is_empty() {
            return ExportRun {
                summary,
                error: Some(ExportError::EmptyRequest),
            };
        }

        let dims = world.dimensions();
        if !dims.is_square() {
            error!(width = dims.width, height = dims.height, "World is not square");
            return ExportRun {
                summary,
                error: Some(ExportError::UnsupportedWorld {
                    width: dims.width,
                    height: dims.height,
                }),
            };
        }

        info!(
            region = %summary.region_name,
            date = %summary.date,
            width = dims.width,
            height = dims.height,
            maps = selection.len(),
            "Starting map export"
        );

        self.board.reset();
        let (done_tx, done_rx) = unbounded();

        let mut pipelines = Vec::with_capacity(selection.len());
        let mut reserved = 0usize;
        for category in selection.iter() {
            match self.start_pipeline(category, dims, &done_tx, &mut reserved) {
                Ok(pipeline) => pipelines.push(pipeline),
                Err(err) => {
                    error!(map = %category, error = %err, "Failed to start map pipeline");
                    shut_down(pipelines);
                    summary.elapsed_ms = started.elapsed().as_millis() as u64;
                    return ExportRun {
                        summary,
                        error: Some(err),
                    };
                }
            }
        }
        // Only workers hold senders from here on.
        drop(done_tx);

        let abort = self.scan(world, &mut pipelines, &mut summary);
        summary.aborted = abort.is_some();

        for pipeline in &mut pipelines {
            if let Err(e) = pipeline.producer.push_end() {
                warn!(map = %pipeline.category, error = %e, "Failed to send end marker");
            }
        }

        let slow: Vec<MapCategory> = selection.slow().collect();
        self.wait_for_slow_maps(&pipelines, &slow, &done_rx);

        let mut outputs = Vec::with_capacity(pipelines.len());
        let mut panicked = None;
        for Pipeline {
            category,
            producer,
            handle,
        } in pipelines
        {
            let stats = producer.stats();
            drop(producer);
            match handle.join() {
                Ok(output) => outputs.push((output, stats)),
                Err(_) => {
                    error!(map = %category, "Worker thread panicked");
                    summary.maps.push(MapReport {
                        category,
                        tiles_rendered: 0,
                        overlay_marks: 0,
                        queue: stats,
                        completed: false,
                        file: None,
                        bytes_written: 0,
                    });
                    panicked.get_or_insert(category);
                }
            }
        }

        let mut first_error = abort;
        if first_error.is_none() {
            first_error = panicked.map(ExportError::WorkerPanicked);
        }

        if summary.aborted {
            info!(maps = outputs.len(), "Export aborted; discarding map buffers");
            summary.maps.extend(outputs.into_iter().map(|(out, stats)| report(&out, stats)));
        } else {
            let flush_error = self.flush(&summary.region_name, summary.date, outputs, &mut summary.maps);
            if first_error.is_none() {
                first_error = flush_error;
            }
        }

        summary.maps.sort_by_key(|m| m.category);
        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            tiles = summary.tiles_scanned,
            files = summary.files_written(),
            elapsed_ms = summary.elapsed_ms,
            aborted = summary.aborted,
            "Map export finished"
        );

        ExportRun {
            summary,
            error: first_error,
        }
    }

    fn start_pipeline(
        &self,
        category: MapCategory,
        dims: WorldDims,
        done: &Sender<MapCategory>,
        reserved: &mut usize,
    ) -> Result<Pipeline> {
        let bytes = canvas_bytes(category, dims)?;
        let total = reserved.saturating_add(bytes);
        if let Some(limit) = self.buffer_limit {
            if total > limit {
                return Err(ExportError::Allocation(format!(
                    "{} map needs {} bytes, {} of the {} byte buffer limit left",
                    category,
                    bytes,
                    limit.saturating_sub(*reserved),
                    limit
                )));
            }
        }

        let canvas = new_canvas(category, dims)?;
        *reserved = total;
        let (producer, consumer) = category_queue(category);
        let handle = spawn_worker(WorkerContext {
            category,
            queue: consumer,
            canvas,
            progress: Arc::clone(&self.board),
            done: done.clone(),
            total_tiles: dims.tile_count(),
        })
        .map_err(|e| ExportError::Allocation(format!("failed to start {} worker: {}", category, e)))?;

        debug!(map = %category, bytes, "Started map pipeline");
        Ok(Pipeline {
            category,
            producer,
            handle,
        })
    }

    /// Dispatch every tile. Returns the abort error, if any.
    fn scan<W: WorldData>(
        &self,
        world: &mut W,
        pipelines: &mut [Pipeline],
        summary: &mut ExportSummary,
    ) -> Option<ExportError> {
        let dims = world.dimensions();
        let resident = world.resident_coords();

        for y in 0..dims.height {
            for x in 0..dims.width {
                let coord = WorldCoord::new(x, y);
                let scanned = if resident.contains(&coord) {
                    match world.lookup_resident(coord) {
                        Some(detail) => ScannedRegion::Borrowed(detail),
                        None => {
                            let err = GenerationError::Failed("resident detail vanished".to_string());
                            return Some(abort_at(coord, err));
                        }
                    }
                } else {
                    match world.synthesize(coord) {
                        Ok(detail) => ScannedRegion::Owned(detail),
                        Err(err) => return Some(abort_at(coord, err)),
                    }
                };

                dispatch(pipelines, coord, scanned.detail());
                summary.tiles_scanned += 1;

                match scanned {
                    ScannedRegion::Owned(detail) => {
                        world.release(detail);
                        summary.tiles_synthesized += 1;
                    }
                    ScannedRegion::Borrowed(_) => summary.tiles_resident += 1,
                }
            }
            self.sink.scan_row(y, dims.height);
        }

        None
    }

    fn wait_for_slow_maps(
        &self,
        pipelines: &[Pipeline],
        slow: &[MapCategory],
        done: &Receiver<MapCategory>,
    ) {
        let running = |category: &MapCategory| {
            !self.board.is_done(*category)
                && pipelines
                    .iter()
                    .find(|p| p.category == *category)
                    .is_some_and(|p| !p.handle.is_finished())
        };

        let mut pending: BTreeSet<MapCategory> = slow.iter().copied().filter(running).collect();
        while !pending.is_empty() {
            match done.recv_timeout(self.progress_interval) {
                Ok(category) => {
                    pending.remove(&category);
                }
                Err(RecvTimeoutError::Timeout) => self.sink.slow_maps(&self.snapshot(slow)),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            // A worker that died never sends its notification.
            pending.retain(running);
        }

        if !slow.is_empty() {
            self.sink.slow_maps(&self.snapshot(slow));
        }
    }

    fn snapshot(&self, slow: &[MapCategory]) -> Vec<(MapCategory, i32)> {
        slow.iter()
            .map(|c| (*c, self.board.get(*c).unwrap_or(0)))
            .collect()
    }

    /// Encode every buffer. Returns the first failure; the rest are still written.
    fn flush(
        &self,
        region_name: &str,
        date: WorldDate,
        outputs: Vec<(WorkerOutput, QueueStats)>,
        reports: &mut Vec<MapReport>,
    ) -> Option<ExportError> {
        let results: Vec<(MapReport, Option<ExportError>)> = outputs
            .into_par_iter()
            .map(|(output, stats)| {
                let path = self
                    .output_dir
                    .join(date.output_file_name(region_name, output.category));
                let mut report = report(&output, stats);
                match self.encode(&path, &output.canvas) {
                    Ok(bytes) => {
                        info!(map = %output.category, path = %path.display(), bytes, "Wrote map");
                        report.file = Some(path);
                        report.bytes_written = bytes;
                        (report, None)
                    }
                    Err(source) => {
                        error!(map = %output.category, path = %path.display(), error = %source, "Failed to write map");
                        let err = ExportError::Flush {
                            category: output.category,
                            path,
                            source,
                        };
                        (report, Some(err))
                    }
                }
            })
            .collect();

        let mut first_error = None;
        for (report, err) in results {
            reports.push(report);
            if first_error.is_none() {
                first_error = err;
            }
        }
        first_error
    }

    fn encode(&self, path: &Path, canvas: &MapCanvas) -> std::result::Result<u64, EncodeError> {
        match canvas {
            MapCanvas::Dense(buffer) => {
                self.encoder
                    .encode_rgba(path, buffer.as_bytes(), buffer.width(), buffer.height())
            }
            MapCanvas::Raw(buffer) => {
                self.encoder
                    .encode_gray16(path, buffer.as_bytes(), buffer.width(), buffer.height())
            }
        }
    }
}

fn abort_at(coord: WorldCoord, err: GenerationError) -> ExportError {
    warn!(x = coord.x, y = coord.y, error = %err, "World generation failed; aborting scan");
    ExportError::generation_failed(coord, err)
}

fn dispatch(pipelines: &mut [Pipeline], coord: WorldCoord, detail: &RegionDetail) {
    for pipeline in pipelines.iter_mut() {
        let packet = build_packet(pipeline.category, coord, detail);
        if let Err(e) = pipeline.producer.push(packet) {
            debug!(map = %pipeline.category, error = %e, "Dropped packet");
        }
    }
}

fn report(output: &WorkerOutput, queue: QueueStats) -> MapReport {
    MapReport {
        category: output.category,
        tiles_rendered: output.tiles,
        overlay_marks: output.marks,
        queue,
        completed: output.completed,
        file: None,
        bytes_written: 0,
    }
}

/// End and join pipelines started before a setup failure.
fn shut_down(pipelines: Vec<Pipeline>) {
    for mut pipeline in pipelines {
        if let Err(e) = pipeline.producer.push_end() {
            warn!(map = %pipeline.category, error = %e, "Failed to send end marker");
        }
        drop(pipeline.producer);
        if pipeline.handle.join().is_err() {
            error!(map = %pipeline.category, "Worker thread panicked during shutdown");
        }
    }
}
