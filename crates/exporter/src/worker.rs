//! Consumer worker: one thread per category draining its queue into a buffer.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use map_common::MapCategory;
use renderer::canvas::MapCanvas;
use tracing::{debug, warn};

use crate::category::MapPainter;
use crate::packet::CategoryPacket;
use crate::progress::{percent_of, ProgressBoard};
use crate::queue::QueueConsumer;

/// Everything a worker thread owns.
pub struct WorkerContext {
    pub category: MapCategory,
    pub queue: QueueConsumer,
    pub canvas: MapCanvas,
    pub progress: Arc<ProgressBoard>,
    /// Receives the category once the worker has finished.
    pub done: Sender<MapCategory>,
    /// Tiles the scan will dispatch, for percentage reporting.
    pub total_tiles: u64,
}

/// What a worker hands back when joined.
#[derive(Debug)]
pub struct WorkerOutput {
    pub category: MapCategory,
    pub canvas: MapCanvas,
    pub tiles: u64,
    pub marks: usize,
    /// False when the queue disconnected before its end marker.
    pub completed: bool,
}

/// Thread name for a category's worker.
pub fn thread_name(category: MapCategory) -> String {
    format!("mapexport-{}", category.slug())
}

/// Start the worker thread.
pub fn spawn_worker(ctx: WorkerContext) -> io::Result<JoinHandle<WorkerOutput>> {
    thread::Builder::new()
        .name(thread_name(ctx.category))
        .spawn(move || run_worker(ctx))
}

/// Drain the queue until the end marker, then finish the map.
pub fn run_worker(ctx: WorkerContext) -> WorkerOutput {
    let WorkerContext {
        category,
        queue,
        canvas,
        progress,
        done,
        total_tiles,
    } = ctx;

    debug!(map = %category, "Worker started");
    let mut painter = MapPainter::new(canvas);
    let completed = loop {
        match queue.pop() {
            Ok(CategoryPacket::Data { coord, payload }) => {
                painter.paint(category, coord, &payload);
                if category.is_slow() {
                    progress.set(category, percent_of(painter.tiles(), total_tiles));
                }
            }
            Ok(CategoryPacket::EndOfStream) => break true,
            Err(e) => {
                warn!(map = %category, error = %e, "Queue closed without end marker");
                break false;
            }
        }
    };

    let tiles = painter.tiles();
    let (canvas, marks) = painter.finish();
    progress.mark_done(category);
    // The orchestrator may already have stopped listening.
    let _ = done.send(category);
    debug!(map = %category, tiles, marks, "Worker finished");

    WorkerOutput {
        category,
        canvas,
        tiles,
        marks,
        completed,
    }
}
