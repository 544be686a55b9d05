//! Progress reporting for the scan and the slow overlay maps.

use std::sync::atomic::{AtomicI32, Ordering};

use map_common::MapCategory;
use tracing::{debug, info};

/// Progress value of a slow map that has finished.
pub const PROGRESS_DONE: i32 = -1;

/// Percent-complete cells for the slow categories.
///
/// Each cell has a single writer (the category's worker) and a single reader
/// (the orchestrator).
#[derive(Debug, Default)]
pub struct ProgressBoard {
    cells: [AtomicI32; MapCategory::SLOW.len()],
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, category: MapCategory) -> Option<&AtomicI32> {
        MapCategory::SLOW
            .iter()
            .position(|c| *c == category)
            .map(|i| &self.cells[i])
    }

    /// Set every cell back to 0.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(0, Ordering::Release);
        }
    }

    /// Publish a percentage. Ignored for categories that do not report.
    pub fn set(&self, category: MapCategory, percent: i32) {
        if let Some(cell) = self.cell(category) {
            cell.store(percent, Ordering::Release);
        }
    }

    pub fn mark_done(&self, category: MapCategory) {
        self.set(category, PROGRESS_DONE);
    }

    /// Last published value, or `None` for categories that do not report.
    pub fn get(&self, category: MapCategory) -> Option<i32> {
        self.cell(category).map(|cell| cell.load(Ordering::Acquire))
    }

    pub fn is_done(&self, category: MapCategory) -> bool {
        self.get(category) == Some(PROGRESS_DONE)
    }
}

/// Percentage published after `consumed` of `total` tiles, held below 100
/// until the worker finishes.
pub fn percent_of(consumed: u64, total: u64) -> i32 {
    if total == 0 {
        return 0;
    }
    (consumed.saturating_mul(100) / total).min(99) as i32
}

/// Receiver of progress updates.
pub trait ProgressSink: Send + Sync {
    /// Called after each world row is dispatched.
    fn scan_row(&self, row: u32, total_rows: u32);

    /// Called with the last known value of every requested slow map.
    fn slow_maps(&self, progress: &[(MapCategory, i32)]);
}

/// Sink that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn scan_row(&self, row: u32, total_rows: u32) {
        debug!(row = row + 1, total_rows, "Scanned world row");
    }

    fn slow_maps(&self, progress: &[(MapCategory, i32)]) {
        for (category, percent) in progress {
            if *percent == PROGRESS_DONE {
                info!(map = %category, "{} complete", category.label());
            } else {
                info!(map = %category, percent, "{} in progress", category.label());
            }
        }
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn scan_row(&self, _row: u32, _total_rows: u32) {}

    fn slow_maps(&self, _progress: &[(MapCategory, i32)]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_tracks_slow_categories_only() {
        let board = ProgressBoard::new();
        board.set(MapCategory::Trading, 42);
        board.set(MapCategory::Elevation, 42);
        assert_eq!(board.get(MapCategory::Trading), Some(42));
        assert_eq!(board.get(MapCategory::Elevation), None);
        assert_eq!(board.get(MapCategory::Sites), Some(0));
    }

    #[test]
    fn test_done_and_reset() {
        let board = ProgressBoard::new();
        board.mark_done(MapCategory::Diplomacy);
        assert!(board.is_done(MapCategory::Diplomacy));
        assert!(!board.is_done(MapCategory::Nobility));
        board.reset();
        assert_eq!(board.get(MapCategory::Diplomacy), Some(0));
    }

    #[test]
    fn test_percent_is_capped_until_done() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(5, 10), 50);
        assert_eq!(percent_of(10, 10), 99);
        assert_eq!(percent_of(3, 0), 0);
    }
}
