//! World map export.
//!
//! Scans every tile of a world once and renders any subset of the nineteen
//! map categories in parallel, one worker thread per map.
//!
//! # Architecture
//!
//! ```text
//! MapsExporter::generate(world, selection)
//!      │
//!      ├─► start one queue + buffer + worker per category
//!      │
//!      ├─► for each tile (row-major)
//!      │         │
//!      │         ├─► resident: borrow detail
//!      │         ├─► otherwise: synthesize, dispatch, release
//!      │         └─► build_packet() ──► queue ──► worker ──► MapCanvas
//!      │
//!      ├─► end marker to every queue, wait for slow maps
//!      │
//!      └─► join workers, flush buffers to PNG
//! ```
//!
//! # Example
//!
//! ```ignore
//! use exporter::{MapsExporter, SyntheticWorld};
//! use map_common::{MapSelection, WorldDims};
//!
//! let mut world = SyntheticWorld::new(WorldDims::new(16, 16)?, 42);
//! let summary = MapsExporter::new("out")
//!     .generate(&mut world, &MapSelection::parse_list("elevation,biome")?)?;
//! ```

pub mod category;
pub mod config;
pub mod encoder;
pub mod error;
pub mod orchestrator;
pub mod packet;
pub mod progress;
pub mod queue;
pub mod worker;
pub mod world;

// Re-export commonly used types at crate root
pub use config::ExportSettings;
pub use encoder::{ImageEncoder, PngFileEncoder};
pub use error::{ConfigError, EncodeError, ExportError, GenerationError, QueueError, Result};
pub use orchestrator::{ExportRun, ExportSummary, MapReport, MapsExporter};
pub use packet::{CategoryPacket, Payload};
pub use progress::{LogProgress, NoProgress, ProgressBoard, ProgressSink, PROGRESS_DONE};
pub use world::{SyntheticWorld, WorldData};
