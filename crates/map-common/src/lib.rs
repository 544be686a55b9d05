//! Common types shared across the world map exporter crates.

pub mod category;
pub mod coord;
pub mod date;
pub mod error;
pub mod region;

pub use category::{MapCategory, MapSelection};
pub use coord::{EmbarkPoint, WorldCoord, WorldDims, TILE_CELLS, TILE_SIZE};
pub use date::WorldDate;
pub use error::{MapError, MapResult};
pub use region::{
    BiomeType, DiplomaticLink, EmbarkTile, RegionDetail, SiteKind, SiteRecord, Stance,
    WaterFeature,
};
