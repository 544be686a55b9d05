//! Common test fixtures for world map export tests.

use map_common::{EmbarkPoint, SiteKind, SiteRecord, WorldCoord, WorldDate, WorldDims};

/// Common world sizes for testing.
pub mod worlds {
    /// Smallest possible world.
    pub const SINGLE: (u32, u32) = (1, 1);

    /// Square world where the buffer layout is row-major.
    pub const SQUARE: (u32, u32) = (2, 2);

    /// Odd side, so the middle tile has neighbors on every side.
    pub const LARGE: (u32, u32) = (3, 3);

    /// Not a valid export shape; exporters refuse it.
    pub const OBLONG: (u32, u32) = (3, 2);
}

/// Build `WorldDims` from one of the `worlds` constants.
pub fn dims((width, height): (u32, u32)) -> WorldDims {
    WorldDims::new(width, height).expect("fixture world sizes are valid")
}

/// Region name used by the file name fixtures.
pub const REGION_NAME: &str = "region1";

/// World date used by the file name fixtures.
pub fn date() -> WorldDate {
    WorldDate::new(250, 3, 14).expect("fixture date is valid")
}

/// Center pixel of a world tile.
pub fn tile_center(coord: WorldCoord) -> EmbarkPoint {
    let origin = coord.origin();
    EmbarkPoint::new(origin.x + 8, origin.y + 8)
}

/// A town at the center of `coord`.
pub fn town(id: u32, civ_id: u32, coord: WorldCoord) -> SiteRecord {
    SiteRecord::new(id, SiteKind::Town, civ_id, tile_center(coord))
}

/// Two towns in different tiles that trade with each other.
pub fn trading_pair(a: WorldCoord, b: WorldCoord) -> (SiteRecord, SiteRecord) {
    let mut first = town(1, 1, a);
    let mut second = town(2, 1, b);
    first.trade_partners.push(second.pos);
    second.trade_partners.push(first.pos);
    (first, second)
}
