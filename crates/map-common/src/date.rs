//! In-game calendar date and output file naming.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::MapCategory;
use crate::error::{MapError, MapResult};

/// Date of the simulated world at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDate {
    pub year: i32,
    /// 1-12
    pub month: u8,
    /// 1-28
    pub day: u8,
}

impl WorldDate {
    pub fn new(year: i32, month: u8, day: u8) -> MapResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(MapError::InvalidDate(format!("month {} not in 1-12", month)));
        }
        if !(1..=28).contains(&day) {
            return Err(MapError::InvalidDate(format!("day {} not in 1-28", day)));
        }
        Ok(Self { year, month, day })
    }

    /// `<region>-<year>-<month>-<day>-<slug>.png`
    pub fn output_file_name(&self, region_name: &str, category: MapCategory) -> String {
        format!("{}-{}-{}.png", region_name, self, category.slug())
    }
}

impl fmt::Display for WorldDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}
