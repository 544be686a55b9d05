//! Export settings.

use std::path::PathBuf;
use std::time::Duration;

use map_common::{MapSelection, WorldDate, WorldDims};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Largest accepted world side, in tiles.
pub const MAX_WORLD_SIDE: u32 = 4096;

/// Settings for an export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory the map images are written to.
    pub output_dir: PathBuf,

    /// Maps to produce.
    pub maps: MapSelection,

    /// How often slow map progress is reported, in milliseconds.
    pub progress_interval_ms: u64,

    /// Synthetic world width in tiles.
    pub world_width: u32,

    /// Synthetic world height in tiles.
    pub world_height: u32,

    /// Seed of the synthetic world.
    pub seed: u64,

    /// Output file prefix.
    pub region_name: String,

    pub date: WorldDate,

    /// Probability (0-1) that a synthetic tile holds a site.
    pub site_chance: f64,

    /// Cap on the summed size of all map buffers, in bytes.
    pub max_buffer_bytes: Option<usize>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            maps: MapSelection::all_visual(),
            progress_interval_ms: 1000,
            world_width: 64,
            world_height: 64,
            seed: 0,
            region_name: "region1".to_string(),
            date: WorldDate {
                year: 250,
                month: 1,
                day: 1,
            },
            site_chance: 0.3,
            max_buffer_bytes: None,
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    let val = std::env::var(var).ok()?;
    match val.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var, value = %val, "Ignoring unparseable environment override");
            None
        }
    }
}

impl ExportSettings {
    /// Load settings from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Read {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `MAPEXPORT_*` environment variables.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("MAPEXPORT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("MAPEXPORT_MAPS") {
            match MapSelection::parse_list(&val) {
                Ok(maps) => self.maps = maps,
                Err(e) => warn!(error = %e, "Ignoring MAPEXPORT_MAPS"),
            }
        }

        if let Some(ms) = parsed("MAPEXPORT_PROGRESS_INTERVAL_MS") {
            self.progress_interval_ms = ms;
        }

        if let Some(width) = parsed("MAPEXPORT_WORLD_WIDTH") {
            self.world_width = width;
        }

        if let Some(height) = parsed("MAPEXPORT_WORLD_HEIGHT") {
            self.world_height = height;
        }

        if let Some(seed) = parsed("MAPEXPORT_SEED") {
            self.seed = seed;
        }

        if let Ok(val) = std::env::var("MAPEXPORT_REGION_NAME") {
            self.region_name = val;
        }

        if let Some(chance) = parsed("MAPEXPORT_SITE_CHANCE") {
            self.site_chance = chance;
        }

        if let Some(bytes) = parsed("MAPEXPORT_MAX_BUFFER_BYTES") {
            self.max_buffer_bytes = Some(bytes);
        }

        self
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_width == 0 || self.world_width > MAX_WORLD_SIDE {
            return Err(ConfigError::invalid(
                "world_width",
                format!("must be 1-{}", MAX_WORLD_SIDE),
            ));
        }

        if self.world_height == 0 || self.world_height > MAX_WORLD_SIDE {
            return Err(ConfigError::invalid(
                "world_height",
                format!("must be 1-{}", MAX_WORLD_SIDE),
            ));
        }

        // Tile layout addressing uses the height as scanline stride.
        if self.world_width != self.world_height {
            return Err(ConfigError::invalid(
                "world",
                format!(
                    "must be square, got {}x{}",
                    self.world_width, self.world_height
                ),
            ));
        }

        if self.max_buffer_bytes == Some(0) {
            return Err(ConfigError::invalid("max_buffer_bytes", "must be > 0"));
        }

        if self.progress_interval_ms == 0 {
            return Err(ConfigError::invalid("progress_interval_ms", "must be > 0"));
        }

        if !(0.0..=1.0).contains(&self.site_chance) {
            return Err(ConfigError::invalid("site_chance", "must be 0-1"));
        }

        if self.region_name.trim().is_empty() || self.region_name.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "region_name",
                "must be non-empty and contain no path separators",
            ));
        }

        WorldDate::new(self.date.year, self.date.month, self.date.day)
            .map_err(|e| ConfigError::invalid("date", e.to_string()))?;

        Ok(())
    }

    pub fn world_dims(&self) -> Result<WorldDims, ConfigError> {
        WorldDims::new(self.world_width, self.world_height)
            .map_err(|e| ConfigError::invalid("world", e.to_string()))
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
