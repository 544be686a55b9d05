//! Settings loading for the mapexport binary.
//!
//! Layers, lowest precedence first: defaults, YAML file, `MAPEXPORT_*`
//! environment variables, command line flags. The YAML file supports
//! `$VAR`/`${VAR}` substitution and `~` expansion.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use exporter::ExportSettings;
use map_common::MapSelection;

/// Values given on the command line. `None` keeps the lower layer's value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_dir: Option<String>,
    pub maps: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub seed: Option<u64>,
    pub region_name: Option<String>,
    pub progress_interval_ms: Option<u64>,
}

/// Load a settings file after expanding environment variables in it.
pub fn load_settings_file<P: AsRef<Path>>(path: P) -> Result<ExportSettings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {:?}", path))?;

    let expanded = shellexpand::env(&content)
        .with_context(|| format!("Failed to expand variables in {:?}", path))?;

    let settings = ExportSettings::from_yaml_str(&expanded)
        .with_context(|| format!("Failed to parse settings from {:?}", path))?;

    Ok(settings)
}

/// Build the effective settings from every layer and validate them.
pub fn resolve_settings(config: Option<&str>, cli: &CliOverrides) -> Result<ExportSettings> {
    let base = match config {
        Some(path) => load_settings_file(expand_path(path)?)?.with_env_overrides(),
        None => ExportSettings::from_env(),
    };

    let mut settings = apply_cli(base, cli)?;
    settings.output_dir = expand_path(&settings.output_dir.to_string_lossy())?;

    settings.validate()?;
    Ok(settings)
}

/// Apply command line values on top of `settings`.
pub fn apply_cli(mut settings: ExportSettings, cli: &CliOverrides) -> Result<ExportSettings> {
    if let Some(dir) = &cli.output_dir {
        settings.output_dir = PathBuf::from(dir);
    }
    if let Some(maps) = &cli.maps {
        settings.maps =
            MapSelection::parse_list(maps).with_context(|| format!("Invalid --maps {:?}", maps))?;
    }
    if let Some(width) = cli.width {
        settings.world_width = width;
    }
    if let Some(height) = cli.height {
        settings.world_height = height;
    }
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(name) = &cli.region_name {
        settings.region_name = name.clone();
    }
    if let Some(ms) = cli.progress_interval_ms {
        settings.progress_interval_ms = ms;
    }
    Ok(settings)
}

/// Expand `~` and environment variables in a path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path {:?}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
