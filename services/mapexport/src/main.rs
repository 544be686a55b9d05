//! World map exporter.
//!
//! Builds a seeded synthetic world and writes the requested maps as PNG
//! files, one per map category.

mod config_loader;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use exporter::{LogProgress, MapsExporter, SyntheticWorld};
use map_common::{WorldCoord, WorldDate};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config_loader::CliOverrides;

#[derive(Parser, Debug)]
#[command(name = "mapexport")]
#[command(about = "Export world maps as PNG images")]
struct Args {
    /// Settings file path (YAML)
    #[arg(short, long)]
    config: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<String>,

    /// Comma separated maps to export; "all" and "all-raw" select groups
    #[arg(short, long)]
    maps: Option<String>,

    /// World width in tiles
    #[arg(long)]
    width: Option<u32>,

    /// World height in tiles
    #[arg(long)]
    height: Option<u32>,

    /// World seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output file prefix
    #[arg(long)]
    region_name: Option<String>,

    /// Slow map progress interval in milliseconds
    #[arg(long)]
    progress_interval_ms: Option<u64>,

    /// Keep a rectangle of tiles resident: x,y,width,height
    #[arg(long)]
    embark: Option<String>,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    summary_json: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Human readable logs instead of JSON
    #[arg(long)]
    plain_logs: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output_dir: self.output.clone(),
            maps: self.maps.clone(),
            width: self.width,
            height: self.height,
            seed: self.seed,
            region_name: self.region_name.clone(),
            progress_interval_ms: self.progress_interval_ms,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if args.plain_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_names(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Starting world map exporter");

    let settings = config_loader::resolve_settings(args.config.as_deref(), &args.overrides())?;
    info!(
        output_dir = %settings.output_dir.display(),
        maps = settings.maps.len(),
        width = settings.world_width,
        height = settings.world_height,
        seed = settings.seed,
        "Loaded settings"
    );

    let date = WorldDate::new(settings.date.year, settings.date.month, settings.date.day)?;
    let mut world = SyntheticWorld::new(settings.world_dims()?, settings.seed)
        .with_name(settings.region_name.clone())
        .with_date(date)
        .with_site_chance(settings.site_chance);

    if let Some(embark) = &args.embark {
        let (origin, width, height) = parse_embark(embark)?;
        world = world.with_resident_area(origin, width, height);
    }

    let exporter = MapsExporter::from_settings(&settings).with_progress_sink(Arc::new(LogProgress));
    let summary = exporter.generate(&mut world, &settings.maps)?;

    info!(
        files = summary.files_written(),
        tiles = summary.tiles_scanned,
        elapsed_ms = summary.elapsed_ms,
        "Export complete"
    );

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).with_context(|| format!("Failed to write summary to {}", path))?;
    }

    Ok(())
}

/// Parse `x,y,width,height`.
fn parse_embark(value: &str) -> Result<(WorldCoord, u32, u32)> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --embark {:?}", value))?;

    match parts.as_slice() {
        [x, y, width, height] => Ok((WorldCoord::new(*x, *y), *width, *height)),
        _ => anyhow::bail!("--embark expects x,y,width,height, got {:?}", value),
    }
}
