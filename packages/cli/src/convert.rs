//! Converts the source shapefile assets into the `GeoJSON` files the
//! dashboard reads, via `ogr2ogr`.

use std::path::{Path, PathBuf};
use std::process::Command;

use resilience_map_config::AssetConfig;
use resilience_map_store::paths::ensure_dir;
use resilience_map_store::progress::ProgressCallback;

/// Shapefile holding the intersection graph with its `t_*` columns.
pub const GRAPH_SHAPEFILE: &str = "graph_data_1.shp";
/// Shapefile holding police station points.
pub const POLICE_SHAPEFILE: &str = "police.shp";
/// Shapefile holding fire station points.
pub const FIRE_SHAPEFILE: &str = "fire_station.shp";

/// One shapefile and the `GeoJSON` file it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Input shapefile.
    pub source: PathBuf,
    /// Output `GeoJSON` file.
    pub target: PathBuf,
}

/// The three conversions for a shapefile directory and asset layout.
#[must_use]
pub fn plan(source_dir: &Path, assets: &AssetConfig) -> Vec<Conversion> {
    [
        (GRAPH_SHAPEFILE, assets.graph_path()),
        (POLICE_SHAPEFILE, assets.police_path()),
        (FIRE_SHAPEFILE, assets.fire_path()),
    ]
    .into_iter()
    .map(|(shapefile, target)| Conversion {
        source: source_dir.join(shapefile),
        target,
    })
    .collect()
}

/// Runs every conversion, reprojecting to EPSG:4326.
///
/// Missing shapefiles are skipped with a warning; an existing target is
/// replaced.
///
/// # Errors
///
/// Returns an error if the asset directory cannot be created, `ogr2ogr`
/// cannot be started, or it exits unsuccessfully.
pub fn run(
    source_dir: &Path,
    assets: &AssetConfig,
    progress: &dyn ProgressCallback,
) -> Result<usize, Box<dyn std::error::Error>> {
    ensure_dir(&assets.dir)?;

    let conversions = plan(source_dir, assets);
    progress.set_total(conversions.len() as u64);

    let mut converted = 0;
    for conversion in &conversions {
        progress.set_message(format!("Converting {}", conversion.source.display()));

        if conversion.source.exists() {
            convert_one(conversion)?;
            converted += 1;
        } else {
            log::warn!("Skipping {}: not found", conversion.source.display());
        }

        progress.inc(1);
    }

    progress.finish(format!("Converted {converted} shapefiles"));
    Ok(converted)
}

fn convert_one(conversion: &Conversion) -> Result<(), Box<dyn std::error::Error>> {
    // The GeoJSON driver refuses to write over an existing file
    if conversion.target.exists() {
        std::fs::remove_file(&conversion.target)?;
    }

    log::info!(
        "Running ogr2ogr: {} -> {}",
        conversion.source.display(),
        conversion.target.display()
    );

    let status = Command::new("ogr2ogr")
        .arg("-f")
        .arg("GeoJSON")
        .arg("-t_srs")
        .arg("EPSG:4326")
        .arg(&conversion.target)
        .arg(&conversion.source)
        .status()?;

    if !status.success() {
        return Err(format!("ogr2ogr failed for {}", conversion.source.display()).into());
    }

    log::info!("GeoJSON written: {}", conversion.target.display());
    Ok(())
}
