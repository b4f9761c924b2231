//! Resolved file paths for the three input datasets.

use std::path::{Path, PathBuf};

use resilience_map_config::AssetConfig;

/// Locations of the intersection graph and facility files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Intersection graph `GeoJSON`.
    pub graph: PathBuf,
    /// Police station `GeoJSON`.
    pub police: PathBuf,
    /// Fire station `GeoJSON`.
    pub fire: PathBuf,
}

impl DataPaths {
    /// Resolves paths from the asset section of the dashboard config.
    #[must_use]
    pub fn from_assets(assets: &AssetConfig) -> Self {
        Self {
            graph: assets.graph_path(),
            police: assets.police_path(),
            fire: assets.fire_path(),
        }
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
