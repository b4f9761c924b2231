#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only access to the pre-built geospatial datasets.
//!
//! Three `GeoJSON` files back the dashboard: the intersection graph with its
//! per-treatment centrality columns, police stations, and fire stations.
//! [`DataCache`] loads each file at most once and hands out shared
//! references for the rest of the process lifetime.

pub mod cache;
pub mod loader;
pub mod paths;
pub mod progress;

use std::path::PathBuf;

pub use cache::DataCache;
pub use paths::DataPaths;

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` parsed but does not have the expected shape.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
