#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive map rendering.
//!
//! Builds self-contained Leaflet HTML documents: circle markers colored by
//! rank or centrality score, numeric rank labels, and optional facility
//! overlays with buffer rings. Layer data is serialized to JSON and
//! embedded in the page, so the output needs no server round-trips beyond
//! the Leaflet assets and map tiles.

pub mod colormap;
pub mod escape;
pub mod map;

pub use colormap::Colormap;
pub use escape::escape_html;
pub use map::{MapDocument, MapView, centrality_map, ranked_map};

/// Errors that can occur while rendering a map document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Layer data could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
