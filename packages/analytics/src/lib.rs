#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranking and proximity analysis over the precomputed centrality scores.
//!
//! [`ranking`] orders intersections by a treatment's score and truncates to
//! the top N. [`proximity`] counts how many ranked intersections fall
//! inside the buffer zone of any police or fire station.

pub mod proximity;
pub mod ranking;

pub use proximity::{ProximityReport, ProximityScorer, count_within_buffer, flag_within_buffer};
pub use ranking::{NullPolicy, defined_scores, top_n};
