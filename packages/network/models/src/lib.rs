#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street network and emergency facility types for the resilience map.
//!
//! An [`Intersection`] is a node of the Jakarta street graph carrying one
//! precomputed betweenness-centrality score per [`Treatment`]. A treatment
//! is the scenario in which a single intersection is removed from the
//! network and centrality is recomputed for the remaining nodes. These
//! types are loaded once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Highest treatment identifier present in the graph data (`t_40`).
pub const MAX_TREATMENT: u8 = 40;

/// Number of score columns per intersection (`t_0` through `t_40`).
pub const TREATMENT_COUNT: usize = MAX_TREATMENT as usize + 1;

/// Prefix of the per-treatment score columns.
pub const SCORE_COLUMN_PREFIX: &str = "t_";

/// An intersection-removal scenario, from 0 to [`MAX_TREATMENT`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Treatment(u8);

impl Treatment {
    /// Creates a treatment from its numeric identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is greater than [`MAX_TREATMENT`].
    pub const fn new(value: u8) -> Result<Self, InvalidTreatmentError> {
        if value > MAX_TREATMENT {
            return Err(InvalidTreatmentError { value });
        }
        Ok(Self(value))
    }

    /// Returns the numeric identifier.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Index of this treatment's score in [`Intersection`] storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the attribute name holding this treatment's scores (e.g. `t_5`).
    #[must_use]
    pub fn column_name(self) -> String {
        format!("{SCORE_COLUMN_PREFIX}{}", self.0)
    }

    /// Parses an attribute name such as `t_12` back into a treatment.
    #[must_use]
    pub fn from_column_name(column: &str) -> Option<Self> {
        column
            .strip_prefix(SCORE_COLUMN_PREFIX)?
            .parse::<u8>()
            .ok()
            .and_then(|v| Self::new(v).ok())
    }

    /// Iterates over every treatment in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=MAX_TREATMENT).map(Self)
    }
}

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Treatment {
    type Error = InvalidTreatmentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Treatment> for u8 {
    fn from(treatment: Treatment) -> Self {
        treatment.0
    }
}

/// Error returned when a treatment identifier is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTreatmentError {
    /// The rejected identifier.
    pub value: u8,
}

impl std::fmt::Display for InvalidTreatmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid treatment {}: expected 0-{MAX_TREATMENT}",
            self.value
        )
    }
}

impl std::error::Error for InvalidTreatmentError {}

/// A node of the street network.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Graph node identifier.
    pub node: i64,
    /// Longitude (EPSG:4326).
    pub x: f64,
    /// Latitude (EPSG:4326).
    pub y: f64,
    /// One slot per treatment; `None` where the score is undefined
    /// (e.g. the node itself was removed in that treatment).
    scores: Vec<Option<f64>>,
}

impl Intersection {
    /// Creates an intersection with every score undefined.
    #[must_use]
    pub fn new(node: i64, x: f64, y: f64) -> Self {
        Self {
            node,
            x,
            y,
            scores: vec![None; TREATMENT_COUNT],
        }
    }

    /// Builder-style variant of [`Self::set_score`].
    #[must_use]
    pub fn with_score(mut self, treatment: Treatment, score: f64) -> Self {
        self.set_score(treatment, Some(score));
        self
    }

    /// Sets the score for a treatment. Non-finite values are stored as
    /// undefined.
    pub fn set_score(&mut self, treatment: Treatment, score: Option<f64>) {
        self.scores[treatment.index()] = score.filter(|s| s.is_finite());
    }

    /// Returns the centrality score under `treatment`, if defined.
    #[must_use]
    pub fn score(&self, treatment: Treatment) -> Option<f64> {
        self.scores[treatment.index()]
    }
}

/// The full set of intersections, in input file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionTable {
    intersections: Vec<Intersection>,
}

impl IntersectionTable {
    /// Wraps intersections, preserving their order.
    #[must_use]
    pub const fn new(intersections: Vec<Intersection>) -> Self {
        Self { intersections }
    }

    /// Number of intersections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Iterates in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.intersections.iter()
    }

    /// Number of intersections with a defined score under `treatment`.
    #[must_use]
    pub fn defined_count(&self, treatment: Treatment) -> usize {
        self.iter().filter(|i| i.score(treatment).is_some()).count()
    }
}

impl<'a> IntoIterator for &'a IntersectionTable {
    type Item = &'a Intersection;
    type IntoIter = std::slice::Iter<'a, Intersection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Emergency service facility categories shown as overlay layers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacilityKind {
    /// Police stations
    Police,
    /// Fire stations
    Fire,
}

impl FacilityKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Police, Self::Fire]
    }

    /// Human-readable layer name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Police => "police station",
            Self::Fire => "fire station",
        }
    }

    /// Stroke color of the buffer overlay.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Police => "black",
            Self::Fire => "red",
        }
    }

    /// Text color of the sidebar statistic.
    #[must_use]
    pub const fn text_color(self) -> &'static str {
        match self {
            Self::Police => "blue",
            Self::Fire => "red",
        }
    }
}

/// A police or fire station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Station name.
    pub name: String,
    /// Longitude (EPSG:4326).
    pub x: f64,
    /// Latitude (EPSG:4326).
    pub y: f64,
}

/// All facilities of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySet {
    /// Which layer these facilities belong to.
    pub kind: FacilityKind,
    /// Stations in input order.
    pub facilities: Vec<Facility>,
}

impl FacilitySet {
    /// Creates a facility set.
    #[must_use]
    pub const fn new(kind: FacilityKind, facilities: Vec<Facility>) -> Self {
        Self { kind, facilities }
    }

    /// An empty set of the given kind.
    #[must_use]
    pub const fn empty(kind: FacilityKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Whether there are no facilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

/// An intersection's position in a treatment ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIntersection {
    /// 1-based rank (1 = highest score).
    pub rank: usize,
    /// Graph node identifier.
    pub node: i64,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    /// Score under the ranked treatment.
    pub score: Option<f64>,
}

/// An intersection with a defined score, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredIntersection {
    /// Graph node identifier.
    pub node: i64,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    /// Betweenness-centrality score.
    pub score: f64,
}
