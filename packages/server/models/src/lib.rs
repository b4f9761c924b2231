#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page parameters and API types for the resilience map server.
//!
//! Query parameter types mirror the sidebar controls of the dashboard
//! pages. Response types are serialized to JSON for the `/api` routes and
//! kept separate from the analysis types so the API contract can evolve
//! on its own.

use resilience_map_network_models::{FacilityKind, RankedIntersection, ScoredIntersection};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The three dashboard views. Any view can be selected from any other.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Page {
    /// How the elimination test works.
    #[default]
    Intro,
    /// Top-N intersections under one treatment, with facility buffers.
    Treatment,
    /// Every defined centrality score under one treatment.
    Centrality,
}

impl Page {
    /// Every page, in selector order.
    pub const ALL: &[Self] = &[Self::Intro, Self::Treatment, Self::Centrality];

    /// Label shown in the page selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "Home Page",
            Self::Treatment => "Treatment",
            Self::Centrality => "Jakarta Betweenness Centrality",
        }
    }
}

/// Sidebar controls submitted with every page request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// Selected page; the intro page when absent.
    pub page: Option<Page>,
    /// Treatment (closed intersection) identifier.
    pub treatment: Option<u8>,
    /// Number of top-ranked intersections to show.
    pub top: Option<usize>,
    /// Show the police station buffer layer.
    pub police: Option<bool>,
    /// Show the fire station buffer layer.
    pub fire: Option<bool>,
}

impl PageParams {
    /// Facility layers whose checkbox is ticked, in display order.
    #[must_use]
    pub fn selected_layers(&self) -> Vec<FacilityKind> {
        FacilityKind::all()
            .iter()
            .copied()
            .filter(|kind| match kind {
                FacilityKind::Police => self.police.unwrap_or(false),
                FacilityKind::Fire => self.fire.unwrap_or(false),
            })
            .collect()
    }
}

/// Query parameters for `/api/ranking`.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingQueryParams {
    /// Treatment identifier.
    pub treatment: u8,
    /// Number of intersections to rank.
    pub top: Option<usize>,
}

/// Query parameters for `/api/proximity`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProximityQueryParams {
    /// Treatment identifier.
    pub treatment: u8,
    /// Number of intersections to rank.
    pub top: Option<usize>,
    /// Facility layer to measure against.
    pub layer: FacilityKind,
}

/// Query parameters for `/api/centrality`.
#[derive(Debug, Clone, Deserialize)]
pub struct CentralityQueryParams {
    /// Treatment identifier.
    pub treatment: u8,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Top-N ranking under one treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRanking {
    /// Treatment identifier.
    pub treatment: u8,
    /// Score attribute name (e.g. `t_5`).
    pub column: String,
    /// Requested N.
    pub requested: usize,
    /// Ranked intersections, best first.
    pub intersections: Vec<RankedIntersection>,
}

/// Proximity statistic for one facility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProximity {
    /// Treatment identifier.
    pub treatment: u8,
    /// Facility layer.
    pub layer: FacilityKind,
    /// Buffer radius in meters.
    pub radius_m: f64,
    /// Ranked intersections inside a buffer.
    pub near: usize,
    /// Intersections ranked.
    pub ranked: usize,
    /// Human-readable sentence.
    pub summary: String,
}

/// Every defined score under one treatment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCentrality {
    /// Treatment identifier.
    pub treatment: u8,
    /// Score attribute name.
    pub column: String,
    /// Intersections with a defined score, in input order.
    pub intersections: Vec<ScoredIntersection>,
}

/// Error body for failed API requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Description of the failure.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parses_from_str() {
        for page in Page::ALL {
            let parsed: Page = page.to_string().parse().unwrap();
            assert_eq!(parsed, *page);
        }
        assert_eq!(Page::Centrality.to_string(), "centrality");
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn default_page_is_intro() {
        assert_eq!(Page::default(), Page::Intro);
        assert_eq!(PageParams::default().page, None);
    }

    #[test]
    fn selected_layers_follow_checkboxes() {
        let params = PageParams {
            fire: Some(true),
            police: Some(false),
            ..PageParams::default()
        };
        assert_eq!(params.selected_layers(), vec![FacilityKind::Fire]);

        let both = PageParams {
            fire: Some(true),
            police: Some(true),
            ..PageParams::default()
        };
        assert_eq!(
            both.selected_layers(),
            vec![FacilityKind::Police, FacilityKind::Fire]
        );
    }

    #[test]
    fn proximity_params_deserialize_layer() {
        let params: ProximityQueryParams =
            serde_json::from_str(r#"{"treatment": 3, "layer": "police"}"#).unwrap();
        assert_eq!(params.layer, FacilityKind::Police);
        assert_eq!(params.top, None);
    }
}
