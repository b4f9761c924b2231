//! Builds the map documents and statistics behind each page.
//!
//! Every call recomputes from the cached tables; nothing is memoized
//! between requests.

use resilience_map_analytics::{NullPolicy, ProximityReport, ProximityScorer, defined_scores, top_n};
use resilience_map_config::AnalysisConfig;
use resilience_map_network_models::{FacilityKind, Treatment};
use resilience_map_render::{MapDocument, centrality_map, ranked_map};
use resilience_map_server_models::PageParams;
use resilience_map_store::DataCache;

use crate::ServerError;

/// Validated sidebar controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Selected treatment.
    pub treatment: Treatment,
    /// Number of top-ranked intersections, within `1..=max_top_n`.
    pub top: usize,
    /// Facility layers to overlay.
    pub layers: Vec<FacilityKind>,
}

impl Controls {
    /// Resolves raw page parameters against the analysis defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidTreatment`] if the treatment is out of
    /// range.
    pub fn from_params(params: &PageParams, analysis: &AnalysisConfig) -> Result<Self, ServerError> {
        let treatment = params
            .treatment
            .map(Treatment::new)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            treatment,
            top: clamp_top(params.top, analysis),
            layers: params.selected_layers(),
        })
    }
}

/// Requested row count, defaulted and clamped to the slider range.
#[must_use]
pub fn clamp_top(top: Option<usize>, analysis: &AnalysisConfig) -> usize {
    top.unwrap_or(analysis.default_top_n)
        .clamp(1, analysis.max_top_n.max(1))
}

/// The ranked map plus one proximity statistic per available overlay.
pub struct TreatmentView {
    /// Map of the ranked intersections and selected overlays.
    pub document: MapDocument,
    /// Statistics for the selected layers that could be loaded.
    pub reports: Vec<ProximityReport>,
}

/// Ranks the top intersections for the controls and scores them against
/// every selected facility layer.
///
/// Layers that fail to load are left out of both the map and the
/// statistics.
///
/// # Errors
///
/// Returns [`ServerError::Data`] if the intersection graph cannot be
/// loaded.
pub fn treatment_view(
    cache: &DataCache,
    analysis: &AnalysisConfig,
    controls: &Controls,
) -> Result<TreatmentView, ServerError> {
    let table = cache.graph()?;
    let ranked = top_n(table, controls.treatment, controls.top, NullPolicy::Exclude);

    if ranked.is_empty() {
        log::warn!("No defined scores for treatment {}", controls.treatment);
    } else if ranked.len() < controls.top {
        log::debug!(
            "Only {} of {} intersections have a {} score",
            table.defined_count(controls.treatment),
            table.len(),
            controls.treatment.column_name()
        );
    }

    let mut document = ranked_map(&ranked, controls.treatment);
    let mut reports = Vec::with_capacity(controls.layers.len());

    for kind in &controls.layers {
        let Some(facilities) = cache.facilities(*kind) else {
            continue;
        };
        let scorer = ProximityScorer::new(facilities, analysis.buffer_radius_m);
        reports.push(ProximityReport::from_ranking(
            &scorer,
            controls.treatment,
            &ranked,
        ));
        document.add_facility_overlay(facilities, analysis.buffer_radius_m);
    }

    Ok(TreatmentView { document, reports })
}

/// Map of every defined centrality score under `treatment`.
///
/// # Errors
///
/// Returns [`ServerError::Data`] if the intersection graph cannot be
/// loaded.
pub fn centrality_view(cache: &DataCache, treatment: Treatment) -> Result<MapDocument, ServerError> {
    let table = cache.graph()?;
    let scored = defined_scores(table, treatment);
    log::debug!(
        "Rendering {} scored intersections for treatment {treatment}",
        scored.len()
    );
    Ok(centrality_map(&scored, treatment))
}

#[cfg(test)]
mod tests {
    use resilience_map_config::DashboardConfig;
    use resilience_map_network_models::{Facility, FacilitySet, Intersection, IntersectionTable};
    use resilience_map_store::DataPaths;

    use super::*;

    fn analysis() -> AnalysisConfig {
        DashboardConfig::default().analysis
    }

    fn cache_with(police: Option<FacilitySet>) -> DataCache {
        let t0 = Treatment::new(0).unwrap();
        let graph = IntersectionTable::new(vec![
            Intersection::new(1, 106.80, -6.20).with_score(t0, 0.9),
            Intersection::new(2, 106.90, -6.10).with_score(t0, 0.4),
            Intersection::new(3, 106.70, -6.30),
        ]);
        let paths = DataPaths {
            graph: "unused/graph.geojson".into(),
            police: "unused/police.geojson".into(),
            fire: "unused/fire.geojson".into(),
        };
        DataCache::with_tables(paths, graph, police, None)
    }

    #[test]
    fn controls_default_and_clamp() {
        let controls = Controls::from_params(&PageParams::default(), &analysis()).unwrap();
        assert_eq!(controls.treatment.value(), 0);
        assert_eq!(controls.top, 1);
        assert!(controls.layers.is_empty());

        let params = PageParams {
            treatment: Some(12),
            top: Some(5_000),
            police: Some(true),
            ..PageParams::default()
        };
        let controls = Controls::from_params(&params, &analysis()).unwrap();
        assert_eq!(controls.treatment.value(), 12);
        assert_eq!(controls.top, 100);
        assert_eq!(controls.layers, vec![FacilityKind::Police]);

        assert_eq!(clamp_top(Some(0), &analysis()), 1);
    }

    #[test]
    fn controls_reject_out_of_range_treatment() {
        let params = PageParams {
            treatment: Some(41),
            ..PageParams::default()
        };
        assert!(matches!(
            Controls::from_params(&params, &analysis()),
            Err(ServerError::InvalidTreatment(_))
        ));
    }

    #[test]
    fn missing_layer_is_omitted() {
        let cache = cache_with(None);
        let controls = Controls {
            treatment: Treatment::new(0).unwrap(),
            top: 100,
            layers: vec![FacilityKind::Police, FacilityKind::Fire],
        };
        let view = treatment_view(&cache, &analysis(), &controls).unwrap();
        assert!(view.reports.is_empty());
        assert_eq!(view.document.layers.len(), 1);
    }

    #[test]
    fn selected_layer_reports_ranked_count() {
        let police = FacilitySet::new(
            FacilityKind::Police,
            vec![Facility {
                name: "Polsek".to_string(),
                x: 106.80,
                y: -6.20,
            }],
        );
        let cache = cache_with(Some(police));
        let controls = Controls {
            treatment: Treatment::new(0).unwrap(),
            top: 100,
            layers: vec![FacilityKind::Police],
        };
        let view = treatment_view(&cache, &analysis(), &controls).unwrap();
        assert_eq!(view.reports.len(), 1);
        assert_eq!(view.reports[0].ranked, 2);
        assert_eq!(view.reports[0].near, 1);
        assert_eq!(view.document.layers.len(), 2);
        assert!(view.document.has_layer_control());
    }

    #[test]
    fn centrality_view_skips_undefined_scores() {
        let cache = cache_with(None);
        let document = centrality_view(&cache, Treatment::new(0).unwrap()).unwrap();
        assert_eq!(document.layers[0].markers.len(), 2);
    }
}
