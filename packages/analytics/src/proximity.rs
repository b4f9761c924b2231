//! Proximity of ranked intersections to emergency facilities.
//!
//! A ranked intersection is "near" when it lies inside the buffer of at
//! least one facility. Buffers are built in Web Mercator so the radius is
//! expressed in meters.

use geo::Point;
use resilience_map_network_models::{
    FacilityKind, FacilitySet, IntersectionTable, RankedIntersection, Treatment,
};
use resilience_map_spatial::BufferIndex;

use crate::ranking::{NullPolicy, top_n};

/// Reusable buffer zones for one facility layer.
///
/// Build once and score many rankings against it (e.g. every treatment).
pub struct ProximityScorer {
    kind: FacilityKind,
    index: BufferIndex,
}

impl ProximityScorer {
    /// Buffers every facility of the set by `radius_m` meters.
    #[must_use]
    pub fn new(facilities: &FacilitySet, radius_m: f64) -> Self {
        let index = BufferIndex::build(
            facilities.facilities.iter().map(|f| Point::new(f.x, f.y)),
            radius_m,
        );
        Self {
            kind: facilities.kind,
            index,
        }
    }

    /// Facility layer these buffers belong to.
    #[must_use]
    pub const fn kind(&self) -> FacilityKind {
        self.kind
    }

    /// Buffer radius in meters.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.index.radius_m()
    }

    /// Near/not-near flag for each ranked intersection, in ranking order.
    #[must_use]
    pub fn flags(&self, ranked: &[RankedIntersection]) -> Vec<bool> {
        ranked
            .iter()
            .map(|r| self.index.contains(Point::new(r.x, r.y)))
            .collect()
    }

    /// Number of ranked intersections inside any buffer.
    #[must_use]
    pub fn count(&self, ranked: &[RankedIntersection]) -> usize {
        ranked
            .iter()
            .filter(|r| self.index.contains(Point::new(r.x, r.y)))
            .count()
    }
}

/// Near/not-near flag for each ranked intersection.
#[must_use]
pub fn flag_within_buffer(
    facilities: &FacilitySet,
    ranked: &[RankedIntersection],
    radius_m: f64,
) -> Vec<bool> {
    ProximityScorer::new(facilities, radius_m).flags(ranked)
}

/// Counts ranked intersections within `radius_m` meters of any facility.
///
/// An empty facility set, or a negative radius, always yields 0.
#[must_use]
pub fn count_within_buffer(
    facilities: &FacilitySet,
    ranked: &[RankedIntersection],
    radius_m: f64,
) -> usize {
    if facilities.is_empty() {
        return 0;
    }
    ProximityScorer::new(facilities, radius_m).count(ranked)
}

/// The sidebar statistic for one facility layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityReport {
    /// Facility layer.
    pub kind: FacilityKind,
    /// Ranked treatment.
    pub treatment: Treatment,
    /// Buffer radius in meters.
    pub radius_m: f64,
    /// Ranked intersections inside a buffer.
    pub near: usize,
    /// Intersections actually ranked (at most the requested N).
    pub ranked: usize,
}

impl ProximityReport {
    /// Ranks the top `n` intersections under `treatment` and scores them
    /// against the scorer's buffers.
    #[must_use]
    pub fn compute(
        scorer: &ProximityScorer,
        table: &IntersectionTable,
        treatment: Treatment,
        n: usize,
    ) -> Self {
        let ranked = top_n(table, treatment, n, NullPolicy::Exclude);
        Self::from_ranking(scorer, treatment, &ranked)
    }

    /// Scores an existing ranking.
    #[must_use]
    pub fn from_ranking(
        scorer: &ProximityScorer,
        treatment: Treatment,
        ranked: &[RankedIntersection],
    ) -> Self {
        Self {
            kind: scorer.kind(),
            treatment,
            radius_m: scorer.radius_m(),
            near: scorer.count(ranked),
            ranked: ranked.len(),
        }
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "In treatment {}, there are {} intersections within {} buffer zones out of {} intersections",
            self.treatment,
            self.near,
            self.kind.label(),
            self.ranked
        )
    }
}

#[cfg(test)]
mod tests {
    use resilience_map_network_models::{Facility, Intersection};
    use resilience_map_spatial::from_web_mercator;

    use super::*;

    fn ranked_at(points: &[(f64, f64)]) -> Vec<RankedIntersection> {
        points
            .iter()
            .enumerate()
            .map(|(idx, (x, y))| RankedIntersection {
                rank: idx + 1,
                node: i64::try_from(idx).unwrap(),
                x: *x,
                y: *y,
                score: Some(1.0),
            })
            .collect()
    }

    fn east_of_origin(meters: f64) -> (f64, f64) {
        let p = from_web_mercator(Point::new(meters, 0.0));
        (p.x(), p.y())
    }

    fn origin_station(kind: FacilityKind) -> FacilitySet {
        FacilitySet::new(
            kind,
            vec![Facility {
                name: "Origin".to_string(),
                x: 0.0,
                y: 0.0,
            }],
        )
    }

    #[test]
    fn empty_facilities_count_zero() {
        let ranked = ranked_at(&[(0.0, 0.0), (106.8, -6.2)]);
        let empty = FacilitySet::empty(FacilityKind::Fire);
        for radius in [0.0, 1.0, 500.0, 1e7] {
            assert_eq!(count_within_buffer(&empty, &ranked, radius), 0);
        }
    }

    #[test]
    fn scorer_over_empty_layer_counts_zero() {
        let ranked = ranked_at(&[(0.0, 0.0), (106.8, -6.2)]);
        let scorer = ProximityScorer::new(&FacilitySet::empty(FacilityKind::Police), 500.0);
        assert_eq!(scorer.count(&ranked), 0);
        assert_eq!(scorer.flags(&ranked), vec![false, false]);
    }

    #[test]
    fn buffer_scenario_400m_near_600m_not() {
        let ranked = ranked_at(&[east_of_origin(400.0), east_of_origin(600.0)]);
        let police = origin_station(FacilityKind::Police);
        assert_eq!(
            flag_within_buffer(&police, &ranked, 500.0),
            vec![true, false]
        );
        assert_eq!(count_within_buffer(&police, &ranked, 500.0), 1);
    }

    #[test]
    fn growing_radius_never_decreases_count() {
        let ranked = ranked_at(&[
            east_of_origin(50.0),
            east_of_origin(300.0),
            east_of_origin(800.0),
            east_of_origin(2_500.0),
            (0.01, 0.01),
        ]);
        let fire = origin_station(FacilityKind::Fire);
        let mut previous = 0;
        for radius in [0.0, 10.0, 100.0, 500.0, 1_000.0, 2_000.0, 5_000.0] {
            let count = count_within_buffer(&fire, &ranked, radius);
            assert!(count >= previous, "radius {radius}: {count} < {previous}");
            previous = count;
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn report_uses_ranked_count() {
        let t = Treatment::new(0).unwrap();
        let (near_x, near_y) = east_of_origin(100.0);
        let table = IntersectionTable::new(vec![
            Intersection::new(1, near_x, near_y).with_score(t, 2.0),
            Intersection::new(2, 1.0, 1.0).with_score(t, 3.0),
            Intersection::new(3, 0.0, 0.0),
        ]);
        let scorer = ProximityScorer::new(&origin_station(FacilityKind::Police), 500.0);
        let report = ProximityReport::compute(&scorer, &table, t, 100);
        assert_eq!(report.ranked, 2);
        assert_eq!(report.near, 1);
        assert_eq!(
            report.summary(),
            "In treatment 0, there are 1 intersections within police station buffer zones out of 2 intersections"
        );
    }
}
