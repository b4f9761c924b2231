//! Top-N selection by treatment score.
//!
//! Sorting is stable: intersections with equal scores keep their input
//! file order. Undefined scores either drop out ([`NullPolicy::Exclude`])
//! or sort after every defined score ([`NullPolicy::Last`]).

use std::cmp::Ordering;

use resilience_map_network_models::{
    IntersectionTable, RankedIntersection, ScoredIntersection, Treatment,
};
use serde::{Deserialize, Serialize};

/// How intersections without a score under the ranked treatment are
/// handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Leave them out of the ranking entirely.
    #[default]
    Exclude,
    /// Keep them, ordered after every defined score.
    Last,
}

/// Returns up to `n` intersections ordered by descending score under
/// `treatment`, with 1-based ranks.
#[must_use]
pub fn top_n(
    table: &IntersectionTable,
    treatment: Treatment,
    n: usize,
    null_policy: NullPolicy,
) -> Vec<RankedIntersection> {
    let mut rows: Vec<_> = table
        .iter()
        .filter(|i| null_policy == NullPolicy::Last || i.score(treatment).is_some())
        .collect();

    rows.sort_by(|a, b| descending(a.score(treatment), b.score(treatment)));

    if rows.len() < n {
        log::debug!(
            "Requested top {n} for {} but only {} intersections qualify",
            treatment.column_name(),
            rows.len()
        );
    }

    rows.into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, i)| RankedIntersection {
            rank: idx + 1,
            node: i.node,
            x: i.x,
            y: i.y,
            score: i.score(treatment),
        })
        .collect()
}

/// Every intersection with a defined score under `treatment`, in input
/// order.
#[must_use]
pub fn defined_scores(table: &IntersectionTable, treatment: Treatment) -> Vec<ScoredIntersection> {
    table
        .iter()
        .filter_map(|i| {
            i.score(treatment).map(|score| ScoredIntersection {
                node: i.node,
                x: i.x,
                y: i.y,
                score,
            })
        })
        .collect()
}

/// Descending by score, undefined last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
