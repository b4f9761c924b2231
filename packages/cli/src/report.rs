//! Batch proximity report across every treatment.
//!
//! For each treatment, ranks the top N intersections and counts how many
//! fall inside police and fire station buffers. Layers that fail to load
//! are left out of the table.

use resilience_map_analytics::{NullPolicy, ProximityScorer, top_n};
use resilience_map_network_models::{FacilityKind, IntersectionTable, Treatment};
use resilience_map_store::DataCache;
use resilience_map_store::progress::ProgressCallback;

/// Proximity counts for one treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub treatment: Treatment,
    /// Intersections actually ranked (at most N).
    pub ranked: usize,
    /// Near count per available facility layer, in column order.
    pub near: Vec<usize>,
}

/// The full report: one column per available layer, one row per treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub layers: Vec<FacilityKind>,
    pub top: usize,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Scores every treatment against the given scorers.
    #[must_use]
    pub fn build(
        table: &IntersectionTable,
        scorers: &[ProximityScorer],
        top: usize,
        progress: &dyn ProgressCallback,
    ) -> Self {
        let mut rows = Vec::new();

        for treatment in Treatment::all() {
            progress.set_message(format!("Scoring {}", treatment.column_name()));
            let ranked = top_n(table, treatment, top, NullPolicy::Exclude);
            rows.push(ReportRow {
                treatment,
                ranked: ranked.len(),
                near: scorers.iter().map(|s| s.count(&ranked)).collect(),
            });
            progress.inc(1);
        }

        progress.finish(format!("Scored {} treatments", rows.len()));

        Self {
            layers: scorers.iter().map(ProximityScorer::kind).collect(),
            top,
            rows,
        }
    }

    /// Tab-separated table with a header row.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut out = String::from("treatment\tranked");
        for kind in &self.layers {
            out.push('\t');
            out.push_str(kind.as_ref());
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&format!("{}\t{}", row.treatment, row.ranked));
            for near in &row.near {
                out.push_str(&format!("\t{near}"));
            }
            out.push('\n');
        }
        out
    }
}

/// Loads the datasets and builds the report.
///
/// # Errors
///
/// Returns an error if the intersection graph cannot be loaded.
pub fn run(
    cache: &DataCache,
    radius_m: f64,
    top: usize,
    progress: &dyn ProgressCallback,
) -> Result<Report, Box<dyn std::error::Error>> {
    let table = cache.graph()?;

    let scorers: Vec<ProximityScorer> = FacilityKind::all()
        .iter()
        .filter_map(|kind| cache.facilities(*kind))
        .map(|facilities| ProximityScorer::new(facilities, radius_m))
        .collect();

    if scorers.is_empty() {
        log::warn!("No facility layers available; report has no proximity columns");
    }

    progress.set_total(Treatment::all().count() as u64);
    Ok(Report::build(table, &scorers, top, progress))
}
