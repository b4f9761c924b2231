//! Load-once cache of the dashboard datasets.
//!
//! Every dataset is read lazily on first access and then kept for the
//! lifetime of the cache. Nothing is ever invalidated or reloaded, so the
//! accessors hand out plain shared references. The first graph load is
//! serialized so concurrent cold requests parse the file once; no lock is
//! taken once a value is set.

use std::sync::{Mutex, OnceLock};

use resilience_map_network_models::{FacilityKind, FacilitySet, IntersectionTable};

use crate::progress::ProgressCallback;
use crate::{DataPaths, LoadError, loader};

/// Session-wide cache of the intersection graph and facility layers.
pub struct DataCache {
    paths: DataPaths,
    graph: OnceLock<IntersectionTable>,
    graph_load: Mutex<()>,
    police: OnceLock<Option<FacilitySet>>,
    fire: OnceLock<Option<FacilitySet>>,
}

impl DataCache {
    /// Creates an empty cache that reads from `paths` on demand.
    #[must_use]
    pub const fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            graph: OnceLock::new(),
            graph_load: Mutex::new(()),
            police: OnceLock::new(),
            fire: OnceLock::new(),
        }
    }

    /// Creates a cache whose datasets are already resident.
    ///
    /// A `None` facility layer behaves like a missing optional file.
    #[must_use]
    pub fn with_tables(
        paths: DataPaths,
        graph: IntersectionTable,
        police: Option<FacilitySet>,
        fire: Option<FacilitySet>,
    ) -> Self {
        let cache = Self::new(paths);
        let _ = cache.graph.set(graph);
        let _ = cache.police.set(police);
        let _ = cache.fire.set(fire);
        cache
    }

    /// Paths this cache reads from.
    #[must_use]
    pub const fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Loads every dataset now instead of on first access.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the intersection graph cannot be loaded.
    /// Facility layers never fail this call.
    pub fn preload(&self, progress: &dyn ProgressCallback) -> Result<(), LoadError> {
        progress.set_total(3);

        progress.set_message("Loading intersection graph".to_string());
        self.graph()?;
        progress.inc(1);

        for kind in FacilityKind::all() {
            progress.set_message(format!("Loading {} locations", kind.label()));
            self.facilities(*kind);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// The intersection graph, loading it on first access.
    ///
    /// Concurrent first calls wait for a single load. A failed load is not
    /// cached, so a later call retries.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the graph file is missing or malformed.
    pub fn graph(&self) -> Result<&IntersectionTable, LoadError> {
        if let Some(table) = self.graph.get() {
            return Ok(table);
        }

        // A poisoned guard only means another loader panicked; the slot is
        // still empty or fully set.
        let _guard = self
            .graph_load
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(table) = self.graph.get() {
            return Ok(table);
        }

        let table = loader::load_intersections(&self.paths.graph)?;
        Ok(self.graph.get_or_init(|| table))
    }

    /// A facility layer, loading it on first access.
    ///
    /// Facility layers are optional: any load failure is logged and cached
    /// as `None`, and callers simply omit the overlay.
    pub fn facilities(&self, kind: FacilityKind) -> Option<&FacilitySet> {
        let (slot, path) = match kind {
            FacilityKind::Police => (&self.police, &self.paths.police),
            FacilityKind::Fire => (&self.fire, &self.paths.fire),
        };
        slot.get_or_init(|| match loader::load_facilities(path, kind) {
            Ok(set) => Some(set),
            Err(e) => {
                log::warn!("{} layer unavailable: {e}", kind.label());
                None
            }
        })
        .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use resilience_map_network_models::{Facility, Intersection};

    use super::*;
    use crate::progress::NullProgress;

    fn missing_paths() -> DataPaths {
        DataPaths {
            graph: PathBuf::from("no/such/graph.geojson"),
            police: PathBuf::from("no/such/police.geojson"),
            fire: PathBuf::from("no/such/fire.geojson"),
        }
    }

    #[test]
    fn missing_graph_is_fatal() {
        let cache = DataCache::new(missing_paths());
        assert!(matches!(cache.graph(), Err(LoadError::Io { .. })));
        assert!(cache.preload(&NullProgress).is_err());
    }

    #[test]
    fn missing_facilities_are_optional() {
        let cache = DataCache::new(missing_paths());
        assert!(cache.facilities(FacilityKind::Police).is_none());
        assert!(cache.facilities(FacilityKind::Fire).is_none());
    }

    #[test]
    fn resident_tables_are_served_without_reading() {
        let graph = IntersectionTable::new(vec![Intersection::new(7, 106.8, -6.2)]);
        let police = FacilitySet::new(
            FacilityKind::Police,
            vec![Facility {
                name: "Polda Metro Jaya".to_string(),
                x: 106.81,
                y: -6.22,
            }],
        );
        let cache = DataCache::with_tables(missing_paths(), graph, Some(police), None);

        assert_eq!(cache.graph().unwrap().len(), 1);
        assert_eq!(
            cache.facilities(FacilityKind::Police).unwrap().facilities.len(),
            1
        );
        assert!(cache.facilities(FacilityKind::Fire).is_none());
        assert!(cache.preload(&NullProgress).is_ok());
    }

    #[test]
    fn concurrent_cold_loads_share_one_table() {
        let dir = std::env::temp_dir().join(format!("resilience_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let graph_path = dir.join("graph.geojson");
        std::fs::write(
            &graph_path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[106.8,-6.2]},
                 "properties":{"node":1,"t_0":0.5}}
            ]}"#,
        )
        .unwrap();

        let cache = DataCache::new(DataPaths {
            graph: graph_path,
            ..missing_paths()
        });

        let tables: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| std::ptr::from_ref(cache.graph().unwrap()) as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(tables.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.graph().unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn repeated_access_returns_same_table() {
        let graph = IntersectionTable::new(vec![Intersection::new(1, 0.0, 0.0)]);
        let cache = DataCache::with_tables(missing_paths(), graph, None, None);
        let first = cache.graph().unwrap();
        let second = cache.graph().unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
