#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index of facility buffers.
//!
//! Facility locations are projected into Web Mercator, buffered by a fixed
//! radius in meters with [`geo::Buffer`], and stored in an R-tree. Point lookups first select
//! buffers whose envelope covers the point, then run an exact
//! point-in-polygon test.

pub mod projection;

use geo::{BoundingRect, Buffer, Contains, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

pub use projection::{from_web_mercator, to_web_mercator};

/// A buffered facility stored in the R-tree.
struct BufferEntry {
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BufferEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Union of fixed-radius buffers around a set of locations.
pub struct BufferIndex {
    buffers: RTree<BufferEntry>,
    radius_m: f64,
}

impl BufferIndex {
    /// Buffers every longitude/latitude location by `radius_m` meters in
    /// Web Mercator space.
    ///
    /// A negative or non-finite radius yields an empty index.
    #[must_use]
    pub fn build(locations: impl IntoIterator<Item = Point<f64>>, radius_m: f64) -> Self {
        let entries: Vec<BufferEntry> = if radius_m.is_finite() && radius_m >= 0.0 {
            locations
                .into_iter()
                .filter_map(|lon_lat| {
                    let polygon = to_web_mercator(lon_lat).buffer(radius_m);
                    let envelope = compute_envelope(&polygon)?;
                    Some(BufferEntry { envelope, polygon })
                })
                .collect()
        } else {
            log::warn!("Ignoring invalid buffer radius {radius_m}");
            Vec::new()
        };

        log::debug!(
            "Built buffer index with {} entries at {radius_m} m",
            entries.len()
        );

        Self {
            buffers: RTree::bulk_load(entries),
            radius_m,
        }
    }

    /// Number of buffers in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.size()
    }

    /// Whether the index holds no buffers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.size() == 0
    }

    /// Buffer radius in meters.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Whether a longitude/latitude point lies inside any buffer.
    #[must_use]
    pub fn contains(&self, lon_lat: Point<f64>) -> bool {
        let point = to_web_mercator(lon_lat);
        let query_env = AABB::from_point([point.x(), point.y()]);

        self.buffers
            .locate_in_envelope_intersecting(&query_env)
            .any(|entry| entry.polygon.contains(&point))
    }
}

/// Bounding box envelope of a buffer, or `None` when the buffer is empty.
fn compute_envelope(polygon: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    polygon
        .bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
mod tests {
    use geo::Area;

    use super::*;

    /// Longitude/latitude of a point `meters` east of the origin in Web
    /// Mercator space.
    fn east_of_origin(meters: f64) -> Point<f64> {
        from_web_mercator(Point::new(meters, 0.0))
    }

    #[test]
    fn point_at_400m_is_near_and_600m_is_not() {
        let index = BufferIndex::build([Point::new(0.0, 0.0)], 500.0);
        assert_eq!(index.len(), 1);
        assert!(index.contains(east_of_origin(400.0)));
        assert!(!index.contains(east_of_origin(600.0)));
    }

    #[test]
    fn empty_index_contains_nothing() {
        let index = BufferIndex::build(std::iter::empty(), 500.0);
        assert!(index.is_empty());
        assert!(!index.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn any_buffer_counts() {
        let jakarta = Point::new(106.8456, -6.2088);
        let far = Point::new(106.95, -6.1);
        let index = BufferIndex::build([far, jakarta], 500.0);
        assert!(index.contains(jakarta));
        assert!(index.contains(far));
        assert!(!index.contains(Point::new(106.9, -6.15)));
    }

    #[test]
    fn negative_or_non_finite_radius_builds_empty_index() {
        for radius in [-5.0, f64::NAN, f64::INFINITY] {
            let index = BufferIndex::build([Point::new(0.0, 0.0)], radius);
            assert!(index.is_empty(), "radius {radius}");
            assert!(!index.contains(Point::new(0.0, 0.0)));
        }
    }

    #[test]
    fn buffer_area_approaches_circle() {
        let buffer = Point::new(10.0, 20.0).buffer(100.0);
        let circle = std::f64::consts::PI * 100.0 * 100.0;
        let ratio = buffer.unsigned_area() / circle;
        assert!(ratio > 0.95 && ratio < 1.05, "ratio {ratio}");
    }

    #[test]
    fn zero_radius_flags_nothing() {
        let index = BufferIndex::build([Point::new(0.0, 0.0)], 0.0);
        assert!(!index.contains(east_of_origin(1.0)));
    }
}
