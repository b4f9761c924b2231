//! `GeoJSON` readers for the intersection graph and facility layers.
//!
//! Features that cannot be placed on the map (no usable geometry and no
//! `x`/`y` attributes) are skipped with a warning rather than failing the
//! whole file.

use std::path::Path;

use geo::Centroid;
use geojson::{Feature, GeoJson, JsonObject};
use resilience_map_network_models::{
    Facility, FacilityKind, FacilitySet, Intersection, IntersectionTable, Treatment,
};
use serde_json::Value;

use crate::LoadError;

/// Name given to stations without a `name` attribute.
pub const UNNAMED_FACILITY: &str = "Unnamed station";

/// Reads the intersection graph file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or is not a `GeoJSON`
/// `FeatureCollection`.
pub fn load_intersections(path: &Path) -> Result<IntersectionTable, LoadError> {
    let contents = read_file(path)?;
    let table = parse_intersections(&contents)?;
    log::info!(
        "Loaded {} intersections from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Parses intersection features from a `GeoJSON` document.
///
/// Each feature needs a `node` attribute and a location. Scores are read
/// from the `t_0`..`t_40` attributes; missing, `null`, or non-numeric
/// values are undefined.
///
/// # Errors
///
/// Returns [`LoadError`] if the document is not a `FeatureCollection`.
pub fn parse_intersections(contents: &str) -> Result<IntersectionTable, LoadError> {
    let features = read_features(contents)?;
    let mut intersections = Vec::with_capacity(features.len());
    let mut skipped = 0_usize;

    for (idx, feature) in features.into_iter().enumerate() {
        let Some((x, y)) = feature_location(&feature) else {
            log::warn!("Skipping intersection feature {idx}: no location");
            skipped += 1;
            continue;
        };
        let properties = feature.properties.as_ref();
        let Some(node) = property(properties, "node").and_then(value_as_node) else {
            log::warn!("Skipping intersection feature {idx}: missing node id");
            skipped += 1;
            continue;
        };

        let mut intersection = Intersection::new(node, x, y);
        for treatment in Treatment::all() {
            let score = property(properties, &treatment.column_name()).and_then(value_as_f64);
            intersection.set_score(treatment, score);
        }
        intersections.push(intersection);
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} intersection features without node id or location");
    }

    Ok(IntersectionTable::new(intersections))
}

/// Reads a facility file for the given layer.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or is not a `GeoJSON`
/// `FeatureCollection`.
pub fn load_facilities(path: &Path, kind: FacilityKind) -> Result<FacilitySet, LoadError> {
    let contents = read_file(path)?;
    let set = parse_facilities(&contents, kind)?;
    log::info!(
        "Loaded {} {} locations from {}",
        set.facilities.len(),
        kind.label(),
        path.display()
    );
    Ok(set)
}

/// Parses facility features from a `GeoJSON` document.
///
/// # Errors
///
/// Returns [`LoadError`] if the document is not a `FeatureCollection`.
pub fn parse_facilities(contents: &str, kind: FacilityKind) -> Result<FacilitySet, LoadError> {
    let features = read_features(contents)?;
    let mut facilities = Vec::with_capacity(features.len());

    for (idx, feature) in features.into_iter().enumerate() {
        let Some((x, y)) = feature_location(&feature) else {
            log::warn!("Skipping {} feature {idx}: no location", kind.label());
            continue;
        };
        let name = match property(feature.properties.as_ref(), "name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNNAMED_FACILITY.to_string(),
        };
        facilities.push(Facility { name, x, y });
    }

    Ok(FacilitySet::new(kind, facilities))
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_features(contents: &str) -> Result<Vec<Feature>, LoadError> {
    match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(LoadError::Conversion {
            message: "Expected a GeoJSON FeatureCollection".to_string(),
        }),
    }
}

/// Point geometry as-is, any other geometry by its centroid, falling back
/// to the `x`/`y` attributes.
fn feature_location(feature: &Feature) -> Option<(f64, f64)> {
    let from_geometry = feature.geometry.clone().and_then(|geometry| {
        let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
        match geometry {
            geo::Geometry::Point(point) => Some(point),
            other => other.centroid(),
        }
    });

    if let Some(point) = from_geometry {
        return Some((point.x(), point.y()));
    }

    let properties = feature.properties.as_ref();
    let x = property(properties, "x").and_then(value_as_f64)?;
    let y = property(properties, "y").and_then(value_as_f64)?;
    Some((x, y))
}

fn property<'a>(properties: Option<&'a JsonObject>, key: &str) -> Option<&'a Value> {
    properties?.get(key)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn value_as_node(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [106.82, -6.17] },
                "properties": { "node": 101, "x": 106.82, "y": -6.17, "t_0": 0.5, "t_5": null }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": { "node": "202", "x": 106.9, "y": -6.2, "t_0": "0.25" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [106.7, -6.3] },
                "properties": { "t_0": 0.1 }
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                },
                "properties": { "node": 303.0 }
            }
        ]
    }"#;

    #[test]
    fn parses_intersections_and_scores() {
        let table = parse_intersections(GRAPH).unwrap();
        assert_eq!(table.len(), 3);

        let rows: Vec<&Intersection> = table.iter().collect();
        let t0 = Treatment::new(0).unwrap();
        let t5 = Treatment::new(5).unwrap();

        assert_eq!(rows[0].node, 101);
        assert_eq!(rows[0].score(t0), Some(0.5));
        assert_eq!(rows[0].score(t5), None);

        assert_eq!(rows[1].node, 202);
        assert!((rows[1].x - 106.9).abs() < 1e-12);
        assert_eq!(rows[1].score(t0), Some(0.25));
    }

    #[test]
    fn polygon_geometry_uses_centroid() {
        let table = parse_intersections(GRAPH).unwrap();
        let polygon_row = table.iter().find(|i| i.node == 303).unwrap();
        assert!((polygon_row.x - 1.0).abs() < 1e-9);
        assert!((polygon_row.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parses_facilities_with_default_name() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [106.8, -6.2] },
                    "properties": { "name": " Polsek Menteng " }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [106.85, -6.21] },
                    "properties": {}
                }
            ]
        }"#;
        let set = parse_facilities(doc, FacilityKind::Police).unwrap();
        assert_eq!(set.kind, FacilityKind::Police);
        assert_eq!(set.facilities.len(), 2);
        assert_eq!(set.facilities[0].name, "Polsek Menteng");
        assert_eq!(set.facilities[1].name, UNNAMED_FACILITY);
    }

    #[test]
    fn rejects_bare_geometry() {
        let doc = r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#;
        assert!(matches!(
            parse_facilities(doc, FacilityKind::Fire),
            Err(LoadError::Conversion { .. })
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_intersections("not json"),
            Err(LoadError::GeoJson(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_intersections(Path::new("no/such/graph.geojson"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
