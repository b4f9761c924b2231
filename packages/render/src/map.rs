//! Leaflet map documents.
//!
//! A [`MapDocument`] is a list of named layers plus an initial view. Layers
//! are serialized to JSON and drawn by a small inline script; every string
//! shown in a popup or tooltip is HTML-escaped before serialization.

use resilience_map_network_models::{
    FacilitySet, RankedIntersection, ScoredIntersection, Treatment,
};
use serde::Serialize;

use crate::RenderError;
use crate::colormap::Colormap;
use crate::escape::{escape_html, escape_script_json};

/// Zoom level of the ranked-intersection view.
pub const RANKED_ZOOM: u8 = 11;

/// Marker radius (pixels) of ranked intersections.
pub const RANKED_MARKER_RADIUS: f64 = 10.0;

/// Marker radius (pixels) of the centrality overview.
pub const CENTRALITY_MARKER_RADIUS: f64 = 3.0;

/// Fill opacity of facility buffer rings.
pub const BUFFER_FILL_OPACITY: f64 = 0.1;

/// Fallback center when a map has no features (central Jakarta).
const JAKARTA_CENTER: (f64, f64) = (-6.2088, 106.8456);

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Initial map viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MapView {
    /// Fixed center and zoom.
    Center {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lon: f64,
        /// Zoom level.
        zoom: u8,
    },
    /// Fit every drawn feature.
    FitBounds,
}

/// A pixel-radius circle marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMarker {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Radius in pixels.
    pub radius: f64,
    /// Stroke and fill color.
    pub color: String,
    /// Popup HTML (already escaped).
    pub popup: Option<String>,
    /// Tooltip HTML (already escaped).
    pub tooltip: Option<String>,
}

/// A meter-radius circle, used for buffer rings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferRing {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Radius in meters.
    pub radius_m: f64,
    /// Stroke color.
    pub color: String,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Tooltip HTML (already escaped).
    pub tooltip: String,
}

/// A text label pinned at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Label text (already escaped).
    pub text: String,
}

/// A toggleable group of features.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Name shown in the layer control.
    pub name: String,
    /// Circle markers.
    pub markers: Vec<CircleMarker>,
    /// Buffer rings.
    pub rings: Vec<BufferRing>,
    /// Text labels.
    pub labels: Vec<TextLabel>,
}

impl MapLayer {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            rings: Vec::new(),
            labels: Vec::new(),
        }
    }
}

/// Continuous legend drawn in the map corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Legend caption (already escaped).
    pub caption: String,
    /// CSS gradient of the colormap.
    pub gradient: String,
    /// Value at the left end.
    pub min: String,
    /// Value at the right end.
    pub max: String,
}

/// A complete interactive map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    /// Initial viewport.
    pub view: MapView,
    /// Layers in drawing order.
    pub layers: Vec<MapLayer>,
    /// Optional color legend.
    pub legend: Option<Legend>,
}

impl MapDocument {
    /// Adds a facility layer: a point marker and a `radius_m` buffer ring
    /// per facility, styled by the facility kind.
    pub fn add_facility_overlay(&mut self, facilities: &FacilitySet, radius_m: f64) {
        let kind = facilities.kind;
        let mut layer = MapLayer::named(kind.label());
        for facility in &facilities.facilities {
            let name = escape_html(&facility.name);
            layer.rings.push(BufferRing {
                lat: facility.y,
                lon: facility.x,
                radius_m,
                color: kind.color().to_string(),
                fill_opacity: BUFFER_FILL_OPACITY,
                tooltip: name.clone(),
            });
            layer.markers.push(CircleMarker {
                lat: facility.y,
                lon: facility.x,
                radius: 2.0,
                color: kind.color().to_string(),
                popup: None,
                tooltip: Some(name),
            });
        }
        self.layers.push(layer);
    }

    /// Whether the map shows a layer toggle control.
    #[must_use]
    pub fn has_layer_control(&self) -> bool {
        self.layers.len() > 1
    }

    /// Renders a standalone HTML page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the layer data cannot be serialized.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let data = escape_script_json(&serde_json::to_string(self)?);
        log::debug!(
            "Rendering map with {} layers ({} bytes of layer data)",
            self.layers.len(),
            data.len()
        );
        let control = if self.has_layer_control() {
            "true"
        } else {
            "false"
        };
        Ok(MAP_TEMPLATE
            .replace("{{LEAFLET_CSS}}", LEAFLET_CSS)
            .replace("{{LEAFLET_JS}}", LEAFLET_JS)
            .replace("{{LAYER_CONTROL}}", control)
            .replace(
                "{{FALLBACK_CENTER}}",
                &format!("[{}, {}]", JAKARTA_CENTER.0, JAKARTA_CENTER.1),
            )
            .replace("{{DATA}}", &data))
    }
}

/// Map of the top-ranked intersections under a treatment.
///
/// Markers are colored by rank, carry the rank as popup and rank plus
/// score as tooltip, and have their rank printed next to them. The view is
/// centered on the mean position of the ranked intersections.
#[must_use]
pub fn ranked_map(ranked: &[RankedIntersection], treatment: Treatment) -> MapDocument {
    let column = treatment.column_name();
    let max_rank = ranked.iter().map(|r| r.rank).max().unwrap_or(1);
    let mut layer = MapLayer::named(format!("top {} ({column})", ranked.len()));

    for r in ranked {
        #[allow(clippy::cast_precision_loss)]
        let color = Colormap::Winter.sample_range(r.rank as f64, 1.0, max_rank as f64);
        let score = r.score.map_or_else(|| "n/a".to_string(), format_score);
        layer.markers.push(CircleMarker {
            lat: r.y,
            lon: r.x,
            radius: RANKED_MARKER_RADIUS,
            color,
            popup: Some(r.rank.to_string()),
            tooltip: Some(format!("rank: {}<br>{column}: {score}", r.rank)),
        });
        layer.labels.push(TextLabel {
            lat: r.y,
            lon: r.x,
            text: r.rank.to_string(),
        });
    }

    let view = mean_center(ranked.iter().map(|r| (r.y, r.x))).map_or(
        MapView::FitBounds,
        |(lat, lon)| MapView::Center {
            lat,
            lon,
            zoom: RANKED_ZOOM,
        },
    );

    MapDocument {
        view,
        layers: vec![layer],
        legend: Some(Legend {
            caption: "rank".to_string(),
            gradient: Colormap::Winter.css_gradient(),
            min: "1".to_string(),
            max: max_rank.to_string(),
        }),
    }
}

/// Map of every defined centrality score under a treatment, colored by
/// score.
#[must_use]
pub fn centrality_map(scored: &[ScoredIntersection], treatment: Treatment) -> MapDocument {
    let column = treatment.column_name();
    let (min, max) = scored.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, s| {
        (acc.0.min(s.score), acc.1.max(s.score))
    });
    let mut layer = MapLayer::named(column.clone());

    for s in scored {
        layer.markers.push(CircleMarker {
            lat: s.y,
            lon: s.x,
            radius: CENTRALITY_MARKER_RADIUS,
            color: Colormap::Plasma.sample_range(s.score, min, max),
            popup: Some(format!("{column}: {}", format_score(s.score))),
            tooltip: Some(format!("node {}", s.node)),
        });
    }

    let legend = (!scored.is_empty()).then(|| Legend {
        caption: column.clone(),
        gradient: Colormap::Plasma.css_gradient(),
        min: format_score(min),
        max: format_score(max),
    });

    MapDocument {
        view: MapView::FitBounds,
        layers: vec![layer],
        legend,
    }
}

fn format_score(score: f64) -> String {
    format!("{score:.6}")
}

#[allow(clippy::cast_precision_loss)]
fn mean_center(points: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let (count, lat_sum, lon_sum) = points.fold((0_usize, 0.0, 0.0), |acc, (lat, lon)| {
        (acc.0 + 1, acc.1 + lat, acc.2 + lon)
    });
    (count > 0).then(|| (lat_sum / count as f64, lon_sum / count as f64))
}

const MAP_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<link rel="stylesheet" href="{{LEAFLET_CSS}}">
<script src="{{LEAFLET_JS}}"></script>
<style>
html,body,#map{height:100%;margin:0}
.rank-label{font-size:10px;color:black;background:none;border:none}
.legend{background:rgba(255,255,255,.85);padding:6px 8px;font:11px sans-serif;border-radius:4px}
.legend .bar{width:160px;height:10px;margin:4px 0}
.legend .ends{display:flex;justify-content:space-between}
</style>
</head>
<body>
<div id="map"></div>
<script>
const doc = {{DATA}};
const map = L.map('map');
const base = L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
const overlays = {};
const bounds = [];
for (const layer of doc.layers) {
  const group = L.featureGroup();
  for (const r of layer.rings) {
    L.circle([r.lat, r.lon], {radius: r.radiusM, color: r.color, weight: 1, fill: true, fillOpacity: r.fillOpacity})
      .bindTooltip(r.tooltip).addTo(group);
  }
  for (const m of layer.markers) {
    const marker = L.circleMarker([m.lat, m.lon], {radius: m.radius, color: m.color, fillColor: m.color, fillOpacity: 0.8, weight: 1});
    if (m.popup) marker.bindPopup(m.popup);
    if (m.tooltip) marker.bindTooltip(m.tooltip);
    marker.addTo(group);
    bounds.push([m.lat, m.lon]);
  }
  for (const l of layer.labels) {
    L.marker([l.lat, l.lon], {icon: L.divIcon({className: 'rank-label', html: l.text})}).addTo(group);
  }
  group.addTo(map);
  overlays[layer.name] = group;
}
if (doc.view.type === 'center') {
  map.setView([doc.view.lat, doc.view.lon], doc.view.zoom);
} else if (bounds.length > 0) {
  map.fitBounds(bounds, {padding: [20, 20]});
} else {
  map.setView({{FALLBACK_CENTER}}, 11);
}
if ({{LAYER_CONTROL}}) {
  L.control.layers({'OpenStreetMap': base}, overlays, {collapsed: false}).addTo(map);
}
if (doc.legend) {
  const legend = L.control({position: 'bottomright'});
  legend.onAdd = function () {
    const div = L.DomUtil.create('div', 'legend');
    div.innerHTML = '<div>' + doc.legend.caption + '</div>'
      + '<div class="bar" style="background:' + doc.legend.gradient + '"></div>'
      + '<div class="ends"><span>' + doc.legend.min + '</span><span>' + doc.legend.max + '</span></div>';
    return div;
  };
  legend.addTo(map);
}
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use resilience_map_network_models::{Facility, FacilityKind};

    use super::*;

    fn ranked(scores: &[(f64, f64, f64)]) -> Vec<RankedIntersection> {
        scores
            .iter()
            .enumerate()
            .map(|(idx, (x, y, score))| RankedIntersection {
                rank: idx + 1,
                node: i64::try_from(idx).unwrap() + 100,
                x: *x,
                y: *y,
                score: Some(*score),
            })
            .collect()
    }

    #[test]
    fn ranked_map_centers_on_mean() {
        let t = Treatment::new(5).unwrap();
        let doc = ranked_map(&ranked(&[(106.0, -6.0, 10.0), (107.0, -7.0, 9.0)]), t);
        assert_eq!(
            doc.view,
            MapView::Center {
                lat: -6.5,
                lon: 106.5,
                zoom: RANKED_ZOOM
            }
        );
        let layer = &doc.layers[0];
        assert_eq!(layer.markers.len(), 2);
        assert_eq!(layer.labels[1].text, "2");
        assert_eq!(layer.markers[0].popup.as_deref(), Some("1"));
        assert_eq!(
            layer.markers[0].tooltip.as_deref(),
            Some("rank: 1<br>t_5: 10.000000")
        );
        assert_eq!(layer.markers[0].color, Colormap::Winter.sample(0.0));
        assert_eq!(layer.markers[1].color, Colormap::Winter.sample(1.0));
        assert!(!doc.has_layer_control());
    }

    #[test]
    fn empty_ranking_fits_bounds() {
        let doc = ranked_map(&[], Treatment::default());
        assert_eq!(doc.view, MapView::FitBounds);
        assert!(doc.to_html().is_ok());
    }

    #[test]
    fn overlays_enable_layer_control() {
        let t = Treatment::new(1).unwrap();
        let mut doc = ranked_map(&ranked(&[(106.8, -6.2, 1.0)]), t);
        doc.add_facility_overlay(
            &FacilitySet::new(
                FacilityKind::Fire,
                vec![Facility {
                    name: "Pos <Damkar>".to_string(),
                    x: 106.81,
                    y: -6.21,
                }],
            ),
            500.0,
        );
        assert!(doc.has_layer_control());

        let overlay = &doc.layers[1];
        assert_eq!(overlay.name, "fire station");
        assert_eq!(overlay.rings[0].color, "red");
        assert!((overlay.rings[0].radius_m - 500.0).abs() < f64::EPSILON);
        assert_eq!(overlay.rings[0].tooltip, "Pos &lt;Damkar&gt;");

        let html = doc.to_html().unwrap();
        assert!(html.contains("if (true)"));
        assert!(!html.contains("<Damkar>"));
    }

    #[test]
    fn centrality_map_colors_by_score() {
        let t = Treatment::new(0).unwrap();
        let scored = vec![
            ScoredIntersection {
                node: 1,
                x: 106.8,
                y: -6.2,
                score: 0.0,
            },
            ScoredIntersection {
                node: 2,
                x: 106.9,
                y: -6.3,
                score: 0.4,
            },
        ];
        let doc = centrality_map(&scored, t);
        assert_eq!(doc.view, MapView::FitBounds);
        let markers = &doc.layers[0].markers;
        assert_eq!(markers[0].color, Colormap::Plasma.sample(0.0));
        assert_eq!(markers[1].color, Colormap::Plasma.sample(1.0));
        assert!((markers[0].radius - CENTRALITY_MARKER_RADIUS).abs() < f64::EPSILON);
        let legend = doc.legend.unwrap();
        assert_eq!(legend.max, "0.400000");
    }
}
