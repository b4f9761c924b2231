//! Spherical Web Mercator (EPSG:3857) projection.
//!
//! Geographic coordinates (EPSG:4326, degrees) are projected onto a planar
//! system whose units are meters at the equator. Buffers for the proximity
//! metric are built in this space.

use std::f64::consts::FRAC_PI_2;

use geo::Point;

/// Sphere radius used by EPSG:3857, in meters.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitudes beyond this limit are clamped before projecting.
pub const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// Projects a longitude/latitude point into Web Mercator meters.
#[must_use]
pub fn to_web_mercator(lon_lat: Point<f64>) -> Point<f64> {
    let lat = lon_lat.y().clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG).to_radians();
    let x = WEB_MERCATOR_RADIUS_M * lon_lat.x().to_radians();
    let y = WEB_MERCATOR_RADIUS_M * (0.5 * (FRAC_PI_2 + lat)).tan().ln();
    Point::new(x, y)
}

/// Converts Web Mercator meters back to longitude/latitude.
#[must_use]
pub fn from_web_mercator(xy: Point<f64>) -> Point<f64> {
    let lon = (xy.x() / WEB_MERCATOR_RADIUS_M).to_degrees();
    let lat = 2.0f64.mul_add((xy.y() / WEB_MERCATOR_RADIUS_M).exp().atan(), -FRAC_PI_2);
    Point::new(lon, lat.to_degrees())
}
