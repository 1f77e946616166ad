//! Geometric primitives for hazard proximity checks.
//!
//! Point distances use the haversine great-circle formula. Point-to-segment
//! distances use a local planar (ENU) projection, which is accurate enough for
//! the intra-metro segment lengths routing providers return.

use crate::error::{EngineError, Result};
use crate::models::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Reject NaN, infinite or out-of-range coordinates.
pub fn validate_point(point: &GeoPoint) -> Result<()> {
    let lat_ok = point.lat.is_finite() && (-90.0..=90.0).contains(&point.lat);
    let lon_ok = point.lon.is_finite() && (-180.0..=180.0).contains(&point.lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(EngineError::InvalidCoordinate {
            lat: point.lat,
            lon: point.lon,
        })
    }
}

/// Validate every vertex of a polyline and require at least one segment.
pub fn validate_polyline(line: &[GeoPoint]) -> Result<()> {
    if line.len() < 2 {
        return Err(EngineError::DegenerateRoute { points: line.len() });
    }
    line.iter().try_for_each(validate_point)
}

/// Great-circle distance between two points in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> Result<f64> {
    validate_point(&a)?;
    validate_point(&b)?;
    Ok(haversine_km(a, b))
}

pub(crate) fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// True when `point` lies inside (or on) the circle.
pub fn point_in_circle(point: GeoPoint, center: GeoPoint, radius_km: f64) -> Result<bool> {
    Ok(distance_km(point, center)? <= radius_km)
}

/// Minimum distance in kilometres from `point` to any segment of `line`.
pub fn min_distance_to_polyline_km(point: GeoPoint, line: &[GeoPoint]) -> Result<f64> {
    validate_point(&point)?;
    validate_polyline(line)?;
    Ok(polyline_distance_km(point, line))
}

/// Unchecked variant for callers that already validated their inputs.
pub(crate) fn polyline_distance_km(point: GeoPoint, line: &[GeoPoint]) -> f64 {
    line.windows(2)
        .map(|segment| distance_to_segment_km(point, segment[0], segment[1]))
        .fold(f64::INFINITY, f64::min)
}

// ==== Local planar projection ====

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert an east/west offset in kilometres to degrees longitude at `ref_lat_deg`.
pub fn km_to_lon(km: f64, ref_lat_deg: f64) -> f64 {
    km * 1000.0 / meters_per_deg_lon(ref_lat_deg).max(1e-9)
}

/// Convert a north/south offset in kilometres to degrees latitude at `ref_lat_deg`.
pub fn km_to_lat(km: f64, ref_lat_deg: f64) -> f64 {
    km * 1000.0 / meters_per_deg_lat(ref_lat_deg).max(1e-9)
}

/// Distance in kilometres from `point` to the closest point on segment `start`-`end`.
///
/// The projection parameter is clamped to [0, 1], so points beyond either end
/// measure to that endpoint rather than to the infinite line.
pub fn distance_to_segment_km(point: GeoPoint, start: GeoPoint, end: GeoPoint) -> f64 {
    // Local ENU frame anchored at the segment start
    let ref_lat = start.lat;
    let m_lat = meters_per_deg_lat(ref_lat);
    let m_lon = meters_per_deg_lon(ref_lat);

    let px = (point.lon - start.lon) * m_lon;
    let py = (point.lat - start.lat) * m_lat;
    let sx = (end.lon - start.lon) * m_lon;
    let sy = (end.lat - start.lat) * m_lat;

    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < 0.0001 {
        // Segment is essentially a point
        return (px * px + py * py).sqrt() / 1000.0;
    }

    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);
    let dx = px - t * sx;
    let dy = py - t * sy;

    (dx * dx + dy * dy).sqrt() / 1000.0
}
