//! Detour waypoints that steer a re-requested route away from hazards.
//!
//! Geometry is done directly in degree space: the local route direction is
//! rotated 90 degrees and the waypoint is pushed off the segment midpoint on
//! the side opposite the hazard. Offsets convert meters to degrees with a flat
//! 111 km per degree.

use crate::haversine;
use crate::models::{Coordinate, ScoredHazard};

pub const DEFAULT_OFFSET_M: f64 = 1500.0;
pub const METERS_PER_DEGREE: f64 = 111_000.0;
/// Used when the segment is degenerate and the hazard sits on its midpoint.
pub const DEGENERATE_NUDGE_DEG: f64 = 0.005;
/// Most directions providers reject requests beyond a handful of vias.
pub const DEFAULT_MAX_WAYPOINTS: usize = 5;

/// A 2D vector in (latitude, longitude) degrees.
#[derive(Debug, Clone, Copy)]
struct Vector {
    lat: f64,
    lng: f64,
}

impl Vector {
    fn between(from: Coordinate, to: Coordinate) -> Self {
        Self {
            lat: to.latitude - from.latitude,
            lng: to.longitude - from.longitude,
        }
    }

    fn length(self) -> f64 {
        self.lat.hypot(self.lng)
    }

    fn dot(self, other: Self) -> f64 {
        self.lat * other.lat + self.lng * other.lng
    }

    fn perpendicular(self) -> Self {
        Self {
            lat: -self.lng,
            lng: self.lat,
        }
    }

    fn normalized(self) -> Option<Self> {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Self {
            lat: self.lat / length,
            lng: self.lng / length,
        })
    }
}

fn offset(origin: Coordinate, direction: Vector, degrees: f64) -> Coordinate {
    Coordinate::new(
        origin.latitude + direction.lat * degrees,
        origin.longitude + direction.lng * degrees,
    )
}

/// Waypoint for the segment `before -> after`, placed `offset_m` off its
/// midpoint on the side away from `hazard`.
///
/// A hazard lying exactly on the segment's line gets its waypoint on the
/// right-hand side of travel. A zero-length segment pushes straight away from
/// the hazard instead.
pub fn waypoint_for(
    before: Coordinate,
    after: Coordinate,
    hazard: Coordinate,
    offset_m: f64,
) -> Coordinate {
    let mid = before.midpoint(after);
    let offset_deg = offset_m / METERS_PER_DEGREE;

    if let Some(perp) = Vector::between(before, after).perpendicular().normalized() {
        let side = perp.dot(Vector::between(mid, hazard));
        let away = if side > 0.0 { -1.0 } else { 1.0 };
        return offset(mid, perp, away * offset_deg);
    }

    match Vector::between(hazard, mid).normalized() {
        Some(away) => offset(mid, away, offset_deg),
        None => Coordinate::new(mid.latitude + DEGENERATE_NUDGE_DEG, mid.longitude),
    }
}

/// One waypoint per hazard, in hazard order.
///
/// Each hazard is anchored to its nearest path point by a full-precision
/// linear scan; the neighbours of that point (clamped to the path ends) give
/// the local direction. Callers cap how many are forwarded to a provider.
pub fn waypoints_for(
    path: &[Coordinate],
    hazards: &[ScoredHazard],
    offset_m: f64,
) -> Vec<Coordinate> {
    if path.is_empty() {
        return Vec::new();
    }

    hazards
        .iter()
        .map(|scored| {
            let position = scored.hazard.position();
            let index = nearest_index(path, position);
            let before = path[index.saturating_sub(1)];
            let after = path[(index + 1).min(path.len() - 1)];
            waypoint_for(before, after, position, offset_m)
        })
        .collect()
}

fn nearest_index(path: &[Coordinate], target: Coordinate) -> usize {
    path.iter()
        .enumerate()
        .map(|(i, point)| (i, haversine::distance_meters(*point, target)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
