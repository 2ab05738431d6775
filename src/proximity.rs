//! Hazard proximity along a route.
//!
//! Long paths are downsampled before measuring: with `n` points and a sample
//! cap `k`, every `max(1, n / k)`-th point is kept plus the final point. Each
//! hazard's distance is the exact minimum over those samples, so the only
//! error is sampling error: a reported distance can exceed the true distance
//! to the nearest path vertex by at most half of the longest along-path gap
//! between two consecutive samples. Distances are never understated.
//!
//! No early exit is taken: every sample is measured even once a hazard is
//! known to be inside the radius, so the reported distance does not depend
//! on the order in which samples are visited.

use std::collections::HashMap;

use crate::haversine::{self, EARTH_RADIUS_M};
use crate::models::{Coordinate, HazardPoint, ScoredHazard};

pub const DEFAULT_RADIUS_M: f64 = 500.0;
pub const DEFAULT_MAX_SAMPLES: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct ProximityOptions {
    /// Hazards farther than this from every sample are dropped.
    pub radius_m: f64,
    /// Upper bound (approximately) on the number of path samples checked.
    pub max_samples: usize,
}

impl Default for ProximityOptions {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Finds every hazard within `options.radius_m` of `path`.
///
/// The result holds one entry per hazard id (the closest, if an id repeats)
/// sorted ascending by distance, ties broken by id.
pub fn find_nearby(
    path: &[Coordinate],
    hazards: &[HazardPoint],
    options: ProximityOptions,
) -> Vec<ScoredHazard> {
    if path.is_empty() || hazards.is_empty() {
        return Vec::new();
    }

    let samples = sample_path(path, options.max_samples);
    let (min_lat, max_lat) = latitude_bounds(&samples);
    // Meridian arc is a lower bound on great-circle distance.
    let margin_deg = (options.radius_m / EARTH_RADIUS_M).to_degrees();

    let mut nearest: HashMap<&str, ScoredHazard> = HashMap::new();
    for hazard in hazards {
        if hazard.latitude < min_lat - margin_deg || hazard.latitude > max_lat + margin_deg {
            continue;
        }

        let position = hazard.position();
        let distance = samples
            .iter()
            .map(|sample| haversine::distance_meters(*sample, position))
            .fold(f64::INFINITY, f64::min);

        if distance > options.radius_m {
            continue;
        }

        match nearest.get(hazard.id.as_str()) {
            Some(existing) if existing.distance_meters <= distance => {}
            _ => {
                nearest.insert(
                    hazard.id.as_str(),
                    ScoredHazard {
                        hazard: hazard.clone(),
                        distance_meters: distance,
                    },
                );
            }
        }
    }

    let mut result: Vec<ScoredHazard> = nearest.into_values().collect();
    result.sort_by(|a, b| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then_with(|| a.hazard.id.cmp(&b.hazard.id))
    });
    result
}

/// Every `stride`-th point, always ending with the last point.
fn sample_path(path: &[Coordinate], max_samples: usize) -> Vec<Coordinate> {
    let stride = (path.len() / max_samples.max(1)).max(1);
    let mut samples: Vec<Coordinate> = path.iter().step_by(stride).copied().collect();
    if (path.len() - 1) % stride != 0 {
        samples.push(path[path.len() - 1]);
    }
    samples
}

fn latitude_bounds(points: &[Coordinate]) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.latitude), hi.max(p.latitude))
    })
}
