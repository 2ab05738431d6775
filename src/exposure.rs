//! Route hazard exposure score.

use crate::models::ScoredHazard;

/// Distance at which a hazard stops contributing.
pub const REFERENCE_RADIUS_M: f64 = 500.0;
/// Points contributed by a severity-10 hazard sitting on the route.
pub const MAX_HAZARD_POINTS: f64 = 30.0;
pub const MAX_SCORE: u8 = 100;

/// Folds proximity-annotated hazards into a score in `0..=100`.
///
/// Each hazard adds `(1 - d/500) * (severity/10) * 30`; contributions stack
/// and the total is clamped to 100 then rounded.
pub fn score(hazards: &[ScoredHazard]) -> u8 {
    let total: f64 = hazards.iter().map(contribution).sum();
    total.clamp(0.0, f64::from(MAX_SCORE)).round() as u8
}

fn contribution(scored: &ScoredHazard) -> f64 {
    let proximity = (1.0 - scored.distance_meters / REFERENCE_RADIUS_M).clamp(0.0, 1.0);
    let severity = (f64::from(scored.hazard.severity) / 10.0).clamp(0.0, 1.0);
    proximity * severity * MAX_HAZARD_POINTS
}
