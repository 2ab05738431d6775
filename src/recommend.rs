//! Route recommendation: reasoner output validation and the deterministic
//! fallback used whenever the reasoner is absent or fails.

use crate::models::{EnvironmentalSnapshot, Recommendation, RouteCandidate};
use crate::traits::{RecommendationContext, RecommendationReasoner};

const SENSITIVE_AQI: u32 = 100;
const UNHEALTHY_AQI: u32 = 150;
const HEAT_WARNING_C: f64 = 35.0;
const COLD_WARNING_C: f64 = -5.0;

/// Asks the reasoner when there is one, falling back on any failure.
///
/// Returns `None` only when there are no routes to choose from.
pub fn recommend(
    reasoner: Option<&dyn RecommendationReasoner>,
    context: &RecommendationContext<'_>,
) -> Option<Recommendation> {
    let first = context.routes.first()?;

    if let Some(reasoner) = reasoner {
        match reasoner.recommend(context) {
            Ok(recommendation) => return Some(validate(recommendation, context.routes, &first.id)),
            Err(err) => {
                tracing::warn!(error = %err, "recommendation reasoner failed, using deterministic policy");
            }
        }
    }

    fallback(context)
}

/// Keeps reasoner output inside the response contract.
fn validate(mut recommendation: Recommendation, routes: &[RouteCandidate], first_id: &str) -> Recommendation {
    if !routes.iter().any(|route| route.id == recommendation.recommended_route_id) {
        tracing::warn!(
            returned = %recommendation.recommended_route_id,
            substitute = %first_id,
            "reasoner recommended an unknown route"
        );
        recommendation.recommended_route_id = first_id.to_string();
    }
    recommendation.safety_score = recommendation.safety_score.min(100);
    recommendation.eco_score = recommendation.eco_score.min(100);
    recommendation
}

/// Deterministic choice, in order of preference:
/// 1. an eco hazard-avoiding route when eco is preferred,
/// 2. any hazard-avoiding route when hazards are present,
/// 3. an eco route when eco is preferred,
/// 4. the fastest plain route,
/// 5. the first route.
pub fn fallback(context: &RecommendationContext<'_>) -> Option<Recommendation> {
    let routes = context.routes;
    let hazards_present = !context.hazards.is_empty();

    let least_exposed = |filter: &dyn Fn(&RouteCandidate) -> bool| {
        routes
            .iter()
            .filter(|r| filter(r))
            .min_by_key(|r| r.hazard_exposure_score)
    };

    let (chosen, reasoning) = if let Some(route) = context
        .prefer_eco
        .then(|| least_exposed(&|r: &RouteCandidate| r.is_eco_variant && r.is_avoidance_variant))
        .flatten()
    {
        (
            route,
            format!(
                "{} keeps emissions low and steers around reported hazards.",
                route.name
            ),
        )
    } else if let Some(route) = hazards_present
        .then(|| least_exposed(&|r: &RouteCandidate| r.is_avoidance_variant))
        .flatten()
    {
        (
            route,
            format!(
                "{} detours around hazards reported near the other routes.",
                route.name
            ),
        )
    } else if let Some(route) = context
        .prefer_eco
        .then(|| least_exposed(&|r: &RouteCandidate| r.is_eco_variant))
        .flatten()
    {
        (
            route,
            format!(
                "{} saves {:.2} kg of CO2 compared with the fastest route.",
                route.name, route.co2_saved_kg
            ),
        )
    } else if let Some(route) = routes
        .iter()
        .filter(|r| !r.is_eco_variant && !r.is_avoidance_variant)
        .min_by(|a, b| a.duration_minutes.total_cmp(&b.duration_minutes))
    {
        (
            route,
            format!(
                "{} is the quickest option at {:.0} minutes.",
                route.name, route.duration_minutes
            ),
        )
    } else {
        let route = routes.first()?;
        (route, format!("{} is the only available option.", route.name))
    };

    Some(Recommendation {
        recommended_route_id: chosen.id.clone(),
        reasoning,
        health_advisory: health_advisory(context.environmental),
        safety_score: 100u8.saturating_sub(chosen.hazard_exposure_score),
        eco_score: eco_score(chosen, routes),
    })
}

/// 100 for the lowest-emission route, proportionally less for the rest.
fn eco_score(chosen: &RouteCandidate, routes: &[RouteCandidate]) -> u8 {
    let lowest = routes
        .iter()
        .map(|r| r.co2_kg)
        .filter(|co2| *co2 > 0.0)
        .fold(f64::INFINITY, f64::min);
    if chosen.co2_kg <= 0.0 || !lowest.is_finite() {
        return 100;
    }
    (100.0 * lowest / chosen.co2_kg).clamp(0.0, 100.0).round() as u8
}

pub fn health_advisory(environmental: &EnvironmentalSnapshot) -> Option<String> {
    let mut notes = Vec::new();

    let aqi = environmental.air_quality_index;
    if aqi > UNHEALTHY_AQI {
        notes.push(format!(
            "Air quality is unhealthy (AQI {}); keep windows closed and limit time outdoors.",
            aqi
        ));
    } else if aqi > SENSITIVE_AQI {
        notes.push(format!(
            "Air quality is unhealthy for sensitive groups (AQI {}); consider keeping windows closed.",
            aqi
        ));
    }

    if environmental.temperature >= HEAT_WARNING_C {
        notes.push(format!(
            "Extreme heat ({:.0}°C); carry water and avoid long waits outdoors.",
            environmental.temperature
        ));
    } else if environmental.temperature <= COLD_WARNING_C {
        notes.push(format!(
            "Freezing conditions ({:.0}°C); allow extra time for icy roads.",
            environmental.temperature
        ));
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes.join(" "))
    }
}
