//! Hazard-aware route planning pipeline.
//!
//! One call to [`RoutePlanner::plan`] handles one request:
//!
//! 1. fan out to directions (fastest + eco), weather, air quality and the
//!    hazard feed on the planner's provider pool, collecting a `Result` per
//!    branch by a shared deadline (`provider_timeout`);
//! 2. turn each directions answer into a candidate, or synthesize candidates
//!    when none is usable;
//! 3. score every candidate for hazard exposure;
//! 4. when asked to avoid hazards, re-query exposed candidates through detour
//!    waypoints (again in parallel, under a fresh deadline) and keep only
//!    strict improvements;
//! 5. assemble the environment snapshot, the deduplicated hazard list and a
//!    recommendation.
//!
//! Provider failures are logged and replaced by a named fallback; only an
//! empty candidate set is reported to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use crate::avoidance;
use crate::config::PlannerConfig;
use crate::dispatch::{Pending, ProviderPool};
use crate::error::{PlanError, ProviderError};
use crate::exposure;
use crate::fallback;
use crate::models::{
    Coordinate, EnvironmentalSnapshot, HazardPoint, PlanningRequest, PlanningResult, Recommendation,
    RouteCandidate, RouteStep,
};
use crate::polyline;
use crate::proximity;
use crate::recommend;
use crate::traits::{
    AirQualityProvider, AirQualityReport, DirectionsPath, DirectionsProvider, DirectionsQuery,
    HazardFeed, Place, RecommendationContext, RecommendationReasoner, WeatherProvider,
    WeatherReport,
};

/// Tailpipe CO2 per km for motorway-heavy routing.
pub const FASTEST_CO2_KG_PER_KM: f64 = 0.21;
/// Tailpipe CO2 per km when highways are avoided.
pub const ECO_CO2_KG_PER_KM: f64 = 0.17;

/// The external services a planner talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub directions: Arc<dyn DirectionsProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub air_quality: Arc<dyn AirQualityProvider>,
    pub hazards: Arc<dyn HazardFeed>,
    pub reasoner: Option<Arc<dyn RecommendationReasoner>>,
}

#[derive(Clone)]
pub struct RoutePlanner {
    collaborators: Collaborators,
    config: PlannerConfig,
    pool: ProviderPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Fastest,
    Alternative,
    Eco,
}

impl Variant {
    fn id(self) -> &'static str {
        match self {
            Variant::Fastest => "fastest",
            Variant::Alternative => "alternative",
            Variant::Eco => "eco",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Variant::Fastest => "Fastest route",
            Variant::Alternative => "Alternative route",
            Variant::Eco => "Eco route",
        }
    }

    fn is_eco(self) -> bool {
        self == Variant::Eco
    }
}

/// Settled outcome of every fan-out branch.
struct FanOut {
    fastest: Result<Vec<DirectionsPath>, ProviderError>,
    eco: Result<Vec<DirectionsPath>, ProviderError>,
    weather: Result<WeatherReport, ProviderError>,
    air_quality: Result<AirQualityReport, ProviderError>,
    hazards: Result<Vec<HazardPoint>, ProviderError>,
}

/// A directions path whose geometry decoded.
struct DecodedPath {
    variant: Variant,
    synthetic: bool,
    path: DirectionsPath,
    points: Vec<Coordinate>,
}

/// A candidate plus the geometry it was scored on.
struct ScoredCandidate {
    candidate: RouteCandidate,
    points: Vec<Coordinate>,
}

impl RoutePlanner {
    /// Starts the provider pool (`config.io_threads`, at least one thread per
    /// fan-out branch).
    pub fn new(collaborators: Collaborators, config: PlannerConfig) -> Result<Self, PlanError> {
        let pool = ProviderPool::new(config.io_threads, config.provider_timeout)?;
        Ok(Self {
            collaborators,
            config,
            pool,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, PlanError> {
        let origin = Place::new(request.origin.clone(), request.origin_coordinate());
        let destination = Place::new(request.destination.clone(), request.destination_coordinate());
        let lookup_at = origin.coordinate.unwrap_or(self.config.default_location);

        tracing::info!(
            origin = %origin.label,
            destination = %destination.label,
            prefer_eco = request.prefer_eco,
            avoid_hazards = request.avoid_hazards,
            "planning route"
        );

        let fan_out = self.fan_out(&origin, &destination, lookup_at);

        let hazards = fan_out.hazards.unwrap_or_else(|err| {
            tracing::warn!(provider = err.provider(), error = %err, "hazard feed failed, planning without hazards");
            Vec::new()
        });

        let mut decoded = decode_paths(self.base_paths(fan_out.fastest, fan_out.eco));
        if decoded.is_empty() {
            tracing::warn!("no usable directions, substituting synthetic routes");
            decoded = decode_paths(synthetic_paths(&origin, &destination));
        }
        if decoded.is_empty() {
            return Err(PlanError::NoRoutesAvailable);
        }

        let baseline_km = baseline_distance_km(&decoded);
        let base: Vec<ScoredCandidate> = decoded
            .into_iter()
            .map(|d| self.score(d, &hazards, baseline_km))
            .collect();

        let mut routes: Vec<RouteCandidate> = Vec::with_capacity(base.len() * 2);
        let avoiding = if request.avoid_hazards && !hazards.is_empty() {
            self.avoidance_pass(&base, &origin, &destination, &hazards, baseline_km)
        } else {
            Vec::new()
        };
        routes.extend(base.into_iter().map(|scored| scored.candidate));
        routes.extend(avoiding);

        let environmental = environmental_snapshot(fan_out.weather, fan_out.air_quality);
        let hazards_near_any_route = dedupe_hazards(&routes);

        let context = RecommendationContext {
            routes: &routes,
            environmental: &environmental,
            hazards: &hazards_near_any_route,
            prefer_eco: request.prefer_eco,
        };
        let reasoner = self
            .collaborators
            .reasoner
            .as_ref()
            .map(|inner| BoundedReasoner { inner, pool: &self.pool });
        let recommendation = recommend::recommend(
            reasoner.as_ref().map(|r| r as &dyn RecommendationReasoner),
            &context,
        )
        .ok_or(PlanError::NoRoutesAvailable)?;

        tracing::info!(
            routes = routes.len(),
            hazards = hazards_near_any_route.len(),
            recommended = %recommendation.recommended_route_id,
            "route plan ready"
        );

        Ok(PlanningResult {
            routes,
            environmental,
            hazards_near_any_route,
            recommendation,
        })
    }

    /// Runs the five provider calls concurrently; a branch still running at
    /// the deadline settles as timed out.
    fn fan_out(&self, origin: &Place, destination: &Place, lookup_at: Coordinate) -> FanOut {
        let c = &self.collaborators;
        let deadline = self.pool.deadline();
        let fastest_query = DirectionsQuery {
            origin: origin.clone(),
            destination: destination.clone(),
            avoid_highways: false,
            waypoints: Vec::new(),
            alternatives: true,
        };
        let eco_query = DirectionsQuery {
            avoid_highways: true,
            alternatives: false,
            ..fastest_query.clone()
        };

        let directions = Arc::clone(&c.directions);
        let fastest = self
            .pool
            .dispatch("directions", move || directions.route(&fastest_query));
        let directions = Arc::clone(&c.directions);
        let eco = self
            .pool
            .dispatch("directions", move || directions.route(&eco_query));
        let weather = Arc::clone(&c.weather);
        let weather = self
            .pool
            .dispatch("weather", move || weather.current(lookup_at));
        let air_quality = Arc::clone(&c.air_quality);
        let air_quality = self
            .pool
            .dispatch("air-quality", move || air_quality.current(lookup_at));
        let feed = Arc::clone(&c.hazards);
        let hazards = self.pool.dispatch("hazard-feed", move || feed.active_hazards());

        FanOut {
            fastest: fastest.wait(deadline),
            eco: eco.wait(deadline),
            weather: weather.wait(deadline),
            air_quality: air_quality.wait(deadline),
            hazards: hazards.wait(deadline),
        }
    }

    fn base_paths(
        &self,
        fastest: Result<Vec<DirectionsPath>, ProviderError>,
        eco: Result<Vec<DirectionsPath>, ProviderError>,
    ) -> Vec<(Variant, bool, DirectionsPath)> {
        let mut paths = Vec::new();

        match fastest {
            Ok(found) => {
                let mut found = found.into_iter();
                if let Some(path) = found.next() {
                    paths.push((Variant::Fastest, false, path));
                }
                if self.config.include_alternatives {
                    if let Some(path) = found.next() {
                        paths.push((Variant::Alternative, false, path));
                    }
                }
            }
            Err(err) => {
                tracing::warn!(variant = "fastest", error = %err, "directions request failed");
            }
        }

        match eco {
            Ok(found) => {
                if let Some(path) = found.into_iter().next() {
                    paths.push((Variant::Eco, false, path));
                }
            }
            Err(err) => {
                tracing::warn!(variant = "eco", error = %err, "directions request failed");
            }
        }

        paths
    }

    fn score(&self, decoded: DecodedPath, hazards: &[HazardPoint], baseline_km: f64) -> ScoredCandidate {
        let DecodedPath {
            variant,
            synthetic,
            path,
            points,
        } = decoded;
        let name = if synthetic {
            format!("{} (estimated)", variant.name())
        } else {
            variant.name().to_string()
        };
        let candidate = self.candidate(
            variant.id().to_string(),
            name,
            variant.is_eco(),
            false,
            path,
            &points,
            hazards,
            baseline_km,
        );
        ScoredCandidate { candidate, points }
    }

    #[allow(clippy::too_many_arguments)]
    fn candidate(
        &self,
        id: String,
        name: String,
        is_eco: bool,
        is_avoidance: bool,
        path: DirectionsPath,
        points: &[Coordinate],
        hazards: &[HazardPoint],
        baseline_km: f64,
    ) -> RouteCandidate {
        let distance_km = path.distance_meters / 1000.0;
        let co2_kg = distance_km * if is_eco { ECO_CO2_KG_PER_KM } else { FASTEST_CO2_KG_PER_KM };
        let co2_saved_kg = (baseline_km * FASTEST_CO2_KG_PER_KM - co2_kg).max(0.0);

        let nearby_hazards = proximity::find_nearby(points, hazards, self.config.proximity());
        let hazard_exposure_score = exposure::score(&nearby_hazards);

        RouteCandidate {
            id,
            name,
            distance_km: round_to(distance_km, 2),
            duration_minutes: round_to(path.duration_seconds / 60.0, 1),
            is_eco_variant: is_eco,
            is_avoidance_variant: is_avoidance,
            co2_kg: round_to(co2_kg, 2),
            co2_saved_kg: round_to(co2_saved_kg, 2),
            hazard_exposure_score,
            nearby_hazards,
            encoded_path: path.encoded_path,
            steps: path
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: strip_markup(&step.instruction),
                    distance_km: round_to(step.distance_meters / 1000.0, 2),
                    duration_minutes: round_to(step.duration_seconds / 60.0, 1),
                })
                .collect(),
        }
    }

    /// Re-queries every exposed candidate through detour waypoints.
    ///
    /// All re-queries are in flight at once under one deadline; the output
    /// keeps base order and holds only variants that strictly lowered
    /// exposure.
    fn avoidance_pass(
        &self,
        base: &[ScoredCandidate],
        origin: &Place,
        destination: &Place,
        hazards: &[HazardPoint],
        baseline_km: f64,
    ) -> Vec<RouteCandidate> {
        let deadline = self.pool.deadline();
        let in_flight: Vec<_> = base
            .iter()
            .filter(|scored| !scored.candidate.nearby_hazards.is_empty())
            .filter_map(|scored| {
                self.request_detour(scored, origin, destination)
                    .map(|pending| (scored, pending))
            })
            .collect();

        in_flight
            .into_iter()
            .filter_map(|(scored, pending)| {
                self.avoidance_variant(scored, pending.wait(deadline), hazards, baseline_km)
            })
            .collect()
    }

    fn request_detour(
        &self,
        scored: &ScoredCandidate,
        origin: &Place,
        destination: &Place,
    ) -> Option<Pending<Vec<DirectionsPath>>> {
        let base = &scored.candidate;
        let steer_by = base.nearby_hazards.len().min(self.config.max_avoidance_waypoints);
        let waypoints = avoidance::waypoints_for(
            &scored.points,
            &base.nearby_hazards[..steer_by],
            self.config.avoidance_offset_m,
        );
        if waypoints.is_empty() {
            return None;
        }

        let query = DirectionsQuery {
            origin: origin.clone(),
            destination: destination.clone(),
            avoid_highways: base.is_eco_variant,
            waypoints,
            alternatives: false,
        };
        let directions = Arc::clone(&self.collaborators.directions);
        Some(self.pool.dispatch("directions", move || directions.route(&query)))
    }

    fn avoidance_variant(
        &self,
        scored: &ScoredCandidate,
        answer: Result<Vec<DirectionsPath>, ProviderError>,
        hazards: &[HazardPoint],
        baseline_km: f64,
    ) -> Option<RouteCandidate> {
        let base = &scored.candidate;
        let path = match answer {
            Ok(paths) => paths.into_iter().next()?,
            Err(err) => {
                tracing::warn!(candidate = %base.id, error = %err, "avoidance re-query failed, skipping variant");
                return None;
            }
        };

        let points = match polyline::decode(&path.encoded_path) {
            Ok(points) => points,
            Err(err) => {
                tracing::warn!(candidate = %base.id, error = %err, "avoidance path undecodable, skipping variant");
                return None;
            }
        };

        let candidate = self.candidate(
            format!("{}-avoid", base.id),
            format!("{} avoiding hazards", base.name),
            base.is_eco_variant,
            true,
            path,
            &points,
            hazards,
            baseline_km,
        );

        if candidate.hazard_exposure_score < base.hazard_exposure_score {
            tracing::debug!(
                candidate = %base.id,
                before = base.hazard_exposure_score,
                after = candidate.hazard_exposure_score,
                "kept hazard-avoiding variant"
            );
            Some(candidate)
        } else {
            tracing::debug!(
                candidate = %base.id,
                before = base.hazard_exposure_score,
                after = candidate.hazard_exposure_score,
                "dropped hazard-avoiding variant, no improvement"
            );
            None
        }
    }
}

/// Runs the reasoner on the provider pool under the planner's deadline.
struct BoundedReasoner<'a> {
    inner: &'a Arc<dyn RecommendationReasoner>,
    pool: &'a ProviderPool,
}

impl RecommendationReasoner for BoundedReasoner<'_> {
    fn recommend(&self, context: &RecommendationContext<'_>) -> Result<Recommendation, ProviderError> {
        let deadline = self.pool.deadline();
        let inner = Arc::clone(self.inner);
        let routes = context.routes.to_vec();
        let environmental = context.environmental.clone();
        let hazards = context.hazards.to_vec();
        let prefer_eco = context.prefer_eco;

        self.pool
            .dispatch("reasoner", move || {
                inner.recommend(&RecommendationContext {
                    routes: &routes,
                    environmental: &environmental,
                    hazards: &hazards,
                    prefer_eco,
                })
            })
            .wait(deadline)
    }
}

fn synthetic_paths(origin: &Place, destination: &Place) -> Vec<(Variant, bool, DirectionsPath)> {
    let synthetic = fallback::synthetic_routes(origin, destination);
    vec![
        (Variant::Fastest, true, synthetic.fastest),
        (Variant::Eco, true, synthetic.eco),
    ]
}

/// Decodes each path, dropping the ones with malformed geometry.
fn decode_paths(paths: Vec<(Variant, bool, DirectionsPath)>) -> Vec<DecodedPath> {
    paths
        .into_iter()
        .filter_map(|(variant, synthetic, path)| match polyline::decode(&path.encoded_path) {
            Ok(points) => Some(DecodedPath {
                variant,
                synthetic,
                path,
                points,
            }),
            Err(err) => {
                tracing::warn!(candidate = variant.id(), error = %err, "excluding candidate with malformed path");
                None
            }
        })
        .collect()
}

/// Distance of the fastest candidate, or the longest one when it is missing.
fn baseline_distance_km(decoded: &[DecodedPath]) -> f64 {
    decoded
        .iter()
        .find(|d| d.variant == Variant::Fastest)
        .map(|d| d.path.distance_meters / 1000.0)
        .unwrap_or_else(|| {
            decoded
                .iter()
                .map(|d| d.path.distance_meters / 1000.0)
                .fold(0.0, f64::max)
        })
}

fn environmental_snapshot(
    weather: Result<WeatherReport, ProviderError>,
    air_quality: Result<AirQualityReport, ProviderError>,
) -> EnvironmentalSnapshot {
    let weather = weather.unwrap_or_else(|err| {
        tracing::warn!(provider = err.provider(), error = %err, timeout = err.is_timeout(), "using synthetic weather");
        fallback::synthetic_weather()
    });
    let air_quality = air_quality.unwrap_or_else(|err| {
        tracing::warn!(provider = err.provider(), error = %err, timeout = err.is_timeout(), "using synthetic air quality");
        fallback::synthetic_air_quality()
    });

    EnvironmentalSnapshot {
        air_quality_index: air_quality.index,
        air_quality_description: air_quality.category,
        temperature: weather.temperature,
        weather_condition: weather.condition,
        humidity: weather.humidity,
        uv_index: weather.uv_index,
    }
}

/// Hazards near any route, first occurrence wins.
fn dedupe_hazards(routes: &[RouteCandidate]) -> Vec<HazardPoint> {
    let mut seen = HashSet::new();
    routes
        .iter()
        .flat_map(|route| &route.nearby_hazards)
        .filter(|scored| seen.insert(scored.hazard.id.as_str()))
        .map(|scored| scored.hazard.clone())
        .collect()
}

/// Removes HTML-style tags and common entities, collapsing whitespace.
pub fn strip_markup(instruction: &str) -> String {
    let mut text = String::with_capacity(instruction.len());
    let mut in_tag = false;
    for ch in instruction.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&quot;", "\"");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
