//! Test fixtures for commute-planner.
//!
//! Provides:
//! - Real central London commute endpoints
//! - Path and hazard builders
//! - Mock collaborators with scriptable failures

#![allow(dead_code)]

pub mod london_locations;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use commute_planner::error::ProviderError;
use commute_planner::models::{Coordinate, HazardOrigin, HazardPoint, Recommendation};
use commute_planner::polyline;
use commute_planner::traits::{
    AirQualityProvider, AirQualityReport, DirectionsPath, DirectionsProvider, DirectionsQuery,
    DirectionsStep, HazardFeed, RecommendationContext, RecommendationReasoner, WeatherProvider,
    WeatherReport,
};
use commute_planner::{Collaborators, PlannerConfig, RoutePlanner};

pub use london_locations::*;

// ============================================================================
// Geometry
// ============================================================================

/// Points every 0.001 degrees of longitude along a parallel.
pub fn along_parallel(lat: f64, from_lng: f64, to_lng: f64) -> Vec<Coordinate> {
    let steps = ((to_lng - from_lng).abs() / 0.001).round() as usize;
    let dir = (to_lng - from_lng).signum();
    (0..=steps)
        .map(|i| Coordinate::new(lat, from_lng + dir * i as f64 * 0.001))
        .collect()
}

/// Leaves `from` along its meridian to `via_lat`, runs east/west, then
/// comes back down to `to`.
pub fn dogleg(from: Coordinate, to: Coordinate, via_lat: f64) -> Vec<Coordinate> {
    let mut points = vec![from];
    points.extend(along_parallel(via_lat, from.longitude, to.longitude));
    points.push(to);
    points
}

pub fn path(points: &[Coordinate], meters: f64, seconds: f64) -> DirectionsPath {
    DirectionsPath {
        distance_meters: meters,
        duration_seconds: seconds,
        encoded_path: polyline::encode(points),
        steps: vec![
            DirectionsStep {
                instruction: "Head <b>east</b> on <b>The Strand</b>".to_string(),
                distance_meters: meters,
                duration_seconds: seconds,
            },
            DirectionsStep {
                instruction: "Arrive at destination".to_string(),
                distance_meters: 0.0,
                duration_seconds: 0.0,
            },
        ],
    }
}

/// Straight commute along the origin's parallel.
pub fn direct_path() -> DirectionsPath {
    path(&along_parallel(ORIGIN.lat, ORIGIN.lng, DESTINATION.lng), 2800.0, 540.0)
}

/// Surface-road commute ~1.1 km north of the direct line.
pub fn northern_path() -> DirectionsPath {
    path(&dogleg(ORIGIN.coords(), DESTINATION.coords(), ORIGIN.lat + 0.01), 3100.0, 720.0)
}

/// Detour ~1.1 km south of the direct line.
pub fn southern_path() -> DirectionsPath {
    path(&dogleg(ORIGIN.coords(), DESTINATION.coords(), ORIGIN.lat - 0.01), 3300.0, 660.0)
}

pub fn hazard(id: &str, at: Coordinate, severity: u8) -> HazardPoint {
    HazardPoint {
        id: id.to_string(),
        latitude: at.latitude,
        longitude: at.longitude,
        category: "collision".to_string(),
        severity,
        description: format!("Reported {}", id),
        origin: HazardOrigin::Sensor,
    }
}

/// A severity-10 hazard sitting on the direct path.
pub fn hazard_on_direct_path() -> HazardPoint {
    hazard("crash-1", Coordinate::new(ORIGIN.lat, -0.100), 10)
}

// ============================================================================
// Mock collaborators
// ============================================================================

fn down(provider: &'static str) -> ProviderError {
    ProviderError::unavailable(provider, "mock outage")
}

/// Directions keyed on the query shape: plain fastest, plain eco, or detour
/// (any query carrying waypoints).
#[derive(Default)]
pub struct MockDirections {
    pub fastest: Option<Vec<DirectionsPath>>,
    pub eco: Option<Vec<DirectionsPath>>,
    pub detour: Option<DirectionsPath>,
    pub calls: Mutex<Vec<DirectionsQuery>>,
}

impl MockDirections {
    pub fn calls(&self) -> Vec<DirectionsQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detour_calls(&self) -> Vec<DirectionsQuery> {
        self.calls()
            .into_iter()
            .filter(|q| !q.waypoints.is_empty())
            .collect()
    }
}

impl DirectionsProvider for MockDirections {
    fn route(&self, query: &DirectionsQuery) -> Result<Vec<DirectionsPath>, ProviderError> {
        self.calls.lock().unwrap().push(query.clone());
        let answer = if !query.waypoints.is_empty() {
            self.detour.clone().map(|p| vec![p])
        } else if query.avoid_highways {
            self.eco.clone()
        } else {
            self.fastest.clone()
        };
        answer.ok_or_else(|| down("directions"))
    }
}

pub struct MockWeather(pub Option<WeatherReport>);

impl WeatherProvider for MockWeather {
    fn current(&self, _at: Coordinate) -> Result<WeatherReport, ProviderError> {
        self.0.clone().ok_or_else(|| down("weather"))
    }
}

pub struct MockAirQuality(pub Option<AirQualityReport>);

impl AirQualityProvider for MockAirQuality {
    fn current(&self, _at: Coordinate) -> Result<AirQualityReport, ProviderError> {
        self.0.clone().ok_or_else(|| down("air-quality"))
    }
}

pub struct MockHazards(pub Option<Vec<HazardPoint>>);

impl HazardFeed for MockHazards {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError> {
        self.0.clone().ok_or_else(|| down("hazard-feed"))
    }
}

pub struct MockReasoner(pub Option<Recommendation>);

impl RecommendationReasoner for MockReasoner {
    fn recommend(&self, _context: &RecommendationContext<'_>) -> Result<Recommendation, ProviderError> {
        self.0.clone().ok_or_else(|| down("reasoner"))
    }
}

/// Every collaborator answers correctly, but only after `delay`.
pub struct Sluggish {
    pub delay: Duration,
}

impl Sluggish {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

impl DirectionsProvider for Sluggish {
    fn route(&self, query: &DirectionsQuery) -> Result<Vec<DirectionsPath>, ProviderError> {
        thread::sleep(self.delay);
        if query.avoid_highways {
            Ok(vec![northern_path()])
        } else {
            Ok(vec![direct_path()])
        }
    }
}

impl WeatherProvider for Sluggish {
    fn current(&self, _at: Coordinate) -> Result<WeatherReport, ProviderError> {
        thread::sleep(self.delay);
        Ok(mild_weather())
    }
}

impl AirQualityProvider for Sluggish {
    fn current(&self, _at: Coordinate) -> Result<AirQualityReport, ProviderError> {
        thread::sleep(self.delay);
        Ok(clean_air())
    }
}

impl HazardFeed for Sluggish {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError> {
        thread::sleep(self.delay);
        Ok(Vec::new())
    }
}

impl RecommendationReasoner for Sluggish {
    fn recommend(&self, _context: &RecommendationContext<'_>) -> Result<Recommendation, ProviderError> {
        thread::sleep(self.delay);
        Ok(Recommendation {
            recommended_route_id: "eco".to_string(),
            reasoning: "Worth the wait.".to_string(),
            health_advisory: None,
            safety_score: 90,
            eco_score: 90,
        })
    }
}

/// All five fan-out collaborators (and the reasoner) served by `slow`.
pub fn sluggish_collaborators(slow: Arc<Sluggish>) -> Collaborators {
    Collaborators {
        directions: slow.clone(),
        weather: slow.clone(),
        air_quality: slow.clone(),
        hazards: slow.clone(),
        reasoner: Some(slow as Arc<dyn RecommendationReasoner>),
    }
}

pub fn mild_weather() -> WeatherReport {
    WeatherReport {
        temperature: 16.0,
        condition: "Overcast".to_string(),
        humidity: 72.0,
        uv_index: Some(2.0),
    }
}

pub fn clean_air() -> AirQualityReport {
    AirQualityReport {
        index: 35,
        category: "Good".to_string(),
    }
}

/// Builder wiring mocks into a planner.
pub struct TestPlanner {
    pub directions: Arc<MockDirections>,
    pub weather: Option<WeatherReport>,
    pub air_quality: Option<AirQualityReport>,
    pub hazards: Option<Vec<HazardPoint>>,
    pub reasoner: Option<MockReasoner>,
    pub config: PlannerConfig,
}

impl TestPlanner {
    /// Healthy providers, fastest + eco directions, no hazards.
    pub fn new() -> Self {
        Self {
            directions: Arc::new(MockDirections {
                fastest: Some(vec![direct_path()]),
                eco: Some(vec![northern_path()]),
                detour: Some(southern_path()),
                calls: Mutex::new(Vec::new()),
            }),
            weather: Some(mild_weather()),
            air_quality: Some(clean_air()),
            hazards: Some(Vec::new()),
            reasoner: None,
            config: PlannerConfig::default(),
        }
    }

    pub fn directions(mut self, directions: MockDirections) -> Self {
        self.directions = Arc::new(directions);
        self
    }

    pub fn hazards(mut self, hazards: Option<Vec<HazardPoint>>) -> Self {
        self.hazards = hazards;
        self
    }

    pub fn weather(mut self, weather: Option<WeatherReport>) -> Self {
        self.weather = weather;
        self
    }

    pub fn air_quality(mut self, air_quality: Option<AirQualityReport>) -> Self {
        self.air_quality = air_quality;
        self
    }

    pub fn reasoner(mut self, reasoner: MockReasoner) -> Self {
        self.reasoner = Some(reasoner);
        self
    }

    pub fn build(self) -> (RoutePlanner, Arc<MockDirections>) {
        let collaborators = Collaborators {
            directions: self.directions.clone(),
            weather: Arc::new(MockWeather(self.weather)),
            air_quality: Arc::new(MockAirQuality(self.air_quality)),
            hazards: Arc::new(MockHazards(self.hazards)),
            reasoner: self
                .reasoner
                .map(|r| Arc::new(r) as Arc<dyn RecommendationReasoner>),
        };
        let planner = RoutePlanner::new(collaborators, self.config).expect("planner pool");
        (planner, self.directions)
    }
}
