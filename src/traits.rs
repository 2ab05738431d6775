//! Collaborator interfaces consumed by the planner.
//!
//! These are intentionally narrow: the planner only needs typed, already
//! validated values. HTTP adapters live in `osrm` and `open_meteo`; tests and
//! embedding apps supply their own implementations.

use crate::error::ProviderError;
use crate::models::{Coordinate, EnvironmentalSnapshot, HazardPoint, Recommendation, RouteCandidate};

/// A route endpoint as the user named it, with a position when known.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub label: String,
    pub coordinate: Option<Coordinate>,
}

impl Place {
    pub fn new(label: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            label: label.into(),
            coordinate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsQuery {
    pub origin: Place,
    pub destination: Place,
    /// Prefer surface roads (the eco variant).
    pub avoid_highways: bool,
    /// Ordered via points; empty for a plain request.
    pub waypoints: Vec<Coordinate>,
    /// Ask for alternative paths. Ignored when waypoints are present.
    pub alternatives: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsStep {
    /// May contain markup; stripped when building candidates.
    pub instruction: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsPath {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub encoded_path: String,
    pub steps: Vec<DirectionsStep>,
}

/// Turn-by-turn directions.
///
/// The first path is the provider's best; further paths are alternatives and
/// only appear when the query asks for them.
pub trait DirectionsProvider: Send + Sync {
    fn route(&self, query: &DirectionsQuery) -> Result<Vec<DirectionsPath>, ProviderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Degrees Celsius.
    pub temperature: f64,
    pub condition: String,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub uv_index: Option<f64>,
}

pub trait WeatherProvider: Send + Sync {
    fn current(&self, at: Coordinate) -> Result<WeatherReport, ProviderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReport {
    pub index: u32,
    pub category: String,
}

pub trait AirQualityProvider: Send + Sync {
    fn current(&self, at: Coordinate) -> Result<AirQualityReport, ProviderError>;
}

/// Current active hazards, already merged across sources.
///
/// Resolved items are excluded by the feed. Reads may be stale.
pub trait HazardFeed: Send + Sync {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError>;
}

/// Everything a reasoner sees when choosing a route.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext<'a> {
    pub routes: &'a [RouteCandidate],
    pub environmental: &'a EnvironmentalSnapshot,
    pub hazards: &'a [HazardPoint],
    pub prefer_eco: bool,
}

/// External route recommendation service.
///
/// Output is untrusted: the planner validates the route id and clamps scores.
pub trait RecommendationReasoner: Send + Sync {
    fn recommend(&self, context: &RecommendationContext<'_>) -> Result<Recommendation, ProviderError>;
}
