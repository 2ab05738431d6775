//! Request, response and intermediate value types.
//!
//! Everything here is created per planning request and serialized with
//! camelCase field names. Numeric fields are never skipped and hazard lists
//! are always arrays.

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }
}

/// Which subsystem reported a hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardOrigin {
    #[serde(rename = "sensor")]
    Sensor,
    #[serde(rename = "community-report")]
    CommunityReport,
}

/// An active road hazard supplied by a hazard feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    /// 0 (negligible) to 10 (severe).
    pub severity: u8,
    pub description: String,
    pub origin: HazardOrigin,
}

impl HazardPoint {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A hazard annotated with its distance to one particular route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredHazard {
    #[serde(flatten)]
    pub hazard: HazardPoint,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub instruction: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    pub id: String,
    pub name: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub is_eco_variant: bool,
    pub is_avoidance_variant: bool,
    pub co2_kg: f64,
    pub co2_saved_kg: f64,
    pub hazard_exposure_score: u8,
    /// Ascending by `distance_meters`.
    pub nearby_hazards: Vec<ScoredHazard>,
    pub encoded_path: String,
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalSnapshot {
    pub air_quality_index: u32,
    pub air_quality_description: String,
    pub temperature: f64,
    pub weather_condition: String,
    pub humidity: f64,
    pub uv_index: Option<f64>,
}

/// Input to the planner, in its wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub origin_lat: Option<f64>,
    #[serde(default)]
    pub origin_lng: Option<f64>,
    #[serde(default)]
    pub dest_lat: Option<f64>,
    #[serde(default)]
    pub dest_lng: Option<f64>,
    #[serde(default)]
    pub prefer_eco: bool,
    #[serde(default = "default_avoid_hazards")]
    pub avoid_hazards: bool,
}

fn default_avoid_hazards() -> bool {
    true
}

impl PlanningRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            origin_lat: None,
            origin_lng: None,
            dest_lat: None,
            dest_lng: None,
            prefer_eco: false,
            avoid_hazards: true,
        }
    }

    pub fn with_coordinates(mut self, origin: Coordinate, destination: Coordinate) -> Self {
        self.origin_lat = Some(origin.latitude);
        self.origin_lng = Some(origin.longitude);
        self.dest_lat = Some(destination.latitude);
        self.dest_lng = Some(destination.longitude);
        self
    }

    pub fn prefer_eco(mut self, prefer: bool) -> Self {
        self.prefer_eco = prefer;
        self
    }

    pub fn avoid_hazards(mut self, avoid: bool) -> Self {
        self.avoid_hazards = avoid;
        self
    }

    /// Origin position, when both components were supplied.
    pub fn origin_coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.origin_lat?, self.origin_lng?))
    }

    pub fn destination_coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.dest_lat?, self.dest_lng?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_route_id: String,
    pub reasoning: String,
    pub health_advisory: Option<String>,
    pub safety_score: u8,
    pub eco_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResult {
    pub routes: Vec<RouteCandidate>,
    pub environmental: EnvironmentalSnapshot,
    /// Deduplicated by id.
    pub hazards_near_any_route: Vec<HazardPoint>,
    pub recommendation: Recommendation,
}
