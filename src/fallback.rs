//! Named substitutes for collaborators that failed.

use crate::haversine::{self, DEFAULT_SPEED_KMH};
use crate::open_meteo::aqi_category;
use crate::polyline;
use crate::traits::{AirQualityReport, DirectionsPath, DirectionsStep, Place, WeatherReport};

/// Road distance is longer than the crow flies.
const ROAD_DETOUR_FACTOR: f64 = 1.3;
/// Surface roads wind more and move slower.
const ECO_DETOUR_FACTOR: f64 = 1.4;
const ECO_SPEED_KMH: f64 = 32.0;
/// Used when an endpoint has no coordinate.
const NOMINAL_STRAIGHT_LINE_KM: f64 = 10.0;

const MOCK_AQI: u32 = 42;

pub fn synthetic_weather() -> WeatherReport {
    WeatherReport {
        temperature: 18.0,
        condition: "Partly Cloudy".to_string(),
        humidity: 60.0,
        uv_index: None,
    }
}

pub fn synthetic_air_quality() -> AirQualityReport {
    AirQualityReport {
        index: MOCK_AQI,
        category: aqi_category(MOCK_AQI).to_string(),
    }
}

/// Stand-in directions used when no provider produced a usable route.
#[derive(Debug, Clone)]
pub struct SyntheticRoutes {
    pub fastest: DirectionsPath,
    pub eco: DirectionsPath,
}

/// Straight-line estimates between the endpoints.
///
/// With both coordinates known the geometry is the direct segment; otherwise
/// a nominal distance is used and the path is empty.
pub fn synthetic_routes(origin: &Place, destination: &Place) -> SyntheticRoutes {
    let (straight_km, points) = match (origin.coordinate, destination.coordinate) {
        (Some(from), Some(to)) => (haversine::distance_km(from, to), vec![from, from.midpoint(to), to]),
        _ => (NOMINAL_STRAIGHT_LINE_KM, Vec::new()),
    };
    let encoded = polyline::encode(&points);

    SyntheticRoutes {
        fastest: synthetic_path(
            straight_km * ROAD_DETOUR_FACTOR,
            DEFAULT_SPEED_KMH,
            &encoded,
            &destination.label,
        ),
        eco: synthetic_path(
            straight_km * ECO_DETOUR_FACTOR,
            ECO_SPEED_KMH,
            &encoded,
            &destination.label,
        ),
    }
}

fn synthetic_path(km: f64, speed_kmh: f64, encoded: &str, destination: &str) -> DirectionsPath {
    let duration_seconds = haversine::travel_minutes(km, speed_kmh) * 60.0;
    DirectionsPath {
        distance_meters: km * 1000.0,
        duration_seconds,
        encoded_path: encoded.to_string(),
        steps: vec![
            DirectionsStep {
                instruction: format!("Head towards {}", destination),
                distance_meters: km * 1000.0,
                duration_seconds,
            },
            DirectionsStep {
                instruction: "Arrive at destination".to_string(),
                distance_meters: 0.0,
                duration_seconds: 0.0,
            },
        ],
    }
}
