//! OSRM HTTP adapter for turn-by-turn directions.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::models::Coordinate;
use crate::traits::{DirectionsPath, DirectionsProvider, DirectionsQuery, DirectionsStep, Place};

const PROVIDER: &str = "osrm";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Builds the `route` service URL for a query.
    ///
    /// OSRM routes between coordinates only, so both endpoints must be
    /// positioned.
    pub fn route_url(&self, query: &DirectionsQuery) -> Result<String, ProviderError> {
        let origin = require_position(&query.origin)?;
        let destination = require_position(&query.destination)?;

        let coords = std::iter::once(origin)
            .chain(query.waypoints.iter().copied())
            .chain(std::iter::once(destination))
            .map(|c| format!("{:.6},{:.6}", c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .join(";");

        let alternatives = query.alternatives && query.waypoints.is_empty();
        let mut url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=polyline&steps=true&alternatives={}",
            self.config.base_url, self.config.profile, coords, alternatives
        );
        if query.avoid_highways {
            url.push_str("&exclude=motorway");
        }
        Ok(url)
    }
}

fn require_position(place: &Place) -> Result<Coordinate, ProviderError> {
    place.coordinate.ok_or_else(|| {
        ProviderError::unavailable(PROVIDER, format!("no coordinate for '{}'", place.label))
    })
}

impl DirectionsProvider for OsrmClient {
    fn route(&self, query: &DirectionsQuery) -> Result<Vec<DirectionsPath>, ProviderError> {
        let url = self.route_url(query)?;
        tracing::debug!(url = %url, "requesting OSRM route");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        // OSRM reports NoRoute and friends as 400 with a JSON body.
        if status.is_server_error() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<OsrmRouteResponse>()
            .map_err(|source| ProviderError::Http {
                provider: PROVIDER,
                source,
            })?;
        parse_route_response(body)
    }
}

/// Converts an OSRM `route` response into provider-neutral paths.
pub fn parse_route_response(body: OsrmRouteResponse) -> Result<Vec<DirectionsPath>, ProviderError> {
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Err(ProviderError::NoRoute { provider: PROVIDER }),
        other => {
            let reason = body.message.unwrap_or_else(|| other.to_string());
            return Err(ProviderError::invalid(PROVIDER, reason));
        }
    }

    let paths: Vec<DirectionsPath> = body
        .routes
        .into_iter()
        .map(|route| DirectionsPath {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            encoded_path: route.geometry,
            steps: route
                .legs
                .into_iter()
                .flat_map(|leg| leg.steps)
                .map(|step| DirectionsStep {
                    instruction: instruction_for(&step),
                    distance_meters: step.distance,
                    duration_seconds: step.duration,
                })
                .collect(),
        })
        .collect();

    if paths.is_empty() {
        return Err(ProviderError::NoRoute { provider: PROVIDER });
    }
    Ok(paths)
}

/// Human-readable text for an OSRM maneuver.
fn instruction_for(step: &OsrmStep) -> String {
    let road = if step.name.is_empty() {
        None
    } else {
        Some(step.name.as_str())
    };
    let modifier = step.maneuver.modifier.as_deref();

    match (step.maneuver.kind.as_str(), road) {
        ("depart", Some(road)) => format!("Head out on {}", road),
        ("depart", None) => "Head out".to_string(),
        ("arrive", _) => "Arrive at destination".to_string(),
        ("roundabout" | "rotary", Some(road)) => format!("At the roundabout, exit onto {}", road),
        ("roundabout" | "rotary", None) => "Take the roundabout".to_string(),
        (kind, road) => {
            let verb = match (kind, modifier) {
                (_, Some("uturn")) => "Make a U-turn".to_string(),
                ("merge", Some(m)) => format!("Merge {}", m),
                ("on ramp", Some(m)) => format!("Take the ramp on the {}", m),
                ("off ramp", Some(m)) => format!("Take the exit on the {}", m),
                ("fork", Some(m)) => format!("Keep {} at the fork", m),
                (_, Some("straight")) => "Continue straight".to_string(),
                (_, Some(m)) => format!("Turn {}", m),
                (_, None) => "Continue".to_string(),
            };
            match road {
                Some(road) => format!("{} onto {}", verb, road),
                None => verb,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    distance: f64,
    duration: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    modifier: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(waypoints: Vec<Coordinate>, avoid_highways: bool) -> DirectionsQuery {
        DirectionsQuery {
            origin: Place::new("Home", Some(Coordinate::new(51.5, -0.12))),
            destination: Place::new("Office", Some(Coordinate::new(51.52, -0.08))),
            avoid_highways,
            waypoints,
            alternatives: true,
        }
    }

    #[test]
    fn test_route_url_plain() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.route_url(&query(Vec::new(), false)).unwrap();
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/car/-0.120000,51.500000;-0.080000,51.520000\
             ?overview=full&geometries=polyline&steps=true&alternatives=true"
        );
    }

    #[test]
    fn test_route_url_with_waypoints_and_exclusion() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client
            .route_url(&query(vec![Coordinate::new(51.51, -0.1)], true))
            .unwrap();
        assert!(url.contains("-0.120000,51.500000;-0.100000,51.510000;-0.080000,51.520000"));
        assert!(url.contains("alternatives=false"));
        assert!(url.ends_with("&exclude=motorway"));
    }

    #[test]
    fn test_route_url_requires_coordinates() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let mut q = query(Vec::new(), false);
        q.destination.coordinate = None;
        let err = client.route_url(&q).unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { provider: "osrm", .. }));
    }

    #[test]
    fn test_parse_route_response() {
        let body: OsrmRouteResponse = serde_json::from_str(
            r#"{
                "code": "Ok",
                "routes": [
                    {
                        "distance": 4200.5,
                        "duration": 600.0,
                        "geometry": "_p~iF~ps|U_ulLnnqC",
                        "legs": [{
                            "steps": [
                                {"distance": 100.0, "duration": 20.0, "name": "High Street",
                                 "maneuver": {"type": "depart"}},
                                {"distance": 4100.5, "duration": 580.0, "name": "Mill Road",
                                 "maneuver": {"type": "turn", "modifier": "left"}},
                                {"distance": 0.0, "duration": 0.0, "name": "",
                                 "maneuver": {"type": "arrive"}}
                            ]
                        }]
                    },
                    {"distance": 5000.0, "duration": 650.0, "geometry": "", "legs": []}
                ]
            }"#,
        )
        .unwrap();

        let paths = parse_route_response(body).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].distance_meters, 4200.5);
        assert_eq!(paths[0].encoded_path, "_p~iF~ps|U_ulLnnqC");
        let instructions: Vec<&str> = paths[0].steps.iter().map(|s| s.instruction.as_str()).collect();
        assert_eq!(
            instructions,
            vec!["Head out on High Street", "Turn left onto Mill Road", "Arrive at destination"]
        );
        assert!(paths[1].steps.is_empty());
    }

    #[test]
    fn test_parse_no_route() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "message": "Impossible route"}"#).unwrap();
        assert!(matches!(
            parse_route_response(body),
            Err(ProviderError::NoRoute { provider: "osrm" })
        ));
    }

    #[test]
    fn test_parse_error_code_keeps_message() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code": "InvalidQuery", "message": "Query string malformed"}"#)
                .unwrap();
        let err = parse_route_response(body).unwrap_err();
        assert!(err.to_string().contains("Query string malformed"));
    }
}
