//! Planner configuration from defaults and environment.

use std::env;
use std::time::Duration;

use crate::avoidance::{DEFAULT_MAX_WAYPOINTS, DEFAULT_OFFSET_M};
use crate::models::Coordinate;
use crate::open_meteo::OpenMeteoConfig;
use crate::osrm::OsrmConfig;
use crate::proximity::{DEFAULT_MAX_SAMPLES, DEFAULT_RADIUS_M, ProximityOptions};

/// Fan-out plus room for avoidance re-queries and stragglers.
pub const DEFAULT_IO_THREADS: usize = 8;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub hazard_radius_m: f64,
    pub max_path_samples: usize,
    pub avoidance_offset_m: f64,
    /// Via points forwarded per avoidance re-query.
    pub max_avoidance_waypoints: usize,
    /// Bound on each provider call, enforced by the planner as well as the
    /// HTTP clients.
    pub provider_timeout: Duration,
    /// Worker threads for provider calls; never fewer than the fan-out.
    pub io_threads: usize,
    /// Keep the fastest request's second path as its own candidate.
    pub include_alternatives: bool,
    /// Where weather and air quality are looked up when the request has no
    /// origin coordinate.
    pub default_location: Coordinate,
    pub osrm_base_url: String,
    pub osrm_profile: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            hazard_radius_m: DEFAULT_RADIUS_M,
            max_path_samples: DEFAULT_MAX_SAMPLES,
            avoidance_offset_m: DEFAULT_OFFSET_M,
            max_avoidance_waypoints: DEFAULT_MAX_WAYPOINTS,
            provider_timeout: Duration::from_secs(10),
            io_threads: DEFAULT_IO_THREADS,
            include_alternatives: true,
            default_location: Coordinate::new(51.5074, -0.1278),
            osrm_base_url: "http://localhost:5000".to_string(),
            osrm_profile: "car".to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());
        let count = |key: &str| lookup(key).and_then(|s| s.trim().parse::<usize>().ok());

        let default_location = match (parsed("PLANNER_DEFAULT_LAT"), parsed("PLANNER_DEFAULT_LNG")) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
            _ => defaults.default_location,
        };

        Self {
            hazard_radius_m: parsed("PLANNER_HAZARD_RADIUS_M")
                .filter(|r| *r > 0.0)
                .unwrap_or(defaults.hazard_radius_m),
            max_path_samples: count("PLANNER_MAX_PATH_SAMPLES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_path_samples),
            avoidance_offset_m: parsed("PLANNER_AVOIDANCE_OFFSET_M")
                .filter(|m| *m > 0.0)
                .unwrap_or(defaults.avoidance_offset_m),
            max_avoidance_waypoints: count("PLANNER_MAX_WAYPOINTS")
                .unwrap_or(defaults.max_avoidance_waypoints),
            provider_timeout: lookup("PLANNER_PROVIDER_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            io_threads: count("PLANNER_IO_THREADS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.io_threads),
            include_alternatives: lookup("PLANNER_INCLUDE_ALTERNATIVES")
                .map(|s| !matches!(s.trim(), "0" | "false" | "no"))
                .unwrap_or(defaults.include_alternatives),
            default_location,
            osrm_base_url: lookup("OSRM_URL").unwrap_or(defaults.osrm_base_url),
            osrm_profile: lookup("OSRM_PROFILE").unwrap_or(defaults.osrm_profile),
        }
    }

    pub fn proximity(&self) -> ProximityOptions {
        ProximityOptions {
            radius_m: self.hazard_radius_m,
            max_samples: self.max_path_samples,
        }
    }

    pub fn osrm(&self) -> OsrmConfig {
        OsrmConfig {
            base_url: self.osrm_base_url.clone(),
            profile: self.osrm_profile.clone(),
            timeout_secs: self.timeout_secs(),
        }
    }

    pub fn open_meteo(&self) -> OpenMeteoConfig {
        OpenMeteoConfig {
            timeout_secs: self.timeout_secs(),
            ..OpenMeteoConfig::default()
        }
    }

    fn timeout_secs(&self) -> u64 {
        self.provider_timeout.as_secs().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = PlannerConfig::from_lookup(|_| None);
        assert_eq!(config.hazard_radius_m, 500.0);
        assert_eq!(config.max_path_samples, 200);
        assert_eq!(config.avoidance_offset_m, 1500.0);
        assert_eq!(config.max_avoidance_waypoints, 5);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert!(config.include_alternatives);
        assert_eq!(config.io_threads, 8);
    }

    #[test]
    fn test_overrides() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("PLANNER_HAZARD_RADIUS_M", "750"),
            ("PLANNER_MAX_WAYPOINTS", "3"),
            ("PLANNER_PROVIDER_TIMEOUT_SECS", "4"),
            ("PLANNER_IO_THREADS", "12"),
            ("PLANNER_INCLUDE_ALTERNATIVES", "false"),
            ("PLANNER_DEFAULT_LAT", "40.7128"),
            ("PLANNER_DEFAULT_LNG", "-74.006"),
            ("OSRM_URL", "http://osrm:5000"),
        ]));
        assert_eq!(config.hazard_radius_m, 750.0);
        assert_eq!(config.max_avoidance_waypoints, 3);
        assert_eq!(config.io_threads, 12);
        assert_eq!(config.osrm().timeout_secs, 4);
        assert_eq!(config.open_meteo().timeout_secs, 4);
        assert!(!config.include_alternatives);
        assert_eq!(config.default_location, Coordinate::new(40.7128, -74.006));
        assert_eq!(config.osrm().base_url, "http://osrm:5000");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("PLANNER_HAZARD_RADIUS_M", "-5"),
            ("PLANNER_MAX_PATH_SAMPLES", "lots"),
            ("PLANNER_DEFAULT_LAT", "12.0"),
        ]));
        assert_eq!(config.hazard_radius_m, 500.0);
        assert_eq!(config.max_path_samples, 200);
        assert_eq!(config.default_location, PlannerConfig::default().default_location);
    }
}
