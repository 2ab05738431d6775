//! Hazard feed implementations.
//!
//! The detection and community-report subsystems own their stores; these
//! types only read from them.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::models::HazardPoint;
use crate::traits::HazardFeed;

/// Fixed hazard list, e.g. a snapshot taken by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticHazardFeed {
    hazards: Vec<HazardPoint>,
}

impl StaticHazardFeed {
    pub fn new(hazards: Vec<HazardPoint>) -> Self {
        Self { hazards }
    }
}

impl HazardFeed for StaticHazardFeed {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError> {
        Ok(self.hazards.clone())
    }
}

/// Sensor detections plus verified community reports.
///
/// Either side may fail on its own; the merge only fails when both do.
/// Ids repeated across sources keep the sensor entry.
///
/// Both sources are read with `rayon::join` on the calling thread's pool,
/// which is the planner's provider pool when the planner drives the feed.
#[derive(Clone)]
pub struct MergedHazardFeed {
    sensor: Arc<dyn HazardFeed>,
    community: Arc<dyn HazardFeed>,
}

impl MergedHazardFeed {
    pub fn new(sensor: Arc<dyn HazardFeed>, community: Arc<dyn HazardFeed>) -> Self {
        Self { sensor, community }
    }
}

impl HazardFeed for MergedHazardFeed {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError> {
        let (sensor, community) = rayon::join(
            || self.sensor.active_hazards(),
            || self.community.active_hazards(),
        );

        let sources = match (sensor, community) {
            (Ok(s), Ok(c)) => vec![s, c],
            (Ok(s), Err(err)) => {
                tracing::warn!(source = "community", error = %err, "hazard source failed, using sensor hazards only");
                vec![s]
            }
            (Err(err), Ok(c)) => {
                tracing::warn!(source = "sensor", error = %err, "hazard source failed, using community hazards only");
                vec![c]
            }
            (Err(sensor_err), Err(community_err)) => {
                return Err(ProviderError::unavailable(
                    "hazard-feed",
                    format!("sensor: {}; community: {}", sensor_err, community_err),
                ));
            }
        };

        let mut seen = HashSet::new();
        Ok(sources
            .into_iter()
            .flatten()
            .filter(|hazard| seen.insert(hazard.id.clone()))
            .collect())
    }
}

/// Reads a JSON array of hazards from disk on every call.
#[derive(Debug, Clone)]
pub struct JsonFileHazardFeed {
    path: PathBuf,
}

impl JsonFileHazardFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HazardFeed for JsonFileHazardFeed {
    fn active_hazards(&self) -> Result<Vec<HazardPoint>, ProviderError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            ProviderError::unavailable("hazard-file", format!("{}: {}", self.path.display(), err))
        })?;
        serde_json::from_str(&raw).map_err(|err| ProviderError::invalid("hazard-file", err.to_string()))
    }
}
