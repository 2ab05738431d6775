//! commute-planner core
//!
//! Hazard-aware commute route planning: path decoding, hazard proximity,
//! exposure scoring, detour waypoints and a partial-failure-tolerant
//! orchestrator over external directions, weather, air-quality and hazard
//! providers.

pub mod avoidance;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exposure;
pub mod fallback;
pub mod haversine;
pub mod hazards;
pub mod models;
pub mod open_meteo;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod proximity;
pub mod recommend;
pub mod traits;

pub use config::PlannerConfig;
pub use error::{PathError, PlanError, ProviderError};
pub use planner::{Collaborators, RoutePlanner};
