//! Plans one commute from a JSON request.
//!
//! Reads a `PlanningRequest` from the file named by the first argument (or
//! stdin) and prints the `PlanningResult` JSON to stdout. Logs go to stderr.
//!
//! Environment: `OSRM_URL`, `OSRM_PROFILE`, `HAZARD_SENSOR_FILE`,
//! `HAZARD_REPORTS_FILE`, the `PLANNER_*` settings and `RUST_LOG`.

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commute_planner::hazards::{JsonFileHazardFeed, MergedHazardFeed, StaticHazardFeed};
use commute_planner::models::PlanningRequest;
use commute_planner::open_meteo::OpenMeteoClient;
use commute_planner::osrm::OsrmClient;
use commute_planner::traits::HazardFeed;
use commute_planner::{Collaborators, PlannerConfig, RoutePlanner};

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commute_planner=info")))
        .init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let request: PlanningRequest = serde_json::from_str(&raw).context("parsing planning request")?;

    let config = PlannerConfig::from_env();
    let open_meteo = Arc::new(OpenMeteoClient::new(config.open_meteo())?);
    let collaborators = Collaborators {
        directions: Arc::new(OsrmClient::new(config.osrm())?),
        weather: open_meteo.clone(),
        air_quality: open_meteo,
        hazards: hazard_feed(),
        reasoner: None,
    };
    let planner = RoutePlanner::new(collaborators, config)?;

    match planner.plan(&request) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "planning failed");
            println!("{}", serde_json::to_string_pretty(&err.to_body())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn hazard_feed() -> Arc<dyn HazardFeed> {
    let sensor = std::env::var("HAZARD_SENSOR_FILE").ok();
    let reports = std::env::var("HAZARD_REPORTS_FILE").ok();
    match (sensor, reports) {
        (Some(sensor), Some(reports)) => Arc::new(MergedHazardFeed::new(
            Arc::new(JsonFileHazardFeed::new(sensor)),
            Arc::new(JsonFileHazardFeed::new(reports)),
        )),
        (Some(path), None) | (None, Some(path)) => Arc::new(JsonFileHazardFeed::new(path)),
        (None, None) => Arc::new(StaticHazardFeed::default()),
    }
}
