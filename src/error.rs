//! Error types for the planning engine.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Raised when an encoded path cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The string ended in the middle of a codeword.
    #[error("encoded path ends mid-codeword at byte {offset}")]
    Malformed { offset: usize },
    /// A byte outside the polyline alphabet was found.
    #[error("invalid polyline byte {byte:#04x} at {offset}")]
    InvalidByte { byte: u8, offset: usize },
    /// A codeword or running total left the range of valid coordinates.
    #[error("encoded path leaves the coordinate range at byte {offset}")]
    OutOfRange { offset: usize },
}

/// Failure of an external collaborator (directions, weather, air quality,
/// hazard feed or recommendation reasoner).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} responded with status {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} unavailable: {reason}")]
    Unavailable {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} found no route")]
    NoRoute { provider: &'static str },
    #[error("{provider} did not answer within {timeout:?}")]
    TimedOut {
        provider: &'static str,
        timeout: Duration,
    },
}

impl ProviderError {
    pub fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn invalid(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Name of the collaborator that failed.
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Http { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::Unavailable { provider, .. }
            | ProviderError::NoRoute { provider }
            | ProviderError::TimedOut { provider, .. } => provider,
        }
    }

    /// True when the HTTP client or the planner's deadline cut the call short.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Http { source, .. } => source.is_timeout(),
            ProviderError::TimedOut { .. } => true,
            _ => false,
        }
    }
}

/// Hard failures surfaced to the caller of the planner.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("route planning failed: no route candidates could be produced")]
    NoRoutesAvailable,
    #[error("could not start provider worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl PlanError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::NoRoutesAvailable => "route-planning-failed",
            PlanError::WorkerPool(_) => "planner-unavailable",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Structured error returned in place of a [`crate::models::PlanningResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
