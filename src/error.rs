//! Error types for the planner and its routing boundary.

use thiserror::Error;

/// Failures surfaced by a routing or geocoding provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The provider could not produce a route (no path, transport failure, timeout).
    #[error("route unavailable: {0}")]
    RouteUnavailable(String),

    /// An address could not be resolved to coordinates.
    #[error("geocoding failed for '{query}': {reason}")]
    GeocodeFailed { query: String, reason: String },
}

/// Failures of trip planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The request was rejected before simulation started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Routing failures are passed through unchanged.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The assembler received segments that are not contiguous. Never expected
    /// from planner output.
    #[error("invalid segment sequence at index {index}: {reason}")]
    InvalidSegmentSequence { index: usize, reason: String },

    /// The rolling cycle is used up and the rule set has no restart.
    #[error("on-duty cycle exhausted after {cycle_minutes} minutes and no restart is configured")]
    CycleExhausted { cycle_minutes: u32 },
}

impl PlanError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PlanError::InvalidInput(message.into())
    }
}

/// Failures decoding an encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline ended in the middle of a value at byte {0}")]
    Truncated(usize),

    #[error("invalid polyline character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },
}

/// Failures preparing an OSRM dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{step} failed: {status}")]
    ProcessFailure { step: String, status: String },
}
