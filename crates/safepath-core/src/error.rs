//! Error types for the scoring engine.
//!
//! Every variant is a precondition violation on engine input. Nothing here is
//! transient, so callers should surface these rather than retry.

/// Errors produced while scoring or selecting routes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Latitude/longitude is NaN, infinite or outside WGS-84 bounds.
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A polyline handed to the geometry layer has fewer than two points.
    #[error("polyline needs at least 2 points, got {points}")]
    DegenerateRoute { points: usize },

    /// A candidate route cannot be scored because its polyline is too short.
    #[error("route {route_id} has {points} polyline point(s), need at least 2")]
    EmptyPolyline { route_id: String, points: usize },

    /// A hazard zone carries a radius or confidence outside its valid range.
    #[error("hazard zone {id} is invalid: {reason}")]
    InvalidHazardZone { id: String, reason: String },

    /// Selection was asked to pick from an empty (or fully ineligible) route list.
    #[error("no routes available for selection")]
    NoRoutesAvailable,

    /// The caller cancelled the evaluation before every route was scored.
    #[error("evaluation cancelled")]
    Cancelled,

    /// A scoring task panicked or was aborted by the runtime.
    #[error("scoring task failed: {0}")]
    TaskFailed(String),

    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
