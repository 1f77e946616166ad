pub mod engine;
pub mod error;
pub mod geo;
pub mod hazard;
pub mod models;
pub mod rules;
pub mod scorer;
pub mod selector;

pub use engine::{CancelToken, RouteEvaluator};
pub use error::{EngineError, Result};
pub use geo::{distance_km, min_distance_to_polyline_km, point_in_circle};
pub use hazard::{HazardIndex, NearbyZone};
pub use models::{
    CandidateRoute, Evaluation, GeoPoint, HazardKind, HazardZone, RiskLevel, RouteAssessment,
    RoutePoint, RouteRiskDetail, SelectionPolicy, SelectionResult, Severity, VehicleType,
};
pub use rules::ScoringRules;
pub use scorer::{score, score_with_rules};
pub use selector::{rank, select, select_with_rules};
