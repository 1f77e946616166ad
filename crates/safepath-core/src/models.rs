//! Core data models for hazard-aware route scoring.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Hazard severity. Ordered `Low < Medium < High < Extreme`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Extreme,
}

/// Route-level risk uses the same scale as zone severity.
pub type RiskLevel = Severity;

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Extreme,
    ];

    /// High and extreme zones are the ones a route is credited for avoiding.
    pub fn is_high_risk(self) -> bool {
        self >= Severity::High
    }

    /// Capitalized form used at the start of warning lines.
    pub fn title(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Extreme => "Extreme",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = EngineError;

    /// Accepts the loosely-typed labels upstream assessment services emit.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Ok(Severity::Low),
            "medium" | "moderate" => Ok(Severity::Medium),
            "high" | "severe" => Ok(Severity::High),
            "extreme" | "critical" => Ok(Severity::Extreme),
            _ => Err(EngineError::UnknownSeverity(value.to_string())),
        }
    }
}

/// What kind of hazard a zone represents. Only used for warning text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Flood,
    Storm,
    Wind,
    Heat,
    Landslide,
    #[default]
    General,
}

impl HazardKind {
    pub fn noun(self) -> &'static str {
        match self {
            HazardKind::Flood => "flood",
            HazardKind::Storm => "storm",
            HazardKind::Wind => "wind",
            HazardKind::Heat => "heat",
            HazardKind::Landslide => "landslide",
            HazardKind::General => "weather",
        }
    }
}

/// A circular hazard area produced by the upstream risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub id: String,
    pub center: GeoPoint,
    pub radius_km: f64,
    pub severity: Severity,
    /// Assessment confidence in [0, 1]
    pub confidence: f64,
    pub label: String,
    #[serde(default)]
    pub kind: HazardKind,
}

impl HazardZone {
    pub fn new(
        id: impl Into<String>,
        center: GeoPoint,
        radius_km: f64,
        severity: Severity,
        confidence: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            center,
            radius_km,
            severity,
            confidence,
            label: label.into(),
            kind: HazardKind::General,
        }
    }

    pub fn with_kind(mut self, kind: HazardKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check the zone's own invariants: finite center, radius > 0, confidence in [0, 1].
    pub fn validate(&self) -> Result<()> {
        crate::geo::validate_point(&self.center)?;
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(EngineError::InvalidHazardZone {
                id: self.id.clone(),
                reason: format!("radius_km must be > 0, got {}", self.radius_km),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(EngineError::InvalidHazardZone {
                id: self.id.clone(),
                reason: format!("confidence must be within [0, 1], got {}", self.confidence),
            });
        }
        Ok(())
    }

    /// Point-in-circle test against this zone's footprint.
    pub fn contains(&self, point: GeoPoint) -> Result<bool> {
        crate::geo::point_in_circle(point, self.center, self.radius_km)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VehicleType::Driving => "driving",
            VehicleType::Walking => "walking",
            VehicleType::Cycling => "cycling",
        })
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "driving" | "car" => Ok(VehicleType::Driving),
            "walking" | "foot" => Ok(VehicleType::Walking),
            "cycling" | "bike" => Ok(VehicleType::Cycling),
            other => Err(format!("unknown vehicle type '{}'", other)),
        }
    }
}

/// Start/end anchor of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RoutePoint {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// A route alternative supplied by the routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub id: String,
    pub polyline: Vec<GeoPoint>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RoutePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<RoutePoint>,
}

impl CandidateRoute {
    pub fn new(
        id: impl Into<String>,
        polyline: Vec<GeoPoint>,
        distance_meters: f64,
        duration_seconds: f64,
        vehicle_type: VehicleType,
    ) -> Self {
        Self {
            id: id.into(),
            polyline,
            distance_meters,
            duration_seconds,
            vehicle_type,
            summary: None,
            start: None,
            end: None,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

/// One hazard zone's relationship to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRiskDetail {
    pub zone: HazardZone,
    pub min_distance_km: f64,
    /// True when the polyline crosses the zone footprint
    pub encountered: bool,
    pub recommendation: String,
}

impl RouteRiskDetail {
    pub fn min_distance_m(&self) -> f64 {
        self.min_distance_km * 1000.0
    }
}

/// Scored view of a single candidate route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssessment {
    pub route: CandidateRoute,
    /// 0..=100, higher is safer
    pub safety_score: u8,
    pub risk_level: RiskLevel,
    /// Closest zone first
    pub risk_details: Vec<RouteRiskDetail>,
    pub risk_areas_encountered: usize,
    pub risk_areas_avoided: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    #[serde(default)]
    pub avoid_high_risk: bool,
    /// Restrict selection to routes of this vehicle class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleType>,
}

impl SelectionPolicy {
    pub fn new(avoid_high_risk: bool) -> Self {
        Self {
            avoid_high_risk,
            vehicle_type: None,
        }
    }

    pub fn for_vehicle(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    pub fn admits(&self, route: &CandidateRoute) -> bool {
        self.vehicle_type
            .map_or(true, |vehicle| vehicle == route.vehicle_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub chosen: RouteAssessment,
    pub rationale: String,
    pub policy: SelectionPolicy,
}

/// Full outcome of one evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub selection: SelectionResult,
    /// Same order as the input routes
    pub assessments: Vec<RouteAssessment>,
    /// Indices into `assessments`, best first under the request policy
    pub ranking: Vec<usize>,
}
