//! Scoring rules and thresholds for route assessment.

use crate::models::Severity;
use serde::{Deserialize, Serialize};

/// Configuration for route scoring and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Corridor around the polyline in which zones are reported as nearby (km)
    pub proximity_buffer_km: f64,
    /// Base penalty per encountered zone, by severity
    pub penalty_low: f64,
    pub penalty_medium: f64,
    pub penalty_high: f64,
    pub penalty_extreme: f64,
    /// Extra share of the base penalty charged when the route hits the zone center.
    /// Scales linearly with `1 - distance / radius`.
    pub core_exposure_factor: f64,
    /// Scores at or above this are described as the safest available route
    pub safe_score_threshold: u8,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            proximity_buffer_km: 2.0,
            penalty_low: 5.0,
            penalty_medium: 15.0,
            penalty_high: 30.0,
            penalty_extreme: 50.0,
            core_exposure_factor: 1.0,
            safe_score_threshold: 80,
        }
    }
}

impl ScoringRules {
    pub fn penalty_weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.penalty_low,
            Severity::Medium => self.penalty_medium,
            Severity::High => self.penalty_high,
            Severity::Extreme => self.penalty_extreme,
        }
    }

    /// Score deduction for crossing a zone.
    ///
    /// `closeness` is `1 - distance / radius`: 0 at the edge, 1 at the center.
    pub fn encounter_penalty(&self, severity: Severity, confidence: f64, closeness: f64) -> f64 {
        let closeness = closeness.clamp(0.0, 1.0);
        self.penalty_weight(severity)
            * confidence.clamp(0.0, 1.0)
            * (1.0 + self.core_exposure_factor * closeness)
    }
}
