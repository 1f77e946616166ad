//! Scenario files: a set of candidate routes and the hazard zones to score
//! them against.

use anyhow::{Context, Result};
use safepath_core::{
    CancelToken, CandidateRoute, Evaluation, HazardZone, RouteEvaluator, ScoringRules,
    SelectionPolicy, VehicleType,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub routes: Vec<CandidateRoute>,
    #[serde(default)]
    pub hazard_zones: Vec<HazardZone>,
    #[serde(default)]
    pub policy: SelectionPolicy,
    /// Optional scoring overrides; missing fields keep their defaults.
    #[serde(default)]
    pub rules: Option<ScoringRules>,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("scenario is not valid JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Command line flags only ever tighten the policy in the file.
    pub fn apply_overrides(&mut self, avoid_high_risk: bool, vehicle: Option<VehicleType>) {
        if avoid_high_risk {
            self.policy.avoid_high_risk = true;
        }
        if let Some(vehicle) = vehicle {
            self.policy.vehicle_type = Some(vehicle);
        }
    }

    pub async fn evaluate(self, cancel: &CancelToken) -> Result<Evaluation> {
        let evaluator = RouteEvaluator::new(self.rules.unwrap_or_default());
        let evaluation = evaluator
            .evaluate(self.routes, self.hazard_zones, self.policy, cancel)
            .await?;
        Ok(evaluation)
    }
}
