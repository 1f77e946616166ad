//! Evaluation entry point: score every candidate, then select.
//!
//! Routes are scored concurrently on the tokio runtime. The hazard index is
//! shared read-only through an `Arc`; each task builds its own assessment.

use crate::error::{EngineError, Result};
use crate::hazard::HazardIndex;
use crate::models::{CandidateRoute, Evaluation, HazardZone, RouteAssessment, SelectionPolicy};
use crate::rules::ScoringRules;
use crate::scorer::score_with_rules;
use crate::selector::{rank, select_with_rules};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Cooperative cancellation flag, checked between per-route scoring tasks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scores candidate routes against a hazard snapshot and picks one.
#[derive(Debug, Clone, Default)]
pub struct RouteEvaluator {
    rules: ScoringRules,
}

impl RouteEvaluator {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Score all routes in parallel and select one under `policy`.
    ///
    /// Assessments come back in input order regardless of task completion order.
    pub async fn evaluate(
        &self,
        routes: Vec<CandidateRoute>,
        hazard_zones: Vec<HazardZone>,
        policy: SelectionPolicy,
        cancel: &CancelToken,
    ) -> Result<Evaluation> {
        let span = tracing::info_span!(
            "evaluate",
            routes = routes.len(),
            hazard_zones = hazard_zones.len(),
            avoid_high_risk = policy.avoid_high_risk
        );
        self.evaluate_inner(routes, hazard_zones, policy, cancel)
            .instrument(span)
            .await
    }

    async fn evaluate_inner(
        &self,
        routes: Vec<CandidateRoute>,
        hazard_zones: Vec<HazardZone>,
        policy: SelectionPolicy,
        cancel: &CancelToken,
    ) -> Result<Evaluation> {
        let index = Arc::new(HazardIndex::new(hazard_zones)?);
        if routes.is_empty() {
            return Err(EngineError::NoRoutesAvailable);
        }

        let count = routes.len();
        let mut tasks = JoinSet::new();
        for (position, route) in routes.into_iter().enumerate() {
            let index = Arc::clone(&index);
            let rules = self.rules.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                if cancel.is_cancelled() {
                    return (position, Err(EngineError::Cancelled));
                }
                (position, score_with_rules(&route, &index, &rules))
            });
        }

        let mut slots: Vec<Option<Result<RouteAssessment>>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            if cancel.is_cancelled() {
                tasks.abort_all();
                tracing::warn!(
                    scored = slots.iter().filter(|s| s.is_some()).count(),
                    "evaluation cancelled"
                );
                return Err(EngineError::Cancelled);
            }
            let (position, result) = joined.map_err(|err| EngineError::TaskFailed(err.to_string()))?;
            slots[position] = Some(result);
        }

        // Report the first failing route in input order so errors are deterministic too
        let assessments = slots
            .into_iter()
            .map(|slot| slot.unwrap_or(Err(EngineError::Cancelled)))
            .collect::<Result<Vec<_>>>()?;

        self.conclude(assessments, policy)
    }

    /// Sequential variant for callers without a tokio runtime.
    pub fn evaluate_blocking(
        &self,
        routes: &[CandidateRoute],
        hazard_zones: Vec<HazardZone>,
        policy: SelectionPolicy,
        cancel: &CancelToken,
    ) -> Result<Evaluation> {
        let index = HazardIndex::new(hazard_zones)?;
        if routes.is_empty() {
            return Err(EngineError::NoRoutesAvailable);
        }

        let mut assessments = Vec::with_capacity(routes.len());
        for route in routes {
            if cancel.is_cancelled() {
                tracing::warn!(scored = assessments.len(), "evaluation cancelled");
                return Err(EngineError::Cancelled);
            }
            assessments.push(score_with_rules(route, &index, &self.rules)?);
        }

        self.conclude(assessments, policy)
    }

    fn conclude(
        &self,
        assessments: Vec<RouteAssessment>,
        policy: SelectionPolicy,
    ) -> Result<Evaluation> {
        let selection = select_with_rules(&assessments, &policy, &self.rules)?;
        let ranking = rank(&assessments, &policy);
        Ok(Evaluation {
            selection,
            assessments,
            ranking,
        })
    }
}
