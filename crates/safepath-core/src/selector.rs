//! Route selection over scored assessments.

use crate::error::{EngineError, Result};
use crate::models::{RouteAssessment, SelectionPolicy, SelectionResult};
use crate::rules::ScoringRules;
use std::cmp::Ordering;

/// Pick the winning route with the default rules.
pub fn select(assessments: &[RouteAssessment], policy: &SelectionPolicy) -> Result<SelectionResult> {
    select_with_rules(assessments, policy, &ScoringRules::default())
}

/// Pick the winning route.
///
/// With `avoid_high_risk` off the fastest route wins (then shortest). With it
/// on the highest safety score wins (then fastest, then shortest). Remaining
/// ties go to the earliest assessment.
pub fn select_with_rules(
    assessments: &[RouteAssessment],
    policy: &SelectionPolicy,
    rules: &ScoringRules,
) -> Result<SelectionResult> {
    let chosen = assessments
        .iter()
        .enumerate()
        .filter(|(_, assessment)| policy.admits(&assessment.route))
        .min_by(|(ia, a), (ib, b)| compare(a, b, policy).then_with(|| ia.cmp(ib)))
        .map(|(_, assessment)| assessment)
        .ok_or(EngineError::NoRoutesAvailable)?;

    let rationale = rationale(chosen, rules);
    tracing::info!(
        route_id = %chosen.route.id,
        safety_score = chosen.safety_score,
        avoid_high_risk = policy.avoid_high_risk,
        candidates = assessments.len(),
        "selected route"
    );

    Ok(SelectionResult {
        chosen: chosen.clone(),
        rationale,
        policy: *policy,
    })
}

/// Order every assessment best-first under `policy`.
///
/// Routes the policy does not admit sort after all admitted ones.
pub fn rank(assessments: &[RouteAssessment], policy: &SelectionPolicy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..assessments.len()).collect();
    order.sort_by(|&ia, &ib| {
        let a = &assessments[ia];
        let b = &assessments[ib];
        policy
            .admits(&b.route)
            .cmp(&policy.admits(&a.route))
            .then_with(|| compare(a, b, policy))
            .then_with(|| ia.cmp(&ib))
    });
    order
}

/// `Less` means `a` is the better choice.
fn compare(a: &RouteAssessment, b: &RouteAssessment, policy: &SelectionPolicy) -> Ordering {
    let by_time_then_distance = || {
        a.route
            .duration_seconds
            .total_cmp(&b.route.duration_seconds)
            .then_with(|| a.route.distance_meters.total_cmp(&b.route.distance_meters))
    };
    if policy.avoid_high_risk {
        b.safety_score
            .cmp(&a.safety_score)
            .then_with(by_time_then_distance)
    } else {
        by_time_then_distance()
    }
}

fn rationale(chosen: &RouteAssessment, rules: &ScoringRules) -> String {
    if chosen.safety_score >= rules.safe_score_threshold {
        return "Automatically selected the safest available route".to_string();
    }

    let mut text = "Selected the least risky option available".to_string();
    match chosen.risk_areas_avoided {
        0 => {}
        1 => text.push_str(", avoiding 1 high-risk area"),
        n => text.push_str(&format!(", avoiding {} high-risk areas", n)),
    }
    if chosen.risk_level.is_high_risk() {
        text.push_str(&format!(
            ". Use caution: this route still passes through {} risk areas",
            chosen.risk_level
        ));
    }
    text
}
