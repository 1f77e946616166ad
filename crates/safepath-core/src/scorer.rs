//! Per-route hazard assessment.
//!
//! Walks one candidate polyline against the [`HazardIndex`] and turns the
//! zones it crosses or passes near into a [`RouteAssessment`].

use crate::error::{EngineError, Result};
use crate::hazard::HazardIndex;
use crate::models::{CandidateRoute, RouteAssessment, RouteRiskDetail, Severity};
use crate::rules::ScoringRules;

pub const RECOMMEND_AVOID: &str = "avoid if possible, seek alternate transportation";
pub const RECOMMEND_CAUTION: &str = "proceed with caution";
pub const RECOMMEND_STAY_ALERT: &str = "stay alert to changing conditions";
pub const RECOMMEND_MONITOR: &str = "monitor conditions near this area";
pub const ALL_CLEAR_WARNING: &str = "Route avoids all known risk areas";

const MAX_SCORE: f64 = 100.0;

/// Score a route with the default rules.
pub fn score(route: &CandidateRoute, index: &HazardIndex) -> Result<RouteAssessment> {
    score_with_rules(route, index, &ScoringRules::default())
}

/// Score a route using configured rules.
pub fn score_with_rules(
    route: &CandidateRoute,
    index: &HazardIndex,
    rules: &ScoringRules,
) -> Result<RouteAssessment> {
    if route.polyline.len() < 2 {
        return Err(EngineError::EmptyPolyline {
            route_id: route.id.clone(),
            points: route.polyline.len(),
        });
    }

    let nearby = index.near(&route.polyline, rules.proximity_buffer_km)?;

    let mut crossed = vec![false; index.len()];
    let mut risk_details = Vec::with_capacity(nearby.len());
    let mut score = MAX_SCORE;

    for hit in nearby {
        let zone = hit.zone;
        let encountered = hit.min_distance_km <= zone.radius_km;
        if encountered {
            crossed[hit.index] = true;
            let closeness = 1.0 - hit.min_distance_km / zone.radius_km;
            score -= rules.encounter_penalty(zone.severity, zone.confidence, closeness);
        }
        risk_details.push(RouteRiskDetail {
            zone: zone.clone(),
            min_distance_km: hit.min_distance_km,
            encountered,
            recommendation: recommendation(zone.severity, encountered).to_string(),
        });
    }

    let risk_areas_encountered = risk_details.iter().filter(|d| d.encountered).count();
    let risk_areas_avoided = index
        .zones()
        .iter()
        .zip(&crossed)
        .filter(|(zone, crossed)| zone.severity.is_high_risk() && !**crossed)
        .count();
    let risk_level = risk_details
        .iter()
        .filter(|d| d.encountered)
        .map(|d| d.zone.severity)
        .max()
        .unwrap_or(Severity::Low);
    // Floor so that any encounter costs at least one point
    let safety_score = score.clamp(0.0, MAX_SCORE).floor() as u8;
    let warnings = build_warnings(&risk_details);

    tracing::debug!(
        route_id = %route.id,
        safety_score,
        risk_level = %risk_level,
        encountered = risk_areas_encountered,
        avoided = risk_areas_avoided,
        "scored route"
    );

    Ok(RouteAssessment {
        route: route.clone(),
        safety_score,
        risk_level,
        risk_details,
        risk_areas_encountered,
        risk_areas_avoided,
        warnings,
    })
}

fn recommendation(severity: Severity, encountered: bool) -> &'static str {
    if !encountered {
        return RECOMMEND_MONITOR;
    }
    match severity {
        Severity::Extreme | Severity::High => RECOMMEND_AVOID,
        Severity::Medium => RECOMMEND_CAUTION,
        Severity::Low => RECOMMEND_STAY_ALERT,
    }
}

/// One line per crossed zone, most severe first. Details arrive closest first,
/// and the stable sort keeps that order within a severity.
fn build_warnings(details: &[RouteRiskDetail]) -> Vec<String> {
    let mut crossed: Vec<&RouteRiskDetail> = details.iter().filter(|d| d.encountered).collect();
    if crossed.is_empty() {
        return vec![ALL_CLEAR_WARNING.to_string()];
    }
    crossed.sort_by(|a, b| b.zone.severity.cmp(&a.zone.severity));
    crossed
        .into_iter()
        .map(|detail| {
            format!(
                "{} {} risk near {}, consider alternate route",
                detail.zone.severity.title(),
                detail.zone.kind.noun(),
                detail.zone.label
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::km_to_lon;
    use crate::models::{GeoPoint, HazardKind, HazardZone, VehicleType};

    fn straight_route(id: &str, lon: f64) -> CandidateRoute {
        CandidateRoute::new(
            id,
            vec![GeoPoint::new(-0.2, lon), GeoPoint::new(0.2, lon)],
            44_000.0,
            1800.0,
            VehicleType::Driving,
        )
    }

    fn zone(id: &str, severity: Severity, confidence: f64, radius_km: f64) -> HazardZone {
        HazardZone::new(
            id,
            GeoPoint::new(0.0, 0.0),
            radius_km,
            severity,
            confidence,
            format!("{id} district"),
        )
    }

    #[test]
    fn no_zones_scores_perfect() {
        let assessment = score(&straight_route("r", 0.0), &HazardIndex::default()).unwrap();
        assert_eq!(assessment.safety_score, 100);
        assert_eq!(assessment.risk_level, Severity::Low);
        assert_eq!(assessment.risk_areas_encountered, 0);
        assert_eq!(assessment.warnings, vec![ALL_CLEAR_WARNING.to_string()]);
    }

    #[test]
    fn too_short_polyline_is_rejected() {
        let mut route = straight_route("short", 0.0);
        route.polyline.truncate(1);
        let err = score(&route, &HazardIndex::default()).unwrap_err();
        assert_eq!(
            err,
            EngineError::EmptyPolyline {
                route_id: "short".to_string(),
                points: 1
            }
        );
    }

    #[test]
    fn nearby_zone_is_reported_but_not_penalized() {
        let index = HazardIndex::new(vec![zone("z", Severity::Extreme, 1.0, 3.0)]).unwrap();
        let route = straight_route("r", km_to_lon(4.0, 0.0));
        let assessment = score(&route, &index).unwrap();

        assert_eq!(assessment.safety_score, 100);
        assert_eq!(assessment.risk_areas_encountered, 0);
        assert_eq!(assessment.risk_areas_avoided, 1);
        assert_eq!(assessment.risk_details.len(), 1);
        assert!(!assessment.risk_details[0].encountered);
        assert_eq!(assessment.risk_details[0].recommendation, RECOMMEND_MONITOR);
    }

    #[test]
    fn recommendations_follow_severity() {
        let index = HazardIndex::new(vec![
            zone("x", Severity::Extreme, 0.5, 2.0),
            zone("m", Severity::Medium, 0.5, 2.0),
            zone("l", Severity::Low, 0.5, 2.0),
        ])
        .unwrap();
        let assessment = score(&straight_route("r", 0.0), &index).unwrap();
        let recs: Vec<(&str, &str)> = assessment
            .risk_details
            .iter()
            .map(|d| (d.zone.id.as_str(), d.recommendation.as_str()))
            .collect();
        assert_eq!(
            recs,
            vec![
                ("x", RECOMMEND_AVOID),
                ("m", RECOMMEND_CAUTION),
                ("l", RECOMMEND_STAY_ALERT)
            ]
        );
    }

    #[test]
    fn warnings_are_most_severe_first() {
        let index = HazardIndex::new(vec![
            zone("low", Severity::Low, 0.5, 2.0),
            zone("flood", Severity::High, 0.5, 2.0).with_kind(HazardKind::Flood),
        ])
        .unwrap();
        let assessment = score(&straight_route("r", 0.0), &index).unwrap();
        assert_eq!(
            assessment.warnings,
            vec![
                "High flood risk near flood district, consider alternate route".to_string(),
                "Low weather risk near low district, consider alternate route".to_string(),
            ]
        );
    }

    #[test]
    fn risk_level_is_max_and_penalties_accumulate() {
        let extreme_only = HazardIndex::new(vec![zone("x", Severity::Extreme, 0.5, 2.0)]).unwrap();
        let both = HazardIndex::new(vec![
            zone("x", Severity::Extreme, 0.5, 2.0),
            zone("l", Severity::Low, 1.0, 2.0),
        ])
        .unwrap();
        let route = straight_route("r", 0.0);

        let single = score(&route, &extreme_only).unwrap();
        let combined = score(&route, &both).unwrap();
        assert_eq!(combined.risk_level, Severity::Extreme);
        assert_eq!(combined.risk_areas_encountered, 2);
        assert!(combined.safety_score < single.safety_score);
    }

    #[test]
    fn score_clamps_at_zero() {
        let zones = (0..5)
            .map(|i| zone(&format!("x{i}"), Severity::Extreme, 1.0, 2.0))
            .collect();
        let index = HazardIndex::new(zones).unwrap();
        let assessment = score(&straight_route("r", 0.0), &index).unwrap();
        assert_eq!(assessment.safety_score, 0);
        assert_eq!(assessment.risk_areas_avoided, 0);
    }

    #[test]
    fn faint_encounter_still_costs_a_point() {
        let index = HazardIndex::new(vec![zone("drizzle", Severity::Low, 0.05, 5.0)]).unwrap();
        let center = score(&straight_route("center", 0.0), &index).unwrap();
        let graze = score(&straight_route("graze", km_to_lon(4.9, 0.0)), &index).unwrap();

        assert_eq!(center.risk_areas_encountered, 1);
        assert_eq!(graze.risk_areas_encountered, 1);
        assert!(center.safety_score < 100);
        assert!(graze.safety_score < 100);
        assert!(center.safety_score <= graze.safety_score);
    }

    #[test]
    fn higher_confidence_costs_more() {
        let route = straight_route("r", 0.0);
        let sure = HazardIndex::new(vec![zone("z", Severity::High, 1.0, 2.0)]).unwrap();
        let unsure = HazardIndex::new(vec![zone("z", Severity::High, 0.2, 2.0)]).unwrap();
        assert!(
            score(&route, &sure).unwrap().safety_score
                < score(&route, &unsure).unwrap().safety_score
        );
    }
}
