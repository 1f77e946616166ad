//! End-to-end scoring and selection scenarios.

use safepath_core::geo::{km_to_lat, km_to_lon};
use safepath_core::{
    score, select, CancelToken, CandidateRoute, EngineError, GeoPoint, HazardIndex, HazardZone,
    RouteEvaluator, SelectionPolicy, Severity, VehicleType,
};

const KL: GeoPoint = GeoPoint::new(3.1390, 101.6869);

fn kl_flood_zone() -> HazardZone {
    HazardZone::new("kl-flood", KL, 5.0, Severity::High, 0.9, "Kuala Lumpur")
}

/// North-south route whose closest approach to KL is `offset_km` to the east.
fn route_east_of_kl(id: &str, offset_km: f64, duration_s: f64) -> CandidateRoute {
    let lon = KL.lon + km_to_lon(offset_km, KL.lat);
    CandidateRoute::new(
        id,
        vec![
            GeoPoint::new(KL.lat - km_to_lat(15.0, KL.lat), lon),
            GeoPoint::new(KL.lat, lon),
            GeoPoint::new(KL.lat + km_to_lat(15.0, KL.lat), lon),
        ],
        30_000.0,
        duration_s,
        VehicleType::Driving,
    )
}

#[test]
fn route_through_center_versus_route_six_km_away() {
    let index = HazardIndex::new(vec![kl_flood_zone()]).unwrap();
    let route_a = route_east_of_kl("A", 0.0, 600.0);
    let route_b = route_east_of_kl("B", 6.0, 900.0);

    let a = score(&route_a, &index).unwrap();
    assert_eq!(a.risk_areas_encountered, 1);
    assert_eq!(a.risk_level, Severity::High);
    assert!(a.safety_score <= 70, "score was {}", a.safety_score);
    assert!(a.risk_details[0].min_distance_km < 0.01);

    let b = score(&route_b, &index).unwrap();
    assert_eq!(b.risk_areas_encountered, 0);
    assert_eq!(b.safety_score, 100);
    assert_eq!(b.risk_level, Severity::Low);
    assert_eq!(b.risk_areas_avoided, 1);
    // Inside the 2 km corridor: listed, not counted
    assert_eq!(b.risk_details.len(), 1);
    assert!(!b.risk_details[0].encountered);
    assert!((b.risk_details[0].min_distance_km - 6.0).abs() < 0.05);

    let selection = select(&[a.clone(), b.clone()], &SelectionPolicy::new(true)).unwrap();
    assert_eq!(selection.chosen.route.id, "B");
    assert_eq!(
        selection.rationale,
        "Automatically selected the safest available route"
    );

    let selection = select(&[a, b], &SelectionPolicy::new(false)).unwrap();
    assert_eq!(selection.chosen.route.id, "A");
}

#[test]
fn far_route_is_untouched() {
    let index = HazardIndex::new(vec![kl_flood_zone()]).unwrap();
    let far = score(&route_east_of_kl("far", 7.5, 600.0), &index).unwrap();
    assert_eq!(far.safety_score, 100);
    assert_eq!(far.risk_level, Severity::Low);
    assert_eq!(far.risk_areas_encountered, 0);
    assert!(far.risk_details.is_empty());
    assert_eq!(far.warnings, vec!["Route avoids all known risk areas"]);
}

#[test]
fn crossing_the_center_scores_lower_than_grazing() {
    let index = HazardIndex::new(vec![kl_flood_zone()]).unwrap();
    let center = score(&route_east_of_kl("center", 0.0, 600.0), &index).unwrap();
    let graze = score(&route_east_of_kl("graze", 4.5, 600.0), &index).unwrap();

    assert_eq!(graze.risk_areas_encountered, 1);
    assert!(center.safety_score < graze.safety_score);
}

#[test]
fn extreme_and_low_both_encountered() {
    let extreme = HazardZone::new("x", KL, 3.0, Severity::Extreme, 0.8, "Chow Kit");
    let low = HazardZone::new("l", KL, 4.0, Severity::Low, 0.8, "Bukit Bintang");
    let route = route_east_of_kl("r", 1.0, 600.0);

    let only_extreme = score(&route, &HazardIndex::new(vec![extreme.clone()]).unwrap()).unwrap();
    let both = score(&route, &HazardIndex::new(vec![extreme, low]).unwrap()).unwrap();

    assert_eq!(both.risk_level, Severity::Extreme);
    assert_eq!(both.risk_areas_encountered, 2);
    assert!(both.safety_score < only_extreme.safety_score);
    assert!(both.warnings[0].starts_with("Extreme"));
}

#[test]
fn score_stays_in_range_for_many_zones() {
    let zones: Vec<HazardZone> = (0..40)
        .map(|i| {
            let severity = Severity::ALL[i % 4];
            let offset = (i as f64) * 0.4;
            let center = GeoPoint::new(KL.lat, KL.lon + km_to_lon(offset, KL.lat));
            HazardZone::new(
                format!("z{i}"),
                center,
                1.0 + (i % 3) as f64,
                severity,
                (i % 10) as f64 / 9.0,
                format!("zone {i}"),
            )
        })
        .collect();
    let index = HazardIndex::new(zones).unwrap();
    for offset in [0.0, 2.0, 5.0, 10.0, 20.0] {
        let assessment = score(&route_east_of_kl("r", offset, 600.0), &index).unwrap();
        assert!(assessment.safety_score <= 100);
        let encountered = assessment
            .risk_details
            .iter()
            .filter(|d| d.encountered)
            .count();
        assert_eq!(encountered, assessment.risk_areas_encountered);
        assert!(assessment
            .risk_details
            .windows(2)
            .all(|w| w[0].min_distance_km <= w[1].min_distance_km));
    }
}

#[test]
fn equal_score_and_duration_resolves_to_first() {
    let index = HazardIndex::default();
    let first = score(&route_east_of_kl("first", 0.0, 600.0), &index).unwrap();
    let second = score(&route_east_of_kl("second", 1.0, 600.0), &index).unwrap();

    for avoid in [true, false] {
        let selection =
            select(&[first.clone(), second.clone()], &SelectionPolicy::new(avoid)).unwrap();
        assert_eq!(selection.chosen.route.id, "first");
    }
}

#[test]
fn empty_selection_fails() {
    assert_eq!(
        select(&[], &SelectionPolicy::new(false)).unwrap_err(),
        EngineError::NoRoutesAvailable
    );
}

#[tokio::test]
async fn evaluate_is_deterministic() {
    let routes = vec![
        route_east_of_kl("A", 0.0, 600.0),
        route_east_of_kl("B", 6.0, 900.0),
        route_east_of_kl("C", 3.0, 700.0),
    ];
    let zones = vec![
        kl_flood_zone(),
        HazardZone::new("dup", KL, 5.0, Severity::High, 0.9, "Kuala Lumpur"),
    ];
    let policy = SelectionPolicy::new(true);
    let evaluator = RouteEvaluator::default();

    let first = evaluator
        .evaluate(routes.clone(), zones.clone(), policy, &CancelToken::new())
        .await
        .unwrap();
    let second = evaluator
        .evaluate(routes, zones, policy, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_vec(&first.selection).unwrap(),
        serde_json::to_vec(&second.selection).unwrap()
    );
    assert_eq!(first.ranking, second.ranking);
    assert_eq!(first.selection.chosen.route.id, "B");
    // Duplicate zones produce duplicate details
    assert_eq!(first.assessments[0].risk_areas_encountered, 2);
}

#[tokio::test]
async fn no_hazard_data_scores_every_route_perfect() {
    let routes = vec![
        route_east_of_kl("A", 0.0, 600.0),
        route_east_of_kl("B", 6.0, 900.0),
    ];
    let evaluation = RouteEvaluator::default()
        .evaluate(
            routes,
            Vec::new(),
            SelectionPolicy::new(true),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert!(evaluation
        .assessments
        .iter()
        .all(|a| a.safety_score == 100 && a.risk_level == Severity::Low));
    assert_eq!(evaluation.selection.chosen.route.id, "A");
}

#[tokio::test]
async fn invalid_zone_coordinate_is_rejected() {
    let bad = HazardZone::new(
        "bad",
        GeoPoint::new(f64::NAN, 0.0),
        1.0,
        Severity::Low,
        0.5,
        "nowhere",
    );
    let err = RouteEvaluator::default()
        .evaluate(
            vec![route_east_of_kl("A", 0.0, 600.0)],
            vec![bad],
            SelectionPolicy::new(false),
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCoordinate { .. }));
}
