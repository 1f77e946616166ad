//! Trip planning: resolve places, fetch candidate routes and hazard data,
//! then hand everything to the engine.

use crate::hazards::HazardService;
use crate::providers::{Geocoder, HazardProvider, RoutingProvider, UpstreamError};
use safepath_core::geo::validate_point;
use safepath_core::{
    CancelToken, CandidateRoute, EngineError, Evaluation, GeoPoint, RouteEvaluator, RoutePoint,
    SelectionPolicy, VehicleType,
};
use serde::Deserialize;

/// A trip endpoint given either as coordinates or as a place name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Place {
    Coordinates(RoutePoint),
    Named { query: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub start: Place,
    pub end: Place,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub avoid_high_risk: bool,
    /// Locations to pull hazard data for. Defaults to the trip endpoints plus
    /// the middle vertex of each candidate route.
    #[serde(default)]
    pub monitored_locations: Vec<GeoPoint>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Borrowed collaborators for one planning call.
pub struct Planner<'a, R, H, G> {
    pub routing: &'a R,
    pub hazards: &'a HazardService<H>,
    pub geocoder: &'a G,
    pub evaluator: &'a RouteEvaluator,
}

impl<R, H, G> Planner<'_, R, H, G>
where
    R: RoutingProvider,
    H: HazardProvider,
    G: Geocoder,
{
    pub async fn plan(
        &self,
        request: TripRequest,
        cancel: &CancelToken,
    ) -> Result<Evaluation, PlanError> {
        let (start, end) = futures::try_join!(
            self.resolve(&request.start),
            self.resolve(&request.end)
        )?;
        validate_point(&start.point())?;
        validate_point(&end.point())?;
        request
            .monitored_locations
            .iter()
            .try_for_each(validate_point)?;

        let routes = self
            .routing
            .routes(&start, &end, request.vehicle_type)
            .await?;

        let monitored = if request.monitored_locations.is_empty() {
            default_monitored_locations(&start, &end, &routes)
        } else {
            request.monitored_locations
        };
        let zones = self.hazards.hazards_for(&monitored).await?;

        tracing::info!(
            routes = routes.len(),
            zones = zones.len(),
            vehicle = %request.vehicle_type,
            "planning trip"
        );

        let policy = SelectionPolicy::new(request.avoid_high_risk).for_vehicle(request.vehicle_type);
        Ok(self.evaluator.evaluate(routes, zones, policy, cancel).await?)
    }

    async fn resolve(&self, place: &Place) -> Result<RoutePoint, UpstreamError> {
        match place {
            Place::Coordinates(point) => Ok(point.clone()),
            Place::Named { query } => self.geocoder.resolve(query).await,
        }
    }
}

fn default_monitored_locations(
    start: &RoutePoint,
    end: &RoutePoint,
    routes: &[CandidateRoute],
) -> Vec<GeoPoint> {
    let mut locations = vec![start.point(), end.point()];
    locations.extend(
        routes
            .iter()
            .filter_map(|route| route.polyline.get(route.polyline.len() / 2).copied()),
    );
    locations
}
