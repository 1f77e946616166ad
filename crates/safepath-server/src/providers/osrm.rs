//! OSRM-compatible routing client.

use super::{trim_base_url, RoutingProvider, Upstream, UpstreamError};
use reqwest::Client;
use safepath_core::{CandidateRoute, GeoPoint, RoutePoint, VehicleType};
use serde::Deserialize;

const UPSTREAM: Upstream = Upstream::Routing;

#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lon, lat]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    summary: String,
}

impl OsrmClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn profile(vehicle_type: VehicleType) -> &'static str {
        match vehicle_type {
            VehicleType::Driving => "driving",
            VehicleType::Walking => "foot",
            VehicleType::Cycling => "bike",
        }
    }
}

impl RoutingProvider for OsrmClient {
    async fn routes(
        &self,
        start: &RoutePoint,
        end: &RoutePoint,
        vehicle_type: VehicleType,
    ) -> Result<Vec<CandidateRoute>, UpstreamError> {
        let base = trim_base_url(&self.base_url);
        if base.is_empty() {
            return Err(UpstreamError::not_configured(UPSTREAM, "routing URL is empty"));
        }

        let url = format!(
            "{}/route/v1/{}/{},{};{},{}",
            base,
            Self::profile(vehicle_type),
            start.lon,
            start.lat,
            end.lon,
            end.lat
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("alternatives", "true"),
                ("overview", "full"),
                ("geometries", "geojson"),
            ])
            .send()
            .await
            .map_err(|err| UpstreamError::from_reqwest(UPSTREAM, err))?;

        // OSRM answers NoRoute with a 400 and a JSON body, so read the body first
        let status = response.status();
        let payload: OsrmResponse = match response.json().await {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(UpstreamError::Http {
                    upstream: UPSTREAM,
                    status: status.as_u16(),
                })
            }
            Err(err) => return Err(UpstreamError::from_reqwest(UPSTREAM, err)),
        };

        let routes = parse_routes(payload, vehicle_type, start, end)?;
        tracing::debug!(count = routes.len(), profile = Self::profile(vehicle_type), "fetched routes");
        Ok(routes)
    }
}

fn parse_routes(
    payload: OsrmResponse,
    vehicle_type: VehicleType,
    start: &RoutePoint,
    end: &RoutePoint,
) -> Result<Vec<CandidateRoute>, UpstreamError> {
    match payload.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(UpstreamError::Empty { upstream: UPSTREAM }),
        other => {
            return Err(UpstreamError::Decode {
                upstream: UPSTREAM,
                detail: format!(
                    "{}: {}",
                    other,
                    payload.message.as_deref().unwrap_or("no message")
                ),
            })
        }
    }

    let routes: Vec<CandidateRoute> = payload
        .routes
        .into_iter()
        .filter(|route| route.geometry.coordinates.len() >= 2)
        .enumerate()
        .map(|(i, route)| {
            let summary = route
                .legs
                .iter()
                .map(|leg| leg.summary.trim())
                .filter(|summary| !summary.is_empty())
                .collect::<Vec<_>>()
                .join(" / ");
            CandidateRoute {
                id: format!("route-{}", i + 1),
                polyline: route
                    .geometry
                    .coordinates
                    .iter()
                    .map(|[lon, lat]| GeoPoint::new(*lat, *lon))
                    .collect(),
                distance_meters: route.distance.max(0.0),
                duration_seconds: route.duration.max(0.0),
                vehicle_type,
                summary: (!summary.is_empty()).then_some(summary),
                start: Some(start.clone()),
                end: Some(end.clone()),
            }
        })
        .collect();

    if routes.is_empty() {
        return Err(UpstreamError::Empty { upstream: UPSTREAM });
    }
    Ok(routes)
}
