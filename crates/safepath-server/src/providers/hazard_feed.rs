//! Client for the hazard-assessment feed.
//!
//! The feed turns weather observations into circular hazard zones around a
//! monitored location. Severity arrives as a free-form label and is mapped
//! onto the closed [`Severity`] scale here.

use super::{trim_base_url, HazardProvider, Upstream, UpstreamError};
use reqwest::Client;
use safepath_core::{GeoPoint, HazardKind, HazardZone, Severity};
use serde::Deserialize;

const UPSTREAM: Upstream = Upstream::Hazards;

#[derive(Debug, Clone)]
pub struct HazardFeedClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    zones: Vec<FeedZone>,
}

#[derive(Debug, Deserialize)]
struct FeedZone {
    id: String,
    lat: f64,
    lon: f64,
    radius_km: f64,
    severity: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    kind: Option<HazardKind>,
}

fn default_confidence() -> f64 {
    0.5
}

impl HazardFeedClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
        }
    }
}

impl HazardProvider for HazardFeedClient {
    async fn hazards_at(&self, location: GeoPoint) -> Result<Vec<HazardZone>, UpstreamError> {
        let url = trim_base_url(&self.base_url);
        if url.is_empty() {
            return Err(UpstreamError::not_configured(UPSTREAM, "hazard feed URL is empty"));
        }

        let mut request = self.client.get(url).query(&[
            ("lat", location.lat.to_string()),
            ("lon", location.lon.to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| UpstreamError::from_reqwest(UPSTREAM, err))?;
        match response.status().as_u16() {
            401 | 403 => {
                return Err(UpstreamError::not_configured(
                    UPSTREAM,
                    "hazard feed rejected the API key",
                ))
            }
            code if !response.status().is_success() => {
                return Err(UpstreamError::Http {
                    upstream: UPSTREAM,
                    status: code,
                })
            }
            _ => {}
        }

        let payload: FeedResponse = response
            .json()
            .await
            .map_err(|err| UpstreamError::from_reqwest(UPSTREAM, err))?;
        Ok(convert_zones(payload, location))
    }
}

/// Keep zones that map onto the engine's model; drop and log the rest.
fn convert_zones(payload: FeedResponse, location: GeoPoint) -> Vec<HazardZone> {
    payload
        .zones
        .into_iter()
        .filter_map(|raw| {
            let severity = match raw.severity.parse::<Severity>() {
                Ok(severity) => severity,
                Err(err) => {
                    tracing::warn!(zone_id = %raw.id, "skipping hazard zone: {}", err);
                    return None;
                }
            };
            let label = raw
                .label
                .unwrap_or_else(|| format!("{:.4}, {:.4}", location.lat, location.lon));
            let zone = HazardZone {
                id: raw.id,
                center: GeoPoint::new(raw.lat, raw.lon),
                radius_km: raw.radius_km,
                severity,
                confidence: raw.confidence.clamp(0.0, 1.0),
                label,
                kind: raw.kind.unwrap_or_default(),
            };
            match zone.validate() {
                Ok(()) => Some(zone),
                Err(err) => {
                    tracing::warn!(zone_id = %zone.id, "skipping hazard zone: {}", err);
                    None
                }
            }
        })
        .collect()
}
