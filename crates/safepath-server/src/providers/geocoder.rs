//! Nominatim-style free-text geocoder.

use super::{trim_base_url, Geocoder, Upstream, UpstreamError};
use reqwest::Client;
use safepath_core::RoutePoint;
use serde::Deserialize;

const UPSTREAM: Upstream = Upstream::Geocoding;

#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Geocoder for NominatimClient {
    async fn resolve(&self, query: &str) -> Result<RoutePoint, UpstreamError> {
        let base = trim_base_url(&self.base_url);
        if base.is_empty() {
            return Err(UpstreamError::not_configured(UPSTREAM, "geocoder URL is empty"));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(UpstreamError::Empty { upstream: UPSTREAM });
        }

        let response = self
            .client
            .get(format!("{}/search", base))
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| UpstreamError::from_reqwest(UPSTREAM, err))?;
        if !response.status().is_success() {
            return Err(UpstreamError::Http {
                upstream: UPSTREAM,
                status: response.status().as_u16(),
            });
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|err| UpstreamError::from_reqwest(UPSTREAM, err))?;
        let point = first_hit(hits, query)?;
        tracing::debug!(query, lat = point.lat, lon = point.lon, "resolved place");
        Ok(point)
    }
}

fn first_hit(hits: Vec<SearchHit>, query: &str) -> Result<RoutePoint, UpstreamError> {
    let hit = hits
        .into_iter()
        .next()
        .ok_or(UpstreamError::Empty { upstream: UPSTREAM })?;
    let parse = |value: &str| {
        value.trim().parse::<f64>().map_err(|err| UpstreamError::Decode {
            upstream: UPSTREAM,
            detail: format!("bad coordinate '{}': {}", value, err),
        })
    };
    Ok(RoutePoint {
        lat: parse(&hit.lat)?,
        lon: parse(&hit.lon)?,
        name: Some(hit.display_name.unwrap_or_else(|| query.to_string())),
    })
}
