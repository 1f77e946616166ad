//! Upstream collaborators the engine depends on but does not implement.
//!
//! Each provider reports failures as a distinct [`UpstreamError`] so callers
//! never confuse "provider unavailable" with "no routes" or "no risk".

pub mod geocoder;
pub mod hazard_feed;
pub mod osrm;

use safepath_core::{CandidateRoute, GeoPoint, HazardZone, RoutePoint, VehicleType};
use std::fmt;
use std::future::Future;

pub use geocoder::NominatimClient;
pub use hazard_feed::HazardFeedClient;
pub use osrm::OsrmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Routing,
    Hazards,
    Geocoding,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Upstream::Routing => "routing",
            Upstream::Hazards => "hazard",
            Upstream::Geocoding => "geocoding",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Missing base URL or API credentials.
    #[error("{upstream} provider is not configured: {detail}")]
    NotConfigured { upstream: Upstream, detail: String },

    #[error("{upstream} request failed: {detail}")]
    Network { upstream: Upstream, detail: String },

    #[error("{upstream} provider returned HTTP {status}")]
    Http { upstream: Upstream, status: u16 },

    #[error("{upstream} response could not be decoded: {detail}")]
    Decode { upstream: Upstream, detail: String },

    #[error("{upstream} provider returned no results")]
    Empty { upstream: Upstream },
}

impl UpstreamError {
    pub fn upstream(&self) -> Upstream {
        match self {
            UpstreamError::NotConfigured { upstream, .. }
            | UpstreamError::Network { upstream, .. }
            | UpstreamError::Http { upstream, .. }
            | UpstreamError::Decode { upstream, .. }
            | UpstreamError::Empty { upstream } => *upstream,
        }
    }

    /// Message shown to end users for a failed upstream.
    pub fn user_message(&self) -> &'static str {
        match self.upstream() {
            Upstream::Routing => "could not calculate routes",
            Upstream::Hazards => "risk data unavailable",
            Upstream::Geocoding => "could not resolve location",
        }
    }

    pub(crate) fn from_reqwest(upstream: Upstream, err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode {
                upstream,
                detail: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            UpstreamError::Http {
                upstream,
                status: status.as_u16(),
            }
        } else {
            UpstreamError::Network {
                upstream,
                detail: err.to_string(),
            }
        }
    }

    pub(crate) fn not_configured(upstream: Upstream, detail: impl Into<String>) -> Self {
        UpstreamError::NotConfigured {
            upstream,
            detail: detail.into(),
        }
    }
}

/// Supplies candidate routes for a trip.
pub trait RoutingProvider: Send + Sync {
    fn routes(
        &self,
        start: &RoutePoint,
        end: &RoutePoint,
        vehicle_type: VehicleType,
    ) -> impl Future<Output = Result<Vec<CandidateRoute>, UpstreamError>> + Send;
}

/// Supplies assessed hazard zones around a monitored location.
pub trait HazardProvider: Send + Sync {
    fn hazards_at(
        &self,
        location: GeoPoint,
    ) -> impl Future<Output = Result<Vec<HazardZone>, UpstreamError>> + Send;
}

/// Resolves free-text place names.
pub trait Geocoder: Send + Sync {
    fn resolve(&self, query: &str)
        -> impl Future<Output = Result<RoutePoint, UpstreamError>> + Send;
}

pub(crate) fn trim_base_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}
