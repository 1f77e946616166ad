//! Hazard lookups for monitored locations, deduplicated through the cache.

use crate::cache::{CoordKey, SingleFlight};
use crate::providers::{HazardProvider, UpstreamError};
use futures::future::try_join_all;
use safepath_core::{GeoPoint, HazardZone};
use std::collections::HashSet;
use std::time::Duration;

pub struct HazardService<P> {
    provider: P,
    cache: SingleFlight<CoordKey, Vec<HazardZone>>,
}

impl<P: HazardProvider> HazardService<P> {
    pub fn new(provider: P, ttl: Duration, max_entries: usize) -> Self {
        Self {
            provider,
            cache: SingleFlight::new(ttl, max_entries),
        }
    }

    /// Collect hazard zones for every location, one upstream call per rounded
    /// coordinate. Zones come back in location order; a zone reported for
    /// several locations is kept once, under its first id.
    ///
    /// Any failed lookup fails the whole request: partial hazard data would
    /// understate risk.
    pub async fn hazards_for(&self, locations: &[GeoPoint]) -> Result<Vec<HazardZone>, UpstreamError> {
        let mut seen = HashSet::new();
        let keys: Vec<CoordKey> = locations
            .iter()
            .map(|location| CoordKey::new(*location))
            .filter(|key| seen.insert(*key))
            .collect();

        let lookups = keys.iter().map(|key| {
            self.cache
                .get_or_fetch(*key, || self.provider.hazards_at(key.point()))
        });
        let per_location = try_join_all(lookups).await?;

        let mut ids = HashSet::new();
        let zones: Vec<HazardZone> = per_location
            .into_iter()
            .flatten()
            .filter(|zone| ids.insert(zone.id.clone()))
            .collect();
        tracing::debug!(
            locations = keys.len(),
            zones = zones.len(),
            "collected hazard zones"
        );
        Ok(zones)
    }

    pub fn cached_locations(&self) -> usize {
        self.cache.len()
    }
}
