//! Read-only index over the hazard zones of one scoring request.

use crate::error::Result;
use crate::geo::{self, validate_polyline};
use crate::models::{GeoPoint, HazardZone};

/// A zone returned by [`HazardIndex::near`].
#[derive(Debug, Clone, Copy)]
pub struct NearbyZone<'a> {
    /// Position of the zone in the index
    pub index: usize,
    pub zone: &'a HazardZone,
    pub min_distance_km: f64,
}

/// Holds the hazard zones for one evaluation. Never mutated after construction,
/// so it can be shared across concurrent scoring tasks.
#[derive(Debug, Clone, Default)]
pub struct HazardIndex {
    zones: Vec<HazardZone>,
}

impl HazardIndex {
    /// Build an index, validating every zone.
    ///
    /// Duplicate ids are kept; each copy is reported separately.
    pub fn new(zones: Vec<HazardZone>) -> Result<Self> {
        zones.iter().try_for_each(HazardZone::validate)?;
        Ok(Self { zones })
    }

    pub fn zones(&self) -> &[HazardZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones whose center lies within `radius + buffer_km` of the polyline,
    /// closest first. Equal distances keep index order.
    pub fn near(&self, line: &[GeoPoint], buffer_km: f64) -> Result<Vec<NearbyZone<'_>>> {
        validate_polyline(line)?;
        let buffer_km = buffer_km.max(0.0);

        let mut nearby: Vec<NearbyZone<'_>> = self
            .zones
            .iter()
            .enumerate()
            .filter_map(|(index, zone)| {
                let min_distance_km = geo::polyline_distance_km(zone.center, line);
                (min_distance_km <= zone.radius_km + buffer_km).then_some(NearbyZone {
                    index,
                    zone,
                    min_distance_km,
                })
            })
            .collect();

        nearby.sort_by(|a, b| {
            a.min_distance_km
                .total_cmp(&b.min_distance_km)
                .then_with(|| a.index.cmp(&b.index))
        });
        Ok(nearby)
    }

    /// Zones whose footprint contains `point`.
    pub fn containing(&self, point: GeoPoint) -> Result<Vec<&HazardZone>> {
        geo::validate_point(&point)?;
        Ok(self
            .zones
            .iter()
            .filter(|zone| geo::haversine_km(point, zone.center) <= zone.radius_km)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::geo::km_to_lon;
    use crate::models::Severity;

    fn zone_east_of_line(id: &str, offset_km: f64, radius_km: f64) -> HazardZone {
        HazardZone::new(
            id,
            GeoPoint::new(0.0, km_to_lon(offset_km, 0.0)),
            radius_km,
            Severity::Medium,
            0.8,
            id,
        )
    }

    fn north_south_line() -> Vec<GeoPoint> {
        vec![GeoPoint::new(-0.5, 0.0), GeoPoint::new(0.5, 0.0)]
    }

    #[test]
    fn near_filters_by_radius_plus_buffer_and_sorts() {
        let index = HazardIndex::new(vec![
            zone_east_of_line("far", 10.0, 1.0),
            zone_east_of_line("buffer", 4.0, 3.0),
            zone_east_of_line("crossing", 1.0, 3.0),
        ])
        .unwrap();

        let nearby = index.near(&north_south_line(), 2.0).unwrap();
        let ids: Vec<&str> = nearby.iter().map(|n| n.zone.id.as_str()).collect();
        assert_eq!(ids, vec!["crossing", "buffer"]);
        assert_eq!(nearby[0].index, 2);
        assert!(nearby[0].min_distance_km < nearby[1].min_distance_km);
    }

    #[test]
    fn zero_buffer_keeps_only_crossed_zones() {
        let index = HazardIndex::new(vec![
            zone_east_of_line("buffer", 4.0, 3.0),
            zone_east_of_line("crossing", 1.0, 3.0),
        ])
        .unwrap();

        let nearby = index.near(&north_south_line(), 0.0).unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].zone.id, "crossing");
    }

    #[test]
    fn duplicates_are_reported_separately() {
        let zone = zone_east_of_line("dup", 1.0, 3.0);
        let index = HazardIndex::new(vec![zone.clone(), zone]).unwrap();
        let nearby = index.near(&north_south_line(), 2.0).unwrap();
        assert_eq!(nearby.len(), 2);
        assert_eq!((nearby[0].index, nearby[1].index), (0, 1));
    }

    #[test]
    fn invalid_zone_rejected_at_construction() {
        let bad = zone_east_of_line("bad", 1.0, -1.0);
        assert!(matches!(
            HazardIndex::new(vec![bad]),
            Err(EngineError::InvalidHazardZone { .. })
        ));
    }

    #[test]
    fn near_rejects_degenerate_line() {
        let index = HazardIndex::default();
        assert_eq!(
            index.near(&[GeoPoint::new(0.0, 0.0)], 2.0).unwrap_err(),
            EngineError::DegenerateRoute { points: 1 }
        );
    }

    #[test]
    fn containing_uses_footprint() {
        let index = HazardIndex::new(vec![
            zone_east_of_line("a", 1.0, 3.0),
            zone_east_of_line("b", 10.0, 1.0),
        ])
        .unwrap();
        let hits = index.containing(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }
}
