//! Request-deduplicating cache for upstream lookups.
//!
//! Concurrent callers asking for the same key share one in-flight fetch
//! instead of each racing a check-then-fetch. Failed fetches are not cached.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use safepath_core::GeoPoint;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

const COORD_SCALE: f64 = 10_000.0;

/// Coordinates rounded to 4 decimal degrees (~11 m).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lat_e4: i32,
    lon_e4: i32,
}

impl CoordKey {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            lat_e4: (point.lat * COORD_SCALE).round() as i32,
            lon_e4: (point.lon * COORD_SCALE).round() as i32,
        }
    }

    /// The rounded position this key stands for.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(
            self.lat_e4 as f64 / COORD_SCALE,
            self.lon_e4 as f64 / COORD_SCALE,
        )
    }
}

#[derive(Debug, Clone)]
struct Cached<V> {
    value: V,
    fetched_at: Instant,
}

type Slot<V> = Arc<OnceCell<Cached<V>>>;

/// Single-flight cache with TTL expiry and a soft size bound.
pub struct SingleFlight<K, V> {
    slots: DashMap<K, Slot<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> SingleFlight<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached value for `key`, or run `fetch` once for all
    /// concurrent callers of the same key.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let (slot, inserted) = self.slot_for(&key);
        if inserted {
            self.prune();
        }

        let result = slot
            .get_or_try_init(|| async {
                let value = fetch().await?;
                Ok::<_, E>(Cached {
                    value,
                    fetched_at: Instant::now(),
                })
            })
            .await;
        match result {
            Ok(cached) => Ok(cached.value.clone()),
            Err(err) => {
                // Only drop our own slot, and only if nobody filled it since
                self.slots.remove_if(&key, |_, current| {
                    Arc::ptr_eq(current, &slot) && !current.initialized()
                });
                Err(err)
            }
        }
    }

    /// Number of tracked keys, including in-flight ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot_for(&self, key: &K) -> (Slot<V>, bool) {
        match self.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let expired = occupied
                    .get()
                    .get()
                    .is_some_and(|cached| cached.fetched_at.elapsed() > self.ttl);
                if expired {
                    occupied.insert(Arc::new(OnceCell::new()));
                }
                (Arc::clone(occupied.get()), false)
            }
            Entry::Vacant(vacant) => {
                let slot = vacant.insert(Arc::new(OnceCell::new()));
                (Arc::clone(slot.value()), true)
            }
        }
    }

    /// Drop expired entries, then the oldest completed ones until the cache
    /// fits `max_entries`. In-flight slots are never evicted.
    fn prune(&self) {
        let now = Instant::now();
        let mut entries: Vec<(K, Instant)> = self
            .slots
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .get()
                    .map(|cached| (entry.key().clone(), cached.fetched_at))
            })
            .collect();

        for (key, fetched_at) in &entries {
            if now.duration_since(*fetched_at) > self.ttl {
                self.slots.remove(key);
            }
        }

        if self.slots.len() <= self.max_entries {
            return;
        }

        entries.sort_by_key(|(_, fetched_at)| *fetched_at);
        for (key, _) in entries {
            if self.slots.len() <= self.max_entries {
                break;
            }
            self.slots.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn coord_key_rounds_to_four_decimals() {
        let a = CoordKey::new(GeoPoint::new(3.139_04, 101.686_91));
        let b = CoordKey::new(GeoPoint::new(3.138_96, 101.686_94));
        let c = CoordKey::new(GeoPoint::new(3.1392, 101.6869));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.point(), GeoPoint::new(3.139, 101.6869));
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache: Arc<SingleFlight<CoordKey, u32>> =
            Arc::new(SingleFlight::new(Duration::from_secs(60), 16));
        let fetches = Arc::new(AtomicUsize::new(0));
        let key = CoordKey::new(GeoPoint::new(3.139, 101.6869));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let fetches = Arc::clone(&fetches);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key, move || async move {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: SingleFlight<&str, u32> = SingleFlight::new(Duration::from_secs(60), 16);

        let first = cache
            .get_or_fetch("k", || async { Err::<u32, _>("upstream down") })
            .await;
        assert_eq!(first, Err("upstream down"));

        let second = cache
            .get_or_fetch("k", || async { Ok::<_, &str>(7) })
            .await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cache: SingleFlight<&str, usize> = SingleFlight::new(Duration::from_millis(20), 16);
        let fetches = AtomicUsize::new(0);
        let counter = &fetches;
        let fetch = move || async move { Ok::<_, ()>(counter.fetch_add(1, Ordering::SeqCst)) };

        assert_eq!(cache.get_or_fetch("k", fetch).await, Ok(0));
        assert_eq!(cache.get_or_fetch("k", fetch).await, Ok(0));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get_or_fetch("k", fetch).await, Ok(1));
    }

    #[tokio::test]
    async fn size_bound_evicts_oldest() {
        let cache: SingleFlight<u32, u32> = SingleFlight::new(Duration::from_secs(60), 2);
        for key in 0..4u32 {
            let value = cache
                .get_or_fetch(key, move || async move { Ok::<_, ()>(key * 10) })
                .await;
            assert_eq!(value, Ok(key * 10));
        }
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failed_keys_do_not_accumulate() {
        let cache: SingleFlight<u32, u32> = SingleFlight::new(Duration::from_secs(60), 2);
        for key in 0..50u32 {
            let result = cache
                .get_or_fetch(key, || async { Err::<u32, _>("down") })
                .await;
            assert_eq!(result, Err("down"));
        }
        assert!(cache.is_empty());

        let value = cache.get_or_fetch(7, || async { Ok::<_, &str>(70) }).await;
        assert_eq!(value, Ok(70));
        assert_eq!(cache.len(), 1);
    }
}
