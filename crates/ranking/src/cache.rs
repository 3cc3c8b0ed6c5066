use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use wayfare_core::{Coordinate, RankedPlace};

/// Cache key for filter-free rankings: canonical category hint, coordinate
/// rounded to 4 decimal places (~11 m), and the result limit. A key is only
/// ever written by the query shape that computed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: Option<String>,
    lat_e4: i64,
    lon_e4: i64,
    limit: usize,
}

impl CacheKey {
    pub fn new(category: Option<&str>, origin: Coordinate, limit: usize) -> Self {
        Self {
            category: category.map(|value| value.to_lowercase()),
            lat_e4: (origin.latitude * 10_000.0).round() as i64,
            lon_e4: (origin.longitude * 10_000.0).round() as i64,
            limit,
        }
    }
}

struct CacheEntry {
    places: Vec<RankedPlace>,
    stored_at: DateTime<Utc>,
}

/// TTL memoization for category-only rankings. Staleness within the window
/// is acceptable — place data changes rarely — and concurrent readers and
/// writers only contend on the lock, never on entry contents.
pub struct RankingCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl RankingCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds.max(0)),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<RankedPlace>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if Utc::now() - entry.stored_at > self.ttl {
            return None;
        }
        Some(entry.places.clone())
    }

    pub fn put(&self, key: CacheKey, places: Vec<RankedPlace>) {
        self.entries.write().insert(
            key,
            CacheEntry {
                places,
                stored_at: Utc::now(),
            },
        );
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.stored_at <= self.ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::{MatchedFilters, Place};

    fn ranked(name: &str) -> RankedPlace {
        RankedPlace {
            place: Place {
                name: name.to_string(),
                latitude: 1.0,
                longitude: 1.0,
                category: None,
                description: None,
                rating: None,
                average_duration_hours: None,
            },
            distance_km: 1.0,
            matched: MatchedFilters::default(),
        }
    }

    #[test]
    fn hit_within_ttl_and_miss_after_expiry() {
        let origin = Coordinate::new(10.0, 20.0);

        let fresh = RankingCache::new(600);
        let key = CacheKey::new(Some("Park"), origin, 5);
        fresh.put(key.clone(), vec![ranked("City Park")]);
        assert_eq!(fresh.get(&key).unwrap().len(), 1);

        let expired = RankingCache::new(0);
        let key = CacheKey::new(Some("Park"), origin, 5);
        expired.put(key.clone(), vec![ranked("City Park")]);
        assert!(expired.get(&key).is_none());
        assert_eq!(expired.purge_expired(), 1);
    }

    #[test]
    fn keys_isolate_category_origin_and_limit() {
        let cache = RankingCache::new(600);
        let origin = Coordinate::new(10.0, 20.0);
        cache.put(CacheKey::new(Some("Park"), origin, 5), vec![ranked("A")]);

        assert!(cache.get(&CacheKey::new(Some("Museum"), origin, 5)).is_none());
        assert!(cache.get(&CacheKey::new(Some("Park"), origin, 10)).is_none());
        assert!(cache
            .get(&CacheKey::new(Some("Park"), Coordinate::new(11.0, 20.0), 5))
            .is_none());
        assert!(cache.get(&CacheKey::new(None, origin, 5)).is_none());
    }

    #[test]
    fn category_key_is_case_insensitive() {
        let cache = RankingCache::new(600);
        let origin = Coordinate::new(10.0, 20.0);
        cache.put(CacheKey::new(Some("Park"), origin, 5), vec![ranked("A")]);
        assert!(cache.get(&CacheKey::new(Some("park"), origin, 5)).is_some());
    }
}
