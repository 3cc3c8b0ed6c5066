pub mod cache;
pub mod geo;

use std::cmp::Ordering;

use tracing::warn;
use wayfare_core::{Coordinate, FilterSet, MatchedFilters, Place, RankedPlace};

use crate::cache::{CacheKey, RankingCache};

pub const DEFAULT_RESULT_LIMIT: usize = 5;
pub const MAX_RESULT_LIMIT: usize = 20;
pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 600;

/// Clamp an externally requested limit to the hard cap; absent means the
/// default of 5.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    match requested {
        Some(limit) if limit >= 1 => limit.min(MAX_RESULT_LIMIT),
        Some(_) => DEFAULT_RESULT_LIMIT,
        None => DEFAULT_RESULT_LIMIT,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rank a place snapshot around an origin: compute distances, skip entries
/// the distance math rejected, apply the optional category/time/distance
/// filters, stable-sort ascending by distance, truncate to `limit`.
///
/// Identical inputs always produce identical output ordering; distance ties
/// keep catalog iteration order because the sort is stable.
pub fn rank_places(
    origin: Coordinate,
    places: &[Place],
    filters: &FilterSet,
    category_hint: Option<&str>,
    limit: usize,
) -> Vec<RankedPlace> {
    let hint_lower = category_hint.map(|hint| hint.to_lowercase());

    let mut survivors: Vec<RankedPlace> = Vec::new();
    for place in places {
        let distance = geo::distance_km(origin, place.coordinate());
        if !distance.is_finite() {
            warn!(place = %place.name, "skipping place with unrankable coordinates");
            continue;
        }

        if let Some(hint) = hint_lower.as_deref() {
            if !place.category_label().to_lowercase().contains(hint) {
                continue;
            }
        }
        if let Some(hours) = filters.hours {
            if place.average_duration() > hours {
                continue;
            }
        }
        if let Some(max_distance) = filters.max_distance_km {
            if distance > max_distance {
                continue;
            }
        }

        survivors.push(RankedPlace {
            place: place.clone(),
            distance_km: round2(distance),
            matched: MatchedFilters {
                category: category_hint.map(ToString::to_string),
                hours: filters.hours,
                max_distance_km: filters.max_distance_km,
            },
        });
    }

    survivors.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    survivors.truncate(limit);
    survivors
}

#[derive(Debug, Clone)]
pub struct Ranked {
    pub places: Vec<RankedPlace>,
    pub from_cache: bool,
}

/// Ranker with the TTL memoization layer. The cache is consulted only for
/// filter-free (category-only or unconstrained) queries — never for a filter
/// combination it wasn't computed under.
pub struct PlaceRanker {
    cache: RankingCache,
}

impl PlaceRanker {
    pub fn new(cache_ttl_seconds: i64) -> Self {
        Self {
            cache: RankingCache::new(cache_ttl_seconds),
        }
    }

    pub fn rank(
        &self,
        origin: Coordinate,
        places: &[Place],
        filters: &FilterSet,
        category_hint: Option<&str>,
        limit: usize,
    ) -> Ranked {
        let cacheable = filters.is_empty();
        let key = cacheable.then(|| CacheKey::new(category_hint, origin, limit));

        if let Some(key) = key.as_ref() {
            if let Some(places) = self.cache.get(key) {
                return Ranked {
                    places,
                    from_cache: true,
                };
            }
        }

        let ranked = rank_places(origin, places, filters, category_hint, limit);
        if let Some(key) = key {
            self.cache.put(key, ranked.clone());
        }

        Ranked {
            places: ranked,
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, latitude: f64, longitude: f64, category: &str, hours: u32) -> Place {
        Place {
            name: name.to_string(),
            latitude,
            longitude,
            category: Some(category.to_string()),
            description: None,
            rating: None,
            average_duration_hours: Some(hours),
        }
    }

    // Origin at (0,0); 1 degree of longitude on the equator is ~111.19 km.
    fn catalog() -> Vec<Place> {
        vec![
            place("Far Park", 0.0, 0.05, "Park", 1),
            place("Near Museum", 0.0, 0.01, "Museum", 3),
            place("Mid Cafe", 0.0, 0.03, "Restaurant", 1),
        ]
    }

    #[test]
    fn sorts_ascending_and_truncates() {
        let ranked = rank_places(
            Coordinate::new(0.0, 0.0),
            &catalog(),
            &FilterSet::default(),
            None,
            2,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["Near Museum", "Mid Cafe"]);
        assert!(ranked[0].distance_km < ranked[1].distance_km);
    }

    #[test]
    fn category_filter_excludes_nearer_entries() {
        let ranked = rank_places(
            Coordinate::new(0.0, 0.0),
            &catalog(),
            &FilterSet::default(),
            Some("park"),
            5,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["Far Park"]);
    }

    #[test]
    fn hours_filter_excludes_long_visits_regardless_of_distance() {
        let filters = FilterSet {
            hours: Some(2),
            max_distance_km: None,
        };
        let ranked = rank_places(Coordinate::new(0.0, 0.0), &catalog(), &filters, None, 5);
        assert!(ranked.iter().all(|r| r.place.average_duration() <= 2));
        assert!(!ranked.iter().any(|r| r.place.name == "Near Museum"));
    }

    #[test]
    fn distance_filter_bounds_results() {
        let filters = FilterSet {
            hours: None,
            max_distance_km: Some(2.0),
        };
        let ranked = rank_places(Coordinate::new(0.0, 0.0), &catalog(), &filters, None, 5);
        let names: Vec<&str> = ranked.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["Near Museum"]);
    }

    #[test]
    fn malformed_place_is_skipped_not_fatal() {
        let mut places = catalog();
        places.push(place("Broken", 999.0, 0.0, "Park", 1));
        let ranked = rank_places(
            Coordinate::new(0.0, 0.0),
            &places,
            &FilterSet::default(),
            None,
            10,
        );
        assert_eq!(ranked.len(), 3);
        assert!(!ranked.iter().any(|r| r.place.name == "Broken"));
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let ranked = rank_places(
            Coordinate::new(0.0, 0.0),
            &[],
            &FilterSet::default(),
            None,
            5,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn distance_ties_keep_catalog_order() {
        let places = vec![
            place("East Gate", 0.0, 0.01, "Park", 1),
            place("West Gate", 0.0, -0.01, "Park", 1),
        ];
        let ranked = rank_places(
            Coordinate::new(0.0, 0.0),
            &places,
            &FilterSet::default(),
            None,
            5,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.place.name.as_str()).collect();
        assert_eq!(names, vec!["East Gate", "West Gate"]);
    }

    #[test]
    fn limit_clamping() {
        assert_eq!(clamp_limit(None), DEFAULT_RESULT_LIMIT);
        assert_eq!(clamp_limit(Some(3)), 3);
        assert_eq!(clamp_limit(Some(50)), MAX_RESULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), DEFAULT_RESULT_LIMIT);
    }

    #[test]
    fn cached_rank_is_reused_only_for_filter_free_queries() {
        let ranker = PlaceRanker::new(600);
        let origin = Coordinate::new(0.0, 0.0);
        let places = catalog();

        let first = ranker.rank(origin, &places, &FilterSet::default(), Some("park"), 5);
        assert!(!first.from_cache);
        let second = ranker.rank(origin, &places, &FilterSet::default(), Some("park"), 5);
        assert!(second.from_cache);
        assert_eq!(first.places, second.places);

        let filters = FilterSet {
            hours: Some(2),
            max_distance_km: None,
        };
        let filtered = ranker.rank(origin, &places, &filters, None, 5);
        assert!(!filtered.from_cache);
        let filtered_again = ranker.rank(origin, &places, &filters, None, 5);
        assert!(!filtered_again.from_cache);
    }
}
