use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FilterSet;

static HOURS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*hour").expect("hours pattern must compile"));

/// Equivalent distance phrasings, tried in order; the first match wins.
/// The bare "N km" form also covers "N km distance" and "distance N km".
static DISTANCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"within\s+(\d+(?:\.\d+)?)\s*km\b",
        r"(\d+(?:\.\d+)?)\s*km\b",
        r"(\d+(?:\.\d+)?)\s*kilometer",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("distance pattern must compile"))
    .collect()
});

/// Scan cleaned text for an optional time budget and an optional distance
/// radius. Both are independent; no upper bound is enforced here — bounds
/// belong to validation and ranking policy, not extraction.
pub fn extract_filters(text: &str) -> FilterSet {
    let hours = HOURS_PATTERN
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<u32>().ok());

    let max_distance_km = DISTANCE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<f64>().ok())
    });

    FilterSet {
        hours,
        max_distance_km,
    }
}
