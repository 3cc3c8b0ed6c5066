pub mod similarity;

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument};
use wayfare_core::{
    clean, compose, extract_filters, find_intent, match_category, match_mood, validate_location,
    Coordinate, FilterSet, MessageInput, Outcome,
};
use wayfare_observability::AppMetrics;
use wayfare_ranking::{clamp_limit, PlaceRanker, Ranked, DEFAULT_CACHE_TTL_SECONDS};
use wayfare_storage::{FaqRepository, PlaceRepository, StoreError};

/// Trigger words that send a message down the nearby-places branch.
const NEARBY_TRIGGERS: &[&str] = &[
    "nearest",
    "nearby",
    "closest",
    "near me",
    "around me",
    "places to visit",
    "visit",
    "suggest",
    "recommend",
    "explore",
];

const OPEN_HOURS_PHRASES: &[&str] = &["open now", "opening hours", "open hours", "is it open"];

const TRAVEL_MODE_PHRASES: &[&str] = &[
    "by car",
    "by bus",
    "by train",
    "on foot",
    "travel mode",
    "how do i get",
];

/// The resolution ladder, evaluated strictly in this order per request;
/// the first rule that produces an outcome wins and nothing later runs.
/// Numeric filters deliberately outrank category hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Conversational,
    NumericFilters,
    NearbyTrigger,
    CategoryMood,
    SpecialStubs,
    FaqLookup,
}

pub const RULE_ORDER: [Rule; 6] = [
    Rule::Conversational,
    Rule::NumericFilters,
    Rule::NearbyTrigger,
    Rule::CategoryMood,
    Rule::SpecialStubs,
    Rule::FaqLookup,
];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum similarity ratio for a fuzzy FAQ match.
    pub faq_similarity_threshold: f64,
    pub cache_ttl_seconds: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            faq_similarity_threshold: 0.45,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

pub struct GuideEngine<S>
where
    S: PlaceRepository + FaqRepository,
{
    store: Arc<S>,
    ranker: PlaceRanker,
    metrics: Arc<AppMetrics>,
    config: EngineConfig,
}

impl<S> GuideEngine<S>
where
    S: PlaceRepository + FaqRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>, config: EngineConfig) -> Self {
        let ranker = PlaceRanker::new(config.cache_ttl_seconds);
        Self {
            store,
            ranker,
            metrics,
            config,
        }
    }

    /// Resolve one message to an outcome. Never fails: internal errors are
    /// caught here and surfaced as a generic server-error outcome.
    #[instrument(skip(self, input))]
    pub async fn handle_message(&self, input: MessageInput) -> Outcome {
        let started = Instant::now();
        self.metrics.inc_request();

        let outcome = match self.resolve(&input).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "message resolution failed");
                self.metrics.inc_internal_error();
                compose::internal_error()
            }
        };

        self.metrics.observe_latency(started.elapsed());
        info!(
            kind = outcome.kind.as_tag(),
            status = ?outcome.status,
            "message resolved"
        );
        outcome
    }

    /// Rank the full catalog around a raw location, for the nearest-places
    /// operation exposed by the transport and the CLI.
    pub async fn nearest(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        limit: Option<usize>,
    ) -> Outcome {
        self.metrics.inc_request();

        let origin = match validate_location(latitude, longitude) {
            Ok(origin) => origin,
            Err(outcome) => return outcome,
        };

        match self.rank_all(origin, &FilterSet::default(), None, clamp_limit(limit)).await {
            Ok(ranked) => compose::nearest_places(ranked.places),
            Err(err) => {
                error!(error = %err, "nearest-places lookup failed");
                self.metrics.inc_internal_error();
                compose::internal_error()
            }
        }
    }

    async fn resolve(&self, input: &MessageInput) -> Result<Outcome, StoreError> {
        let text = clean(&input.message);
        if text.is_empty() {
            return Ok(compose::empty_message());
        }

        let limit = clamp_limit(input.limit);
        for rule in RULE_ORDER {
            if let Some(outcome) = self.apply_rule(rule, &text, input, limit).await? {
                return Ok(outcome);
            }
        }

        self.metrics.inc_fallback();
        Ok(compose::fallback())
    }

    async fn apply_rule(
        &self,
        rule: Rule,
        text: &str,
        input: &MessageInput,
        limit: usize,
    ) -> Result<Option<Outcome>, StoreError> {
        match rule {
            Rule::Conversational => Ok(find_intent(text)
                .map(|entry| Outcome::reply_only(entry.kind, entry.reply))),
            Rule::NumericFilters => self.resolve_numeric_filters(text, input, limit).await,
            Rule::NearbyTrigger => self.resolve_nearby(text, input, limit).await,
            Rule::CategoryMood => self.resolve_category_mood(text, input, limit).await,
            Rule::SpecialStubs => Ok(resolve_stubs(text)),
            Rule::FaqLookup => self.resolve_faq(text).await,
        }
    }

    async fn resolve_numeric_filters(
        &self,
        text: &str,
        input: &MessageInput,
        limit: usize,
    ) -> Result<Option<Outcome>, StoreError> {
        let filters = extract_filters(text);
        if filters.is_empty() {
            return Ok(None);
        }

        let origin = match validate_location(input.latitude, input.longitude) {
            Ok(origin) => origin,
            Err(outcome) => return Ok(Some(outcome)),
        };

        let ranked = self.rank_all(origin, &filters, None, limit).await?;
        Ok(Some(compose::filtered_places(&filters, ranked.places)))
    }

    async fn resolve_nearby(
        &self,
        text: &str,
        input: &MessageInput,
        limit: usize,
    ) -> Result<Option<Outcome>, StoreError> {
        if !NEARBY_TRIGGERS.iter().any(|trigger| text.contains(trigger)) {
            return Ok(None);
        }

        let origin = match validate_location(input.latitude, input.longitude) {
            Ok(origin) => origin,
            Err(outcome) => return Ok(Some(outcome)),
        };

        let hint = match_category(text).or_else(|| match_mood(text).map(|mood| mood.category));
        let outcome = match hint {
            Some(category) => {
                let ranked = self.rank_category(origin, category, limit).await?;
                compose::category_places(category, ranked.places)
            }
            None => {
                let ranked = self.rank_all(origin, &FilterSet::default(), None, limit).await?;
                compose::nearest_places(ranked.places)
            }
        };
        Ok(Some(outcome))
    }

    async fn resolve_category_mood(
        &self,
        text: &str,
        input: &MessageInput,
        limit: usize,
    ) -> Result<Option<Outcome>, StoreError> {
        if let Some(category) = match_category(text) {
            let origin = match validate_location(input.latitude, input.longitude) {
                Ok(origin) => origin,
                Err(outcome) => return Ok(Some(outcome)),
            };
            let ranked = self.rank_category(origin, category, limit).await?;
            return Ok(Some(compose::category_places(category, ranked.places)));
        }

        if let Some(mood) = match_mood(text) {
            let origin = match validate_location(input.latitude, input.longitude) {
                Ok(origin) => origin,
                Err(outcome) => return Ok(Some(outcome)),
            };
            let ranked = self.rank_category(origin, mood.category, limit).await?;
            return Ok(Some(compose::mood_places(
                mood.mood,
                mood.category,
                ranked.places,
            )));
        }

        Ok(None)
    }

    async fn resolve_faq(&self, text: &str) -> Result<Option<Outcome>, StoreError> {
        let faqs = self.store.list_faqs().await?;
        if faqs.is_empty() {
            return Ok(None);
        }

        // Best match wins; ties keep catalog order by only replacing on a
        // strictly greater score.
        let mut best: Option<(&str, f64)> = None;
        for faq in &faqs {
            let score = similarity::similarity_ratio(text, &clean(&faq.question));
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((faq.question.as_str(), score));
            }
        }

        let Some((question, score)) = best else {
            return Ok(None);
        };
        if score < self.config.faq_similarity_threshold {
            return Ok(None);
        }

        // Exact-question lookup mirrors the catalog contract; a miss here
        // falls through to the next rule instead of failing.
        match self.store.find_faq_by_question(question).await? {
            Some(entry) => {
                self.metrics.inc_faq_hit();
                Ok(Some(compose::faq_answer(&entry.answer)))
            }
            None => Ok(None),
        }
    }

    async fn rank_all(
        &self,
        origin: Coordinate,
        filters: &FilterSet,
        category_hint: Option<&str>,
        limit: usize,
    ) -> Result<Ranked, StoreError> {
        self.metrics.inc_place_query();
        let places = self.store.list_places().await?;
        let ranked = self.ranker.rank(origin, &places, filters, category_hint, limit);
        if ranked.from_cache {
            self.metrics.inc_cache_hit();
        }
        Ok(ranked)
    }

    async fn rank_category(
        &self,
        origin: Coordinate,
        category: &str,
        limit: usize,
    ) -> Result<Ranked, StoreError> {
        self.metrics.inc_place_query();
        let places = self.store.list_places_by_category(category).await?;
        let ranked = self.ranker.rank(
            origin,
            &places,
            &FilterSet::default(),
            Some(category),
            limit,
        );
        if ranked.from_cache {
            self.metrics.inc_cache_hit();
        }
        Ok(ranked)
    }
}

fn resolve_stubs(text: &str) -> Option<Outcome> {
    if OPEN_HOURS_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return Some(compose::open_hours_stub());
    }
    if TRAVEL_MODE_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return Some(compose::travel_mode_stub());
    }
    None
}
