mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use wayfare_core::{MessageInput, Outcome, OutcomeKind, RankedPlace, ResponseStatus};
use wayfare_engine::{EngineConfig, GuideEngine};
use wayfare_observability::AppMetrics;
use wayfare_storage::Store;

pub use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<GuideEngine<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: wayfare_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NearestRequest {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PlaceDto {
    name: String,
    category: String,
    distance_km: f64,
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
}

impl From<&RankedPlace> for PlaceDto {
    fn from(ranked: &RankedPlace) -> Self {
        Self {
            name: ranked.place.name.clone(),
            category: ranked.place.category_label().to_string(),
            distance_km: ranked.distance_km,
            latitude: ranked.place.latitude,
            longitude: ranked.place.longitude,
            description: ranked.place.description.clone(),
            rating: ranked.place.rating,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    places: Option<Vec<PlaceDto>>,
    status: ResponseStatus,
}

impl From<Outcome> for ChatResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            kind: outcome.kind.as_tag(),
            reply: outcome.reply,
            places: outcome
                .places
                .map(|places| places.iter().map(PlaceDto::from).collect()),
            status: outcome.status,
        }
    }
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("WAYFARE_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let config = EngineConfig {
        faq_similarity_threshold: env::var("WAYFARE_FAQ_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or_else(|| EngineConfig::default().faq_similarity_threshold),
        cache_ttl_seconds: env::var("WAYFARE_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or_else(|| EngineConfig::default().cache_ttl_seconds),
    };

    let engine = Arc::new(GuideEngine::new(Arc::new(store), metrics.clone(), config));

    let api_key = env::var("WAYFARE_API_KEY").unwrap_or_else(|_| "dev-wayfare-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("WAYFARE_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("WAYFARE_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);
    let allowed_origins = env::var("WAYFARE_ALLOWED_ORIGINS")
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let state = ApiState {
        engine,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
        allowed_origins: Arc::new(allowed_origins),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/places/nearest", post(nearest_places))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let outcome = state
        .engine
        .handle_message(MessageInput {
            message: request.message,
            latitude: request.latitude,
            longitude: request.longitude,
            limit: request.limit,
        })
        .await;

    let code =
        StatusCode::from_u16(outcome.status.http_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(ChatResponse::from(outcome)))
}

async fn nearest_places(
    State(state): State<ApiState>,
    Json(request): Json<NearestRequest>,
) -> Response {
    let outcome = state
        .engine
        .nearest(request.latitude, request.longitude, request.limit)
        .await;

    match outcome.kind {
        OutcomeKind::NearestPlaces => {
            let places: Vec<PlaceDto> = outcome
                .places
                .unwrap_or_default()
                .iter()
                .map(PlaceDto::from)
                .collect();
            (StatusCode::OK, Json(places)).into_response()
        }
        OutcomeKind::LocationRequest => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "location_required",
                "message": "Latitude and Longitude required"
            })),
        )
            .into_response(),
        OutcomeKind::ValidationError => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_location",
                "message": outcome.reply
            })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "internal_error",
                "message": outcome.reply
            })),
        )
            .into_response(),
    }
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if request.method() == Method::OPTIONS || is_public_endpoint(path) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}
