use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfare_api::{build_router, ApiState, IpRateLimiter};
use wayfare_core::{FaqEntry, Place};
use wayfare_engine::{EngineConfig, GuideEngine};
use wayfare_observability::AppMetrics;
use wayfare_storage::{FaqRepository, PlaceRepository, Store};

const TEST_API_KEY: &str = "test-wayfare-key";

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

// Catalog around (0,0); 0.01 deg of longitude is ~1.11 km.
async fn test_app(rate_limit_max: usize) -> Router {
    let store = Store::memory();
    store
        .upsert_place(place("City Park", 0.0, 0.02, "Park", 1))
        .await
        .unwrap();
    store
        .upsert_place(place("Old Museum", 0.0, 0.01, "Museum", 3))
        .await
        .unwrap();
    store
        .upsert_place(place("Far Park", 0.0, 0.09, "Park", 2))
        .await
        .unwrap();
    store
        .upsert_faq(FaqEntry {
            question: "How much does the service cost?".to_string(),
            answer: "The guide is free to use.".to_string(),
        })
        .await
        .unwrap();

    let metrics = AppMetrics::shared();
    let engine = Arc::new(GuideEngine::new(
        Arc::new(store),
        metrics.clone(),
        EngineConfig::default(),
    ));

    let state = ApiState {
        engine,
        metrics,
        api_key: TEST_API_KEY.to_string(),
        limiter: IpRateLimiter::new(Duration::from_secs(60), rate_limit_max),
        allowed_origins: Arc::new(Vec::new()),
    };

    build_router(state)
}

fn chat_request(body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app(100).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["metrics"]["requests_total"].is_u64());
}

#[tokio::test]
async fn chat_requires_api_key() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(json!({ "message": "hello" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_greeting_round_trip() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(json!({ "message": "hello" }), Some(TEST_API_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "greeting");
    assert_eq!(body["status"], "success");
    assert!(body.get("places").is_none());
}

#[tokio::test]
async fn chat_category_query_lists_parks_sorted() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(
            json!({
                "message": "find parks near me",
                "latitude": 0.0,
                "longitude": 0.0
            }),
            Some(TEST_API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "category_places");

    let places = body["places"].as_array().expect("places should be a list");
    let names: Vec<&str> = places
        .iter()
        .map(|place| place["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["City Park", "Far Park"]);
    assert!(places
        .iter()
        .all(|place| place["category"].as_str() == Some("Park")));
}

#[tokio::test]
async fn chat_with_time_budget_but_no_location_prompts() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(
            json!({ "message": "I have 2 hours" }),
            Some(TEST_API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "location_request");
}

#[tokio::test]
async fn chat_empty_message_is_a_client_error() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(json!({ "message": "  " }), Some(TEST_API_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], "client-error");
}

#[tokio::test]
async fn chat_invalid_coordinates_are_a_client_error() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(
            json!({
                "message": "find parks near me",
                "latitude": 91.0,
                "longitude": 0.0
            }),
            Some(TEST_API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["type"], "validation_error");
}

#[tokio::test]
async fn chat_fallback_for_nonsense() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(
            json!({ "message": "xyzzy frobnicate" }),
            Some(TEST_API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "fallback");
}

#[tokio::test]
async fn chat_faq_answer_round_trip() {
    let app = test_app(100).await;

    let response = app
        .oneshot(chat_request(
            json!({ "message": "how much does it cost" }),
            Some(TEST_API_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["type"], "faq_answer");
    assert_eq!(body["reply"], "The guide is free to use.");
}

#[tokio::test]
async fn nearest_requires_location() {
    let app = test_app(100).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/places/nearest")
                .header("content-type", "application/json")
                .header("x-api-key", TEST_API_KEY)
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "location_required");
}

#[tokio::test]
async fn nearest_returns_ranked_place_records() {
    let app = test_app(100).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/places/nearest")
                .header("content-type", "application/json")
                .header("x-api-key", TEST_API_KEY)
                .body(Body::from(
                    json!({ "latitude": 0.0, "longitude": 0.0, "limit": 2 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let places = body.as_array().expect("response should be a list");
    assert_eq!(places.len(), 2);
    assert_eq!(places[0]["name"], "Old Museum");
    assert!(places[0]["distance_km"].as_f64().unwrap() <= places[1]["distance_km"].as_f64().unwrap());
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let app = test_app(2).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(chat_request(json!({ "message": "hello" }), Some(TEST_API_KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(chat_request(json!({ "message": "hello" }), Some(TEST_API_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
