use super::common::*;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::reporting::router::{leaderboard_handler, RangeQuery};
use crate::reporting::reporting_router;
use crate::reporting::snapshot::SnapshotStore;

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn leaderboard_defaults_to_current_week() {
    let router = reporting_router(state_for(Arc::new(sample_snapshot())));

    let response = router
        .oneshot(get("/api/v1/leaderboard"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["range"]["from"], json!("2025-10-13"));
    assert_eq!(payload["range"]["to"], json!("2025-10-19"));
    assert_eq!(payload["range_label"], json!("Oct 13, 2025 to Oct 19, 2025"));

    let producers = payload["producers"].as_array().expect("producer rows");
    assert_eq!(producers.len(), 3);
    assert_eq!(producers[0]["producer_name"], json!("Blake"));
    assert_eq!(producers[0]["close_rate"], json!(100.0));
    assert_eq!(producers[2]["qhh"], json!(0));
}

#[tokio::test]
async fn leaderboard_accepts_explicit_range() {
    let router = reporting_router(state_for(Arc::new(sample_snapshot())));

    let response = router
        .oneshot(get("/api/v1/leaderboard?from=2025-10-06&to=2025-10-06"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let producers = payload["producers"].as_array().expect("producer rows");
    assert_eq!(producers.len(), 1);
    assert_eq!(producers[0]["producer_name"], json!("Devon"));
    assert_eq!(producers[0]["premium"], json!(9000.0));
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let router = reporting_router(state_for(Arc::new(sample_snapshot())));

    let response = router
        .oneshot(get("/api/v1/leaderboard?from=2025-10-19&to=2025-10-13"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("after range end"));
}

#[tokio::test]
async fn half_specified_range_is_rejected() {
    let state = state_for(Arc::new(SnapshotStore::default()));

    let response = leaderboard_handler(
        State(state),
        Query(RangeQuery {
            from: Some("2025-10-13".to_string()),
            to: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_failure_surfaces_generic_load_error() {
    let store = FailingStore {
        inner: sample_snapshot(),
        fail_at: FailAt::Producers,
    };
    let router = reporting_router(state_for(Arc::new(store)));

    let response = router
        .oneshot(get("/api/v1/leaderboard"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "error": "failed to load leaderboard" }));
}

#[tokio::test]
async fn zip_health_route_returns_rollup() {
    let router = reporting_router(state_for(Arc::new(sample_snapshot())));

    let response = router
        .oneshot(get("/api/v1/zip-health"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let zips = payload["zips"].as_array().expect("zip rows");
    assert_eq!(zips.len(), 3);
    assert_eq!(zips[0]["zip_code"], json!("50309"));
    assert_eq!(zips[0]["health"], json!("green"));
}

#[tokio::test]
async fn classify_route_applies_precedence() {
    let router = reporting_router(state_for(Arc::new(SnapshotStore::default())));

    let response = router
        .oneshot(
            Request::post("/api/v1/zip-health/classify")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "quotes": 8, "sales": 0, "conversion_rate": 0.0 }).to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["health"], json!("red"));
    assert_eq!(payload["health_label"], json!("Needs Attention"));
}

#[tokio::test]
async fn calendar_route_reports_chicago_dates() {
    let router = reporting_router(state_for(Arc::new(SnapshotStore::default())));

    let response = router
        .oneshot(get("/api/v1/calendar?date=2025-10-15"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["timezone"], json!("America/Chicago"));
    assert_eq!(payload["today"], json!("2025-10-16"));
    assert_eq!(payload["yesterday"], json!("2025-10-15"));
    assert_eq!(payload["default_entry_date"], json!("2025-10-16"));
    assert_eq!(payload["past_cutoff"], Value::Bool(true));
}

#[tokio::test]
async fn calendar_route_fails_open_on_bad_dates() {
    let router = reporting_router(state_for(Arc::new(SnapshotStore::default())));

    let response = router
        .oneshot(get("/api/v1/calendar?date=bad-date"))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(payload["date"], json!("bad-date"));
    assert_eq!(payload["past_cutoff"], Value::Bool(false));
}
