#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use examprep_api::{config::Config, create_router, services::catalog::Catalog, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const CATALOG: &str = include_str!("../../assets/catalog.json");

pub fn create_test_app() -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let catalog = Catalog::from_json(CATALOG).expect("Failed to parse test catalog");
    let app_state = Arc::new(AppState::with_catalog(Config::default(), catalog));

    create_router(app_state)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn post_json(app: &Router, uri: &str, payload: &Value) -> (StatusCode, Vec<u8>) {
    post_raw(app, uri, serde_json::to_string(payload).unwrap()).await
}

pub async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|e| panic!("Invalid JSON ({}): {}", e, String::from_utf8_lossy(body)))
}

/// Submits one answer and returns the parsed response body.
pub async fn answer(app: &Router, learner: &str, question: &str, selected: &[&str]) -> Value {
    let (status, body) = post_json(
        app,
        &format!("/api/v1/learners/{}/responses", learner),
        &serde_json::json!({
            "question_id": question,
            "selected": selected,
            "confidence": 3,
            "elapsed_ms": 4200
        }),
    )
    .await;

    if status != StatusCode::CREATED {
        panic!(
            "Answer submission failed with status {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );
    }
    json(&body)
}
