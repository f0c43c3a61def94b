mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_reports_catalog_counts() {
    let app = common::create_test_app();
    let (status, body) = common::get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let body = common::json(&body);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog"]["skills"], 5);
    assert_eq!(body["catalog"]["questions"], 10);
    assert_eq!(body["catalog"]["patterns"], 7);
}

#[tokio::test]
async fn test_list_skills() {
    let app = common::create_test_app();
    let (status, body) = common::get(&app, "/api/v1/skills").await;
    assert_eq!(status, StatusCode::OK);

    let skills = common::json(&body);
    let assessment = skills
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == "assessment")
        .unwrap();
    assert_eq!(assessment["prerequisites"], json!(["measurement"]));
}

#[tokio::test]
async fn test_questions_hide_answers_and_filter() {
    let app = common::create_test_app();

    let (status, body) = common::get(&app, "/api/v1/questions").await;
    assert_eq!(status, StatusCode::OK);
    let all = common::json(&body);
    assert_eq!(all.as_array().unwrap().len(), 10);
    for question in all.as_array().unwrap() {
        assert!(question.get("correct").is_none());
        assert!(question.get("rationale").is_none());
    }

    let (_, body) = common::get(&app, "/api/v1/questions?skill_id=measurement").await;
    assert_eq!(common::json(&body).as_array().unwrap().len(), 3);

    let (_, body) = common::get(&app, "/api/v1/questions?difficulty=analysis").await;
    let analysis = common::json(&body);
    assert!(analysis
        .as_array()
        .unwrap()
        .iter()
        .any(|q| q["id"] == "q-measure-3"));

    let (status, _) = common::get(&app, "/api/v1/questions?difficulty=legendary").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_question() {
    let app = common::create_test_app();

    let (status, body) = common::get(&app, "/api/v1/questions/q-assess-2").await;
    assert_eq!(status, StatusCode::OK);
    let question = common::json(&body);
    assert_eq!(question["multi_answer"], true);
    assert_eq!(question["difficulty"], "application");
    assert_eq!(question["choices"].as_array().unwrap().len(), 4);

    let (status, _) = common::get(&app, "/api/v1/questions/q-invalid-1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_match_distractor_pattern_endpoint() {
    let app = common::create_test_app();

    let (status, body) = common::post_json(
        &app,
        "/api/v1/distractor-patterns/match",
        &json!({ "text": "Implement the intervention immediately" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = common::json(&body);
    assert_eq!(body["pattern_id"], "premature-action");
    assert_eq!(body["pattern"]["name"], "Premature action");

    let (_, body) = common::post_json(
        &app,
        "/api/v1/distractor-patterns/match",
        &json!({ "text": "Always use this approach for all students" }),
    )
    .await;
    assert_eq!(common::json(&body)["pattern_id"], "extreme-language");

    let (_, body) = common::post_json(
        &app,
        "/api/v1/distractor-patterns/match",
        &json!({ "text": "The median" }),
    )
    .await;
    let body = common::json(&body);
    assert!(body["pattern_id"].is_null());
    assert!(body["pattern"].is_null());
}

#[tokio::test]
async fn test_list_patterns_in_match_order() {
    let app = common::create_test_app();
    let (status, body) = common::get(&app, "/api/v1/distractor-patterns").await;
    assert_eq!(status, StatusCode::OK);

    let patterns = common::json(&body);
    let ids: Vec<&str> = patterns
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.first(), Some(&"premature-action"));
    assert_eq!(ids.get(1), Some(&"extreme-language"));
    assert_eq!(ids.len(), 7);
}

#[tokio::test]
async fn test_trace_id_is_echoed() {
    let app = common::create_test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-trace-id"], "trace-123");
}

#[tokio::test]
#[serial]
async fn test_metrics_requires_basic_auth() {
    std::env::set_var("METRICS_AUTH", "ops:secret");
    let app = common::create_test_app();

    let (status, _) = common::get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let credentials = general_purpose::STANDARD.encode("ops:secret");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header(header::AUTHORIZATION, format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("http_requests_total"));

    std::env::remove_var("METRICS_AUTH");
}
