mod common;

use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

fn skill_row<'a>(dashboard: &'a Value, skill_id: &str) -> &'a Value {
    dashboard["skills"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["skill_id"] == skill_id)
        .unwrap_or_else(|| panic!("skill {} missing from dashboard", skill_id))
}

async fn dashboard(app: &axum::Router, learner: &str) -> Value {
    let (status, body) = common::get(app, &format!("/api/v1/learners/{}/progress", learner)).await;
    assert_eq!(status, StatusCode::OK);
    common::json(&body)
}

#[tokio::test]
async fn test_empty_dashboard_lists_every_skill() {
    let app = common::create_test_app();
    let learner = format!("fresh-{}", Uuid::new_v4());

    let board = dashboard(&app, &learner).await;
    assert_eq!(board["skills"].as_array().unwrap().len(), 5);
    assert_eq!(board["total_attempts"], 0);
    assert_eq!(board["overall_accuracy"], 0.0);
    assert_eq!(board["state_counts"]["emerging"], 5);
    assert_eq!(board["state_counts"]["mastered"], 0);

    assert_eq!(skill_row(&board, "measurement")["prerequisites_met"], true);
    assert_eq!(skill_row(&board, "assessment")["prerequisites_met"], false);
}

#[tokio::test]
async fn test_labels_progress_through_states() {
    let app = common::create_test_app();
    let learner = format!("climber-{}", Uuid::new_v4());

    let mut states = Vec::new();
    for _ in 0..5 {
        let body = common::answer(&app, &learner, "q-measure-1", &["A"]).await;
        states.push(body["performance"]["learning_state"].as_str().unwrap().to_string());
    }
    assert_eq!(
        states,
        vec!["emerging", "emerging", "proficient", "proficient", "mastered"]
    );

    let board = dashboard(&app, &learner).await;
    let row = skill_row(&board, "measurement");
    assert_eq!(row["learning_state"], "mastered");
    assert!(row["mastered_at"].is_string());
    assert_eq!(board["state_counts"]["mastered"], 1);
    assert_eq!(board["total_attempts"], 5);
    assert_eq!(board["overall_accuracy"], 1.0);
}

#[tokio::test]
async fn test_mastered_timestamp_survives_further_answers() {
    let app = common::create_test_app();
    let learner = format!("steady-{}", Uuid::new_v4());

    let mut last = Value::Null;
    for _ in 0..5 {
        last = common::answer(&app, &learner, "q-measure-1", &["A"]).await;
    }
    let first_mastered = last["performance"]["mastered_at"].clone();
    assert!(first_mastered.is_string());

    for _ in 0..3 {
        last = common::answer(&app, &learner, "q-measure-2", &["A"]).await;
        assert_eq!(last["performance"]["learning_state"], "mastered");
        assert_eq!(last["performance"]["mastered_at"], first_mastered);
    }
}

#[tokio::test]
async fn test_prerequisite_gate_blocks_then_releases_dependent_skill() {
    let app = common::create_test_app();
    let learner = format!("gated-{}", Uuid::new_v4());

    // Strong record on assessment, but measurement is not yet mastered
    for _ in 0..5 {
        let body = common::answer(&app, &learner, "q-assess-1", &["B"]).await;
        assert_eq!(body["performance"]["learning_state"], "emerging");
    }

    let board = dashboard(&app, &learner).await;
    let row = skill_row(&board, "assessment");
    assert_eq!(row["attempts"], 5);
    assert_eq!(row["accuracy"], 1.0);
    assert_eq!(row["learning_state"], "emerging");
    assert_eq!(row["prerequisites_met"], false);

    // Mastering the prerequisite re-evaluates the dependent skill
    for _ in 0..5 {
        common::answer(&app, &learner, "q-measure-1", &["A"]).await;
    }

    let board = dashboard(&app, &learner).await;
    assert_eq!(skill_row(&board, "measurement")["learning_state"], "mastered");
    let row = skill_row(&board, "assessment");
    assert_eq!(row["prerequisites_met"], true);
    assert_eq!(row["learning_state"], "mastered");
    assert_eq!(skill_row(&board, "consultation")["prerequisites_met"], true);
    assert_eq!(skill_row(&board, "consultation")["learning_state"], "emerging");
}

#[tokio::test]
async fn test_feedback_tips_grow_with_learning_state() {
    let app = common::create_test_app();
    let learner = format!("tips-{}", Uuid::new_v4());

    let first = common::answer(&app, &learner, "q-ethics-1", &["A"]).await;
    let first_tips = first["feedback"]["tips"].as_array().unwrap().len();

    let mut last = Value::Null;
    for _ in 0..4 {
        last = common::answer(&app, &learner, "q-ethics-1", &["A"]).await;
    }
    assert_eq!(last["feedback"]["learning_state"], "mastered");
    let mastered_tips = last["feedback"]["tips"].as_array().unwrap().len();
    assert!(mastered_tips > first_tips);

    let wrong = common::answer(&app, &learner, "q-ethics-1", &["B"]).await;
    assert_eq!(wrong["feedback"]["pattern_id"], "ethical-legal-violation");
    assert_eq!(wrong["performance"]["consecutive_correct"], 0);
}
