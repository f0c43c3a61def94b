use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::{
        distractor::{MatchPatternRequest, MatchPatternResponse},
        question::{QuestionListQuery, QuestionView},
    },
    services::{distractor_matcher::match_distractor_pattern, AppState},
};

pub async fn list_skills(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.skills().to_vec())
}

pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::debug!(
        "Listing questions: skill_id={:?}, difficulty={:?}",
        query.skill_id,
        query.difficulty
    );

    let questions = state
        .catalog
        .questions(&query)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let views: Vec<QuestionView> = questions.into_iter().map(QuestionView::from).collect();
    Ok(Json(views))
}

pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .catalog
        .question(&question_id)
        .map(|question| Json(QuestionView::from(question)))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Question {} not found", question_id),
            )
        })
}

pub async fn list_patterns(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.patterns().to_vec())
}

pub async fn match_pattern(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<MatchPatternRequest>,
) -> impl IntoResponse {
    let pattern_id = match_distractor_pattern(&req.text, req.correct_text.as_deref());
    let pattern = pattern_id.and_then(|id| state.catalog.pattern(id)).cloned();

    (
        StatusCode::OK,
        Json(MatchPatternResponse {
            pattern_id: pattern_id.map(str::to_string),
            pattern,
        }),
    )
}
