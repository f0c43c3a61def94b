use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    models::response::SubmitResponseRequest,
    services::{
        progress_service::ProgressService,
        response_service::{ResponseService, ServiceError},
        AppState,
    },
};

pub async fn submit_response(
    State(state): State<Arc<AppState>>,
    Path(learner_id): Path<String>,
    AppJson(req): AppJson<SubmitResponseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Submitting response for learner={}, question={}",
        learner_id,
        req.question_id
    );

    let service = ResponseService::new(&state);

    match service.submit(&learner_id, &req).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            let status = match &e {
                ServiceError::Validation(_)
                | ServiceError::UnknownChoice { .. }
                | ServiceError::DuplicateChoice(_) => StatusCode::BAD_REQUEST,
                ServiceError::QuestionNotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                tracing::error!("Failed to submit response: {:#}", e);
            } else {
                tracing::warn!("Rejected response submission: {}", e);
            }
            Err((status, e.to_string()))
        }
    }
}

pub async fn list_responses(
    State(state): State<Arc<AppState>>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = ProgressService::new(&state);

    match service.responses(&learner_id).await {
        Ok(events) => Ok((StatusCode::OK, Json(events))),
        Err(e) => {
            tracing::error!("Failed to list responses: {:#}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Building progress dashboard for learner={}", learner_id);

    let service = ProgressService::new(&state);

    match service.dashboard(&learner_id).await {
        Ok(dashboard) => Ok((StatusCode::OK, Json(dashboard))),
        Err(e) => {
            tracing::error!("Failed to build dashboard: {:#}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
