use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::feedback::FeedbackPayload;
use super::skill::{LearningState, SkillPerformance};

/// One answer submission. Written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub id: String,
    pub learner_id: String,
    pub question_id: String,
    pub selected: Vec<String>,
    pub correct: bool,
    pub confidence: Option<u8>,
    pub elapsed_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitResponseRequest {
    #[validate(length(min = 1, max = 200, message = "question_id must not be empty"))]
    pub question_id: String,

    #[validate(length(min = 1, max = 4, message = "Select between 1 and 4 choices"))]
    pub selected: Vec<String>,

    /// Self-rated confidence, 1 (guess) to 5 (certain).
    #[validate(range(min = 1, max = 5, message = "Confidence must be between 1 and 5"))]
    pub confidence: Option<u8>,

    pub elapsed_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseResponse {
    pub response_id: String,
    pub correct: bool,
    pub previous_state: LearningState,
    pub performance: Option<SkillPerformance>,
    pub feedback: FeedbackPayload,
}
