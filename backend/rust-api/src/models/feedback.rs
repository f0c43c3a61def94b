use serde::Serialize;

use super::question::FrameworkStep;
use super::skill::LearningState;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackPayload {
    pub correct: bool,
    pub pattern_id: Option<String>,
    pub pattern_name: Option<String>,
    pub explanation: Option<String>,
    pub rationale: String,
    pub framework_step: Option<FrameworkStep>,
    pub learning_state: LearningState,
    pub tips: Vec<String>,
}
