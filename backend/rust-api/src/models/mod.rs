use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub mod distractor;
pub mod feedback;
pub mod question;
pub mod response;
pub mod skill;

use skill::LearningState;

#[derive(Debug, Clone, Serialize)]
pub struct SkillProgress {
    pub skill_id: String,
    pub name: String,
    pub learning_state: LearningState,
    pub attempts: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub consecutive_correct: u32,
    pub prerequisites_met: bool,
    pub mastered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressDashboard {
    pub learner_id: String,
    pub skills: Vec<SkillProgress>,
    pub state_counts: BTreeMap<LearningState, u32>,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub overall_accuracy: f64,
    pub generated_at: DateTime<Utc>,
}
