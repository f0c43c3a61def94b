use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::fmt;

/// Number of outcomes kept in the rolling recent-history window.
pub const RECENT_HISTORY_LEN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// Ordinal mastery label, lowest to highest.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    #[default]
    Emerging,
    Developing,
    Proficient,
    Mastered,
}

impl LearningState {
    pub const ALL: [LearningState; 4] = [
        LearningState::Emerging,
        LearningState::Developing,
        LearningState::Proficient,
        LearningState::Mastered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningState::Emerging => "emerging",
            LearningState::Developing => "developing",
            LearningState::Proficient => "proficient",
            LearningState::Mastered => "mastered",
        }
    }
}

impl fmt::Display for LearningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-learner, per-skill accuracy record. The cached `learning_state` is only
/// ever written by the performance tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillPerformance {
    pub learner_id: String,
    pub skill_id: String,
    pub attempts: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub consecutive_correct: u32,
    /// Oldest outcome first.
    pub recent_history: VecDeque<bool>,
    pub learning_state: LearningState,
    pub mastered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SkillPerformance {
    pub fn new(learner_id: &str, skill_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            skill_id: skill_id.to_string(),
            attempts: 0,
            correct: 0,
            accuracy: 0.0,
            consecutive_correct: 0,
            recent_history: VecDeque::with_capacity(RECENT_HISTORY_LEN),
            learning_state: LearningState::Emerging,
            mastered_at: None,
            updated_at: now,
        }
    }

    /// Number of correct outcomes among the last `n` history entries.
    pub fn recent_correct(&self, n: usize) -> usize {
        self.recent_history
            .iter()
            .rev()
            .take(n)
            .filter(|outcome| **outcome)
            .count()
    }
}

/// Caller-assembled view of one learner's records, keyed by skill id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LearnerProfile {
    pub learner_id: String,
    pub performance: HashMap<String, SkillPerformance>,
}

impl LearnerProfile {
    pub fn new(learner_id: &str, records: Vec<SkillPerformance>) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            performance: records
                .into_iter()
                .map(|record| (record.skill_id.clone(), record))
                .collect(),
        }
    }

    pub fn state_for(&self, skill_id: &str) -> LearningState {
        self.performance
            .get(skill_id)
            .map(|record| record.learning_state)
            .unwrap_or_default()
    }
}
