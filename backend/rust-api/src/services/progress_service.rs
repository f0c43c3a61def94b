use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::response::ResponseEvent;
use crate::models::skill::{LearnerProfile, LearningState};
use crate::models::{ProgressDashboard, SkillProgress};

use super::catalog::Catalog;
use super::learner_repository::LearnerRepository;
use super::performance_tracker::prerequisites_met;
use super::AppState;

pub struct ProgressService {
    catalog: Arc<Catalog>,
    repository: Arc<dyn LearnerRepository>,
}

impl ProgressService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            repository: state.repository.clone(),
        }
    }

    /// One row per catalog skill; skills the learner has not touched show up
    /// as Emerging with zero attempts.
    pub async fn dashboard(&self, learner_id: &str) -> Result<ProgressDashboard> {
        let profile =
            LearnerProfile::new(learner_id, self.repository.list_performance(learner_id).await?);

        let mut state_counts: BTreeMap<LearningState, u32> =
            LearningState::ALL.iter().map(|state| (*state, 0)).collect();
        let mut total_attempts = 0;
        let mut total_correct = 0;

        let skills = self
            .catalog
            .skills()
            .iter()
            .map(|skill| {
                let record = profile.performance.get(&skill.id);
                let learning_state = record.map(|r| r.learning_state).unwrap_or_default();
                *state_counts.entry(learning_state).or_insert(0) += 1;

                let attempts = record.map(|r| r.attempts).unwrap_or(0);
                let correct = record.map(|r| r.correct).unwrap_or(0);
                total_attempts += attempts;
                total_correct += correct;

                SkillProgress {
                    skill_id: skill.id.clone(),
                    name: skill.name.clone(),
                    learning_state,
                    attempts,
                    correct,
                    accuracy: record.map(|r| r.accuracy).unwrap_or(0.0),
                    consecutive_correct: record.map(|r| r.consecutive_correct).unwrap_or(0),
                    prerequisites_met: prerequisites_met(&skill.id, self.catalog.as_ref(), &profile),
                    mastered_at: record.and_then(|r| r.mastered_at),
                }
            })
            .collect();

        let overall_accuracy = if total_attempts == 0 {
            0.0
        } else {
            total_correct as f64 / total_attempts as f64
        };

        tracing::debug!(
            "Dashboard built: learner={}, attempts={}, accuracy={:.2}",
            learner_id,
            total_attempts,
            overall_accuracy
        );

        Ok(ProgressDashboard {
            learner_id: learner_id.to_string(),
            skills,
            state_counts,
            total_attempts,
            total_correct,
            overall_accuracy,
            generated_at: Utc::now(),
        })
    }

    pub async fn responses(&self, learner_id: &str) -> Result<Vec<ResponseEvent>> {
        self.repository.list_responses(learner_id).await
    }
}
