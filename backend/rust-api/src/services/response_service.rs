use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::metrics::{
    DISTRACTOR_MATCHES_TOTAL, LEARNING_STATE_TRANSITIONS_TOTAL, RESPONSES_RECORDED_TOTAL,
};
use crate::models::response::{ResponseEvent, SubmitResponseRequest, SubmitResponseResponse};
use crate::models::skill::{LearnerProfile, LearningState, SkillPerformance};

use super::catalog::Catalog;
use super::feedback_composer::compose_feedback;
use super::learner_repository::{LearnerLocks, LearnerRepository};
use super::performance_tracker::{record_outcome, refresh_label};
use super::AppState;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Question {0} not found")]
    QuestionNotFound(String),
    #[error("Choice {label} does not exist on question {question_id}")]
    UnknownChoice { question_id: String, label: String },
    #[error("Choice {0} selected more than once")]
    DuplicateChoice(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct ResponseService {
    catalog: Arc<Catalog>,
    repository: Arc<dyn LearnerRepository>,
    learner_locks: Arc<LearnerLocks>,
}

impl ResponseService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            repository: state.repository.clone(),
            learner_locks: state.learner_locks.clone(),
        }
    }

    pub async fn submit(
        &self,
        learner_id: &str,
        req: &SubmitResponseRequest,
    ) -> Result<SubmitResponseResponse, ServiceError> {
        req.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        tracing::info!(
            "Processing response: learner={}, question={}, selected={:?}",
            learner_id,
            req.question_id,
            req.selected
        );

        let mut seen = HashSet::with_capacity(req.selected.len());
        if let Some(label) = req.selected.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(ServiceError::DuplicateChoice(label.clone()));
        }

        let question = self
            .catalog
            .question(&req.question_id)
            .ok_or_else(|| ServiceError::QuestionNotFound(req.question_id.clone()))?;

        if let Some(label) = req.selected.iter().find(|l| question.choice(l).is_none()) {
            return Err(ServiceError::UnknownChoice {
                question_id: question.id.clone(),
                label: label.clone(),
            });
        }

        // Held until the learner's records are written back
        let _learner_guard = self.learner_locks.lock(learner_id).await;

        let now = Utc::now();
        let correct = question.is_correct(&req.selected);

        let event = ResponseEvent {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            question_id: question.id.clone(),
            selected: req.selected.clone(),
            correct,
            confidence: req.confidence,
            elapsed_ms: req.elapsed_ms,
            timestamp: now,
        };
        self.repository.append_response(&event).await?;

        RESPONSES_RECORDED_TOTAL
            .with_label_values(&[if correct { "true" } else { "false" }])
            .inc();

        let mut profile =
            LearnerProfile::new(learner_id, self.repository.list_performance(learner_id).await?);

        let skill = question
            .tags
            .skill_id
            .as_deref()
            .and_then(|id| self.catalog.skill(id));

        let (previous_state, performance) = match skill {
            Some(skill) => {
                let (previous, record) = self
                    .apply_outcome(&mut profile, &skill.id, correct, now)
                    .await?;
                (previous, Some(record))
            }
            None => {
                tracing::warn!(
                    "Question {} has no known skill; performance not tracked",
                    question.id
                );
                (LearningState::Emerging, None)
            }
        };

        let feedback = compose_feedback(
            question,
            &req.selected,
            correct,
            skill,
            &profile,
            self.catalog.patterns(),
        );

        if !correct {
            DISTRACTOR_MATCHES_TOTAL
                .with_label_values(&[feedback.pattern_id.as_deref().unwrap_or("none")])
                .inc();
        }

        tracing::info!(
            "Response recorded: learner={}, question={}, correct={}, state={}",
            learner_id,
            question.id,
            correct,
            feedback.learning_state
        );

        Ok(SubmitResponseResponse {
            response_id: event.id,
            correct,
            previous_state,
            performance,
            feedback,
        })
    }

    /// Updates the answered skill, then re-evaluates every dependent skill
    /// whose prerequisite gate may have opened or closed.
    async fn apply_outcome(
        &self,
        profile: &mut LearnerProfile,
        skill_id: &str,
        correct: bool,
        now: chrono::DateTime<Utc>,
    ) -> Result<(LearningState, SkillPerformance), ServiceError> {
        let mut record = profile
            .performance
            .get(skill_id)
            .cloned()
            .unwrap_or_else(|| SkillPerformance::new(&profile.learner_id, skill_id, now));

        record_outcome(&mut record, correct, now);
        let previous = refresh_label(&mut record, self.catalog.as_ref(), &*profile, now);
        self.save(profile, record.clone(), previous).await?;

        for dependent_id in self.catalog.dependents_of(skill_id) {
            let Some(mut dependent) = profile.performance.get(&dependent_id).cloned() else {
                continue;
            };
            let before = refresh_label(&mut dependent, self.catalog.as_ref(), &*profile, now);
            if before != dependent.learning_state {
                self.save(profile, dependent, before).await?;
            }
        }

        Ok((previous, record))
    }

    async fn save(
        &self,
        profile: &mut LearnerProfile,
        record: SkillPerformance,
        previous: LearningState,
    ) -> Result<(), ServiceError> {
        if previous != record.learning_state {
            LEARNING_STATE_TRANSITIONS_TOTAL
                .with_label_values(&[previous.as_str(), record.learning_state.as_str()])
                .inc();
        }
        self.repository.save_performance(&record).await?;
        profile.performance.insert(record.skill_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::performance_tracker::assign_label;

    const SHORTCUT_CATALOG: &str = r#"{
        "skills": [
            {"id": "a", "name": "A"},
            {"id": "x", "name": "X", "prerequisites": ["a"]},
            {"id": "y", "name": "Y", "prerequisites": ["x"]},
            {"id": "z", "name": "Z", "prerequisites": ["y", "a"]}
        ],
        "questions": [
            {"id": "qa", "stem": "Define a.", "choices": [{"label": "A", "text": "Right"}, {"label": "B", "text": "Wrong"}], "correct": ["A"], "tags": {"skill_id": "a"}},
            {"id": "qx", "stem": "Define x.", "choices": [{"label": "A", "text": "Right"}, {"label": "B", "text": "Wrong"}], "correct": ["A"], "tags": {"skill_id": "x"}},
            {"id": "qy", "stem": "Define y.", "choices": [{"label": "A", "text": "Right"}, {"label": "B", "text": "Wrong"}], "correct": ["A"], "tags": {"skill_id": "y"}},
            {"id": "qz", "stem": "Define z.", "choices": [{"label": "A", "text": "Right"}, {"label": "B", "text": "Wrong"}], "correct": ["A"], "tags": {"skill_id": "z"}}
        ]
    }"#;

    fn state() -> Arc<AppState> {
        let catalog = Catalog::from_json(SHORTCUT_CATALOG).unwrap();
        Arc::new(AppState::with_catalog(Config::default(), catalog))
    }

    fn answer(question_id: &str, selected: &[&str]) -> SubmitResponseRequest {
        SubmitResponseRequest {
            question_id: question_id.to_string(),
            selected: selected.iter().map(|l| l.to_string()).collect(),
            confidence: None,
            elapsed_ms: None,
        }
    }

    #[tokio::test]
    async fn cached_labels_match_derived_labels_after_prerequisite_mastered() {
        let state = state();
        let service = ResponseService::new(&state);

        for question_id in ["qx", "qy", "qz", "qa"] {
            for _ in 0..5 {
                service.submit("l1", &answer(question_id, &["A"])).await.unwrap();
            }
        }

        let records = state.repository.list_performance("l1").await.unwrap();
        let profile = LearnerProfile::new("l1", records);
        for record in profile.performance.values() {
            assert_eq!(
                record.learning_state,
                assign_label(record, state.catalog.as_ref(), &profile),
                "stale label on {}",
                record.skill_id
            );
            assert_eq!(record.learning_state, LearningState::Mastered);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_for_one_learner_are_not_lost() {
        let state = state();

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move {
                    ResponseService::new(&state)
                        .submit("l1", &answer("qa", &["A"]))
                        .await
                        .map(|_| ())
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let log = state.repository.list_responses("l1").await.unwrap();
        let records = state.repository.list_performance("l1").await.unwrap();
        assert_eq!(log.len(), 200);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attempts, 200);
        assert_eq!(records[0].correct, 200);
    }

    #[tokio::test]
    async fn duplicate_labels_are_rejected_before_recording() {
        let state = state();
        let service = ResponseService::new(&state);

        let result = service.submit("l1", &answer("qa", &["A", "A"])).await;
        assert!(matches!(result, Err(ServiceError::DuplicateChoice(label)) if label == "A"));
        assert!(state.repository.list_responses("l1").await.unwrap().is_empty());
    }
}
