use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::models::response::ResponseEvent;
use crate::models::skill::SkillPerformance;

/// Storage seam for learner data. The rule engine never sees this trait;
/// services read records through it, run the pure functions, and write back.
#[async_trait]
pub trait LearnerRepository: Send + Sync {
    async fn list_performance(&self, learner_id: &str) -> Result<Vec<SkillPerformance>>;

    /// Inserts or replaces the record for its (learner, skill) pair.
    async fn save_performance(&self, record: &SkillPerformance) -> Result<()>;

    /// Responses are append-only.
    async fn append_response(&self, event: &ResponseEvent) -> Result<()>;

    /// Oldest first.
    async fn list_responses(&self, learner_id: &str) -> Result<Vec<ResponseEvent>>;
}

#[derive(Default)]
pub struct InMemoryLearnerRepository {
    performance: RwLock<HashMap<String, HashMap<String, SkillPerformance>>>,
    responses: RwLock<HashMap<String, Vec<ResponseEvent>>>,
}

impl InMemoryLearnerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One async mutex per learner. Holding the guard serialises a learner's
/// read-modify-write cycle over their records; other learners proceed.
#[derive(Default)]
pub struct LearnerLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LearnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, learner_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(learner_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[async_trait]
impl LearnerRepository for InMemoryLearnerRepository {
    async fn list_performance(&self, learner_id: &str) -> Result<Vec<SkillPerformance>> {
        let guard = self.performance.read().await;
        let mut records: Vec<SkillPerformance> = guard
            .get(learner_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.skill_id.cmp(&b.skill_id));
        Ok(records)
    }

    async fn save_performance(&self, record: &SkillPerformance) -> Result<()> {
        let mut guard = self.performance.write().await;
        guard
            .entry(record.learner_id.clone())
            .or_default()
            .insert(record.skill_id.clone(), record.clone());
        Ok(())
    }

    async fn append_response(&self, event: &ResponseEvent) -> Result<()> {
        let mut guard = self.responses.write().await;
        guard
            .entry(event.learner_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn list_responses(&self, learner_id: &str) -> Result<Vec<ResponseEvent>> {
        let guard = self.responses.read().await;
        Ok(guard.get(learner_id).cloned().unwrap_or_default())
    }
}
