//! Per-skill accuracy tracking and learning-state assignment.
//!
//! Everything here is pure: callers hand in a record plus read-only views of
//! the skill graph and the learner's other records, and get the updated record
//! back. Storage is the caller's concern.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::models::skill::{LearnerProfile, LearningState, SkillPerformance, RECENT_HISTORY_LEN};

/// Attempts required before any label above Emerging can be earned.
pub const MIN_ATTEMPTS: u32 = 3;

pub const MASTERED_ACCURACY: f64 = 0.85;
pub const MASTERED_STREAK: u32 = 5;
pub const MASTERED_WINDOW: usize = 5;
pub const MASTERED_WINDOW_CORRECT: usize = 4;

pub const PROFICIENT_ACCURACY: f64 = 0.75;
pub const PROFICIENT_STREAK: u32 = 3;
pub const PROFICIENT_WINDOW: usize = 3;
pub const PROFICIENT_WINDOW_CORRECT: usize = 2;

pub const DEVELOPING_ACCURACY: f64 = 0.60;
pub const DEVELOPING_STREAK: u32 = 2;

/// Read access to the static prerequisite graph.
pub trait SkillGraph {
    /// Direct prerequisites of a skill, `None` when the skill is not in the catalog.
    fn prerequisites(&self, skill_id: &str) -> Option<&[String]>;
}

/// Read access to a learner's current records.
pub trait PerformanceLookup {
    fn performance(&self, skill_id: &str) -> Option<&SkillPerformance>;
}

impl PerformanceLookup for LearnerProfile {
    fn performance(&self, skill_id: &str) -> Option<&SkillPerformance> {
        self.performance.get(skill_id)
    }
}

impl PerformanceLookup for HashMap<String, SkillPerformance> {
    fn performance(&self, skill_id: &str) -> Option<&SkillPerformance> {
        self.get(skill_id)
    }
}

/// Applies one answered question to the record's counters.
pub fn record_outcome(record: &mut SkillPerformance, correct: bool, now: DateTime<Utc>) {
    record.attempts += 1;
    if correct {
        record.correct += 1;
        record.consecutive_correct += 1;
    } else {
        record.consecutive_correct = 0;
    }

    record.recent_history.push_back(correct);
    while record.recent_history.len() > RECENT_HISTORY_LEN {
        record.recent_history.pop_front();
    }

    record.accuracy = record.correct as f64 / record.attempts as f64;
    record.updated_at = now;
}

/// True iff every prerequisite of `skill_id`, transitively, is Mastered.
///
/// A prerequisite without a record, or missing from the catalog, is not met.
/// A skill reached twice on the same path (a cycle) is not met either.
pub fn prerequisites_met<G, L>(skill_id: &str, graph: &G, lookup: &L) -> bool
where
    G: SkillGraph + ?Sized,
    L: PerformanceLookup + ?Sized,
{
    let mut path = HashSet::new();
    prerequisites_met_on_path(skill_id, graph, lookup, &mut path)
}

fn prerequisites_met_on_path<G, L>(
    skill_id: &str,
    graph: &G,
    lookup: &L,
    path: &mut HashSet<String>,
) -> bool
where
    G: SkillGraph + ?Sized,
    L: PerformanceLookup + ?Sized,
{
    let Some(prerequisites) = graph.prerequisites(skill_id) else {
        return false;
    };
    if !path.insert(skill_id.to_string()) {
        tracing::warn!("Prerequisite cycle detected at skill {}", skill_id);
        return false;
    }

    let met = prerequisites.iter().all(|prerequisite| {
        let mastered = lookup
            .performance(prerequisite)
            .map(|record| record.learning_state == LearningState::Mastered)
            .unwrap_or(false);
        mastered && prerequisites_met_on_path(prerequisite, graph, lookup, path)
    });

    path.remove(skill_id);
    met
}

/// Label earned by the record's own counters, ignoring prerequisites.
pub fn label_from_counters(record: &SkillPerformance) -> LearningState {
    if record.attempts < MIN_ATTEMPTS {
        return LearningState::Emerging;
    }

    let history_len = record.recent_history.len();

    if record.accuracy >= MASTERED_ACCURACY
        && record.consecutive_correct >= MASTERED_STREAK
        && history_len >= MASTERED_WINDOW
        && record.recent_correct(MASTERED_WINDOW) >= MASTERED_WINDOW_CORRECT
    {
        return LearningState::Mastered;
    }

    if record.accuracy >= PROFICIENT_ACCURACY
        && record.consecutive_correct >= PROFICIENT_STREAK
        && history_len >= PROFICIENT_WINDOW
        && record.recent_correct(PROFICIENT_WINDOW) >= PROFICIENT_WINDOW_CORRECT
    {
        return LearningState::Proficient;
    }

    if record.accuracy >= DEVELOPING_ACCURACY
        || record.consecutive_correct >= DEVELOPING_STREAK
        || record.recent_history.iter().any(|outcome| *outcome)
    {
        return LearningState::Developing;
    }

    LearningState::Emerging
}

pub fn assign_label<G, L>(record: &SkillPerformance, graph: &G, lookup: &L) -> LearningState
where
    G: SkillGraph + ?Sized,
    L: PerformanceLookup + ?Sized,
{
    if !prerequisites_met(&record.skill_id, graph, lookup) {
        return LearningState::Emerging;
    }
    label_from_counters(record)
}

/// Recomputes the cached label and stamps `mastered_at` on first entry into
/// Mastered. Returns the previous label.
pub fn refresh_label<G, L>(
    record: &mut SkillPerformance,
    graph: &G,
    lookup: &L,
    now: DateTime<Utc>,
) -> LearningState
where
    G: SkillGraph + ?Sized,
    L: PerformanceLookup + ?Sized,
{
    let previous = record.learning_state;
    let next = assign_label(record, graph, lookup);

    if next == LearningState::Mastered && record.mastered_at.is_none() {
        record.mastered_at = Some(now);
    }
    record.learning_state = next;

    if previous != next {
        tracing::debug!(
            "Learning state changed: learner={}, skill={}, {} -> {}",
            record.learner_id,
            record.skill_id,
            previous,
            next
        );
    }

    previous
}
