use serde::Deserialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::models::distractor::{builtin_patterns, DistractorPattern};
use crate::models::question::{Difficulty, Question, QuestionListQuery};
use crate::models::skill::Skill;

use super::performance_tracker::SkillGraph;
use super::question_classifier::tag_question;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate {kind} id in catalog: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("Invalid difficulty filter: {0}")]
    InvalidFilter(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    skills: Vec<Skill>,
    #[serde(default)]
    questions: Vec<Question>,
}

/// Immutable reference data: skills, questions and distractor patterns.
#[derive(Debug, Clone)]
pub struct Catalog {
    skills: Vec<Skill>,
    skill_index: HashMap<String, usize>,
    questions: Vec<Question>,
    question_index: HashMap<String, usize>,
    dependents: HashMap<String, Vec<String>>,
    patterns: Vec<DistractorPattern>,
    skipped_questions: usize,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            "Catalog loaded from {}: {} skills, {} questions ({} skipped)",
            path.display(),
            catalog.skills.len(),
            catalog.questions.len(),
            catalog.skipped_questions
        );
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::build(file.skills, file.questions)
    }

    pub fn build(skills: Vec<Skill>, questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut skill_index = HashMap::with_capacity(skills.len());
        for (position, skill) in skills.iter().enumerate() {
            if skill_index.insert(skill.id.clone(), position).is_some() {
                return Err(CatalogError::Duplicate {
                    kind: "skill",
                    id: skill.id.clone(),
                });
            }
        }

        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for skill in &skills {
            for prerequisite in &skill.prerequisites {
                if !skill_index.contains_key(prerequisite) {
                    tracing::warn!(
                        "Skill {} lists unknown prerequisite {}; it can never be met",
                        skill.id,
                        prerequisite
                    );
                }
                dependents
                    .entry(prerequisite.clone())
                    .or_default()
                    .push(skill.id.clone());
            }
        }

        let mut kept = Vec::with_capacity(questions.len());
        let mut question_index = HashMap::with_capacity(questions.len());
        let mut seen_questions = HashSet::with_capacity(questions.len());
        let mut skipped_questions = 0;
        for mut question in questions {
            if !seen_questions.insert(question.id.clone()) {
                return Err(CatalogError::Duplicate {
                    kind: "question",
                    id: question.id,
                });
            }
            if let Err(reason) = question.validate() {
                tracing::warn!("Skipping question {}: {}", question.id, reason);
                skipped_questions += 1;
                continue;
            }
            if let Some(skill_id) = &question.tags.skill_id {
                if !skill_index.contains_key(skill_id) {
                    tracing::warn!(
                        "Question {} references unknown skill {}",
                        question.id,
                        skill_id
                    );
                }
            }
            tag_question(&mut question);
            question_index.insert(question.id.clone(), kept.len());
            kept.push(question);
        }

        Ok(Self {
            skills,
            skill_index,
            questions: kept,
            question_index,
            dependents,
            patterns: builtin_patterns(),
            skipped_questions,
        })
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skill_index.get(id).map(|&position| &self.skills[position])
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.question_index
            .get(id)
            .map(|&position| &self.questions[position])
    }

    pub fn questions(&self, query: &QuestionListQuery) -> Result<Vec<&Question>, CatalogError> {
        let difficulty = query
            .difficulty
            .as_deref()
            .map(Difficulty::from_str)
            .transpose()
            .map_err(CatalogError::InvalidFilter)?;

        Ok(self
            .questions
            .iter()
            .filter(|q| {
                query
                    .skill_id
                    .as_ref()
                    .map_or(true, |skill| q.tags.skill_id.as_ref() == Some(skill))
            })
            .filter(|q| difficulty.map_or(true, |d| q.tags.difficulty == Some(d)))
            .collect())
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn patterns(&self) -> &[DistractorPattern] {
        &self.patterns
    }

    pub fn pattern(&self, id: &str) -> Option<&DistractorPattern> {
        self.patterns.iter().find(|pattern| pattern.id == id)
    }

    /// Every skill that lists `skill_id` as a prerequisite, directly or
    /// transitively, ordered so each skill comes after its prerequisites
    /// within the set. Skills caught in a cycle come last.
    pub fn dependents_of(&self, skill_id: &str) -> Vec<String> {
        let reachable = self.reachable_dependents(skill_id);
        let members: HashSet<&str> = reachable.iter().map(String::as_str).collect();

        let mut pending: HashMap<&str, usize> = reachable
            .iter()
            .map(|id| {
                let blocking = self
                    .prerequisites(id)
                    .unwrap_or_default()
                    .iter()
                    .filter(|prerequisite| members.contains(prerequisite.as_str()))
                    .count();
                (id.as_str(), blocking)
            })
            .collect();

        let mut ready: VecDeque<&str> = reachable
            .iter()
            .map(String::as_str)
            .filter(|id| pending.get(id) == Some(&0))
            .collect();

        let mut ordered = Vec::with_capacity(reachable.len());
        while let Some(current) = ready.pop_front() {
            ordered.push(current.to_string());
            for dependent in self.dependents.get(current).into_iter().flatten() {
                if let Some(blocking) = pending.get_mut(dependent.as_str()) {
                    *blocking = blocking.saturating_sub(1);
                    if *blocking == 0 {
                        ready.push_back(dependent.as_str());
                    }
                }
            }
        }

        if ordered.len() < reachable.len() {
            let placed: HashSet<String> = ordered.iter().cloned().collect();
            ordered.extend(reachable.into_iter().filter(|id| !placed.contains(id)));
        }
        ordered
    }

    fn reachable_dependents(&self, skill_id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reachable = Vec::new();
        let mut frontier = vec![skill_id.to_string()];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for dependent in self.dependents.get(&current).into_iter().flatten() {
                    if dependent != skill_id && seen.insert(dependent.clone()) {
                        reachable.push(dependent.clone());
                        next.push(dependent.clone());
                    }
                }
            }
            frontier = next;
        }

        reachable
    }
}

impl SkillGraph for Catalog {
    fn prerequisites(&self, skill_id: &str) -> Option<&[String]> {
        self.skill(skill_id).map(|skill| skill.prerequisites.as_slice())
    }
}
