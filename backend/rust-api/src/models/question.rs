use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const MIN_CHOICES: usize = 2;
pub const MAX_CHOICES: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Foundational,
    Application,
    Analysis,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Foundational => "foundational",
            Difficulty::Application => "application",
            Difficulty::Analysis => "analysis",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "foundational" => Ok(Difficulty::Foundational),
            "application" => Ok(Difficulty::Application),
            "analysis" => Ok(Difficulty::Analysis),
            _ => Err(format!("Invalid difficulty: {}", value)),
        }
    }
}

/// Steps of the problem-solving framework questions are tagged with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkStep {
    ProblemIdentification,
    ProblemAnalysis,
    PlanImplementation,
    PlanEvaluation,
}

impl FrameworkStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkStep::ProblemIdentification => "problem_identification",
            FrameworkStep::ProblemAnalysis => "problem_analysis",
            FrameworkStep::PlanImplementation => "plan_implementation",
            FrameworkStep::PlanEvaluation => "plan_evaluation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionTags {
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub framework_id: Option<String>,
    #[serde(default)]
    pub framework_step: Option<FrameworkStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub stem: String,
    pub choices: Vec<Choice>,
    pub correct: BTreeSet<String>,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub tags: QuestionTags,
}

impl Question {
    pub fn is_multi_answer(&self) -> bool {
        self.correct.len() > 1
    }

    pub fn choice(&self, label: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.label == label)
    }

    /// Correct iff the selected label set equals the correct set.
    pub fn is_correct(&self, selected: &[String]) -> bool {
        let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
        let expected: BTreeSet<&str> = self.correct.iter().map(String::as_str).collect();
        selected == expected
    }

    /// Structural checks applied at catalog load; returns the reason a
    /// question has to be skipped.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_CHOICES..=MAX_CHOICES).contains(&self.choices.len()) {
            return Err(format!(
                "expected {}-{} choices, found {}",
                MIN_CHOICES,
                MAX_CHOICES,
                self.choices.len()
            ));
        }
        let labels: BTreeSet<&str> = self.choices.iter().map(|c| c.label.as_str()).collect();
        if labels.len() != self.choices.len() {
            return Err("duplicate choice labels".to_string());
        }
        if self.correct.is_empty() {
            return Err("no correct choice".to_string());
        }
        if let Some(unknown) = self.correct.iter().find(|l| !labels.contains(l.as_str())) {
            return Err(format!("correct label {} is not a choice", unknown));
        }
        Ok(())
    }
}

/// Learner-facing projection: answers and rationale stay server side.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub stem: String,
    pub choices: Vec<Choice>,
    pub multi_answer: bool,
    pub skill_id: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub framework_step: Option<FrameworkStep>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            stem: question.stem.clone(),
            choices: question.choices.clone(),
            multi_answer: question.is_multi_answer(),
            skill_id: question.tags.skill_id.clone(),
            difficulty: question.tags.difficulty,
            framework_step: question.tags.framework_step,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestionListQuery {
    pub skill_id: Option<String>,
    pub difficulty: Option<String>,
}
