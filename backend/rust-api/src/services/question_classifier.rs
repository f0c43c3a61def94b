//! Keyword heuristics that tag questions with a difficulty level and a
//! problem-solving framework step. Rules are tried in order; first hit wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::question::{Difficulty, FrameworkStep, Question};

lazy_static! {
    static ref EVALUATION_CUES: Regex = Regex::new(
        r"(?i)\b(progress monitoring|monitor\w*|effective\w*|outcomes?|fidelity|evaluat\w* (?:the|whether|if)|response to (?:the )?intervention)\b"
    )
    .unwrap();
    static ref ANALYSIS_CUES: Regex = Regex::new(
        r"(?i)\b(why|hypothes\w*|function of|functional|cause[sd]?|underlying|explain\w*|analy[sz]\w*)\b"
    )
    .unwrap();
    static ref IMPLEMENTATION_CUES: Regex = Regex::new(
        r"(?i)\b(intervention|implement\w*|strateg\w*|plan|design\w*|recommend\w*|support\w*)\b"
    )
    .unwrap();
    static ref IDENTIFICATION_CUES: Regex = Regex::new(
        r"(?i)\b(first step|identif\w*|screen\w*|referr\w*|concern\w*|define|defining|baseline|data)\b"
    )
    .unwrap();

    static ref ANALYSIS_DIFFICULTY_CUES: Regex = Regex::new(
        r"(?i)\b(most likely (?:explains|reason|cause)|best explains|hypothes\w*|interpret\w*|which of the following (?:would )?best account|discrepan\w*)\b"
    )
    .unwrap();
    static ref APPLICATION_CUES: Regex = Regex::new(
        r"(?i)\b(a (?:student|teacher|parent|school psychologist|principal|team)|scenario|should (?:the|a)|most appropriate|next step|first step)\b"
    )
    .unwrap();
}

/// Rules in evaluation order. Evaluation cues are checked before identification
/// so that "progress monitoring data" is not read as problem identification.
fn framework_rules() -> [(FrameworkStep, &'static Regex); 4] {
    [
        (FrameworkStep::PlanEvaluation, &*EVALUATION_CUES),
        (FrameworkStep::ProblemAnalysis, &*ANALYSIS_CUES),
        (FrameworkStep::PlanImplementation, &*IMPLEMENTATION_CUES),
        (FrameworkStep::ProblemIdentification, &*IDENTIFICATION_CUES),
    ]
}

/// Guesses the framework step from question text.
pub fn infer_framework_step(stem: &str) -> Option<FrameworkStep> {
    framework_rules()
        .into_iter()
        .find(|(_, cue)| cue.is_match(stem))
        .map(|(step, _)| step)
}

pub fn classify_difficulty(question: &Question) -> Difficulty {
    let difficulty = if ANALYSIS_DIFFICULTY_CUES.is_match(&question.stem) {
        Difficulty::Analysis
    } else if APPLICATION_CUES.is_match(&question.stem) {
        Difficulty::Application
    } else {
        Difficulty::Foundational
    };

    if question.is_multi_answer() {
        difficulty.max(Difficulty::Application)
    } else {
        difficulty
    }
}

/// Fills in missing difficulty and framework-step tags. Explicit tags win.
pub fn tag_question(question: &mut Question) {
    if question.tags.difficulty.is_none() {
        question.tags.difficulty = Some(classify_difficulty(question));
    }
    if question.tags.framework_step.is_none() {
        question.tags.framework_step = infer_framework_step(&question.stem);
    }

    tracing::debug!(
        "Tagged question {}: difficulty={}, framework_step={}",
        question.id,
        question.tags.difficulty.map_or("none", |d| d.as_str()),
        question.tags.framework_step.map_or("none", |s| s.as_str())
    );
}
