//! Per-answer diagnostic feedback. Stateless: every call is a lookup over the
//! question, the learner's selection and the learner's current labels.

use crate::models::distractor::DistractorPattern;
use crate::models::feedback::FeedbackPayload;
use crate::models::question::Question;
use crate::models::skill::{LearnerProfile, LearningState, Skill};

use super::distractor_matcher::match_distractor_pattern;
use super::question_classifier::infer_framework_step;

const EMERGING_TIPS: &[&str] = &[
    "Reread the question stem and underline what it actually asks before looking at the choices.",
    "Review the core definitions for this skill before attempting more questions.",
];

const DEVELOPING_TIPS: &[&str] = &[
    "Eliminate choices that use absolute language or skip assessment, then compare what is left.",
    "After each miss, write one sentence on why the correct answer is better than yours.",
];

const PROFICIENT_TIPS: &[&str] = &[
    "Identify which step of the problem-solving model the question targets before answering.",
    "Practice mixed sets so you recognize this skill when it is not labeled.",
    "Time yourself and aim to answer within the exam pace.",
];

const MASTERED_TIPS: &[&str] = &[
    "Move on to skills that depend on this one; it now counts toward their prerequisites.",
    "Explain the reasoning behind each distractor to confirm you can spot the misconception.",
    "Revisit this skill periodically with scenario questions to keep it current.",
];

/// Static remediation strings for a learning state, fewer and simpler at the
/// low end.
pub fn remediation_tips(state: LearningState) -> Vec<String> {
    let tips = match state {
        LearningState::Emerging => EMERGING_TIPS,
        LearningState::Developing => DEVELOPING_TIPS,
        LearningState::Proficient => PROFICIENT_TIPS,
        LearningState::Mastered => MASTERED_TIPS,
    };
    tips.iter().map(|tip| tip.to_string()).collect()
}

/// Builds feedback for one submission.
///
/// `skill` is the catalog entry for the question's skill tag; when it is
/// missing the tip list is empty and the state defaults to Emerging.
pub fn compose_feedback(
    question: &Question,
    selected: &[String],
    correct: bool,
    skill: Option<&Skill>,
    profile: &LearnerProfile,
    patterns: &[DistractorPattern],
) -> FeedbackPayload {
    let (pattern_id, pattern) = if correct {
        (None, None)
    } else {
        let chosen_text = wrong_choice_text(question, selected);
        let correct_text = correct_choice_text(question);
        let id = match_distractor_pattern(&chosen_text, Some(&correct_text));
        let pattern = id.and_then(|id| patterns.iter().find(|p| p.id == id));
        (id.map(str::to_string), pattern)
    };

    let framework_step = question
        .tags
        .framework_step
        .or_else(|| infer_framework_step(&question.stem));

    let learning_state = skill
        .map(|skill| profile.state_for(&skill.id))
        .unwrap_or_default();
    let tips = if skill.is_some() {
        remediation_tips(learning_state)
    } else {
        Vec::new()
    };

    FeedbackPayload {
        correct,
        pattern_id,
        pattern_name: pattern.map(|p| p.name.clone()),
        explanation: pattern.map(|p| p.feedback.clone()),
        rationale: question.rationale.clone(),
        framework_step,
        learning_state,
        tips,
    }
}

/// Text of the selected choices that are not correct; falls back to every
/// selected choice when the miss was an omission in a multi-answer question.
fn wrong_choice_text(question: &Question, selected: &[String]) -> String {
    let wrong: Vec<&str> = selected
        .iter()
        .filter(|label| !question.correct.contains(*label))
        .filter_map(|label| question.choice(label))
        .map(|choice| choice.text.as_str())
        .collect();

    if !wrong.is_empty() {
        return wrong.join(" ");
    }

    selected
        .iter()
        .filter_map(|label| question.choice(label))
        .map(|choice| choice.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn correct_choice_text(question: &Question) -> String {
    question
        .correct
        .iter()
        .filter_map(|label| question.choice(label))
        .map(|choice| choice.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
