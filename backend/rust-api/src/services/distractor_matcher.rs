//! Ordered keyword rules that guess which misconception a wrong answer shows.
//!
//! The first rule that matches wins. There is no scoring between rules, so
//! list order is the only tie-breaker. False positives are expected.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::models::distractor::{
    ETHICAL_LEGAL_VIOLATION, EXTREME_LANGUAGE, PARTIAL_TRUTH, PREMATURE_ACTION, PUNITIVE_RESPONSE,
    SCOPE_OF_PRACTICE, SINGLE_DATA_SOURCE,
};

/// Minimum share of the correct answer's content words a distractor must
/// repeat to count as a partial truth.
const PARTIAL_TRUTH_OVERLAP: f64 = 0.5;

lazy_static! {
    static ref ACTION_VERBS: Regex = Regex::new(
        r"(?i)\b(implement\w*|begin\w*|start\w*|initiat\w*|refer\w*|place\w*|placing|administer\w*|apply|applying|enroll\w*|provide\w*|immediately|right away)\b"
    )
    .unwrap();
    static ref ASSESSMENT_VERBS: Regex = Regex::new(
        r"(?i)\b(assess\w*|evaluat\w*|gather\w*|collect\w*|review\w*|observ\w*|consult\w*|screen\w*|interview\w*|determin\w*|identify\w*|investigat\w*|examin\w*|data)\b"
    )
    .unwrap();
    static ref ABSOLUTE_QUALIFIERS: Regex = Regex::new(
        r"(?i)\b(always|never|all|every|everyone|only|none|must|completely|entirely|guaranteed?|regardless)\b"
    )
    .unwrap();
    static ref HEDGING_QUALIFIERS: Regex = Regex::new(
        r"(?i)\b(may|might|could|some|often|usually|typically|generally|likely|consider\w*|possibly|most)\b"
    )
    .unwrap();
    static ref PUNITIVE_TERMS: Regex = Regex::new(
        r"(?i)\b(suspend\w*|suspension|expel\w*|expulsion|punish\w*|detention|zero[- ]tolerance|remove\w* (?:privileges|recess))\b"
    )
    .unwrap();
    static ref SCOPE_TERMS: Regex = Regex::new(
        r"(?i)\b(prescrib\w*|medication|medicat\w*|medical diagnosis|diagnose\w* (?:adhd|autism|a medical|the medical))\b"
    )
    .unwrap();
    static ref ETHICS_TERMS: Regex = Regex::new(
        r"(?i)(without (?:parental |the parents'? |informed |written )?(?:consent|permission|notice)|\bshar\w* (?:the )?(?:records?|results|files)\b|\bdisclos\w*\b|\bcovert\w*\b)"
    )
    .unwrap();
    static ref SINGLE_SOURCE_TERMS: Regex = Regex::new(
        r"(?i)\b(solely|exclusively|single (?:test|score|assessment|measure|observation)|one (?:test|score|assessment|measure|observation)|only (?:the|on the|on a) (?:score|test|results?))\b"
    )
    .unwrap();
    static ref WORD: Regex = Regex::new(r"[A-Za-z']+").unwrap();
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "to", "in", "on", "for", "with", "by", "is", "are",
    "be", "it", "its", "that", "this", "as", "at", "from", "their", "they", "then", "than",
];

type Rule = fn(&str, Option<&str>) -> bool;

/// Rules in evaluation order.
const RULES: &[(&str, Rule)] = &[
    (PREMATURE_ACTION, premature_action),
    (EXTREME_LANGUAGE, extreme_language),
    (PUNITIVE_RESPONSE, punitive_response),
    (SCOPE_OF_PRACTICE, scope_of_practice),
    (ETHICAL_LEGAL_VIOLATION, ethical_legal_violation),
    (SINGLE_DATA_SOURCE, single_data_source),
    (PARTIAL_TRUTH, partial_truth),
];

/// Returns the id of the first pattern whose rule matches `text`, if any.
pub fn match_distractor_pattern(text: &str, correct_text: Option<&str>) -> Option<&'static str> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let matched = RULES
        .iter()
        .find(|(_, rule)| rule(text, correct_text))
        .map(|(id, _)| *id);

    tracing::debug!("Distractor pattern match: text={:?}, pattern={:?}", text, matched);
    matched
}

fn premature_action(text: &str, _correct: Option<&str>) -> bool {
    ACTION_VERBS.is_match(text) && !ASSESSMENT_VERBS.is_match(text)
}

fn extreme_language(text: &str, _correct: Option<&str>) -> bool {
    ABSOLUTE_QUALIFIERS.is_match(text) && !HEDGING_QUALIFIERS.is_match(text)
}

fn punitive_response(text: &str, _correct: Option<&str>) -> bool {
    PUNITIVE_TERMS.is_match(text)
}

fn scope_of_practice(text: &str, _correct: Option<&str>) -> bool {
    SCOPE_TERMS.is_match(text)
}

fn ethical_legal_violation(text: &str, _correct: Option<&str>) -> bool {
    ETHICS_TERMS.is_match(text)
}

fn single_data_source(text: &str, _correct: Option<&str>) -> bool {
    SINGLE_SOURCE_TERMS.is_match(text)
}

fn partial_truth(text: &str, correct: Option<&str>) -> bool {
    let Some(correct) = correct else {
        return false;
    };
    let expected = content_words(correct);
    if expected.is_empty() {
        return false;
    }
    let chosen = content_words(text);
    if chosen == expected {
        return false;
    }
    let shared = expected.intersection(&chosen).count();
    shared as f64 / expected.len() as f64 >= PARTIAL_TRUTH_OVERLAP
}

fn content_words(text: &str) -> HashSet<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
