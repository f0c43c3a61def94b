use serde::{Deserialize, Serialize};

pub const PREMATURE_ACTION: &str = "premature-action";
pub const EXTREME_LANGUAGE: &str = "extreme-language";
pub const PUNITIVE_RESPONSE: &str = "punitive-response";
pub const SCOPE_OF_PRACTICE: &str = "scope-of-practice";
pub const ETHICAL_LEGAL_VIOLATION: &str = "ethical-legal-violation";
pub const SINGLE_DATA_SOURCE: &str = "single-data-source";
pub const PARTIAL_TRUTH: &str = "partial-truth";

/// A named misconception category a wrong answer can represent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistractorPattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub heuristic: String,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchPatternRequest {
    pub text: String,
    #[serde(default)]
    pub correct_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchPatternResponse {
    pub pattern_id: Option<String>,
    pub pattern: Option<DistractorPattern>,
}

/// Reference table of the patterns the matcher can return, in match order.
pub fn builtin_patterns() -> Vec<DistractorPattern> {
    let entries: [(&str, &str, &str, &str, &str); 7] = [
        (
            PREMATURE_ACTION,
            "Premature action",
            "Jumps to an intervention or placement before the problem has been assessed.",
            "action verb present, no assessment verb",
            "Before acting, gather and review data. The best answer usually begins with assessment, consultation, or observation.",
        ),
        (
            EXTREME_LANGUAGE,
            "Extreme language",
            "Uses absolute qualifiers that rarely hold in practice.",
            "absolute qualifier present, no hedging qualifier",
            "Answers built on words like always, never, or all tend to be wrong. Prefer options that allow for individual differences.",
        ),
        (
            PUNITIVE_RESPONSE,
            "Punitive response",
            "Responds to behavior with exclusion or punishment instead of support.",
            "punishment or exclusion vocabulary",
            "Exclusionary discipline is rarely the best practice answer. Look for options that teach replacement behavior.",
        ),
        (
            SCOPE_OF_PRACTICE,
            "Scope of practice",
            "Assigns a task that falls outside the practitioner's professional role.",
            "medical diagnosis or prescribing vocabulary",
            "Check whose role the action belongs to. Medical diagnosis and medication decisions are made by other professionals.",
        ),
        (
            ETHICAL_LEGAL_VIOLATION,
            "Ethical or legal violation",
            "Skips consent or breaches confidentiality.",
            "missing consent or disclosure vocabulary",
            "Informed consent and confidentiality come first. Eliminate any option that bypasses them.",
        ),
        (
            SINGLE_DATA_SOURCE,
            "Single data source",
            "Makes a high-stakes decision from one measure.",
            "sole, single, or one-measure vocabulary",
            "Decisions should rest on multiple sources of data. Be wary of options that rely on a single score or test.",
        ),
        (
            PARTIAL_TRUTH,
            "Partial truth",
            "Shares most of the correct answer but leaves out or distorts a key element.",
            "high word overlap with the correct answer",
            "This option is close. Compare it word by word with the other choices to find the missing element.",
        ),
    ];

    entries
        .into_iter()
        .map(
            |(id, name, description, heuristic, feedback)| DistractorPattern {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                heuristic: heuristic.to_string(),
                feedback: feedback.to_string(),
            },
        )
        .collect()
}
