//! Structured extraction: turns phrases in free text into
//! [`SuggestedConstraint`]s (spec.md §4.4). Heuristic by design — downstream
//! `governance-validator` validation is the authoritative gate, not this
//! module (spec.md §9).

use crate::suggestion::SuggestedConstraint;
use governance_core::{ConstraintRule, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '_' && c != '-'))
        .filter(|tok| !tok.is_empty() && !tok.eq_ignore_ascii_case("and") && !tok.eq_ignore_ascii_case("or"))
        .map(str::to_string)
        .collect()
}

static ALLOWED_TOOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:only use|allowed tools:?|restrict(?:ed)? to)\s+([a-zA-Z0-9_,\s/-]+?)(?:[.\n]|$)").unwrap()
});
static DENIED_TOOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:don't use|do not use|denied tools:?|forbid(?:den)?(?: to use)?)\s+([a-zA-Z0-9_,\s/-]+?)(?:[.\n]|$)").unwrap()
});
static APPROVAL_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(require approval|need(?:s)? confirmation)").unwrap());

/// Tool allow/deny lists plus `requireApproval`, folded into a single
/// `tool_restriction` suggestion when any signal fires.
pub fn extract_tool_constraints(text: &str) -> Vec<SuggestedConstraint> {
    let mut allowed_tools = Vec::new();
    let mut denied_tools = Vec::new();
    let mut require_approval = Vec::new();

    for cap in ALLOWED_TOOLS.captures_iter(text) {
        allowed_tools.extend(split_list(&cap[1]));
    }
    for cap in DENIED_TOOLS.captures_iter(text) {
        denied_tools.extend(split_list(&cap[1]));
    }

    if APPROVAL_PHRASE.is_match(text) {
        require_approval.extend(crate::patterns::tool_mentions(text));
    }

    if allowed_tools.is_empty() && denied_tools.is_empty() && require_approval.is_empty() {
        return Vec::new();
    }

    vec![SuggestedConstraint::new(
        ConstraintRule::ToolRestriction {
            allowed_tools,
            denied_tools,
            tool_patterns: Vec::new(),
            require_approval,
        },
        Severity::Warning,
        "extracted from proposal text",
    )]
}

static ALLOWED_PATHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:only (?:access|touch|modify|edit)|allowed paths:?|restrict(?:ed)? to)\s+([\w./,\s*-]+?)(?:[.\n]|$)").unwrap()
});
static DENIED_PATHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:don't (?:touch|modify|access|edit)|do not (?:touch|modify|access|edit)|denied paths:?|never (?:touch|modify|access|edit))\s+([\w./,\s*-]+?)(?:[.\n]|$)").unwrap()
});
static READ_ONLY_PHRASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)read[\s-]?only").unwrap());
static EXTENSION_RESTRICTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)only\s+(\.\w+)\s+files?").unwrap());

/// File allow/deny lists, read-only detection, and extension restriction,
/// folded into a single `file_access` suggestion when any signal fires.
pub fn extract_file_constraints(text: &str) -> Vec<SuggestedConstraint> {
    let mut allowed_paths = Vec::new();
    let mut denied_paths = Vec::new();
    let mut read_only = Vec::new();
    let mut allowed_extensions = Vec::new();

    for cap in ALLOWED_PATHS.captures_iter(text) {
        allowed_paths.extend(split_list(&cap[1]));
    }
    for cap in DENIED_PATHS.captures_iter(text) {
        denied_paths.extend(split_list(&cap[1]));
    }

    // Path fragments mentioned anywhere are a weaker signal than an
    // explicit allow/deny phrase, but still worth surfacing as allowed
    // paths when no other list was found.
    if allowed_paths.is_empty() && denied_paths.is_empty() {
        allowed_paths.extend(crate::patterns::file_fragments(text));
    }

    if READ_ONLY_PHRASE.is_match(text) {
        read_only.extend(allowed_paths.clone());
    }

    for cap in EXTENSION_RESTRICTION.captures_iter(text) {
        allowed_extensions.push(cap[1].to_string());
    }

    if allowed_paths.is_empty() && denied_paths.is_empty() && allowed_extensions.is_empty() {
        return Vec::new();
    }

    vec![SuggestedConstraint::new(
        ConstraintRule::FileAccess {
            allowed_paths,
            denied_paths,
            read_only,
            write_only: Vec::new(),
            allowed_extensions,
            denied_extensions: Vec::new(),
            max_file_size: None,
        },
        Severity::Warning,
        "extracted from proposal text",
    )]
}

static MAX_ITERATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)max(?:imum)?\s+(\d+)\s+iterations?").unwrap());
static TIMEOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)timeout\s+(?:of\s+)?(\d+)\s*(second|minute|hour)s?").unwrap());
static PROHIBITED_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:must not|never)\s+([a-z][\w\s-]{2,40}?)(?:[.,;\n]|$)").unwrap());
static REQUIRE_CONFIRMATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)require[sd]?\s+confirmation").unwrap());
static REQUIRE_EXPLANATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)require[sd]?\s+(?:an\s+)?explanation").unwrap());

fn timeout_seconds(amount: u64, unit: &str) -> u64 {
    match unit.to_lowercase().as_str() {
        "minute" => amount * 60,
        "hour" => amount * 3600,
        _ => amount,
    }
}

fn normalize_action(phrase: &str) -> String {
    phrase
        .trim()
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Confirmation/explanation flags, `maxIterations`, `timeoutSeconds`, and
/// prohibited-action phrases, folded into a single `behavioral` suggestion
/// when any signal fires.
pub fn extract_behavioral_constraints(text: &str) -> Vec<SuggestedConstraint> {
    let require_confirmation = REQUIRE_CONFIRMATION.is_match(text);
    let require_explanation = REQUIRE_EXPLANATION.is_match(text);

    let max_iterations = MAX_ITERATIONS
        .captures(text)
        .and_then(|c| c[1].parse::<u64>().ok());

    let timeout_seconds = TIMEOUT
        .captures(text)
        .and_then(|c| Some(timeout_seconds(c[1].parse::<u64>().ok()?, &c[2])));

    let prohibited_actions: Vec<String> = PROHIBITED_ACTION
        .captures_iter(text)
        .map(|c| normalize_action(&c[1]))
        .filter(|a| !a.is_empty())
        .collect();

    if !require_confirmation
        && !require_explanation
        && max_iterations.is_none()
        && timeout_seconds.is_none()
        && prohibited_actions.is_empty()
    {
        return Vec::new();
    }

    vec![SuggestedConstraint::new(
        ConstraintRule::Behavioral {
            require_confirmation,
            max_iterations,
            timeout_seconds,
            require_explanation,
            prohibited_actions,
            required_actions: Vec::new(),
        },
        Severity::Warning,
        "extracted from proposal text",
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_use_extracts_allowed_tools() {
        let suggestions = extract_tool_constraints("Only use search and read_file for this task.");
        assert_eq!(suggestions.len(), 1);
        let ConstraintRule::ToolRestriction { allowed_tools, .. } = &suggestions[0].rule else {
            panic!("expected tool_restriction");
        };
        assert!(allowed_tools.contains(&"search".to_string()));
        assert!(allowed_tools.contains(&"read_file".to_string()));
    }

    #[test]
    fn dont_use_extracts_denied_tools() {
        let suggestions = extract_tool_constraints("Please don't use rm or sudo.");
        let ConstraintRule::ToolRestriction { denied_tools, .. } = &suggestions[0].rule else {
            panic!("expected tool_restriction");
        };
        assert!(denied_tools.contains(&"rm".to_string()));
        assert!(denied_tools.contains(&"sudo".to_string()));
    }

    #[test]
    fn require_approval_phrase_attaches_tool_mentions() {
        let suggestions = extract_tool_constraints("You must call deploy but it requires approval first.");
        let ConstraintRule::ToolRestriction { require_approval, .. } = &suggestions[0].rule else {
            panic!("expected tool_restriction");
        };
        assert!(require_approval.iter().any(|t| t.eq_ignore_ascii_case("deploy")));
    }

    #[test]
    fn extension_restriction_is_extracted() {
        let suggestions = extract_file_constraints("You may only .ts files in this repository.");
        let ConstraintRule::FileAccess { allowed_extensions, .. } = &suggestions[0].rule else {
            panic!("expected file_access");
        };
        assert_eq!(allowed_extensions, &vec![".ts".to_string()]);
    }

    #[test]
    fn max_iterations_and_timeout_are_parsed() {
        let suggestions = extract_behavioral_constraints("Max 10 iterations and a timeout of 5 minutes.");
        let ConstraintRule::Behavioral {
            max_iterations,
            timeout_seconds,
            ..
        } = &suggestions[0].rule
        else {
            panic!("expected behavioral");
        };
        assert_eq!(*max_iterations, Some(10));
        assert_eq!(*timeout_seconds, Some(300));
    }

    #[test]
    fn prohibited_action_phrase_is_normalized() {
        let suggestions = extract_behavioral_constraints("You must not delete production data.");
        let ConstraintRule::Behavioral { prohibited_actions, .. } = &suggestions[0].rule else {
            panic!("expected behavioral");
        };
        assert_eq!(prohibited_actions[0], "delete_production_data");
    }
}
