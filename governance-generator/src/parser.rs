//! `parseProposal` (spec.md §4.4): the entry point that turns a free-text
//! worker proposal into a [`ParsedProposal`] of deduplicated, confidence-
//! scored [`SuggestedConstraint`]s.

use crate::confidence;
use crate::extract::{extract_behavioral_constraints, extract_file_constraints, extract_tool_constraints};
use crate::patterns::{behavior_words, file_fragments, tool_mentions};
use crate::suggestion::{dedup_constraints, SuggestedConstraint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedProposal {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub raw_text: String,
    pub suggested_constraints: Vec<SuggestedConstraint>,
    pub confidence: f64,
}

/// Extract structured constraint suggestions from free text (spec.md §4.4).
/// A structurally invalid input (empty/whitespace-only text) never panics —
/// it yields `is_valid: false` with an explanatory error, per spec.md §7.
pub fn parse_proposal(text: &str) -> ParsedProposal {
    if text.trim().is_empty() {
        return ParsedProposal {
            is_valid: false,
            errors: vec!["proposal text is empty".to_string()],
            raw_text: text.to_string(),
            suggested_constraints: Vec::new(),
            confidence: 0.0,
        };
    }

    let mut suggestions = Vec::new();
    suggestions.extend(extract_tool_constraints(text));
    suggestions.extend(extract_file_constraints(text));
    suggestions.extend(extract_behavioral_constraints(text));
    let suggestions = dedup_constraints(suggestions);

    let tool_signal = !tool_mentions(text).is_empty();
    let file_signal = !file_fragments(text).is_empty();
    let behavior_signal = !behavior_words(text).is_empty();

    let confidence = confidence::score(text, suggestions.len(), tool_signal, file_signal, behavior_signal);

    tracing::debug!(
        suggestion_count = suggestions.len(),
        confidence,
        "parsed proposal text into suggested constraints"
    );

    ParsedProposal {
        is_valid: true,
        errors: Vec::new(),
        raw_text: text.to_string(),
        suggested_constraints: suggestions,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_invalid() {
        let parsed = parse_proposal("   ");
        assert!(!parsed.is_valid);
        assert!(!parsed.errors.is_empty());
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn rich_proposal_extracts_multiple_constraint_families() {
        let text = "Only use search and read_file tools. Don't touch ./secrets/keys.pem. \
                     You must not delete production data, and require confirmation before \
                     any destructive action. Max 20 iterations.";
        let parsed = parse_proposal(text);
        assert!(parsed.is_valid);
        assert!(parsed.suggested_constraints.len() >= 2);
        assert!(parsed.confidence > 0.0);
    }

    #[test]
    fn unrelated_text_yields_no_suggestions_but_stays_valid() {
        let parsed = parse_proposal("The weather today is quite pleasant.");
        assert!(parsed.is_valid);
        assert!(parsed.suggested_constraints.is_empty());
    }
}
