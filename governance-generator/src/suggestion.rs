//! `SuggestedConstraint` — one structured extraction result, plus the
//! dedup-by-`(type, serialize(details))` rule from spec.md §4.4.

use governance_core::{ConstraintRule, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedConstraint {
    pub rule: ConstraintRule,
    pub severity: Severity,
    pub message: String,
}

impl SuggestedConstraint {
    pub fn new(rule: ConstraintRule, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
        }
    }

    /// `(type, JSON(details))` dedup key — the rule's own tagged
    /// serialization already embeds the type discriminant.
    fn dedup_key(&self) -> String {
        serde_json::to_string(&self.rule).unwrap_or_default()
    }
}

/// Deduplicate suggestions by `(type, JSON(details))`, keeping the first
/// occurrence of each distinct key.
pub fn dedup_constraints(suggestions: Vec<SuggestedConstraint>) -> Vec<SuggestedConstraint> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use governance_core::ConstraintRule;

    #[test]
    fn identical_rules_are_deduplicated() {
        let rule = ConstraintRule::ToolRestriction {
            allowed_tools: vec!["search".to_string()],
            denied_tools: vec![],
            tool_patterns: vec![],
            require_approval: vec![],
        };
        let suggestions = vec![
            SuggestedConstraint::new(rule.clone(), Severity::Warning, "a"),
            SuggestedConstraint::new(rule, Severity::Warning, "b"),
        ];
        assert_eq!(dedup_constraints(suggestions).len(), 1);
    }
}
