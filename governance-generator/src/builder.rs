//! `createProtocolFromProposal` and `mergeProtocols` (spec.md §4.4): turning
//! a [`ParsedProposal`] into a concrete [`Protocol`], and folding several
//! protocols into one.

use crate::parser::ParsedProposal;
use chrono::{DateTime, Utc};
use governance_core::{ContextMatcher, EnforcementConfig, MatchPatterns, Protocol, ProtocolConstraint};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct CreateProtocolOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub enforcement: Option<EnforcementConfig>,
    pub applicable_contexts: Option<ContextMatcher>,
}

/// Assemble a fresh protocol with one constraint per extracted suggestion.
/// Option fields in `options` override the defaults (priority 0, default
/// enforcement, universal context matcher).
pub fn create_protocol_from_proposal(
    id: impl Into<String>,
    parsed: &ParsedProposal,
    options: CreateProtocolOptions,
    created_at: DateTime<Utc>,
) -> Protocol {
    let constraints = parsed
        .suggested_constraints
        .iter()
        .enumerate()
        .map(|(idx, suggestion)| ProtocolConstraint {
            id: format!("generated-{idx}"),
            rule: suggestion.rule.clone(),
            severity: suggestion.severity,
            message: suggestion.message.clone(),
            enabled: true,
        })
        .collect();

    Protocol {
        id: id.into(),
        version: "1.0.0".to_string(),
        name: options.name,
        description: options.description,
        priority: options.priority.unwrap_or(0),
        constraints,
        enforcement: options.enforcement.unwrap_or_default(),
        applicable_contexts: options.applicable_contexts.unwrap_or_default(),
        extends: Vec::new(),
        requires: Vec::new(),
        conflicts: Vec::new(),
        created_at,
    }
}

fn union_match_patterns(a: &Option<MatchPatterns>, b: &Option<MatchPatterns>) -> Option<MatchPatterns> {
    match (a, b) {
        (None, None) => None,
        (Some(p), None) | (None, Some(p)) => Some(p.clone()),
        (Some(a), Some(b)) => {
            let mut include = a.include.clone();
            for item in &b.include {
                if !include.contains(item) {
                    include.push(item.clone());
                }
            }
            let mut exclude = a.exclude.clone();
            for item in &b.exclude {
                if !exclude.contains(item) {
                    exclude.push(item.clone());
                }
            }
            Some(MatchPatterns { include, exclude })
        }
    }
}

fn union_context_matchers(matchers: &[ContextMatcher]) -> ContextMatcher {
    matchers.iter().fold(ContextMatcher::default(), |acc, next| ContextMatcher {
        feature_id: union_match_patterns(&acc.feature_id, &next.feature_id),
        project_dir: union_match_patterns(&acc.project_dir, &next.project_dir),
        target_files: union_match_patterns(&acc.target_files, &next.target_files),
        source_files: union_match_patterns(&acc.source_files, &next.source_files),
        worker_id: union_match_patterns(&acc.worker_id, &next.worker_id),
        task_description: union_match_patterns(&acc.task_description, &next.task_description),
        environments: union_match_patterns(&acc.environments, &next.environments),
        branches: union_match_patterns(&acc.branches, &next.branches),
    })
}

/// Fold several protocols into one: sort by ascending priority, merge
/// constraints by id (later source overrides earlier), union applicable
/// contexts, take the max priority, and extend from every source id.
pub fn merge_protocols(
    protocols: &[Protocol],
    new_id: impl Into<String>,
    new_name: impl Into<String>,
    created_at: DateTime<Utc>,
) -> Protocol {
    let mut sorted = protocols.to_vec();
    sorted.sort_by_key(|p| p.priority);

    let mut merged_constraints: IndexMap<String, ProtocolConstraint> = IndexMap::new();
    for protocol in &sorted {
        for constraint in &protocol.constraints {
            merged_constraints.insert(constraint.id.clone(), constraint.clone());
        }
    }

    let matchers: Vec<ContextMatcher> = sorted.iter().map(|p| p.applicable_contexts.clone()).collect();
    let max_priority = sorted.iter().map(|p| p.priority).max().unwrap_or(0);
    let extends: Vec<String> = sorted.iter().map(|p| p.id.clone()).collect();

    Protocol {
        id: new_id.into(),
        version: "1.0.0".to_string(),
        name: Some(new_name.into()),
        description: None,
        priority: max_priority,
        constraints: merged_constraints.into_values().collect(),
        enforcement: sorted
            .last()
            .map(|p| p.enforcement.clone())
            .unwrap_or_default(),
        applicable_contexts: union_context_matchers(&matchers),
        extends,
        requires: Vec::new(),
        conflicts: Vec::new(),
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_proposal;
    use governance_core::{ConstraintRule, Severity};

    #[test]
    fn create_protocol_assigns_one_constraint_per_suggestion() {
        let parsed = parse_proposal("Only use search and read_file tools.");
        let protocol = create_protocol_from_proposal(
            "proto-1",
            &parsed,
            CreateProtocolOptions::default(),
            Utc::now(),
        );
        assert_eq!(protocol.constraints.len(), parsed.suggested_constraints.len());
        assert_eq!(protocol.priority, 0);
    }

    #[test]
    fn options_override_defaults() {
        let parsed = parse_proposal("Only use search.");
        let options = CreateProtocolOptions {
            priority: Some(5),
            name: Some("custom".to_string()),
            ..Default::default()
        };
        let protocol = create_protocol_from_proposal("p", &parsed, options, Utc::now());
        assert_eq!(protocol.priority, 5);
        assert_eq!(protocol.name, Some("custom".to_string()));
    }

    #[test]
    fn merge_takes_max_priority_and_records_extends() {
        let now = Utc::now();
        let low = Protocol {
            id: "low".to_string(),
            version: "1.0.0".to_string(),
            name: None,
            description: None,
            priority: 1,
            constraints: vec![ProtocolConstraint {
                id: "c1".to_string(),
                rule: ConstraintRule::ToolRestriction {
                    allowed_tools: vec!["a".to_string()],
                    denied_tools: vec![],
                    tool_patterns: vec![],
                    require_approval: vec![],
                },
                severity: Severity::Warning,
                message: "low".to_string(),
                enabled: true,
            }],
            enforcement: EnforcementConfig::default(),
            applicable_contexts: ContextMatcher::default(),
            extends: vec![],
            requires: vec![],
            conflicts: vec![],
            created_at: now,
        };
        let mut high = low.clone();
        high.id = "high".to_string();
        high.priority = 9;
        high.constraints[0].message = "high".to_string();

        let merged = merge_protocols(&[low, high], "merged", "Merged Protocol", now);
        assert_eq!(merged.priority, 9);
        assert_eq!(merged.extends, vec!["low".to_string(), "high".to_string()]);
        assert_eq!(merged.constraints.len(), 1);
        assert_eq!(merged.constraints[0].message, "high");
    }
}
