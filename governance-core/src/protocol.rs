//! `Protocol` — the named, versioned, priority-ordered bundle of constraints
//! that governs a worker, with inheritance (`extends`), hard dependency
//! (`requires`), and mutual exclusion (`conflicts`) metadata.

use crate::constraint::ProtocolConstraint;
use crate::context_matcher::ContextMatcher;
use crate::enforcement_config::EnforcementConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: i64,
    pub constraints: Vec<ProtocolConstraint>,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    #[serde(default)]
    pub applicable_contexts: ContextMatcher,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Protocol {
    /// Invariant: within one protocol, constraint ids are unique. Returns
    /// the first duplicate id found, if any.
    pub fn duplicate_constraint_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        for c in &self.constraints {
            if !seen.insert(c.id.as_str()) {
                return Some(c.id.as_str());
            }
        }
        None
    }

    /// A cheap fingerprint of the mutable parts of a protocol, used as part
    /// of the validator's cache key (see spec.md §4.2's `(id, version,
    /// serialize(constraints))` cache key).
    pub fn constraints_fingerprint(&self) -> String {
        serde_json::to_string(&self.constraints).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ConstraintRule, Severity};

    fn sample_constraint(id: &str) -> ProtocolConstraint {
        ProtocolConstraint {
            id: id.to_string(),
            rule: ConstraintRule::ToolRestriction {
                allowed_tools: vec![],
                denied_tools: vec![],
                tool_patterns: vec![],
                require_approval: vec![],
            },
            severity: Severity::Error,
            message: "test".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn detects_duplicate_constraint_ids() {
        let protocol = Protocol {
            id: "p".into(),
            version: "1".into(),
            name: None,
            description: None,
            priority: 0,
            constraints: vec![sample_constraint("c1"), sample_constraint("c1")],
            enforcement: Default::default(),
            applicable_contexts: Default::default(),
            extends: vec![],
            requires: vec![],
            conflicts: vec![],
            created_at: Utc::now(),
        };
        assert_eq!(protocol.duplicate_constraint_id(), Some("c1"));
    }
}
