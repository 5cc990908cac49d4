//! `ValidationIssue` — the uniform finding type every validation pass
//! accumulates into. Never thrown: issues are data, and severity only
//! decides whether a protocol is `isValid` or merely flagged.

use crate::fix::SuggestedFix;
use governance_core::Severity;
use serde::{Deserialize, Serialize};

/// Which validation pass (or constraint family) an issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    BaseConstraint,
    ToolRestriction,
    FileAccess,
    OutputFormat,
    Behavioral,
    Temporal,
    Resource,
    SideEffect,
    Enforcement,
    Complexity,
    Risk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: Severity,
    pub category: IssueCategory,
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub constraint_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub suggested_fix: Option<SuggestedFix>,
    pub auto_fixable: bool,
}

impl ValidationIssue {
    pub fn new(issue_type: Severity, category: IssueCategory, code: &str, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            category,
            code: code.to_string(),
            message: message.into(),
            constraint_id: None,
            path: None,
            suggested_fix: None,
            auto_fixable: false,
        }
    }

    pub fn with_constraint(mut self, constraint_id: impl Into<String>) -> Self {
        self.constraint_id = Some(constraint_id.into());
        self
    }

    pub fn with_fix(mut self, fix: SuggestedFix) -> Self {
        self.suggested_fix = Some(fix);
        self.auto_fixable = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.issue_type == Severity::Error
    }
}
