//! Risk assessment (spec.md §4.2.2): combines structural signals read
//! directly off the protocol with the issues already accumulated by the
//! earlier passes.

use crate::issue::{IssueCategory, ValidationIssue};
use crate::risk::{overall_score, RawScore, RiskCategory, RiskFactor, RiskLevel};
use governance_core::{ConstraintRule, Protocol};
use serde::{Deserialize, Serialize};

fn issues_for(issues: &[ValidationIssue], category: IssueCategory) -> Vec<&ValidationIssue> {
    issues.iter().filter(|i| i.category == category).collect()
}

fn fold_issues(raw: &mut RawScore, matching: &[&ValidationIssue]) {
    for issue in matching {
        raw.add_issue(issue.issue_type, issue.message.clone());
    }
}

fn tool_access_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    let mut has_any_tool_restriction_constraint = false;
    for constraint in &protocol.constraints {
        if let ConstraintRule::ToolRestriction {
            allowed_tools,
            denied_tools,
            tool_patterns,
            ..
        } = &constraint.rule
        {
            has_any_tool_restriction_constraint = true;
            if allowed_tools.is_empty() && denied_tools.is_empty() && tool_patterns.is_empty() {
                raw.add(20, "no tool restrictions configured");
            }
            if !allowed_tools.is_empty() && denied_tools.is_empty() {
                raw.add(5, "allow-list present without any deny-list");
            }
        }
    }
    if !has_any_tool_restriction_constraint {
        raw.add(100, "no tool_restriction constraint declared at all");
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::ToolRestriction));
    raw.finish(
        RiskCategory::ToolAccess,
        vec!["add an explicit deniedTools list".to_string()],
    )
}

fn file_access_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    let mut has_any_file_access_constraint = false;
    for constraint in &protocol.constraints {
        if let ConstraintRule::FileAccess {
            allowed_paths,
            denied_paths,
            ..
        } = &constraint.rule
        {
            has_any_file_access_constraint = true;
            if allowed_paths.is_empty() && denied_paths.is_empty() {
                raw.add(20, "no path restrictions configured");
            }
            if allowed_paths.iter().any(|p| p == "**" || p == "*" || p == "/") {
                raw.add(15, "wildcard allowedPaths entry");
            }
        }
    }
    if !has_any_file_access_constraint {
        raw.add(100, "no file_access constraint declared at all");
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::FileAccess));
    raw.finish(
        RiskCategory::FileAccess,
        vec!["scope allowedPaths to the minimum needed directories".to_string()],
    )
}

fn side_effects_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    for constraint in &protocol.constraints {
        if let ConstraintRule::SideEffect {
            allow_network,
            allow_shell_commands,
            allow_git_operations,
            ..
        } = &constraint.rule
        {
            if *allow_network == Some(true) {
                raw.add(15, "network access allowed");
            }
            if *allow_shell_commands == Some(true) {
                raw.add(30, "shell command execution allowed");
            }
            if *allow_git_operations == Some(true) {
                raw.add(10, "git operations allowed");
            }
        }
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::SideEffect));
    raw.finish(
        RiskCategory::SideEffects,
        vec!["require explicit allow-lists for hosts and commands".to_string()],
    )
}

fn enforcement_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    let enforcement = &protocol.enforcement;
    if !enforcement.pre_execution_validation {
        raw.add(20, "pre-execution validation disabled");
    }
    if !enforcement.post_execution_validation {
        raw.add(15, "post-execution validation disabled");
    }
    if enforcement.log_level == governance_core::LogLevel::None {
        raw.add(15, "audit logging disabled");
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::Enforcement));
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::BaseConstraint));
    raw.finish(
        RiskCategory::Enforcement,
        vec!["enable pre/post-execution validation and raise logLevel".to_string()],
    )
}

fn behavioral_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    let has_any_behavioral_constraint = protocol
        .constraints
        .iter()
        .any(|c| matches!(c.rule, ConstraintRule::Behavioral { .. }));
    if !has_any_behavioral_constraint {
        raw.add(100, "no behavioral constraint declared at all");
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::Behavioral));
    raw.finish(RiskCategory::Behavioral, vec![])
}

fn temporal_score(issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::Temporal));
    raw.finish(RiskCategory::Temporal, vec![])
}

fn resource_score(issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::Resource));
    raw.finish(RiskCategory::Resource, vec![])
}

fn complexity_score(protocol: &Protocol, issues: &[ValidationIssue]) -> RiskFactor {
    let mut raw = RawScore::default();
    if protocol.constraints.len() > 50 {
        raw.add(15, "constraint count exceeds 50");
    }
    if protocol.extends.len() > 5 {
        raw.add(10, "direct extends count exceeds 5");
    }
    fold_issues(&mut raw, &issues_for(issues, IssueCategory::Complexity));
    raw.finish(RiskCategory::Complexity, vec![])
}

fn conflict_score(protocol: &Protocol) -> RiskFactor {
    let mut raw = RawScore::default();
    if !protocol.conflicts.is_empty() {
        raw.add(protocol.conflicts.len() as u32 * 8, "protocol declares mutually-exclusive conflicts");
    }
    raw.finish(RiskCategory::Conflict, vec![])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub factors: Vec<RiskFactor>,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub is_acceptable: bool,
}

pub fn assess(protocol: &Protocol, issues: &[ValidationIssue], acceptance_threshold: u8) -> RiskAssessment {
    let factors = vec![
        tool_access_score(protocol, issues),
        file_access_score(protocol, issues),
        side_effects_score(protocol, issues),
        enforcement_score(protocol, issues),
        behavioral_score(protocol, issues),
        temporal_score(issues),
        resource_score(issues),
        complexity_score(protocol, issues),
        conflict_score(protocol),
    ];
    let score = overall_score(&factors);
    RiskAssessment {
        overall_score: score,
        risk_level: RiskLevel::from_score(score),
        is_acceptable: score <= acceptance_threshold,
        factors,
    }
}
