//! The five validation passes (spec.md §4.2) plus the per-constraint
//! rules of §4.2.1. Each pass is a pure function over `(&Protocol,
//! &BaseConstraints)` appending to a shared `Vec<ValidationIssue>`.

use crate::fix::SuggestedFix;
use crate::issue::{IssueCategory, ValidationIssue};
use governance_core::{
    glob_match_safe, BaseConstraints, ConstraintRule, EnforcementMode, LogLevel, OnViolation,
    Protocol, ProtocolConstraint, Severity,
};

const OVERLY_PERMISSIVE_PATHS: [&str; 6] = ["*", "**", "**/*", "/", "~", "~/*"];

/// Pass 1: violations of the immutable baseline.
pub fn base_constraint_check(protocol: &Protocol, base: &BaseConstraints) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for constraint in &protocol.constraints {
        if let ConstraintRule::ToolRestriction { allowed_tools, .. } = &constraint.rule {
            for tool in allowed_tools {
                if base.prohibited_tools.contains(tool) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            IssueCategory::BaseConstraint,
                            "prohibited_tool_allowed",
                            format!("prohibited tool '{tool}' appears in allowedTools"),
                        )
                        .with_constraint(&constraint.id)
                        .with_fix(SuggestedFix::RemoveAllowedTool {
                            constraint_id: constraint.id.clone(),
                            tool: tool.clone(),
                        }),
                    );
                }
            }
            if let Some(max) = base.max_allowed_tools {
                if allowed_tools.len() > max {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            IssueCategory::BaseConstraint,
                            "allowed_tools_exceeds_max",
                            format!("allowedTools has {} entries, exceeding the baseline max of {max}", allowed_tools.len()),
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
        }

        if let ConstraintRule::FileAccess { allowed_paths, .. } = &constraint.rule {
            for path in allowed_paths {
                if let Some(prohibited) = base
                    .prohibited_paths
                    .iter()
                    .find(|p| glob_match_safe(p, path))
                {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            IssueCategory::BaseConstraint,
                            "prohibited_path_allowed",
                            format!("allowedPaths entry '{path}' matches prohibited pattern '{prohibited}'"),
                        )
                        .with_constraint(&constraint.id)
                        .with_fix(SuggestedFix::RemoveAllowedPath {
                            constraint_id: constraint.id.clone(),
                            path: path.clone(),
                        }),
                    );
                }
            }
            if let Some(max) = base.max_allowed_paths {
                if allowed_paths.len() > max {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            IssueCategory::BaseConstraint,
                            "allowed_paths_exceeds_max",
                            format!("allowedPaths has {} entries, exceeding the baseline max of {max}", allowed_paths.len()),
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
        }

        if let ConstraintRule::Behavioral { required_actions, .. } = &constraint.rule {
            for action in required_actions {
                if base.prohibited_operations.contains(action) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Error,
                            IssueCategory::BaseConstraint,
                            "prohibited_operation_required",
                            format!("prohibited operation '{action}' appears in requiredActions"),
                        )
                        .with_constraint(&constraint.id)
                        .with_fix(SuggestedFix::RemoveRequiredAction {
                            constraint_id: constraint.id.clone(),
                            action: action.clone(),
                        }),
                    );
                }
            }
        }
    }

    if base.require_pre_validation && !protocol.enforcement.pre_execution_validation {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::BaseConstraint,
                "pre_validation_required",
                "baseline requires pre-execution validation but this protocol disables it",
            )
            .with_fix(SuggestedFix::EnablePreExecutionValidation),
        );
    }
    if base.require_post_validation && !protocol.enforcement.post_execution_validation {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::BaseConstraint,
                "post_validation_required",
                "baseline requires post-execution validation but this protocol disables it",
            )
            .with_fix(SuggestedFix::EnablePostExecutionValidation),
        );
    }
    if base.require_audit_log && protocol.enforcement.log_level == LogLevel::None {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::BaseConstraint,
                "audit_log_required",
                "baseline requires an audit log but logLevel is none",
            )
            .with_fix(SuggestedFix::SetLogLevelStandard),
        );
    }

    issues
}

/// Pass 2: per-constraint rules (spec.md §4.2.1).
pub fn per_constraint_check(protocol: &Protocol) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for constraint in &protocol.constraints {
        match &constraint.rule {
            ConstraintRule::ToolRestriction {
                allowed_tools,
                denied_tools,
                tool_patterns,
                ..
            } => {
                for pattern in tool_patterns {
                    if pattern == ".*" || pattern == ".+" {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Error,
                                IssueCategory::ToolRestriction,
                                "tool_pattern_matches_everything",
                                format!("toolPatterns entry '{pattern}' matches every tool name"),
                            )
                            .with_constraint(&constraint.id),
                        );
                    }
                }
                if allowed_tools.is_empty() && denied_tools.is_empty() && tool_patterns.is_empty() {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::ToolRestriction,
                            "tool_restriction_unrestricted",
                            "tool_restriction constraint has no allow, deny, or pattern entries",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
            ConstraintRule::FileAccess {
                allowed_paths,
                denied_paths,
                read_only,
                write_only,
                ..
            } => {
                for path in allowed_paths {
                    if OVERLY_PERMISSIVE_PATHS.contains(&path.as_str()) {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Warning,
                                IssueCategory::FileAccess,
                                "file_access_overly_permissive",
                                format!("allowedPaths entry '{path}' grants overly broad access"),
                            )
                            .with_constraint(&constraint.id),
                        );
                    }
                }
                if allowed_paths.is_empty()
                    && denied_paths.is_empty()
                    && read_only.is_empty()
                    && write_only.is_empty()
                {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::FileAccess,
                            "file_access_unrestricted",
                            "file_access constraint has no path restrictions at all",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
            ConstraintRule::SideEffect {
                allow_network,
                allowed_hosts,
                denied_hosts,
                allow_shell_commands,
                allowed_commands,
                denied_commands,
                allowed_git_ops,
                denied_git_ops,
                ..
            } => {
                if *allow_network == Some(true) && allowed_hosts.is_empty() && denied_hosts.is_empty() {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::SideEffect,
                            "network_allowed_without_host_lists",
                            "allowNetwork is true but no allowedHosts or deniedHosts are set",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
                if *allow_shell_commands == Some(true) && allowed_commands.is_empty() && denied_commands.is_empty() {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::SideEffect,
                            "shell_commands_allowed_without_lists",
                            "allowShellCommands is true but no allowedCommands or deniedCommands are set",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
                for command in allowed_commands {
                    if let Some(prohibited) = PROHIBITED_OPERATION_SUBSTRINGS
                        .iter()
                        .find(|p| command.contains(**p))
                    {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Error,
                                IssueCategory::SideEffect,
                                "allowed_command_contains_prohibited_operation",
                                format!("allowedCommands entry '{command}' contains prohibited operation '{prohibited}'"),
                            )
                            .with_constraint(&constraint.id)
                            .with_fix(SuggestedFix::RemoveAllowedCommand {
                                constraint_id: constraint.id.clone(),
                                command: command.clone(),
                            }),
                        );
                    }
                }
                for git_op in allowed_git_ops.iter().chain(denied_git_ops.iter()) {
                    if DANGEROUS_GIT_OPS.iter().any(|dangerous| git_op.contains(dangerous)) {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Warning,
                                IssueCategory::SideEffect,
                                "dangerous_git_operation",
                                format!("git operation '{git_op}' is potentially destructive"),
                            )
                            .with_constraint(&constraint.id),
                        );
                    }
                }
            }
            ConstraintRule::Behavioral {
                required_actions,
                max_iterations,
                timeout_seconds,
                ..
            } => {
                for action in required_actions {
                    if PROHIBITED_OPERATION_SUBSTRINGS.iter().any(|p| action.contains(p)) {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Error,
                                IssueCategory::Behavioral,
                                "required_action_contains_prohibited_operation",
                                format!("requiredActions entry '{action}' contains a prohibited operation"),
                            )
                            .with_constraint(&constraint.id)
                            .with_fix(SuggestedFix::RemoveRequiredAction {
                                constraint_id: constraint.id.clone(),
                                action: action.clone(),
                            }),
                        );
                    }
                }
                if max_iterations.is_some_and(|m| m > 1000) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::Behavioral,
                            "max_iterations_very_high",
                            "maxIterations exceeds 1000",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
                if timeout_seconds.is_some_and(|t| t > 3600) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::Behavioral,
                            "timeout_seconds_very_high",
                            "timeoutSeconds exceeds one hour",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
            ConstraintRule::Temporal {
                rate_limit_per_minute,
                valid_until,
                ..
            } => {
                if rate_limit_per_minute.is_some_and(|r| r > 1000) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Info,
                            IssueCategory::Temporal,
                            "rate_limit_per_minute_very_high",
                            "rateLimitPerMinute exceeds 1000",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
                if let Some(until) = valid_until {
                    if *until < chrono::Utc::now() {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Warning,
                                IssueCategory::Temporal,
                                "valid_until_in_past",
                                "validUntil is already in the past",
                            )
                            .with_constraint(&constraint.id),
                        );
                    }
                }
            }
            ConstraintRule::Resource {
                max_memory_mb,
                max_concurrent_ops,
                ..
            } => {
                if max_memory_mb.is_some_and(|m| m > 16384) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Info,
                            IssueCategory::Resource,
                            "max_memory_mb_very_high",
                            "maxMemoryMB exceeds 16384",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
                if max_concurrent_ops.is_some_and(|m| m > 100) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::Resource,
                            "max_concurrent_ops_very_high",
                            "maxConcurrentOps exceeds 100",
                        )
                        .with_constraint(&constraint.id),
                    );
                }
            }
            ConstraintRule::OutputFormat { .. } => {}
        }
    }
    issues
}

const PROHIBITED_OPERATION_SUBSTRINGS: [&str; 2] = ["delete_all", "force_push"];
const DANGEROUS_GIT_OPS: [&str; 3] = ["push --force", "reset --hard", "clean -fd"];

/// Pass 3: enforcement config checks.
pub fn enforcement_check(protocol: &Protocol, base: &BaseConstraints) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let enforcement = &protocol.enforcement;

    if matches!(enforcement.mode, EnforcementMode::Permissive | EnforcementMode::Audit | EnforcementMode::Learning) {
        issues.push(ValidationIssue::new(
            Severity::Info,
            IssueCategory::Enforcement,
            "permissive_enforcement_mode",
            format!("enforcement mode '{:?}' does not block violations", enforcement.mode),
        ));
    }

    if base.require_pre_validation && !enforcement.pre_execution_validation {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::Enforcement,
                "missing_pre_execution_validation",
                "pre-execution validation is required but disabled",
            )
            .with_fix(SuggestedFix::EnablePreExecutionValidation),
        );
    }
    if base.require_post_validation && !enforcement.post_execution_validation {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                IssueCategory::Enforcement,
                "missing_post_execution_validation",
                "post-execution validation is required but disabled",
            )
            .with_fix(SuggestedFix::EnablePostExecutionValidation),
        );
    }
    if enforcement.on_violation != OnViolation::Block && base.min_severity_for_block == Severity::Error {
        issues.push(ValidationIssue::new(
            Severity::Info,
            IssueCategory::Enforcement,
            "on_violation_not_block",
            "onViolation is not set to block despite a strict baseline",
        ));
    }

    issues
}

/// Pass 4: complexity checks.
pub fn complexity_check(protocol: &Protocol) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if protocol.constraints.len() > 50 {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Complexity,
            "too_many_constraints",
            format!("protocol has {} constraints, exceeding the recommended maximum of 50", protocol.constraints.len()),
        ));
    }
    if protocol.extends.len() > 5 {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Complexity,
            "too_many_direct_extends",
            format!("protocol directly extends {} protocols, exceeding the recommended maximum of 5", protocol.extends.len()),
        ));
    }

    issues.extend(tool_rule_conflicts(&protocol.constraints));
    issues
}

/// Pairwise allow/deny conflicts across tool_restriction constraints: the
/// same tool name appearing in one constraint's `allowedTools` and
/// another's `deniedTools`.
fn tool_rule_conflicts(constraints: &[ProtocolConstraint]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for a in constraints {
        let ConstraintRule::ToolRestriction { allowed_tools, .. } = &a.rule else {
            continue;
        };
        for b in constraints {
            if a.id == b.id {
                continue;
            }
            let ConstraintRule::ToolRestriction { denied_tools, .. } = &b.rule else {
                continue;
            };
            for tool in allowed_tools {
                if denied_tools.contains(tool) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            IssueCategory::Complexity,
                            "conflicting_tool_rules",
                            format!("tool '{tool}' is allowed by '{}' and denied by '{}'", a.id, b.id),
                        )
                        .with_constraint(&a.id),
                    );
                }
            }
        }
    }
    issues
}
