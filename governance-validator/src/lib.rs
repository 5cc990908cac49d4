//! Proposal validation: five accumulating passes, risk scoring, auto-fix,
//! and memoized results (spec.md §4.2).

pub mod cache;
pub mod checks;
pub mod fix;
pub mod issue;
pub mod risk;
pub mod scoring;
pub mod validator;

pub use fix::SuggestedFix;
pub use issue::{IssueCategory, ValidationIssue};
pub use risk::{RiskCategory, RiskFactor, RiskLevel};
pub use scoring::RiskAssessment;
pub use validator::{ProposalValidationResult, Validator, DEFAULT_ACCEPTANCE_THRESHOLD};

#[cfg(test)]
mod tests {
    use super::*;
    use governance_core::{
        BaseConstraints, ConstraintRule, ContextMatcher, EnforcementConfig, EnforcementMode,
        LogLevel, OnViolation, Protocol, ProtocolConstraint, Severity,
    };
    use chrono::Utc;

    fn empty_protocol(id: &str) -> Protocol {
        Protocol {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            name: None,
            description: None,
            priority: 0,
            constraints: Vec::new(),
            enforcement: EnforcementConfig::default(),
            applicable_contexts: ContextMatcher::default(),
            extends: Vec::new(),
            requires: Vec::new(),
            conflicts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn scenario_s6_permissive_shell_only_protocol_is_high_risk() {
        let mut protocol = empty_protocol("risky");
        protocol.enforcement = EnforcementConfig {
            mode: EnforcementMode::Permissive,
            pre_execution_validation: false,
            post_execution_validation: false,
            on_violation: OnViolation::Log,
            max_retries: 0,
            retry_delay_seconds: 0,
            log_level: LogLevel::None,
            include_context: true,
            allow_override: false,
            override_requires_approval: true,
        };
        protocol.constraints.push(ProtocolConstraint {
            id: "c1".to_string(),
            rule: ConstraintRule::SideEffect {
                allow_network: None,
                allowed_hosts: vec![],
                denied_hosts: vec![],
                allow_shell_commands: Some(true),
                allowed_commands: vec![],
                denied_commands: vec![],
                allow_git_operations: None,
                allowed_git_ops: vec![],
                denied_git_ops: vec![],
            },
            severity: Severity::Warning,
            message: "shell access".to_string(),
            enabled: true,
        });

        let validator = Validator::new(BaseConstraints::default());
        let result = validator.validate(&protocol);

        assert!(!result.is_valid);
        assert!(matches!(result.risk.risk_level, crate::risk::RiskLevel::High | crate::risk::RiskLevel::Critical));
        assert!(!result.risk.is_acceptable);
        assert!(result
            .issues
            .iter()
            .any(|i| i.suggested_fix == Some(SuggestedFix::EnablePreExecutionValidation)));
        assert!(result
            .issues
            .iter()
            .any(|i| i.suggested_fix == Some(SuggestedFix::SetLogLevelStandard)));
    }

    #[test]
    fn prohibited_tool_in_allowed_tools_is_auto_fixable() {
        let mut protocol = empty_protocol("p1");
        protocol.constraints.push(ProtocolConstraint {
            id: "c1".to_string(),
            rule: ConstraintRule::ToolRestriction {
                allowed_tools: vec!["rm".to_string(), "ls".to_string()],
                denied_tools: vec![],
                tool_patterns: vec![],
                require_approval: vec![],
            },
            severity: Severity::Error,
            message: "tools".to_string(),
            enabled: true,
        });

        let validator = Validator::new(BaseConstraints::default());
        let (result, fixed) = validator.validate_and_fix(&protocol);
        assert!(result.is_valid);
        let fixed = fixed.expect("expected a fixed protocol");
        let ConstraintRule::ToolRestriction { allowed_tools, .. } = &fixed.constraints[0].rule else {
            panic!("expected tool_restriction rule");
        };
        assert_eq!(allowed_tools, &vec!["ls".to_string()]);
    }

    #[test]
    fn tool_pattern_matching_everything_is_an_unfixable_error() {
        let mut protocol = empty_protocol("p2");
        protocol.constraints.push(ProtocolConstraint {
            id: "c1".to_string(),
            rule: ConstraintRule::ToolRestriction {
                allowed_tools: vec![],
                denied_tools: vec![],
                tool_patterns: vec![".*".to_string()],
                require_approval: vec![],
            },
            severity: Severity::Error,
            message: "bad pattern".to_string(),
            enabled: true,
        });

        let validator = Validator::new(BaseConstraints::default());
        let result = validator.validate(&protocol);
        assert!(!result.is_valid);
        assert!(!result.is_fixable);
    }

    #[test]
    fn validation_cache_hits_on_identical_protocol() {
        let protocol = empty_protocol("cached");
        let validator = Validator::new(BaseConstraints::default());
        let first = validator.validate(&protocol);
        assert_eq!(validator.cache_len(), 1);
        let second = validator.validate(&protocol);
        assert_eq!(first, second);
        validator.clear_cache();
        assert_eq!(validator.cache_len(), 0);
    }

    #[test]
    fn minimal_protocol_with_defaults_is_valid() {
        let protocol = empty_protocol("clean");
        let validator = Validator::new(BaseConstraints::default());
        let result = validator.validate(&protocol);
        assert!(result.is_valid);
        assert!(result.validated_protocol.is_some());
    }
}
