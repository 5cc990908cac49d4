//! `Validator`: runs the five validation passes, assesses risk, applies
//! auto-fixes, and memoizes results (spec.md §4.2).

use crate::cache::{ValidationCache, DEFAULT_CACHE_MAX_SIZE};
use crate::checks::{base_constraint_check, complexity_check, enforcement_check, per_constraint_check};
use crate::fix::SuggestedFix;
use crate::issue::ValidationIssue;
use crate::scoring::{assess, RiskAssessment};
use governance_core::{BaseConstraints, ConstraintRule, Protocol};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalValidationResult {
    pub is_valid: bool,
    pub is_fixable: bool,
    pub issues: Vec<ValidationIssue>,
    pub risk: RiskAssessment,
    pub validated_protocol: Option<Protocol>,
}

pub struct Validator {
    base: BaseConstraints,
    acceptance_threshold: u8,
    cache: Mutex<ValidationCache>,
}

impl Validator {
    pub fn new(base: BaseConstraints) -> Self {
        Self::with_cache_size(base, DEFAULT_CACHE_MAX_SIZE)
    }

    pub fn with_cache_size(base: BaseConstraints, cache_max_size: usize) -> Self {
        Self {
            base,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            cache: Mutex::new(ValidationCache::new(cache_max_size)),
        }
    }

    pub fn with_acceptance_threshold(mut self, threshold: u8) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub fn validate(&self, protocol: &Protocol) -> ProposalValidationResult {
        let key = ValidationCache::key(&protocol.id, &protocol.version, &protocol.constraints_fingerprint());
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return cached;
        }

        let mut issues = Vec::new();
        issues.extend(base_constraint_check(protocol, &self.base));
        issues.extend(per_constraint_check(protocol));
        issues.extend(enforcement_check(protocol, &self.base));
        issues.extend(complexity_check(protocol));

        let risk = assess(protocol, &issues, self.acceptance_threshold);

        let error_issues: Vec<&ValidationIssue> = issues.iter().filter(|i| i.is_error()).collect();
        let is_valid = error_issues.is_empty() && risk.is_acceptable;
        let is_fixable = !error_issues.is_empty() && error_issues.iter().all(|i| i.suggested_fix.is_some());

        let result = ProposalValidationResult {
            is_valid,
            is_fixable,
            issues,
            risk,
            validated_protocol: if is_valid { Some(protocol.clone()) } else { None },
        };

        if !result.is_valid {
            tracing::debug!(
                protocol_id = %protocol.id,
                issue_count = result.issues.len(),
                risk_score = result.risk.overall_score,
                "protocol failed validation"
            );
        }

        self.cache.lock().unwrap().insert(key, result.clone());
        result
    }

    /// Applies every auto-applicable fix, re-validates, and returns the
    /// fixed protocol only if the re-validation is valid.
    pub fn validate_and_fix(&self, protocol: &Protocol) -> (ProposalValidationResult, Option<Protocol>) {
        let first_pass = self.validate(protocol);
        if first_pass.is_valid {
            return (first_pass.clone(), Some(protocol.clone()));
        }

        let mut fixed = protocol.clone();
        for issue in &first_pass.issues {
            if let Some(fix) = &issue.suggested_fix {
                apply_fix(&mut fixed, fix);
            }
        }

        let second_pass = self.validate(&fixed);
        if second_pass.is_valid {
            (second_pass, Some(fixed))
        } else {
            (second_pass, None)
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

fn apply_fix(protocol: &mut Protocol, fix: &SuggestedFix) {
    match fix {
        SuggestedFix::EnablePreExecutionValidation => {
            protocol.enforcement.pre_execution_validation = true;
        }
        SuggestedFix::EnablePostExecutionValidation => {
            protocol.enforcement.post_execution_validation = true;
        }
        SuggestedFix::SetLogLevelStandard => {
            protocol.enforcement.log_level = governance_core::LogLevel::Standard;
        }
        SuggestedFix::RemoveAllowedTool { constraint_id, tool } => {
            if let Some(constraint) = protocol.constraints.iter_mut().find(|c| &c.id == constraint_id) {
                if let ConstraintRule::ToolRestriction { allowed_tools, .. } = &mut constraint.rule {
                    allowed_tools.retain(|t| t != tool);
                }
            }
        }
        SuggestedFix::RemoveAllowedPath { constraint_id, path } => {
            if let Some(constraint) = protocol.constraints.iter_mut().find(|c| &c.id == constraint_id) {
                if let ConstraintRule::FileAccess { allowed_paths, .. } = &mut constraint.rule {
                    allowed_paths.retain(|p| p != path);
                }
            }
        }
        SuggestedFix::RemoveAllowedCommand { constraint_id, command } => {
            if let Some(constraint) = protocol.constraints.iter_mut().find(|c| &c.id == constraint_id) {
                if let ConstraintRule::SideEffect { allowed_commands, .. } = &mut constraint.rule {
                    allowed_commands.retain(|c| c != command);
                }
            }
        }
        SuggestedFix::RemoveRequiredAction { constraint_id, action } => {
            if let Some(constraint) = protocol.constraints.iter_mut().find(|c| &c.id == constraint_id) {
                if let ConstraintRule::Behavioral { required_actions, .. } = &mut constraint.rule {
                    required_actions.retain(|a| a != action);
                }
            }
        }
    }
}
