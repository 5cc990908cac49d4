//! `EnforcementResult` and the violation/warning records it carries.

use crate::constraint::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Proceed,
    Retry,
    Abort,
    Escalate,
}

/// A recorded constraint failure, carrying enough detail for an
/// orchestrator to present a meaningful rejection (spec.md §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub protocol_id: String,
    pub constraint_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    #[serde(default)]
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementResult {
    pub allowed: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub applied_protocols: Vec<String>,
    pub evaluation_time_ms: u64,
    pub should_block: bool,
    pub suggested_action: SuggestedAction,
}

impl EnforcementResult {
    pub fn allow_empty() -> Self {
        Self {
            allowed: true,
            violations: Vec::new(),
            warnings: Vec::new(),
            applied_protocols: Vec::new(),
            evaluation_time_ms: 0,
            should_block: false,
            suggested_action: SuggestedAction::Proceed,
        }
    }
}

/// Registry-friendly projection of an `EnforcementResult`, per spec.md §6's
/// `toValidationResult` helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResultView {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub applied_protocols: Vec<String>,
    pub evaluation_time_ms: u64,
}

pub fn to_validation_result(result: &EnforcementResult) -> ValidationResultView {
    ValidationResultView {
        valid: result.allowed,
        violations: result.violations.clone(),
        warnings: result.warnings.clone(),
        applied_protocols: result.applied_protocols.clone(),
        evaluation_time_ms: result.evaluation_time_ms,
    }
}
