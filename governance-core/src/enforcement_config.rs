//! `EnforcementConfig` — per-protocol knobs controlling how strictly and
//! how verbosely a protocol's constraints are enforced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    Strict,
    Permissive,
    Audit,
    Learning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnViolation {
    Block,
    Warn,
    Log,
    Escalate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Minimal,
    Standard,
    Verbose,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    pub mode: EnforcementMode,
    pub pre_execution_validation: bool,
    pub post_execution_validation: bool,
    pub on_violation: OnViolation,
    pub max_retries: u32,
    pub retry_delay_seconds: u32,
    pub log_level: LogLevel,
    pub include_context: bool,
    pub allow_override: bool,
    pub override_requires_approval: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            mode: EnforcementMode::Strict,
            pre_execution_validation: true,
            post_execution_validation: true,
            on_violation: OnViolation::Block,
            max_retries: 0,
            retry_delay_seconds: 0,
            log_level: LogLevel::Standard,
            include_context: true,
            allow_override: false,
            override_requires_approval: true,
        }
    }
}
