//! Constraint taxonomy: the tagged union of rule variants a protocol can
//! carry, plus severity and the `ProtocolConstraint` envelope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity of a constraint, controlling whether a failure becomes a
/// violation (error) or a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Output format a constraint may require of generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatKind {
    Json,
    Markdown,
    Text,
    Yaml,
    Custom,
}

/// Discriminant for a constraint rule. Mirrors the `type` tag on
/// [`ConstraintRule`] — the invariant `rule.type == constraint.type` is
/// enforced structurally by deriving `constraint_type()` from the rule
/// itself rather than storing it twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    ToolRestriction,
    FileAccess,
    OutputFormat,
    Behavioral,
    Temporal,
    Resource,
    SideEffect,
}

/// Exhaustive tagged union of constraint rule variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintRule {
    ToolRestriction {
        #[serde(default)]
        allowed_tools: Vec<String>,
        #[serde(default)]
        denied_tools: Vec<String>,
        /// Regex patterns matched against the tool name.
        #[serde(default)]
        tool_patterns: Vec<String>,
        #[serde(default)]
        require_approval: Vec<String>,
    },
    FileAccess {
        #[serde(default)]
        allowed_paths: Vec<String>,
        #[serde(default)]
        denied_paths: Vec<String>,
        #[serde(default)]
        read_only: Vec<String>,
        #[serde(default)]
        write_only: Vec<String>,
        #[serde(default)]
        allowed_extensions: Vec<String>,
        #[serde(default)]
        denied_extensions: Vec<String>,
        #[serde(default)]
        max_file_size: Option<u64>,
    },
    OutputFormat {
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        forbidden_patterns: Vec<String>,
        #[serde(default)]
        required_patterns: Vec<String>,
        #[serde(default)]
        format: Option<OutputFormatKind>,
        #[serde(default)]
        schema: Option<serde_json::Value>,
        #[serde(default)]
        required_fields: Vec<String>,
    },
    Behavioral {
        #[serde(default)]
        require_confirmation: bool,
        #[serde(default)]
        max_iterations: Option<u64>,
        #[serde(default)]
        timeout_seconds: Option<u64>,
        #[serde(default)]
        require_explanation: bool,
        #[serde(default)]
        prohibited_actions: Vec<String>,
        #[serde(default)]
        required_actions: Vec<String>,
    },
    Temporal {
        #[serde(default)]
        rate_limit_per_minute: Option<u32>,
        #[serde(default)]
        rate_limit_per_hour: Option<u32>,
        #[serde(default)]
        cooldown_seconds: Option<u64>,
        #[serde(default)]
        valid_from: Option<chrono::DateTime<chrono::Utc>>,
        #[serde(default)]
        valid_until: Option<chrono::DateTime<chrono::Utc>>,
        /// Hours of day, 0-23.
        #[serde(default)]
        allowed_hours: Vec<u32>,
        /// Days of week, 0-6 (Sunday = 0).
        #[serde(default)]
        allowed_days: Vec<u32>,
    },
    Resource {
        #[serde(default)]
        max_memory_mb: Option<u64>,
        #[serde(default)]
        max_cpu_percent: Option<u32>,
        #[serde(default)]
        max_concurrent_ops: Option<u32>,
        #[serde(default)]
        max_disk_write_mb: Option<u64>,
        #[serde(default)]
        max_network_requests_per_min: Option<u32>,
        #[serde(default)]
        max_tokens_per_request: Option<u64>,
    },
    SideEffect {
        #[serde(default)]
        allow_network: Option<bool>,
        #[serde(default)]
        allowed_hosts: Vec<String>,
        #[serde(default)]
        denied_hosts: Vec<String>,
        #[serde(default)]
        allow_shell_commands: Option<bool>,
        #[serde(default)]
        allowed_commands: Vec<String>,
        #[serde(default)]
        denied_commands: Vec<String>,
        #[serde(default)]
        allow_git_operations: Option<bool>,
        #[serde(default)]
        allowed_git_ops: Vec<String>,
        #[serde(default)]
        denied_git_ops: Vec<String>,
    },
}

impl ConstraintRule {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::ToolRestriction { .. } => ConstraintType::ToolRestriction,
            Self::FileAccess { .. } => ConstraintType::FileAccess,
            Self::OutputFormat { .. } => ConstraintType::OutputFormat,
            Self::Behavioral { .. } => ConstraintType::Behavioral,
            Self::Temporal { .. } => ConstraintType::Temporal,
            Self::Resource { .. } => ConstraintType::Resource,
            Self::SideEffect { .. } => ConstraintType::SideEffect,
        }
    }
}

/// A single, independently identified constraint within a protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConstraint {
    pub id: String,
    pub rule: ConstraintRule,
    pub severity: Severity,
    pub message: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ProtocolConstraint {
    pub fn constraint_type(&self) -> ConstraintType {
        self.rule.constraint_type()
    }
}

/// Deduplicate a list of constraints by id, keeping the last occurrence —
/// used both for the protocol-level uniqueness invariant check and for
/// merge operations in the proposal generator.
pub fn index_by_id(constraints: &[ProtocolConstraint]) -> HashMap<&str, &ProtocolConstraint> {
    let mut map = HashMap::new();
    for c in constraints {
        map.insert(c.id.as_str(), c);
    }
    map
}
