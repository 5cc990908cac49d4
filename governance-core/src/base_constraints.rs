//! `BaseConstraints` — the immutable, process-wide safety baseline no
//! protocol may relax. Loaded once at startup, optionally overlaid from
//! `governance.toml` the way the teacher's config loader overlays
//! user-provided TOML over compiled-in defaults.

use crate::constraint::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseConstraints {
    #[serde(default)]
    pub prohibited_tools: Vec<String>,
    #[serde(default)]
    pub prohibited_paths: Vec<String>,
    #[serde(default)]
    pub prohibited_operations: Vec<String>,
    #[serde(default = "default_min_severity")]
    pub min_severity_for_block: Severity,
    #[serde(default = "default_true")]
    pub require_pre_validation: bool,
    #[serde(default = "default_true")]
    pub require_post_validation: bool,
    #[serde(default)]
    pub max_allowed_tools: Option<usize>,
    #[serde(default)]
    pub max_allowed_paths: Option<usize>,
    #[serde(default = "default_true")]
    pub require_audit_log: bool,
    #[serde(default = "default_retention_days")]
    pub audit_retention_days: u32,
}

fn default_true() -> bool {
    true
}

fn default_min_severity() -> Severity {
    Severity::Error
}

fn default_retention_days() -> u32 {
    90
}

impl Default for BaseConstraints {
    fn default() -> Self {
        Self {
            prohibited_tools: vec![
                "rm".to_string(),
                "format".to_string(),
                "shutdown".to_string(),
            ],
            prohibited_paths: vec![
                "/etc/**".to_string(),
                "/sys/**".to_string(),
                "~/.ssh/**".to_string(),
                "**/.env".to_string(),
            ],
            prohibited_operations: vec!["delete_all".to_string(), "force_push".to_string()],
            min_severity_for_block: default_min_severity(),
            require_pre_validation: true,
            require_post_validation: true,
            max_allowed_tools: None,
            max_allowed_paths: None,
            require_audit_log: true,
            audit_retention_days: default_retention_days(),
        }
    }
}

/// Merge a partially specified overlay over these defaults — overlay field
/// wins whenever it differs from the default value for that field, matching
/// the teacher's `merge_toml_values` "overlay replaces base" rule applied at
/// the Rust struct level rather than the raw TOML table level.
impl BaseConstraints {
    pub fn merged_with(mut self, overlay: BaseConstraintsOverlay) -> Self {
        if let Some(v) = overlay.prohibited_tools {
            self.prohibited_tools = v;
        }
        if let Some(v) = overlay.prohibited_paths {
            self.prohibited_paths = v;
        }
        if let Some(v) = overlay.prohibited_operations {
            self.prohibited_operations = v;
        }
        if let Some(v) = overlay.min_severity_for_block {
            self.min_severity_for_block = v;
        }
        if let Some(v) = overlay.require_pre_validation {
            self.require_pre_validation = v;
        }
        if let Some(v) = overlay.require_post_validation {
            self.require_post_validation = v;
        }
        if overlay.max_allowed_tools.is_some() {
            self.max_allowed_tools = overlay.max_allowed_tools;
        }
        if overlay.max_allowed_paths.is_some() {
            self.max_allowed_paths = overlay.max_allowed_paths;
        }
        if let Some(v) = overlay.require_audit_log {
            self.require_audit_log = v;
        }
        if let Some(v) = overlay.audit_retention_days {
            self.audit_retention_days = v;
        }
        self
    }
}

/// Optional overlay read from `governance.toml`; every field absent means
/// "keep the compiled-in default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseConstraintsOverlay {
    pub prohibited_tools: Option<Vec<String>>,
    pub prohibited_paths: Option<Vec<String>>,
    pub prohibited_operations: Option<Vec<String>>,
    pub min_severity_for_block: Option<Severity>,
    pub require_pre_validation: Option<bool>,
    pub require_post_validation: Option<bool>,
    pub max_allowed_tools: Option<usize>,
    pub max_allowed_paths: Option<usize>,
    pub require_audit_log: Option<bool>,
    pub audit_retention_days: Option<u32>,
}
