//! `ExecutionContext` — the transient description of a pending or completed
//! worker action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ToolCall,
    FileOperation,
    Output,
    Network,
    ShellCommand,
    GitOperation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub action_type: ActionType,
    pub action_name: String,
    #[serde(default)]
    pub action_params: Option<serde_json::Value>,
    #[serde(default)]
    pub target_files: Option<Vec<String>>,
    #[serde(default)]
    pub source_files: Option<Vec<String>>,
    #[serde(default)]
    pub output_content: Option<String>,
    #[serde(default)]
    pub target_host: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub command_args: Option<Vec<String>>,
    #[serde(default)]
    pub git_operation: Option<String>,
    #[serde(default)]
    pub feature_id: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub project_dir: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sequence_number: Option<u64>,
}

impl ExecutionContext {
    /// Union of `targetFiles` and `sourceFiles`, per the file_access
    /// evaluator's contract in spec.md §4.3.2.
    pub fn all_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        if let Some(t) = &self.target_files {
            files.extend(t.iter().map(String::as_str));
        }
        if let Some(s) = &self.source_files {
            files.extend(s.iter().map(String::as_str));
        }
        files
    }
}

/// Outcome of a completed action, passed to post-execution verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub side_effects: Option<SideEffects>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideEffects {
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub files_created: Vec<String>,
    #[serde(default)]
    pub files_deleted: Vec<String>,
    #[serde(default)]
    pub network_requests: Vec<NetworkRequest>,
    #[serde(default)]
    pub git_changes: Vec<GitChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub host: String,
    pub method: String,
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitChange {
    pub operation: String,
    #[serde(default)]
    pub git_ref: Option<String>,
}
