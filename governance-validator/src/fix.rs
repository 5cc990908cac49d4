//! The auto-fix catalogue recognised by `validateAndFix` (spec.md §4.2.3).
//! Every variant here is unconditionally safe to apply without human
//! review — anything riskier stays a plain issue with no suggested fix.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestedFix {
    EnablePreExecutionValidation,
    EnablePostExecutionValidation,
    SetLogLevelStandard,
    RemoveAllowedTool { constraint_id: String, tool: String },
    RemoveAllowedPath { constraint_id: String, path: String },
    RemoveAllowedCommand { constraint_id: String, command: String },
    RemoveRequiredAction { constraint_id: String, action: String },
}
