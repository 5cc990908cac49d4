//! Resolution errors — collected, never thrown (spec.md §7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ResolutionError {
    CircularDependency { cycle: Vec<String> },
    MissingProtocol { id: String },
    MissingRequired { id: String, required_by: String },
    ConflictDetected { id: String, conflicting_with: String },
}

impl ResolutionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CircularDependency { .. } => "circular_dependency",
            Self::MissingProtocol { .. } => "missing_protocol",
            Self::MissingRequired { .. } => "missing_required",
            Self::ConflictDetected { .. } => "conflict_detected",
        }
    }
}
