//! Shared data model, config loading, and pattern-safety helpers for the
//! protocol-based behavioral governance engine.
//!
//! This crate is intentionally inert: it defines types and pure helpers
//! only. The Resolver, Proposal Validator, Enforcement Engine, and Proposal
//! Generator each live in their own crate and depend on this one.

pub mod base_constraints;
pub mod clock;
pub mod config;
pub mod constraint;
pub mod context_matcher;
pub mod enforcement_config;
pub mod error;
pub mod execution_context;
pub mod monitoring;
pub mod pattern;
pub mod protocol;
pub mod registry;
pub mod result;

pub use base_constraints::{BaseConstraints, BaseConstraintsOverlay};
pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use constraint::{ConstraintRule, ConstraintType, ProtocolConstraint, Severity};
pub use context_matcher::{ContextMatcher, MatchPatterns, MatchSubject};
pub use enforcement_config::{EnforcementConfig, EnforcementMode, LogLevel, OnViolation};
pub use execution_context::{ActionType, ExecutionContext, ExecutionOutcome, GitChange, NetworkRequest, SideEffects};
pub use monitoring::{AlertSeverity, MonitoringAlert, MonitoringState, ObservedPattern};
pub use pattern::{compile_guarded, glob_match_safe, glob_to_regex, regex_match_safe};
pub use protocol::Protocol;
pub use registry::{InMemoryRegistry, ProtocolRegistry, ViolationFilter, ViolationRecord};
pub use result::{to_validation_result, EnforcementResult, SuggestedAction, Violation, ValidationResultView};
