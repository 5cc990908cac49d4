//! `governance` — wires the Resolver, Proposal Validator, Enforcement
//! Engine, and Proposal Generator crates together behind one facade, the
//! way `vtcode`'s root crate is a thin layer over `vtcode-core` and its
//! sibling config/tool crates rather than owning any domain logic itself.

use governance_core::config::load_base_constraints;
use governance_core::{
    BaseConstraints, ExecutionContext, ExecutionOutcome, ProtocolRegistry, SharedClock,
};
use governance_enforcement::EnforcementEngine;
use governance_generator::{parse_proposal, ParsedProposal};
use governance_resolver::{EffectiveConstraints, ResolvedChain};
use governance_validator::{ProposalValidationResult, Validator};
use std::path::Path;

/// Top-level facade bundling the four subsystems over one registry. This
/// is the thin seam a host orchestrator (out of scope per spec.md §1)
/// would embed; it owns no persistence of its own.
pub struct GovernanceEngine {
    validator: Validator,
    enforcement: EnforcementEngine,
}

impl GovernanceEngine {
    pub fn new(base_constraints: BaseConstraints, clock: SharedClock) -> Self {
        Self {
            validator: Validator::new(base_constraints),
            enforcement: EnforcementEngine::new(clock),
        }
    }

    /// Loads `governance.toml` from `config_path` (or falls back to
    /// compiled-in defaults if the file is absent) and builds the engine
    /// around it.
    pub fn from_config(config_path: &Path, clock: SharedClock) -> Result<Self, governance_core::error::ConfigError> {
        let base_constraints = load_base_constraints(config_path)?;
        Ok(Self::new(base_constraints, clock))
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn enforcement(&self) -> &EnforcementEngine {
        &self.enforcement
    }

    pub fn resolve_chain(&self, protocol_id: &str, registry: &dyn ProtocolRegistry) -> ResolvedChain {
        self.enforcement.resolver().resolve_chain(protocol_id, registry)
    }

    pub fn effective_constraints(&self, protocol_id: &str, registry: &dyn ProtocolRegistry) -> EffectiveConstraints {
        self.enforcement.resolver().get_effective_constraints(protocol_id, registry)
    }

    pub fn validate(&self, protocol: &governance_core::Protocol) -> ProposalValidationResult {
        self.validator.validate(protocol)
    }

    pub fn check_pre_execution(
        &self,
        ctx: &ExecutionContext,
        registry: &dyn ProtocolRegistry,
    ) -> governance_core::EnforcementResult {
        self.enforcement.validate_pre_execution(ctx, registry)
    }

    pub fn check_post_execution(
        &self,
        ctx: &ExecutionContext,
        outcome: &ExecutionOutcome,
        registry: &dyn ProtocolRegistry,
    ) -> governance_core::EnforcementResult {
        self.enforcement.verify_post_execution(ctx, outcome, registry)
    }

    /// Parses free-text into suggested constraints without building a
    /// protocol from them — exposed for callers (like the `propose` CLI
    /// subcommand) that only need the raw parse.
    pub fn propose(&self, text: &str) -> ParsedProposal {
        parse_proposal(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use governance_core::{FixedClock, InMemoryRegistry};
    use std::sync::Arc;

    #[test]
    fn engine_wires_validator_and_enforcement_over_an_empty_registry() {
        let clock: SharedClock = Arc::new(FixedClock::new(Utc::now()));
        let engine = GovernanceEngine::new(BaseConstraints::default(), clock);
        let registry = InMemoryRegistry::new();

        let ctx = ExecutionContext {
            action_type: governance_core::ActionType::ToolCall,
            action_name: "search".to_string(),
            action_params: None,
            target_files: None,
            source_files: None,
            output_content: None,
            target_host: None,
            command: None,
            command_args: None,
            git_operation: None,
            feature_id: None,
            worker_id: Some("worker-1".to_string()),
            project_dir: None,
            timestamp: Utc::now(),
            sequence_number: None,
        };

        let result = engine.check_pre_execution(&ctx, &registry);
        assert!(result.allowed);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn propose_extracts_constraints_from_free_text() {
        let clock: SharedClock = Arc::new(FixedClock::new(Utc::now()));
        let engine = GovernanceEngine::new(BaseConstraints::default(), clock);
        let parsed = engine.propose("Only use search and read_file tools.");
        assert!(parsed.is_valid);
        assert!(!parsed.suggested_constraints.is_empty());
    }
}
