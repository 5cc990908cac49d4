//! Dependency-chain resolution and effective-constraint computation over
//! a `ProtocolRegistry` (spec.md §4.1).

pub mod chain;
pub mod effective;
pub mod error;
pub mod resolver;

pub use chain::{check_activation_conflicts, resolve_chain, ResolvedChain};
pub use effective::{effective_constraints, EffectiveConstraints, OverrideRecord};
pub use error::ResolutionError;
pub use resolver::Resolver;

#[cfg(test)]
mod tests {
    use super::*;
    use governance_core::{
        ConstraintRule, ContextMatcher, EnforcementConfig, InMemoryRegistry, Protocol,
        ProtocolConstraint, ProtocolRegistry, Severity,
    };
    use chrono::Utc;

    fn protocol(id: &str, priority: i64, extends: Vec<&str>) -> Protocol {
        Protocol {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            name: None,
            description: None,
            priority,
            constraints: Vec::new(),
            enforcement: EnforcementConfig::default(),
            applicable_contexts: ContextMatcher::default(),
            extends: extends.into_iter().map(str::to_string).collect(),
            requires: Vec::new(),
            conflicts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn constraint(id: &str) -> ProtocolConstraint {
        ProtocolConstraint {
            id: id.to_string(),
            rule: ConstraintRule::ToolRestriction {
                allowed_tools: vec![],
                denied_tools: vec!["rm".to_string()],
                tool_patterns: vec![],
                require_approval: vec![],
            },
            severity: Severity::Error,
            message: "no rm".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn scenario_s2_override_favors_later_higher_or_equal_priority() {
        let registry = InMemoryRegistry::new();
        let mut base = protocol("base", 0, vec![]);
        base.constraints.push(constraint("c1"));
        let mut derived = protocol("derived", 5, vec!["base"]);
        derived.constraints.push(constraint("c1"));
        registry.upsert_protocol(base);
        registry.upsert_protocol(derived);

        let chain = resolve_chain("derived", &registry);
        assert!(chain.is_valid());
        assert_eq!(chain.order, vec!["base".to_string(), "derived".to_string()]);

        let effective = effective_constraints(&chain, &registry);
        assert_eq!(effective.overridden.len(), 1);
        assert_eq!(effective.overridden[0].from_protocol, "base");
        assert_eq!(effective.overridden[0].by_protocol, "derived");
    }

    #[test]
    fn scenario_s4_cycle_detected() {
        let registry = InMemoryRegistry::new();
        registry.upsert_protocol(protocol("a", 0, vec!["b"]));
        registry.upsert_protocol(protocol("b", 0, vec!["a"]));

        let chain = resolve_chain("a", &registry);
        assert!(!chain.is_valid());
        let cycle_err = chain
            .errors
            .iter()
            .find(|e| matches!(e, ResolutionError::CircularDependency { .. }))
            .expect("expected a circular dependency error");
        match cycle_err {
            ResolutionError::CircularDependency { cycle } => {
                assert_eq!(cycle, &vec!["a".to_string(), "b".to_string(), "a".to_string()]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_parent_is_recorded_without_panicking() {
        let registry = InMemoryRegistry::new();
        registry.upsert_protocol(protocol("derived", 0, vec!["ghost"]));

        let chain = resolve_chain("derived", &registry);
        assert!(!chain.is_valid());
        assert!(matches!(chain.errors[0], ResolutionError::MissingProtocol { .. }));
    }

    #[test]
    fn resolver_cache_returns_stable_results_until_cleared() {
        let registry = InMemoryRegistry::new();
        registry.upsert_protocol(protocol("solo", 0, vec![]));

        let resolver = Resolver::new();
        let first = resolver.resolve_chain("solo", &registry);
        let second = resolver.resolve_chain("solo", &registry);
        assert_eq!(first, second);

        resolver.clear_cache();
        let third = resolver.resolve_chain("solo", &registry);
        assert_eq!(first, third);
    }

    #[test]
    fn requires_missing_protocol_is_an_error() {
        let registry = InMemoryRegistry::new();
        let mut p = protocol("needs-x", 0, vec![]);
        p.requires.push("nonexistent".to_string());
        registry.upsert_protocol(p);

        let chain = resolve_chain("needs-x", &registry);
        assert!(!chain.is_valid());
        assert!(matches!(chain.errors[0], ResolutionError::MissingRequired { .. }));
    }

    #[test]
    fn conflicting_active_protocol_is_an_error() {
        let registry = InMemoryRegistry::new();
        let mut p = protocol("p1", 0, vec![]);
        p.conflicts.push("p2".to_string());
        registry.upsert_protocol(p);
        registry.upsert_protocol(protocol("p2", 0, vec![]));
        registry.activate("p2");

        let errors = check_activation_conflicts("p1", &registry);
        assert!(matches!(errors[0], ResolutionError::ConflictDetected { .. }));
    }
}
