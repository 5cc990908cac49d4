//! Dependency-chain resolution over the `extends` graph, plus cross-chain
//! `requires`/`conflicts` validation (spec.md §4.1).

use crate::error::ResolutionError;
use governance_core::ProtocolRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedChain {
    pub protocol_id: String,
    /// Post-order: root ancestor first, the requested protocol last. Only
    /// ids that were successfully fetched from the registry appear here —
    /// a node that failed (missing or cyclic) is recorded in `errors` and
    /// excluded from `order`.
    pub order: Vec<String>,
    pub errors: Vec<ResolutionError>,
}

impl ResolvedChain {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// DFS over the `extends` graph in post-order, with two visit sets:
/// `visiting` (current path, for cycle detection) and `visited` (fully
/// processed, so shared ancestors aren't walked twice).
pub fn resolve_chain(id: &str, registry: &dyn ProtocolRegistry) -> ResolvedChain {
    let mut order = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut path: Vec<String> = Vec::new();
    let mut errors = Vec::new();

    walk(id, registry, &mut path, &mut visited, &mut order, &mut errors);

    // Cross-chain requires/conflicts check over every protocol that made it
    // into the resolved chain.
    let active = registry.get_active();
    for protocol_id in &order {
        let Some(protocol) = registry.get_protocol(protocol_id) else {
            continue;
        };
        for required in &protocol.requires {
            if required == &protocol.id {
                errors.push(ResolutionError::CircularDependency {
                    cycle: vec![protocol.id.clone()],
                });
            } else if registry.get_protocol(required).is_none() {
                errors.push(ResolutionError::MissingRequired {
                    id: required.clone(),
                    required_by: protocol.id.clone(),
                });
            }
        }
        for conflict in &protocol.conflicts {
            if active.contains(conflict) {
                errors.push(ResolutionError::ConflictDetected {
                    id: conflict.clone(),
                    conflicting_with: protocol.id.clone(),
                });
            }
        }
    }

    ResolvedChain {
        protocol_id: id.to_string(),
        order,
        errors,
    }
}

fn walk(
    id: &str,
    registry: &dyn ProtocolRegistry,
    path: &mut Vec<String>,
    visited: &mut HashSet<String>,
    order: &mut Vec<String>,
    errors: &mut Vec<ResolutionError>,
) {
    if visited.contains(id) {
        return;
    }

    if let Some(idx) = path.iter().position(|p| p == id) {
        let mut cycle = path[idx..].to_vec();
        cycle.push(id.to_string());
        tracing::warn!(protocol_id = id, cycle = ?cycle, "circular protocol dependency detected");
        errors.push(ResolutionError::CircularDependency { cycle });
        return;
    }

    let Some(protocol) = registry.get_protocol(id) else {
        errors.push(ResolutionError::MissingProtocol { id: id.to_string() });
        return;
    };

    path.push(id.to_string());
    for parent in &protocol.extends {
        walk(parent, registry, path, visited, order, errors);
    }
    path.pop();

    visited.insert(id.to_string());
    order.push(id.to_string());
}

/// Independently verify direct conflicts (both directions) and presence of
/// required protocols for a single protocol, without walking its full
/// `extends` chain (spec.md §4.1's `checkActivationConflicts`).
pub fn check_activation_conflicts(id: &str, registry: &dyn ProtocolRegistry) -> Vec<ResolutionError> {
    let Some(protocol) = registry.get_protocol(id) else {
        return vec![ResolutionError::MissingProtocol { id: id.to_string() }];
    };

    let mut errors = Vec::new();
    let active_protocols = registry.get_active_protocols();

    for conflict_id in &protocol.conflicts {
        if active_protocols.iter().any(|p| &p.id == conflict_id) {
            errors.push(ResolutionError::ConflictDetected {
                id: conflict_id.clone(),
                conflicting_with: protocol.id.clone(),
            });
        }
    }

    for active in &active_protocols {
        if active.conflicts.contains(&protocol.id) {
            errors.push(ResolutionError::ConflictDetected {
                id: protocol.id.clone(),
                conflicting_with: active.id.clone(),
            });
        }
    }

    for required in &protocol.requires {
        if required == &protocol.id {
            errors.push(ResolutionError::CircularDependency {
                cycle: vec![protocol.id.clone()],
            });
        } else if registry.get_protocol(required).is_none() {
            errors.push(ResolutionError::MissingRequired {
                id: required.clone(),
                required_by: protocol.id.clone(),
            });
        }
    }

    errors
}
