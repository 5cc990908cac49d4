//! Effective constraint computation: priority-based override across a
//! resolved chain (spec.md §4.1, invariant 1 in §8).

use crate::chain::ResolvedChain;
use governance_core::{ProtocolConstraint, ProtocolRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub constraint_id: String,
    pub from_protocol: String,
    pub by_protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConstraints {
    pub protocol_id: String,
    pub constraints: HashMap<String, ProtocolConstraint>,
    pub overridden: Vec<OverrideRecord>,
}

struct Source {
    protocol_id: String,
    priority: i64,
}

/// Iterate the resolved chain in order (post-order: root ancestor first,
/// target last). For each constraint, keyed by id: if the current
/// protocol's priority is >= the stored source's priority, overwrite and
/// record the override. Ties favor the later (more-derived) protocol
/// because the chain is already post-order.
pub fn effective_constraints(chain: &ResolvedChain, registry: &dyn ProtocolRegistry) -> EffectiveConstraints {
    let mut constraints: HashMap<String, ProtocolConstraint> = HashMap::new();
    let mut sources: HashMap<String, Source> = HashMap::new();
    let mut overridden = Vec::new();

    for protocol_id in &chain.order {
        let Some(protocol) = registry.get_protocol(protocol_id) else {
            continue;
        };

        for constraint in &protocol.constraints {
            match sources.get(&constraint.id) {
                None => {
                    sources.insert(
                        constraint.id.clone(),
                        Source {
                            protocol_id: protocol.id.clone(),
                            priority: protocol.priority,
                        },
                    );
                    constraints.insert(constraint.id.clone(), constraint.clone());
                }
                Some(existing) if protocol.priority >= existing.priority => {
                    overridden.push(OverrideRecord {
                        constraint_id: constraint.id.clone(),
                        from_protocol: existing.protocol_id.clone(),
                        by_protocol: protocol.id.clone(),
                    });
                    sources.insert(
                        constraint.id.clone(),
                        Source {
                            protocol_id: protocol.id.clone(),
                            priority: protocol.priority,
                        },
                    );
                    constraints.insert(constraint.id.clone(), constraint.clone());
                }
                Some(_) => {
                    // Lower priority than the existing source: keep it.
                }
            }
        }
    }

    EffectiveConstraints {
        protocol_id: chain.protocol_id.clone(),
        constraints,
        overridden,
    }
}
