//! Blocking policy (spec.md §4.3.4): whether a set of violations should
//! stop an action, given each violation's originating protocol.

use governance_core::{EnforcementMode, OnViolation, Protocol, Severity, Violation};
use std::collections::HashMap;

pub fn should_block_execution(violations: &[Violation], active_protocols: &[Protocol]) -> bool {
    if violations.is_empty() {
        return false;
    }

    let by_id: HashMap<&str, &Protocol> = active_protocols.iter().map(|p| (p.id.as_str(), p)).collect();

    violations.iter().any(|violation| {
        if violation.severity != Severity::Error {
            return false;
        }
        let Some(protocol) = by_id.get(violation.protocol_id.as_str()) else {
            return false;
        };
        match protocol.enforcement.mode {
            EnforcementMode::Strict => true,
            EnforcementMode::Permissive => protocol.enforcement.on_violation == OnViolation::Block,
            EnforcementMode::Audit | EnforcementMode::Learning => false,
        }
    })
}
