//! `ProtocolRegistry` — the external, out-of-scope collaborator that owns
//! persistent CRUD over protocols and violation history (spec.md §1, §6).
//!
//! This module defines only the trait contract plus one reference
//! in-memory implementation sufficient for tests and the CLI demo harness.
//! Real deployments provide their own persistent implementation.

use crate::constraint::Severity;
use crate::protocol::Protocol;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub protocol_id: String,
    pub constraint_id: String,
    #[serde(default)]
    pub feature_id: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
    pub protocol_id: Option<String>,
    pub worker_id: Option<String>,
    pub min_severity: Option<Severity>,
}

impl ViolationFilter {
    fn matches(&self, record: &ViolationRecord) -> bool {
        if let Some(p) = &self.protocol_id {
            if &record.protocol_id != p {
                return false;
            }
        }
        if let Some(w) = &self.worker_id {
            if record.worker_id.as_deref() != Some(w.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_severity {
            if record.severity < min {
                return false;
            }
        }
        true
    }
}

/// Read-only view consumed by the Resolver and Enforcement Engine, plus the
/// single write path (`record_violation`) that enforcement uses as a side
/// effect. `get_protocol`/`get_active`/`get_active_protocols` must be cheap
/// and side-effect-free — callers may invoke them repeatedly per action.
pub trait ProtocolRegistry: Send + Sync {
    fn get_protocol(&self, id: &str) -> Option<Protocol>;
    fn get_active(&self) -> Vec<String>;
    fn get_active_protocols(&self) -> Vec<Protocol>;
    fn record_violation(&self, record: ViolationRecord);
    fn get_violation_count(&self, filter: Option<ViolationFilter>) -> usize;
}

/// Reference in-memory registry for tests and the CLI demo. Not a
/// production persistence layer — see module docs.
#[derive(Default)]
pub struct InMemoryRegistry {
    protocols: RwLock<IndexMap<String, Protocol>>,
    active: RwLock<Vec<String>>,
    violations: RwLock<Vec<ViolationRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_protocol(&self, protocol: Protocol) {
        self.protocols
            .write()
            .expect("registry lock poisoned")
            .insert(protocol.id.clone(), protocol);
    }

    pub fn activate(&self, id: impl Into<String>) {
        let mut active = self.active.write().expect("registry lock poisoned");
        let id = id.into();
        if !active.contains(&id) {
            active.push(id);
        }
    }

    pub fn deactivate(&self, id: &str) {
        self.active
            .write()
            .expect("registry lock poisoned")
            .retain(|existing| existing != id);
    }
}

impl ProtocolRegistry for InMemoryRegistry {
    fn get_protocol(&self, id: &str) -> Option<Protocol> {
        self.protocols
            .read()
            .expect("registry lock poisoned")
            .get(id)
            .cloned()
    }

    fn get_active(&self) -> Vec<String> {
        self.active.read().expect("registry lock poisoned").clone()
    }

    fn get_active_protocols(&self) -> Vec<Protocol> {
        let active = self.get_active();
        let protocols = self.protocols.read().expect("registry lock poisoned");
        active
            .iter()
            .filter_map(|id| protocols.get(id).cloned())
            .collect()
    }

    fn record_violation(&self, record: ViolationRecord) {
        tracing::warn!(
            protocol_id = %record.protocol_id,
            constraint_id = %record.constraint_id,
            severity = ?record.severity,
            "violation recorded"
        );
        self.violations
            .write()
            .expect("registry lock poisoned")
            .push(record);
    }

    fn get_violation_count(&self, filter: Option<ViolationFilter>) -> usize {
        let violations = self.violations.read().expect("registry lock poisoned");
        match filter {
            None => violations.len(),
            Some(f) => violations.iter().filter(|v| f.matches(v)).count(),
        }
    }
}
