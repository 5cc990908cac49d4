//! Validator memoization by `(protocol.id, protocol.version,
//! serialize(constraints))`, LRU-evicted at a configurable capacity
//! (spec.md §4.2.3). Built on `IndexMap` the same way the teacher's
//! `ToolPolicyManager` keeps an insertion-ordered, bounded config map —
//! here, reinsertion on hit doubles as the "move to most-recently-used"
//! step.

use crate::validator::ProposalValidationResult;
use indexmap::IndexMap;

pub const DEFAULT_CACHE_MAX_SIZE: usize = 100;

pub struct ValidationCache {
    entries: IndexMap<String, ProposalValidationResult>,
    max_size: usize,
}

impl ValidationCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_size,
        }
    }

    pub fn key(protocol_id: &str, version: &str, constraints_fingerprint: &str) -> String {
        format!("{protocol_id}@{version}:{constraints_fingerprint}")
    }

    pub fn get(&mut self, key: &str) -> Option<ProposalValidationResult> {
        let value = self.entries.shift_remove(key)?;
        self.entries.insert(key.to_string(), value.clone());
        Some(value)
    }

    pub fn insert(&mut self, key: String, value: ProposalValidationResult) {
        self.entries.shift_remove(&key);
        if self.entries.len() >= self.max_size {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_MAX_SIZE)
    }
}
