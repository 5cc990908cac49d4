//! `Resolver`: memoizes chain resolution and effective-constraint
//! computation. The cache is flat and never invalidated automatically —
//! callers must call `clear_cache()` after any registry mutation
//! (protocol upsert, activation, deactivation). This mirrors the
//! teacher's `PermissionCache`, which is likewise cleared explicitly by
//! its owner rather than watching for invalidation triggers itself.

use crate::chain::{resolve_chain, ResolvedChain};
use crate::effective::{effective_constraints, EffectiveConstraints};
use governance_core::ProtocolRegistry;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct Resolver {
    chain_cache: Mutex<HashMap<String, ResolvedChain>>,
    effective_cache: Mutex<HashMap<String, EffectiveConstraints>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            chain_cache: Mutex::new(HashMap::new()),
            effective_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve_chain(&self, id: &str, registry: &dyn ProtocolRegistry) -> ResolvedChain {
        if let Some(cached) = self.chain_cache.lock().unwrap().get(id) {
            return cached.clone();
        }
        let chain = resolve_chain(id, registry);
        self.chain_cache.lock().unwrap().insert(id.to_string(), chain.clone());
        chain
    }

    pub fn get_effective_constraints(&self, id: &str, registry: &dyn ProtocolRegistry) -> EffectiveConstraints {
        if let Some(cached) = self.effective_cache.lock().unwrap().get(id) {
            return cached.clone();
        }
        let chain = self.resolve_chain(id, registry);
        let effective = effective_constraints(&chain, registry);
        self.effective_cache
            .lock()
            .unwrap()
            .insert(id.to_string(), effective.clone());
        effective
    }

    /// Must be called after any protocol registry mutation — the cache
    /// does not watch the registry for changes.
    pub fn clear_cache(&self) {
        self.chain_cache.lock().unwrap().clear();
        self.effective_cache.lock().unwrap().clear();
    }
}
