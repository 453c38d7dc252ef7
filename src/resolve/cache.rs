//! Per-entry memo of resolved attribute values.

use crate::resolve::Resolved;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ResolutionCache {
    values: HashMap<String, Resolved>,
    hits: u64,
    misses: u64,
}

/// Cache counters, mostly useful in tests and debug output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: usize,
    pub hits: u64,
    pub misses: u64,
}

impl ResolutionCache {
    pub fn get(&mut self, attribute: &str) -> Option<Resolved> {
        match self.values.get(attribute) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, attribute: &str, value: Resolved) {
        self.values.insert(attribute.to_string(), value);
    }

    pub fn is_cached(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    pub fn invalidate(&mut self, attribute: &str) {
        self.values.remove(attribute);
    }

    pub fn invalidate_all(&mut self) {
        self.values.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached: self.values.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
