// Mon Oct 19 2026 - Alex

use crate::layout::typed::TypedLayoutSet;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Explicit memoization handle for resolved layouts, keyed by row signature.
pub trait MappingCache: Send + Sync {
    fn get(&self, signature: &str) -> Option<TypedLayoutSet>;
    fn put(&self, signature: &str, layouts: TypedLayoutSet);
}

pub struct InMemoryMappingCache {
    entries: RwLock<HashMap<String, TypedLayoutSet>>,
    max_entries: usize,
}

impl InMemoryMappingCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn invalidate(&self, signature: &str) {
        self.entries.write().remove(signature);
    }
}

impl Default for InMemoryMappingCache {
    fn default() -> Self {
        Self::new(64)
    }
}

impl MappingCache for InMemoryMappingCache {
    fn get(&self, signature: &str) -> Option<TypedLayoutSet> {
        self.entries.read().get(signature).cloned()
    }

    fn put(&self, signature: &str, layouts: TypedLayoutSet) {
        let mut entries = self.entries.write();
        if entries.len() >= self.max_entries && !entries.contains_key(signature) {
            entries.clear();
        }
        entries.insert(signature.to_string(), layouts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_invalidate() {
        let cache = InMemoryMappingCache::new(2);
        cache.put("a", TypedLayoutSet::new());
        assert!(cache.get("a").is_some());
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clears_when_full() {
        let cache = InMemoryMappingCache::new(2);
        cache.put("a", TypedLayoutSet::new());
        cache.put("b", TypedLayoutSet::new());
        cache.put("c", TypedLayoutSet::new());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("c").is_some());
    }
}
