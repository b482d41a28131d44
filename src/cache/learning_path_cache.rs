use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe LRU cache for generated learning paths
///
/// The graph is fixed for the process lifetime, so a path generated for an
/// entity stays valid until evicted.
pub struct LearningPathCache {
    cache: Mutex<LruCache<String, Value>>,
}

impl LearningPathCache {
    /// Create a new cache holding at most `capacity` entities (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Value>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, entity: &str) -> Option<Value> {
        self.lock().get(entity).cloned()
    }

    pub fn put(&self, entity: String, path: Value) {
        self.lock().put(entity, path);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_put_and_get() {
        let cache = LearningPathCache::new(10);
        let path = json!({"prerequisites": ["JavaScript"], "core": [], "next_steps": []});

        cache.put("Vue".to_string(), path.clone());

        assert_eq!(cache.get("Vue"), Some(path));
        assert!(cache.get("React").is_none());
    }

    #[test]
    fn test_cache_len() {
        let cache = LearningPathCache::new(10);
        assert!(cache.is_empty());

        cache.put("Vue".to_string(), json!({}));
        cache.put("React".to_string(), json!({}));
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_cache_get_updates_lru() {
        let cache = LearningPathCache::new(2);

        cache.put("Vue".to_string(), json!(1));
        cache.put("React".to_string(), json!(2));

        // Touch Vue so React becomes least recently used
        let _ = cache.get("Vue");
        cache.put("Svelte".to_string(), json!(3));

        assert!(cache.get("Vue").is_some());
        assert!(cache.get("React").is_none());
        assert!(cache.get("Svelte").is_some());
    }

    #[test]
    fn test_cache_zero_capacity_holds_one() {
        let cache = LearningPathCache::new(0);

        cache.put("Vue".to_string(), json!(1));
        cache.put("React".to_string(), json!(2));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("React").is_some());
    }
}
