use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Per-request max-age negotiation across RPC calls.
///
/// Each call path may declare how long its result can be cached; the
/// response can only be cached as long as the shortest declared age.
#[derive(Debug, Default)]
pub struct RpcCache {
    max_ages: Mutex<HashMap<String, u32>>,
}

impl RpcCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        // The map holds plain integers, a poisoned guard is still consistent
        self.max_ages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a max-age for `path`, keeping the smallest ever seen
    pub fn set_max_age(&self, path: &str, max_age: u32) {
        self.lock()
            .entry(path.to_string())
            .and_modify(|current| *current = (*current).min(max_age))
            .or_insert(max_age);
    }

    pub fn get_max_age(&self, path: &str) -> Option<u32> {
        self.lock().get(path).copied()
    }

    /// Smallest max-age over every recorded path
    pub fn min_max_age(&self) -> Option<u32> {
        self.lock().values().copied().min()
    }

    /// `Cache-Control` value for a response assembled from the recorded calls
    pub fn cache_control(&self) -> String {
        match self.min_max_age() {
            Some(max_age) if max_age > 0 => format!("public, max-age={max_age}"),
            _ => "no-store".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_max_age_wins() {
        let cache = RpcCache::new();
        for age in [50, 10, 80] {
            cache.set_max_age("project.findMany", age);
        }
        assert_eq!(cache.get_max_age("project.findMany"), Some(10));
    }

    #[test]
    fn unset_path_has_no_max_age() {
        let cache = RpcCache::new();
        cache.set_max_age("project.findMany", 30);
        assert_eq!(cache.get_max_age("domain.verify"), None);
    }

    #[test]
    fn cache_control_uses_smallest_age_across_paths() {
        let cache = RpcCache::new();
        assert_eq!(cache.cache_control(), "no-store");

        cache.set_max_age("a", 120);
        cache.set_max_age("b", 60);
        assert_eq!(cache.cache_control(), "public, max-age=60");

        cache.set_max_age("c", 0);
        assert_eq!(cache.cache_control(), "no-store");
    }
}
