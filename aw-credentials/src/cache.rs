//! `CredentialCache`: a size-bounded, TTL'd cache of resolved
//! credentials keyed by logical service name.
//!
//! Grounded on `aw_core/cache.py`'s module-level `credentials_cache =
//! TTLCache(maxsize=100, ttl=3600)` plus `store_credentials`/
//! `get_credentials`/`clear_credentials`; `moka::sync::Cache` is the
//! idiomatic Rust analogue of `cachetools.TTLCache`.

use std::time::Duration;

use moka::sync::Cache;

const MAX_ENTRIES: u64 = 100;
const TTL_SECS: u64 = 3600;

pub struct CredentialCache {
    inner: Cache<String, String>,
}

impl CredentialCache {
    pub fn new() -> Self {
        let inner = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(Duration::from_secs(TTL_SECS))
            .build();
        CredentialCache { inner }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// The explicit logout operation: drops every cached credential.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = CredentialCache::new();
        cache.insert("sundial", "passphrase");
        assert_eq!(cache.get("sundial"), Some("passphrase".to_string()));
    }

    #[test]
    fn clear_drops_everything() {
        let cache = CredentialCache::new();
        cache.insert("sundial", "passphrase");
        cache.clear();
        cache.inner.run_pending_tasks();
        assert_eq!(cache.get("sundial"), None);
    }
}
