use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Manifest;

mod macros;

/// Username -> resolved watchlist id
pub type ListIdCache = MemoryCache<String>;

/// Username -> personalized manifest
pub type ManifestCache = MemoryCache<Manifest>;

/// Process-wide cache keyed by IMDB username
///
/// Entries live until the process exits or [`MemoryCache::clear`] is called;
/// there is no expiry and no eviction. Clones share the same storage.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: Arc<RwLock<HashMap<String, V>>>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stores a value, replacing any previous entry for the key
    pub async fn insert(&self, key: &str, value: V) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl<V: Clone> MemoryCache<V> {
    /// Retrieves a copy of the cached value, if any
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }
}
