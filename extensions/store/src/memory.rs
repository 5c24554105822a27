//! In-memory backend. Used by tests and by embedders that persist elsewhere.

use async_trait::async_trait;
use legacy_clock_core::capability::KeyValueStore;
use legacy_clock_core::error::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Process-local map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of every entry, in key order.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("will:0xa").await.unwrap(), None);

        store.set("will:0xa", "{}".to_string()).await.unwrap();
        assert_eq!(store.get("will:0xa").await.unwrap().as_deref(), Some("{}"));

        store.set("will:0xa", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("will:0xa").await.unwrap().as_deref(), Some("[]"));

        store.remove("will:0xa").await.unwrap();
        assert_eq!(store.get("will:0xa").await.unwrap(), None);

        // absent key
        store.remove("will:0xa").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set("checkin:0xa", "1".to_string()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot().get("checkin:0xa").map(String::as_str), Some("1"));
    }
}
