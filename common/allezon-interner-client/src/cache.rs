use std::collections::HashMap;

use tokio::sync::RwLock;

/// Nested `collection -> element -> id` cache guarded by one
/// `RwLock`, mirroring the original client's single `sync.RWMutex`
/// over a `map[string]map[string]int32`. Readers never block other
/// readers; a cache miss pays one write lock to populate.
#[derive(Default)]
pub struct IdCache {
    entries: RwLock<HashMap<String, HashMap<String, i32>>>,
}

impl IdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, collection: &str, element: &str) -> Option<i32> {
        let entries = self.entries.read().await;
        entries.get(collection)?.get(element).copied()
    }

    pub async fn insert(&self, collection: &str, element: &str, id: i32) {
        let mut entries = self.entries.write().await;
        entries
            .entry(collection.to_string())
            .or_default()
            .insert(element.to_string(), id);
    }
}
