use std::sync::Arc;

use allezon_interner_client::IdCache;
use allezon_store::{RecordStore, StoreError};
use thiserror::Error;

const IDS_SET: &str = "ids";
const IDS_BIN: &str = "ids";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("element not found and create_missing was false")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The `/get_id` algorithm of spec §4.7: cache check, then a full-list
/// fetch and linear search (the list's index *is* the id), then an
/// atomic unique-append on a cache miss with `create_missing`.
pub struct IdResolver {
    store: Arc<dyn RecordStore>,
    cache: IdCache,
}

impl IdResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, cache: IdCache::new() }
    }

    pub async fn resolve(&self, collection: &str, element: &str, create_missing: bool) -> Result<i32, ResolveError> {
        if let Some(id) = self.cache.get(collection, element).await {
            return Ok(id);
        }

        let id = match self.lookup_in_store(collection, element).await? {
            Some(id) => id,
            None if create_missing => self.create_in_store(collection, element).await?,
            None => return Err(ResolveError::NotFound),
        };

        self.cache.insert(collection, element, id).await;
        Ok(id)
    }

    async fn lookup_in_store(&self, collection: &str, element: &str) -> Result<Option<i32>, StoreError> {
        match self.store.list_get(IDS_SET, collection, IDS_BIN).await {
            Ok(elements) => Ok(elements.iter().position(|e| e == element).map(|idx| idx as i32)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Appends `element`, returning its index. A concurrent creator
    /// may win the race (`StoreError::ElementExists`) — in that case
    /// the now-settled list is re-read to find the id it was assigned
    /// (spec §4.7, step 3).
    async fn create_in_store(&self, collection: &str, element: &str) -> Result<i32, StoreError> {
        match self.store.list_append_unique(IDS_SET, collection, IDS_BIN, element).await {
            Ok(new_len) => Ok((new_len - 1) as i32),
            Err(StoreError::ElementExists) => {
                let elements = self.store.list_get(IDS_SET, collection, IDS_BIN).await?;
                match elements.iter().position(|e| e == element) {
                    Some(idx) => Ok(idx as i32),
                    None => Err(StoreError::Backend(format!(
                        "element {element} reported as existing in {collection} but not found on refetch"
                    ))),
                }
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allezon_store::InMemoryStore;

    #[tokio::test]
    async fn first_insert_gets_id_zero() {
        let resolver = IdResolver::new(Arc::new(InMemoryStore::new()));
        let id = resolver.resolve("brand", "nike", true).await.unwrap();
        assert_eq!(id, 0);
        let id = resolver.resolve("brand", "adidas", true).await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn repeat_lookup_hits_cache_and_is_stable() {
        let resolver = IdResolver::new(Arc::new(InMemoryStore::new()));
        let first = resolver.resolve("brand", "nike", true).await.unwrap();
        let second = resolver.resolve("brand", "nike", true).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_element_without_create_missing_is_not_found() {
        let resolver = IdResolver::new(Arc::new(InMemoryStore::new()));
        let err = resolver.resolve("brand", "nike", false).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[tokio::test]
    async fn existing_element_is_found_without_create_missing() {
        let resolver = IdResolver::new(Arc::new(InMemoryStore::new()));
        resolver.resolve("brand", "nike", true).await.unwrap();

        let other_resolver = IdResolver::new(resolver.store.clone());
        let id = other_resolver.resolve("brand", "nike", false).await.unwrap();
        assert_eq!(id, 0);
    }
}
