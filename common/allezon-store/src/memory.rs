use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::record::{Bin, Generation, StoredRecord};
use crate::store::RecordStore;

/// A `dashmap`-backed stand-in for the abstract record store of spec
/// §6.3. Every primitive in [`RecordStore`] is satisfied without an
/// external dependency, which is what lets `api-service`,
/// `worker-service`, and `id-interner-service` boot standalone (the
/// `*_null_client` seam of spec §6.5 exists for the log and the
/// ID-Interner HTTP client; this store has no external half to null
/// out).
///
/// Each `(set, key)` pair is sharded by `DashMap`'s internal locking,
/// so every operation here that reads-then-writes a record does so
/// while holding that shard's lock — the same atomicity the spec
/// assigns to the real store's per-record operations.
#[derive(Default)]
pub struct InMemoryStore {
    records: DashMap<(String, String), StoredRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { records: DashMap::new() }
    }

    fn rk(set: &str, key: &str) -> (String, String) {
        (set.to_string(), key.to_string())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get_ordered_map(&self, set: &str, key: &str, bin: &str) -> Result<Vec<(i64, Vec<u8>)>, StoreError> {
        let record = self.records.get(&Self::rk(set, key)).ok_or(StoreError::KeyNotFound)?;
        match record.bins.get(bin) {
            Some(Bin::OrderedMap(map)) => Ok(map.iter().map(|(k, v)| (*k, v.clone())).collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn map_put(&self, set: &str, key: &str, bin: &str, map_key: i64, value: Vec<u8>) -> Result<usize, StoreError> {
        let mut record = self.records.entry(Self::rk(set, key)).or_default();
        let entry = record
            .bins
            .entry(bin.to_string())
            .or_insert_with(|| Bin::OrderedMap(BTreeMap::new()));
        let Bin::OrderedMap(map) = entry else {
            return Err(StoreError::Backend(format!("bin {bin} is not an ordered map")));
        };
        map.insert(map_key, value);
        let new_size = map.len();
        record.generation = record.generation.wrapping_add(1);
        Ok(new_size)
    }

    async fn map_size(&self, set: &str, key: &str, bin: &str) -> Result<(usize, Generation), StoreError> {
        let record = self.records.get(&Self::rk(set, key)).ok_or(StoreError::KeyNotFound)?;
        let size = match record.bins.get(bin) {
            Some(Bin::OrderedMap(map)) => map.len(),
            _ => 0,
        };
        Ok((size, record.generation))
    }

    async fn map_remove_range(
        &self,
        set: &str,
        key: &str,
        bin: &str,
        count: usize,
        expected_generation: Generation,
    ) -> Result<(), StoreError> {
        let Some(mut record) = self.records.get_mut(&Self::rk(set, key)) else {
            // Key-not-found at this stage succeeds silently (spec §4.6).
            return Ok(());
        };
        if record.generation != expected_generation {
            return Err(StoreError::GenerationMismatch);
        }
        if let Some(Bin::OrderedMap(map)) = record.bins.get_mut(bin) {
            let remove_keys: Vec<i64> = map.keys().take(count).copied().collect();
            for k in remove_keys {
                map.remove(&k);
            }
        }
        record.generation = record.generation.wrapping_add(1);
        Ok(())
    }

    async fn list_get(&self, set: &str, key: &str, bin: &str) -> Result<Vec<String>, StoreError> {
        let record = self.records.get(&Self::rk(set, key)).ok_or(StoreError::KeyNotFound)?;
        match record.bins.get(bin) {
            Some(Bin::List(list)) => Ok(list.clone()),
            _ => Err(StoreError::KeyNotFound),
        }
    }

    async fn list_append_unique(&self, set: &str, key: &str, bin: &str, value: &str) -> Result<usize, StoreError> {
        let mut record = self.records.entry(Self::rk(set, key)).or_default();
        let entry = record.bins.entry(bin.to_string()).or_insert_with(|| Bin::List(Vec::new()));
        let Bin::List(list) = entry else {
            return Err(StoreError::Backend(format!("bin {bin} is not a list")));
        };
        if list.iter().any(|existing| existing == value) {
            return Err(StoreError::ElementExists);
        }
        list.push(value.to_string());
        let new_len = list.len();
        record.generation = record.generation.wrapping_add(1);
        Ok(new_len)
    }

    async fn add(&self, set: &str, key: &str, bin: &str, delta: u64) -> Result<(), StoreError> {
        let mut record = self.records.entry(Self::rk(set, key)).or_default();
        let entry = record.bins.entry(bin.to_string()).or_insert(Bin::Counter(0));
        let Bin::Counter(value) = entry else {
            return Err(StoreError::Backend(format!("bin {bin} is not a counter")));
        };
        *value = value.wrapping_add(delta);
        record.generation = record.generation.wrapping_add(1);
        Ok(())
    }

    async fn scan_all(&self, set: &str, bin: &str) -> Result<Vec<(String, u64)>, StoreError> {
        let mut results = Vec::new();
        for entry in self.records.iter() {
            let ((entry_set, entry_key), record) = (entry.key(), entry.value());
            if entry_set != set {
                continue;
            }
            if let Some(Bin::Counter(value)) = record.bins.get(bin) {
                results.push((entry_key.clone(), *value));
            }
        }
        Ok(results)
    }
}
