use crate::error::StoreError;
use crate::record::Generation;
use async_trait::async_trait;

/// The record-store contract of spec §4.5/§6.3: a keyed, generation-
/// versioned store exposing the primitives every Allezon component
/// needs — atomic ordered-map inserts for user-profile history,
/// optimistic-CAS range removal for garbage collection, unique-append
/// lists for the ID-Interner, packed-counter increments for
/// aggregates, and per-set scans for minute queries.
///
/// One namespace (`allezon`) holds every set; callers pass the set
/// name explicitly since it varies per record (`user_profiles`,
/// a `minute mod 1000` shard of `aggregates`, or `ids`).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `get(bins=[bin])` on an ordered-map bin: the map's entries in
    /// ascending key order. `StoreError::KeyNotFound` if the record
    /// does not exist.
    async fn get_ordered_map(&self, set: &str, key: &str, bin: &str) -> Result<Vec<(i64, Vec<u8>)>, StoreError>;

    /// `map_put_with_policy(KEY_ORDERED, UPDATE, bin, map_key, value)`:
    /// upserts into `bin`, creating the record if absent. Returns the
    /// bin's new size.
    async fn map_put(&self, set: &str, key: &str, bin: &str, map_key: i64, value: Vec<u8>) -> Result<usize, StoreError>;

    /// `map_size(bin)` under `UPDATE_ONLY`: the bin's current size and
    /// the record's generation. `StoreError::KeyNotFound` if the
    /// record does not exist.
    async fn map_size(&self, set: &str, key: &str, bin: &str) -> Result<(usize, Generation), StoreError>;

    /// `map_remove_by_index_range(bin, 0, count)` under
    /// `EXPECT_GEN_EQUAL(expected_generation)`: removes the `count`
    /// smallest keys (the oldest entries, since keys are millisecond
    /// timestamps). `StoreError::GenerationMismatch` if the record's
    /// generation has since moved; `Ok(())` silently if the record no
    /// longer exists (spec §4.6, "on key-not-found ... succeed
    /// silently").
    async fn map_remove_range(
        &self,
        set: &str,
        key: &str,
        bin: &str,
        count: usize,
        expected_generation: Generation,
    ) -> Result<(), StoreError>;

    /// The ordered list of elements for an `ids` category.
    /// `StoreError::KeyNotFound` if the category has no elements yet.
    async fn list_get(&self, set: &str, key: &str, bin: &str) -> Result<Vec<String>, StoreError>;

    /// `list_append_with_unique_policy`: appends `value` if absent,
    /// returning the new length (which doubles as the element's
    /// index, i.e. its dense id). `StoreError::ElementExists` if a
    /// concurrent appender already added it.
    async fn list_append_unique(&self, set: &str, key: &str, bin: &str, value: &str) -> Result<usize, StoreError>;

    /// `ADD(bin, delta)`: atomically adds `delta` to the packed
    /// counter, creating the record with `delta` as its initial value
    /// if absent (spec §4.5, "record creation and increment together
    /// form the update").
    async fn add(&self, set: &str, key: &str, bin: &str, delta: u64) -> Result<(), StoreError>;

    /// `scan_all(bins=[bin])` over one set: every record's key and the
    /// packed counter in `bin`, for records that have it.
    async fn scan_all(&self, set: &str, bin: &str) -> Result<Vec<(String, u64)>, StoreError>;
}
