use std::collections::BTreeMap;

/// Per-record monotonically-increasing counter maintained by the
/// store, used for optimistic CAS (spec glossary, "Generation").
pub type Generation = u32;

/// The three bin shapes the store's record primitives operate on
/// (spec §4.5): an order-preserving map (user-profile `views`/`buys`),
/// an append-only unique list (`ids`), and a packed 64-bit counter
/// (`aggregates`).
#[derive(Debug, Clone)]
pub enum Bin {
    OrderedMap(BTreeMap<i64, Vec<u8>>),
    List(Vec<String>),
    Counter(u64),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StoredRecord {
    pub bins: std::collections::HashMap<String, Bin>,
    pub generation: Generation,
}
