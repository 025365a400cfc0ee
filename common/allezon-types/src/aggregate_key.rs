/// The dimension tuple identifying one aggregate cell: `(category_id,
/// brand_id, origin_id)`, each a dense `u16` assigned by the
/// ID-Interner. See spec §3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub category_id: u16,
    pub brand_id: u16,
    pub origin_id: u16,
}

impl AggregateKey {
    pub fn new(category_id: u16, brand_id: u16, origin_id: u16) -> Self {
        Self { category_id, brand_id, origin_id }
    }

    /// `(category << 32) | (brand << 16) | origin`.
    pub fn encode(self) -> u64 {
        ((self.category_id as u64) << 32) | ((self.brand_id as u64) << 16) | (self.origin_id as u64)
    }

    pub fn decode(packed: u64) -> Self {
        Self {
            category_id: (packed >> 32) as u16,
            brand_id: (packed >> 16) as u16,
            origin_id: packed as u16,
        }
    }

    /// The store record key for `(minute, self)`: `"<minute>_<packed>"`.
    pub fn record_key(self, minute: i64) -> String {
        format!("{minute}_{}", self.encode())
    }

    /// The bounded set shard a minute's aggregates live in, per spec
    /// §4.5's "minute mod 1000" layout.
    pub fn set_shard(minute: i64) -> String {
        (minute.rem_euclid(1000)).to_string()
    }
}
