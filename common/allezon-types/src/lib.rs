pub mod aggregate_key;
pub mod counter;
pub mod tag;
pub mod time_range;

pub use aggregate_key::AggregateKey;
pub use counter::ActionAggregate;
pub use tag::{Action, Device, ProductInfo, UserProfile, UserTag};
pub use time_range::{MillisTimeRange, MinuteTimeRange};

/// Target length of a per-cookie action history after garbage collection.
pub const SOFT_LIMIT: usize = 200;

/// GC trigger threshold: `SOFT_LIMIT * 1.1`, rounded down.
pub const GC_TRIGGER_LIMIT: usize = SOFT_LIMIT + SOFT_LIMIT / 10;
