mod cache;
mod client;
mod error;
mod wire;

pub use cache::IdCache;
pub use client::{get_u16_id, HttpInternerClient, InternerClient, NullInternerClient};
pub use error::InternerError;
pub use wire::{BRAND_COLLECTION, CATEGORY_COLLECTION, ORIGIN_COLLECTION, GetIdRequest, GetIdResponse};
