mod error;
mod http_client;
mod memory;
mod record;
mod store;
pub mod wire;

pub use error::StoreError;
pub use http_client::HttpRecordStore;
pub use memory::InMemoryStore;
pub use record::{Bin, Generation};
pub use store::RecordStore;
