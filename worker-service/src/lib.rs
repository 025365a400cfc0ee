pub mod processor;
pub mod retry;

pub use processor::{process_tag_once, ProcessError};
pub use retry::process_tag_with_retry;
