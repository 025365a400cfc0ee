mod error;
mod kafka;
mod log;
mod null;
mod partition;

pub use error::LogError;
pub use kafka::{ensure_topic, KafkaLogConfig, KafkaLogConsumer, KafkaLogProducer};
pub use log::{Delivery, LogConsumer, LogProducer, USER_TAGS_CONSUMER_GROUP, USER_TAGS_TOPIC};
pub use null::NullLog;
pub use partition::partition_for_cookie;
